//! Shared types for the compression-forecast workspace.
//!
//! This crate carries the pieces every other crate needs: the unified error
//! taxonomy with stable codes, the primitive symbol aliases, and the helpers
//! for working with concatenated compressor-group names.

pub mod error;
pub mod names;

pub use error::{Error, ErrorCategory, Result};
pub use names::{concatenate_names, distinct_names, split_group, split_groups};

/// A symbol of a discrete alphabet. Sampled series and compressor inputs are
/// sequences of these.
pub type Symbol = u8;

/// Name of a single compressor, e.g. `"zlib"`.
pub type CompressorName = String;

/// A list of compressor names forming one mixture group.
pub type CompressorNames = Vec<CompressorName>;
