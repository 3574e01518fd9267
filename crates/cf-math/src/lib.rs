//! compression-forecast math utilities.

pub mod krichevsky;
pub mod weights;
pub mod wide;

pub use krichevsky::krichevsky;
pub use weights::{countable_weights, uniform_weights};
pub use wide::WideF64;
