//! Information-theoretic time-series forecasting.
//!
//! Any universal lossless compressor doubles as a universal predictor: among
//! the hypothesized continuations of a history, the one the compressor
//! encodes in the fewest bits is the most probable. This crate builds a
//! forecasting pipeline on that idea:
//!
//! 1. Sample the (real- or integer-valued, scalar or vector) series onto a
//!    zero-based symbol alphabet, optionally differencing it first.
//! 2. Enumerate every continuation of the requested horizon and ask each
//!    compressor for the code length of `history ⧺ continuation`.
//! 3. Turn code lengths into normalized probabilities, mix them over
//!    compressor groups (and over quantization partitions in the
//!    multi-alphabet case), marginalize per step, take pointwise means, undo
//!    the differencing, and map symbols back to values.
//!
//! The [`facade::Forecaster`] is the entry point; [`selector`] picks the
//! best compressors for a series ahead of a full forecast. Compressor
//! backends plug in through the [`compress::Compressor`] port, and any
//! per-symbol stream predictor can join the pool via
//! [`compress::adaptor::StreamPredictor`].

pub mod automaton;
pub mod compress;
pub mod continuation;
pub mod distribution;
pub mod facade;
pub mod pointwise;
pub mod predictor;
pub mod sampler;
pub mod selector;
pub mod series;
pub mod table;
pub mod transforms;

pub use automaton::SensingDfa;
pub use compress::adaptor::{Confidence, StreamPredictor, StreamPredictorAdaptor};
pub use compress::{standard_pool, Compressor, CompressorPool};
pub use continuation::{Continuation, ContinuationGenerator};
pub use distribution::{ContinuationsDistribution, Forecast, ForecastPoint, SymbolsDistribution};
pub use facade::{ForecastParams, Forecaster};
pub use selector::{
    select_best_compressors_discrete, select_best_compressors_real, Share,
};
pub use series::{diff_plain, PreprocInfo, PreprocessedSeries};
pub use table::LabeledTable;
