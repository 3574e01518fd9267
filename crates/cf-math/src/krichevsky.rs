//! The Krichevsky smoothed frequency estimator.
//!
//! Estimates the probability of the next symbol of a sequence from how often
//! the symbol has occurred so far, with additive 1/2 smoothing:
//!
//! ```text
//! P(sym) = (freq(sym) + 1/2) / (total + |A|/2)
//! ```
//!
//! Running products of these estimates serve as sequence probabilities whose
//! negated logarithm is a universal code length. See Krichevsky (1968),
//! "A relation between the plausibility of information about a source and
//! encoding redundancy".

use crate::wide::WideF64;

/// Probability of a symbol that occurred `sym_freq` times among `total_freq`
/// observations over an alphabet of `alphabet_size` symbols.
pub fn krichevsky(sym_freq: usize, total_freq: usize, alphabet_size: usize) -> WideF64 {
    WideF64::from_f64(sym_freq as f64 + 0.5) / WideF64::from_f64(total_freq as f64 + alphabet_size as f64 / 2.0)
}
