//! Fuzz target for the real-valued sampler.
//!
//! Arbitrary (including non-finite) inputs must produce either an error or
//! symbols inside the requested alphabet; no panics.

#![no_main]

use cf_core::sampler::{RealSampler, SeriesSampler};
use cf_core::PreprocessedSeries;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: (Vec<f64>, u8)| {
    let (values, quanta) = input;
    let quanta = usize::from(quanta).max(1);
    let series = PreprocessedSeries::<f64, f64>::new(values);
    if let Ok(sampled) = RealSampler::default().transform(&series, quanta) {
        assert!(sampled
            .values()
            .iter()
            .all(|&symbol| usize::from(symbol) < quanta));
    }
});
