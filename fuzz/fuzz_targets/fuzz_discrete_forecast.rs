//! Fuzz target for the discrete forecasting entry point.
//!
//! Bounded histories over a small alphabet must forecast without panicking
//! and without producing NaN.

#![no_main]

use cf_core::Forecaster;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.is_empty() || data.len() > 64 {
        return;
    }
    let history: Vec<u8> = data.iter().map(|&byte| byte % 4).collect();

    let mut forecaster = match Forecaster::new() {
        Ok(forecaster) => forecaster,
        Err(_) => return,
    };
    if let Ok(result) = forecaster.forecast_discrete(&history, &["zlib".to_string()], 2, 0, -1) {
        for series in result.values() {
            assert!(series.iter().all(|value| !value.is_nan()));
        }
    }
});
