//! The top-level forecasting API.
//!
//! A [`Forecaster`] owns a compressor pool and exposes one entry point per
//! input domain: real or discrete values, scalar or parallel series, and
//! for real sources either one fixed partition cardinality or a mixture
//! over every power-of-two cardinality up to a maximum. Results map each
//! requested group string to its forecast series.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use cf_common::{split_groups, Error, Result};

use crate::compress::adaptor::{StreamPredictor, StreamPredictorAdaptor};
use crate::compress::{standard_pool, Compressor, CompressorPool};
use crate::distribution::Forecast;
use crate::pointwise::{BasicPointwisePredictor, PointwisePredictor, SparsePredictor};
use crate::predictor::{
    CompressionPredictor, DistributionStrategy, MultialphabetStrategy, SingleAlphabetStrategy,
};
use crate::sampler::{
    DiscreteSampler, DiscreteVectorSampler, RealSampler, RealVectorSampler, SeriesSampler,
};
use crate::series::PreprocessedSeries;

/// The forecast parameters every entry point shares.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ForecastParams {
    /// Number of future steps to predict, between 1 and 50.
    pub horizon: usize,
    /// Differencing order, at most 10.
    pub difference: usize,
    /// Sub-series stride of the sparse decorator, at most 20; non-positive
    /// values disable it.
    pub sparse: i32,
}

impl ForecastParams {
    pub fn validate(&self) -> Result<()> {
        if self.horizon == 0 || self.horizon > 50 {
            return Err(Error::InvalidArgument(format!(
                "forecasting horizon {} is outside 1..=50",
                self.horizon
            )));
        }
        if self.difference > 10 {
            return Err(Error::InvalidArgument(format!(
                "difference order {} is greater than 10",
                self.difference
            )));
        }
        if self.sparse > 20 {
            return Err(Error::InvalidArgument(format!(
                "sparse value {} is greater than 20",
                self.sparse
            )));
        }
        Ok(())
    }
}

fn check_quanta_count(quanta_count: usize) -> Result<()> {
    if quanta_count == 0 || quanta_count > 256 {
        return Err(Error::InvalidArgument(format!(
            "quanta count {quanta_count} is outside 1..=256"
        )));
    }
    Ok(())
}

fn check_power_of_two(quanta_count: usize) -> Result<()> {
    if !quanta_count.is_power_of_two() {
        return Err(Error::InvalidArgument(format!(
            "quanta count {quanta_count} is not a power of two"
        )));
    }
    Ok(())
}

/// Turns row-per-series input into row-per-point form and back.
fn pivot<T: Copy>(series: &[Vec<T>]) -> Result<Vec<Vec<T>>> {
    if series.is_empty() {
        return Ok(Vec::new());
    }
    let points = series[0].len();
    for (index, row) in series.iter().enumerate().skip(1) {
        if row.len() != points {
            return Err(Error::DifferentHistoryLengths {
                index,
                expected: points,
                actual: row.len(),
            });
        }
    }
    Ok((0..points)
        .map(|point| series.iter().map(|row| row[point]).collect())
        .collect())
}

fn run_pipeline<S: DistributionStrategy>(
    pool: &mut CompressorPool,
    values: Vec<<S::Sampler as SeriesSampler>::Input>,
    strategy: S,
    groups: &[String],
    params: ForecastParams,
) -> Result<Forecast<<S::Sampler as SeriesSampler>::Orig>> {
    let groups = split_groups(groups);
    let predictor = CompressionPredictor::new(strategy, params.difference);
    let basic = BasicPointwisePredictor::new(predictor);
    let history = PreprocessedSeries::new(values);
    if params.sparse > 0 {
        SparsePredictor::new(basic, params.sparse as usize).predict(
            pool,
            history,
            params.horizon,
            &groups,
        )
    } else {
        basic.predict(pool, history, params.horizon, &groups)
    }
}

fn scalar_result(
    forecast: &Forecast<f64>,
    horizon: usize,
) -> Result<BTreeMap<String, Vec<f64>>> {
    let mut result = BTreeMap::new();
    for name in forecast.rows() {
        let mut series = Vec::with_capacity(horizon);
        for step in 0..horizon {
            series.push(forecast.cell(name, &step)?.point);
        }
        result.insert(name.clone(), series);
    }
    Ok(result)
}

fn vector_result(
    forecast: &Forecast<Vec<f64>>,
    horizon: usize,
) -> Result<BTreeMap<String, Vec<Vec<f64>>>> {
    let mut result = BTreeMap::new();
    for name in forecast.rows() {
        let mut points = Vec::with_capacity(horizon);
        for step in 0..horizon {
            points.push(forecast.cell(name, &step)?.point.clone());
        }
        let series_count = points.first().map(Vec::len).unwrap_or(0);
        for (index, point) in points.iter().enumerate() {
            if point.len() != series_count {
                return Err(Error::DifferentHistoryLengths {
                    index,
                    expected: series_count,
                    actual: point.len(),
                });
            }
        }
        let per_series = (0..series_count)
            .map(|series| points.iter().map(|point| point[series]).collect())
            .collect();
        result.insert(name.clone(), per_series);
    }
    Ok(result)
}

/// Owns the compressor pool and runs the forecasting pipeline.
pub struct Forecaster {
    pool: CompressorPool,
}

impl Forecaster {
    /// A forecaster over the standard pool of built-in backends.
    pub fn new() -> Result<Self> {
        Ok(Self {
            pool: standard_pool()?,
        })
    }

    /// A forecaster over a caller-assembled pool.
    pub fn with_pool(pool: CompressorPool) -> Self {
        Self { pool }
    }

    /// Adopts an external compression backend under the given name.
    pub fn register_compressor(
        &mut self,
        name: &str,
        compressor: Box<dyn Compressor>,
    ) -> Result<()> {
        self.pool.register(name, compressor)
    }

    /// Wraps a per-symbol stream predictor into a virtual compressor and
    /// registers it for subsequent forecasting calls.
    pub fn register_stream_predictor(
        &mut self,
        name: &str,
        algorithm: Box<dyn StreamPredictor>,
    ) -> Result<()> {
        self.pool
            .register(name, Box::new(StreamPredictorAdaptor::new(algorithm)))
    }

    /// Forecast of a real-valued series at one fixed partition cardinality.
    pub fn forecast_real(
        &mut self,
        history: &[f64],
        groups: &[String],
        horizon: usize,
        difference: usize,
        quanta_count: usize,
        sparse: i32,
    ) -> Result<BTreeMap<String, Vec<f64>>> {
        let params = ForecastParams {
            horizon,
            difference,
            sparse,
        };
        params.validate()?;
        check_quanta_count(quanta_count)?;
        debug!(horizon, difference, quanta_count, sparse, "forecast_real");

        let strategy = SingleAlphabetStrategy::new(RealSampler::default(), quanta_count);
        let forecast = run_pipeline(&mut self.pool, history.to_vec(), strategy, groups, params)?;
        scalar_result(&forecast, horizon)
    }

    /// Forecast of a real-valued series mixing every power-of-two partition
    /// cardinality up to `max_quanta_count`.
    pub fn forecast_multialphabet(
        &mut self,
        history: &[f64],
        groups: &[String],
        horizon: usize,
        difference: usize,
        max_quanta_count: usize,
        sparse: i32,
    ) -> Result<BTreeMap<String, Vec<f64>>> {
        let params = ForecastParams {
            horizon,
            difference,
            sparse,
        };
        params.validate()?;
        check_quanta_count(max_quanta_count)?;
        check_power_of_two(max_quanta_count)?;
        debug!(
            horizon,
            difference, max_quanta_count, sparse, "forecast_multialphabet"
        );

        let strategy = MultialphabetStrategy::new(RealSampler::default(), max_quanta_count)?;
        let forecast = run_pipeline(&mut self.pool, history.to_vec(), strategy, groups, params)?;
        scalar_result(&forecast, horizon)
    }

    /// Multi-alphabet forecast of parallel real-valued series of equal
    /// length. The result maps each group to one row per input series.
    pub fn forecast_multialphabet_vec(
        &mut self,
        history: &[Vec<f64>],
        groups: &[String],
        horizon: usize,
        difference: usize,
        max_quanta_count: usize,
        sparse: i32,
    ) -> Result<BTreeMap<String, Vec<Vec<f64>>>> {
        let params = ForecastParams {
            horizon,
            difference,
            sparse,
        };
        params.validate()?;
        check_quanta_count(max_quanta_count)?;
        check_power_of_two(max_quanta_count)?;
        debug!(
            horizon,
            difference, max_quanta_count, sparse, "forecast_multialphabet_vec"
        );

        let points = pivot(history)?;
        let strategy = MultialphabetStrategy::new(RealVectorSampler::default(), max_quanta_count)?;
        let forecast = run_pipeline(&mut self.pool, points, strategy, groups, params)?;
        vector_result(&forecast, horizon)
    }

    /// Forecast of an integer-valued series.
    pub fn forecast_discrete(
        &mut self,
        history: &[u8],
        groups: &[String],
        horizon: usize,
        difference: usize,
        sparse: i32,
    ) -> Result<BTreeMap<String, Vec<f64>>> {
        let params = ForecastParams {
            horizon,
            difference,
            sparse,
        };
        params.validate()?;
        debug!(horizon, difference, sparse, "forecast_discrete");

        let strategy = SingleAlphabetStrategy::new(DiscreteSampler, 0);
        let forecast = run_pipeline(&mut self.pool, history.to_vec(), strategy, groups, params)?;
        scalar_result(&forecast, horizon)
    }

    /// Forecast of parallel integer-valued series. The integer vector
    /// sampler is not implemented; the call reports that faithfully.
    pub fn forecast_discrete_vec(
        &mut self,
        history: &[Vec<u8>],
        groups: &[String],
        horizon: usize,
        difference: usize,
        sparse: i32,
    ) -> Result<BTreeMap<String, Vec<Vec<f64>>>> {
        let params = ForecastParams {
            horizon,
            difference,
            sparse,
        };
        params.validate()?;
        debug!(horizon, difference, sparse, "forecast_discrete_vec");

        let points = pivot(history)?;
        let strategy = SingleAlphabetStrategy::new(DiscreteVectorSampler, 0);
        let forecast = run_pipeline(&mut self.pool, points, strategy, groups, params)?;
        vector_result(&forecast, horizon)
    }
}
