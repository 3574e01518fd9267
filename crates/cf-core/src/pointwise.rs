//! Pointwise forecasting on top of a distribution predictor.
//!
//! The basic predictor marginalizes the continuation probabilities per
//! step, takes expected values and integrates the differencing away. The
//! sparse decorator forecasts every `k`-th sub-series separately and
//! interleaves the results, which stretches a short continuation budget
//! over a long horizon.

use cf_common::{CompressorNames, Result};

use crate::compress::CompressorPool;
use crate::distribution::Forecast;
use crate::predictor::{CompressionPredictor, DistributionStrategy};
use crate::sampler::SeriesSampler;
use crate::series::PreprocessedSeries;
use crate::transforms::{integrate, to_pointwise_forecasts};

type OrigOf<P> = <<P as PointwisePredictor>::Sampler as SeriesSampler>::Orig;
type InputOf<P> = <<P as PointwisePredictor>::Sampler as SeriesSampler>::Input;

/// Produces per-step point forecasts for a history.
pub trait PointwisePredictor {
    type Sampler: SeriesSampler;

    fn predict(
        &self,
        pool: &mut CompressorPool,
        history: PreprocessedSeries<
            <Self::Sampler as SeriesSampler>::Orig,
            <Self::Sampler as SeriesSampler>::Input,
        >,
        horizon: usize,
        groups: &[CompressorNames],
    ) -> Result<Forecast<<Self::Sampler as SeriesSampler>::Orig>>;
}

/// Distribution → marginal per step → mean → integrated forecast.
pub struct BasicPointwisePredictor<S: DistributionStrategy> {
    predictor: CompressionPredictor<S>,
}

impl<S: DistributionStrategy> BasicPointwisePredictor<S> {
    pub fn new(predictor: CompressionPredictor<S>) -> Self {
        Self { predictor }
    }
}

impl<S: DistributionStrategy> PointwisePredictor for BasicPointwisePredictor<S> {
    type Sampler = S::Sampler;

    fn predict(
        &self,
        pool: &mut CompressorPool,
        history: PreprocessedSeries<OrigOf<Self>, InputOf<Self>>,
        horizon: usize,
        groups: &[CompressorNames],
    ) -> Result<Forecast<OrigOf<Self>>> {
        let distribution = self.predictor.predict(pool, history, horizon, groups)?;
        let mut forecast = to_pointwise_forecasts(&distribution, horizon)?;
        integrate(&mut forecast)?;
        Ok(forecast)
    }
}

/// Decorator interleaving forecasts of the `k` strided sub-series; the
/// first `⌈horizon/k⌉` steps come from the full-series forecast.
pub struct SparsePredictor<P: PointwisePredictor> {
    inner: P,
    sparse: usize,
}

impl<P: PointwisePredictor> SparsePredictor<P> {
    pub fn new(inner: P, sparse: usize) -> Self {
        debug_assert!(sparse >= 1);
        Self { inner, sparse }
    }
}

impl<P: PointwisePredictor> PointwisePredictor for SparsePredictor<P> {
    type Sampler = P::Sampler;

    fn predict(
        &self,
        pool: &mut CompressorPool,
        history: PreprocessedSeries<OrigOf<Self>, InputOf<Self>>,
        horizon: usize,
        groups: &[CompressorNames],
    ) -> Result<Forecast<OrigOf<Self>>> {
        let sparsed_horizon = horizon.div_ceil(self.sparse);

        let mut partial = Vec::with_capacity(self.sparse);
        for offset in 0..self.sparse {
            let mut sub_series = PreprocessedSeries::default();
            sub_series.copy_info_from(&history);
            for j in (offset..history.len()).step_by(self.sparse) {
                sub_series.push(history.values()[j].clone());
            }
            partial.push(self.inner.predict(pool, sub_series, sparsed_horizon, groups)?);
        }

        let full = self.inner.predict(pool, history, sparsed_horizon, groups)?;
        let mut result = Forecast::new();
        for step in 0..sparsed_horizon {
            for name in full.rows() {
                *result.cell_mut(name, &step) = full.cell(name, &step)?.clone();
            }
        }

        for step in 0..sparsed_horizon {
            for offset in 0..self.sparse {
                let position = step * self.sparse + offset;
                if position >= sparsed_horizon && position < horizon {
                    for name in partial[offset].rows() {
                        *result.cell_mut(name, &position) =
                            partial[offset].cell(name, &step)?.clone();
                    }
                }
            }
        }
        Ok(result)
    }
}
