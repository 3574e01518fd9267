//! Code-length evaluation and the distribution-predictor strategies.
//!
//! The code-length computer asks every compressor for the bit lengths of
//! `history ⧺ continuation` over all continuations of the horizon. The
//! strategies turn those lengths into code probabilities: the discrete and
//! fixed-partition real strategies work at a single alphabet, the
//! multi-alphabet strategy mixes every power-of-two partition cardinality
//! up to a maximum.

use cf_common::{distinct_names, CompressorName, CompressorNames, Error, Result, Symbol};
use cf_math::WideF64;

use crate::compress::CompressorPool;
use crate::continuation::{Continuation, ContinuationGenerator};
use crate::distribution::ContinuationsDistribution;
use crate::sampler::SeriesSampler;
use crate::series::{diff_n, PreprocessedSeries};
use crate::table::LabeledTable;
use crate::transforms::{
    add_to_each, form_group_mixtures, merge, min_cell, normalize_columns, to_code_probabilities,
    WeightsKind,
};

/// Fills a table with the bit length of `history ⧺ continuation` for every
/// (continuation, compressor) pair, enumerating all `A^horizon`
/// continuations.
pub fn compute_continuations_distribution<O: Clone>(
    pool: &mut CompressorPool,
    history: &PreprocessedSeries<O, Symbol>,
    horizon: usize,
    names: &[CompressorName],
) -> Result<ContinuationsDistribution<O>> {
    let alphabet = history.info().sampling_alphabet();
    if alphabet == 0 {
        return Err(Error::InvalidArgument(
            "history has an empty sampling alphabet".into(),
        ));
    }
    let continuations: Vec<Continuation> =
        ContinuationGenerator::new(alphabet, horizon)?.collect();
    compute_distribution_for(pool, history, names, &continuations)
}

/// Same as [`compute_continuations_distribution`] over an explicit set of
/// continuations.
pub fn compute_distribution_for<O: Clone>(
    pool: &mut CompressorPool,
    history: &PreprocessedSeries<O, Symbol>,
    names: &[CompressorName],
    continuations: &[Continuation],
) -> Result<ContinuationsDistribution<O>> {
    let alphabet = history.info().sampling_alphabet();
    if alphabet == 0 || alphabet > 256 {
        return Err(Error::InvalidArgument(format!(
            "sampling alphabet of {alphabet} symbols is outside the byte range"
        )));
    }
    pool.set_alphabet(0, (alphabet - 1) as Symbol);

    let mut table = ContinuationsDistribution::from_table(LabeledTable::with_labels(
        continuations.iter().cloned(),
        names.iter().cloned(),
    ));
    for name in names {
        let lengths = pool.compress_continuations(name, history.values(), continuations)?;
        for (continuation, bits) in continuations.iter().zip(lengths) {
            *table.cell_mut(continuation, name) = WideF64::from(bits);
        }
    }
    Ok(table)
}

/// A way of turning a (differenced) history into a table of code
/// probabilities over continuations.
pub trait DistributionStrategy {
    type Sampler: SeriesSampler;

    fn obtain_code_probabilities(
        &self,
        pool: &mut CompressorPool,
        history: &PreprocessedSeries<
            <Self::Sampler as SeriesSampler>::Orig,
            <Self::Sampler as SeriesSampler>::Input,
        >,
        horizon: usize,
        names: &[CompressorName],
    ) -> Result<ContinuationsDistribution<<Self::Sampler as SeriesSampler>::Orig>>;
}

/// Samples at one fixed alphabet (the data-derived one for discrete
/// sources, a fixed partition cardinality for real ones), shifts by the
/// minimal code length and exponentiates.
pub struct SingleAlphabetStrategy<S> {
    sampler: S,
    partition_cardinality: usize,
}

impl<S> SingleAlphabetStrategy<S> {
    pub fn new(sampler: S, partition_cardinality: usize) -> Self {
        Self {
            sampler,
            partition_cardinality,
        }
    }
}

impl<S: SeriesSampler> DistributionStrategy for SingleAlphabetStrategy<S> {
    type Sampler = S;

    fn obtain_code_probabilities(
        &self,
        pool: &mut CompressorPool,
        history: &PreprocessedSeries<S::Orig, S::Input>,
        horizon: usize,
        names: &[CompressorName],
    ) -> Result<ContinuationsDistribution<S::Orig>> {
        let sampled = self.sampler.transform(history, self.partition_cardinality)?;
        let mut table = compute_continuations_distribution(pool, &sampled, horizon, names)?;
        let min = min_cell(&table).unwrap_or(WideF64::ZERO);
        add_to_each(&mut table, -min);
        to_code_probabilities(&mut table);
        table.set_info(sampled.info().clone());
        Ok(table)
    }
}

/// Evaluates every power-of-two partition cardinality `2, 4, …, max` and
/// merges the per-partition tables with countable weights. The shift
/// `(levels − i − 1) · message_length` levels the code-length bias between
/// alphabets of different size before the tables are made comparable.
pub struct MultialphabetStrategy<S> {
    sampler: S,
    log2_max_partition: u32,
}

impl<S> MultialphabetStrategy<S> {
    pub fn new(sampler: S, max_partition_cardinality: usize) -> Result<Self> {
        if max_partition_cardinality < 2 || !max_partition_cardinality.is_power_of_two() {
            return Err(Error::InvalidArgument(format!(
                "maximal partition cardinality {max_partition_cardinality} is not a power of two of at least 2"
            )));
        }
        Ok(Self {
            sampler,
            log2_max_partition: max_partition_cardinality.trailing_zeros(),
        })
    }
}

impl<S: SeriesSampler> DistributionStrategy for MultialphabetStrategy<S> {
    type Sampler = S;

    fn obtain_code_probabilities(
        &self,
        pool: &mut CompressorPool,
        history: &PreprocessedSeries<S::Orig, S::Input>,
        horizon: usize,
        names: &[CompressorName],
    ) -> Result<ContinuationsDistribution<S::Orig>> {
        let levels = self.log2_max_partition as usize;
        let mut tables = Vec::with_capacity(levels);
        let mut alphabets = Vec::with_capacity(levels);
        for level in 0..levels {
            let quanta = 1usize << (level + 1);
            let sampled = self.sampler.transform(history, quanta)?;
            // In the vector case this is quanta^series_count, not quanta.
            alphabets.push(sampled.info().sampling_alphabet());
            let mut table = compute_continuations_distribution(pool, &sampled, horizon, names)?;
            table.set_info(sampled.info().clone());
            tables.push(table);
        }

        let message_length = history.len() + horizon;
        for (level, table) in tables.iter_mut().enumerate() {
            add_to_each(
                table,
                WideF64::from(((levels - level - 1) * message_length) as u64),
            );
        }
        let global_min = tables
            .iter()
            .flat_map(|table| table.values())
            .min()
            .copied()
            .unwrap_or(WideF64::ZERO);
        for table in &mut tables {
            add_to_each(table, -global_min);
            to_code_probabilities(table);
        }

        let weights = WeightsKind::Countable.generate(levels);
        merge(&tables, &alphabets, &weights)
    }
}

/// The common outer predictor: differences the history, evaluates the
/// strategy over the distinct compressor names, appends group mixture
/// columns and normalizes every column into a probability distribution.
pub struct CompressionPredictor<S: DistributionStrategy> {
    strategy: S,
    weights: WeightsKind,
    difference_order: usize,
}

impl<S: DistributionStrategy> CompressionPredictor<S> {
    pub fn new(strategy: S, difference_order: usize) -> Self {
        Self {
            strategy,
            weights: WeightsKind::Uniform,
            difference_order,
        }
    }

    pub fn predict(
        &self,
        pool: &mut CompressorPool,
        history: PreprocessedSeries<
            <S::Sampler as SeriesSampler>::Orig,
            <S::Sampler as SeriesSampler>::Input,
        >,
        horizon: usize,
        groups: &[CompressorNames],
    ) -> Result<ContinuationsDistribution<<S::Sampler as SeriesSampler>::Orig>> {
        let differenced = diff_n(history, self.difference_order);
        let names = distinct_names(groups);
        let mut distribution =
            self.strategy
                .obtain_code_probabilities(pool, &differenced, horizon, &names)?;
        form_group_mixtures(&mut distribution, groups, self.weights)?;
        normalize_columns(&mut distribution)?;
        Ok(distribution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compress::Compressor;
    use crate::sampler::DiscreteSampler;

    /// Reports `8 * (history length + sum of continuation digits)` so that
    /// lexicographically smaller continuations look more compressible.
    struct DigitSumCompressor;

    impl Compressor for DigitSumCompressor {
        fn compress(&mut self, data: &[Symbol], _output: &mut Vec<u8>) -> Result<u64> {
            Ok(8 * data.iter().map(|&s| s as u64 + 1).sum::<u64>())
        }
    }

    fn pool_with_digit_sum() -> CompressorPool {
        let mut pool = CompressorPool::new();
        pool.register("digits", Box::new(DigitSumCompressor)).unwrap();
        pool
    }

    #[test]
    fn test_computer_fills_all_cells() {
        let mut pool = pool_with_digit_sum();
        let mut history = PreprocessedSeries::<f64, Symbol>::new(vec![0, 1, 0, 1]);
        history.info_mut().set_sampling_alphabet(2);

        let names = vec!["digits".to_string()];
        let table = compute_continuations_distribution(&mut pool, &history, 2, &names).unwrap();
        assert_eq!(table.row_count(), 4);
        assert_eq!(table.col_count(), 1);

        // history cost is 8 * 6; ending [1, 0] adds 8 * 3.
        let ending = Continuation::from_digits(vec![1, 0], 2).unwrap();
        let bits = table.cell(&ending, &names[0]).unwrap().to_f64();
        assert_eq!(bits, (8 * (6 + 3)) as f64);
    }

    #[test]
    fn test_computer_rejects_empty_alphabet() {
        let mut pool = pool_with_digit_sum();
        let history = PreprocessedSeries::<f64, Symbol>::new(vec![]);
        let names = vec!["digits".to_string()];
        assert!(compute_continuations_distribution(&mut pool, &history, 2, &names).is_err());
    }

    #[test]
    fn test_single_alphabet_strategy_produces_code_probabilities() {
        let mut pool = pool_with_digit_sum();
        let history = PreprocessedSeries::<f64, u8>::new(vec![5, 6, 5, 6, 5]);
        let strategy = SingleAlphabetStrategy::new(DiscreteSampler, 0);
        let names = vec!["digits".to_string()];
        let table = strategy
            .obtain_code_probabilities(&mut pool, &history, 1, &names)
            .unwrap();

        // The cheapest continuation carries probability 1 after the shift.
        let best = table.values().max().unwrap();
        assert_eq!(best.to_f64(), 1.0);
        assert!(table.info().is_sampled());
        assert_eq!(table.info().sampling_alphabet(), 2);
    }

    #[test]
    fn test_compression_predictor_normalizes_and_mixes_groups() {
        let mut pool = pool_with_digit_sum();
        let history = PreprocessedSeries::<f64, u8>::new(vec![5, 6, 5, 6, 5, 6]);
        let predictor =
            CompressionPredictor::new(SingleAlphabetStrategy::new(DiscreteSampler, 0), 0);
        let groups = vec![vec!["digits".to_string()]];
        let distribution = predictor.predict(&mut pool, history, 2, &groups).unwrap();

        let total: f64 = distribution
            .rows()
            .iter()
            .map(|row| {
                distribution
                    .cell(row, &"digits".to_string())
                    .unwrap()
                    .to_f64()
            })
            .sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_multialphabet_strategy_merges_partitions() {
        use crate::sampler::RealSampler;

        let mut pool = pool_with_digit_sum();
        let history =
            PreprocessedSeries::<f64, f64>::new(vec![1.0, 4.0, 2.0, 5.0, 3.0, 4.5, 2.5, 1.5]);
        let strategy = MultialphabetStrategy::new(RealSampler::default(), 8).unwrap();
        let names = vec!["digits".to_string()];
        let table = strategy
            .obtain_code_probabilities(&mut pool, &history, 1, &names)
            .unwrap();

        // Merged over partitions 2, 4, 8: indexed by the finest alphabet.
        assert_eq!(table.row_count(), 8);
        assert_eq!(table.info().sampling_alphabet(), 8);
        assert!(table.values().all(|v| v.to_f64() >= 0.0));
    }

    #[test]
    fn test_multialphabet_rejects_non_power_of_two() {
        use crate::sampler::RealSampler;
        assert!(MultialphabetStrategy::new(RealSampler::default(), 6).is_err());
        assert!(MultialphabetStrategy::new(RealSampler::default(), 1).is_err());
    }
}
