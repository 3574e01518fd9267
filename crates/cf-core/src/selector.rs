//! Fast selection of the most suitable compressors for a series.
//!
//! Instead of forecasting with every available compressor, a candidate set
//! is evaluated on a prefix of the series: each compressor's code length is
//! measured (for real series, at every requested quantization level, with a
//! per-level correction normalizing bits between alphabets) and the best
//! `target` names by length are returned.

use std::collections::BTreeMap;

use tracing::debug;

use cf_common::{CompressorName, CompressorNames, Error, Result, Symbol};

use crate::compress::{standard_pool, CompressorPool};
use crate::sampler::{DiscreteSampler, RealSampler, SeriesSampler};
use crate::series::{diff_plain, Element, PreprocessedSeries};

/// A share of a series, validated into `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Share(f64);

impl Share {
    pub fn new(value: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&value) {
            return Err(Error::InvalidArgument(format!(
                "share {value} is outside [0, 1]"
            )));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

/// One quantization of the evaluation prefix.
struct QuantizedSeries {
    symbols: Vec<Symbol>,
    alphabet: usize,
}

/// Per-element-type behavior of the selector: how to quantize, which
/// quantization levels are acceptable, and how to correct code lengths
/// between levels.
trait SelectableSeries: Element + Sized {
    fn check_quanta_counts(quanta_counts: &[usize]) -> Result<()>;

    fn corrections(quanta_counts: &[usize], series_len: usize) -> Vec<u64>;

    fn quantize(series: &[Self], quanta_counts: &[usize]) -> Result<Vec<QuantizedSeries>>;
}

impl SelectableSeries for u8 {
    fn check_quanta_counts(_quanta_counts: &[usize]) -> Result<()> {
        // Quantization levels are ignored for discrete series.
        Ok(())
    }

    fn corrections(_quanta_counts: &[usize], _series_len: usize) -> Vec<u64> {
        vec![0]
    }

    fn quantize(series: &[Self], _quanta_counts: &[usize]) -> Result<Vec<QuantizedSeries>> {
        let sampled =
            DiscreteSampler.transform(&PreprocessedSeries::<f64, u8>::new(series.to_vec()), 0)?;
        Ok(vec![QuantizedSeries {
            alphabet: sampled.info().sampling_alphabet(),
            symbols: sampled.values().to_vec(),
        }])
    }
}

impl SelectableSeries for f64 {
    fn check_quanta_counts(quanta_counts: &[usize]) -> Result<()> {
        if quanta_counts.is_empty() {
            return Err(Error::InvalidArgument(
                "real-valued selection needs at least one quantization level".into(),
            ));
        }
        Ok(())
    }

    fn corrections(quanta_counts: &[usize], series_len: usize) -> Vec<u64> {
        let max_log = quanta_counts
            .iter()
            .map(|&quanta| (quanta as f64).log2() as u64)
            .max()
            .unwrap_or(0);
        quanta_counts
            .iter()
            .map(|&quanta| (max_log - (quanta as f64).log2() as u64) * series_len as u64)
            .collect()
    }

    fn quantize(series: &[Self], quanta_counts: &[usize]) -> Result<Vec<QuantizedSeries>> {
        let sampler = RealSampler::default();
        quanta_counts
            .iter()
            .map(|&quanta| {
                let sampled =
                    sampler.transform(&PreprocessedSeries::<f64, f64>::new(series.to_vec()), quanta)?;
                Ok(QuantizedSeries {
                    alphabet: sampled.info().sampling_alphabet(),
                    symbols: sampled.values().to_vec(),
                })
            })
            .collect()
    }
}

/// Code length of the (differenced) series under every candidate, taking
/// the minimum over quantization levels after correction. An empty
/// differenced series maps every candidate to zero.
fn evaluate_code_lengths<T: SelectableSeries>(
    pool: &mut CompressorPool,
    history: &[T],
    names: &[CompressorName],
    difference: usize,
    quanta_counts: &[usize],
) -> Result<BTreeMap<CompressorName, u64>> {
    T::check_quanta_counts(quanta_counts)?;

    let differenced = diff_plain(history.to_vec(), difference);
    let mut results = BTreeMap::new();
    if differenced.is_empty() {
        for name in names {
            results.insert(name.clone(), 0);
        }
        return Ok(results);
    }

    let corrections = T::corrections(quanta_counts, differenced.len());
    let quantized = T::quantize(&differenced, quanta_counts)?;
    debug_assert_eq!(corrections.len(), quantized.len());

    for name in names {
        let mut best: Option<u64> = None;
        for (series, correction) in quantized.iter().zip(&corrections) {
            pool.set_alphabet(0, (series.alphabet.max(1) - 1) as Symbol);
            let bits = pool.compress(name, &series.symbols)? + correction;
            best = Some(best.map_or(bits, |current| current.min(bits)));
        }
        if let Some(bits) = best {
            results.insert(name.clone(), bits);
        }
    }
    Ok(results)
}

/// The `target` names with the smallest code lengths; exact ties break by
/// lexicographic name order.
fn best_compressors(
    results: &BTreeMap<CompressorName, u64>,
    target: usize,
) -> Result<CompressorNames> {
    if results.len() < target {
        return Err(Error::Selector(format!(
            "cannot pick {target} compressors out of {}",
            results.len()
        )));
    }
    let mut ranked: Vec<(&CompressorName, &u64)> = results.iter().collect();
    ranked.sort_by(|a, b| a.1.cmp(b.1).then_with(|| a.0.cmp(b.0)));
    Ok(ranked
        .into_iter()
        .take(target)
        .map(|(name, _)| name.clone())
        .collect())
}

fn select_impl<T: SelectableSeries>(
    history: &[T],
    candidates: &[String],
    difference: usize,
    quanta_counts: &[usize],
    share: Share,
    target: usize,
) -> Result<CompressorNames> {
    let prefix_len = ((history.len() as f64 * share.value()).ceil() as usize).min(history.len());
    let prefix = &history[..prefix_len];
    debug!(
        candidates = candidates.len(),
        prefix = prefix_len,
        target,
        "selecting compressors"
    );

    let mut pool = standard_pool()?;
    let results = evaluate_code_lengths(&mut pool, prefix, candidates, difference, quanta_counts)?;
    best_compressors(&results, target)
}

/// Picks the best `target` compressors for a real-valued series, judging on
/// the first `share` of it.
pub fn select_best_compressors_real(
    history: &[f64],
    candidates: &[String],
    difference: usize,
    quanta_counts: &[usize],
    share: Share,
    target: usize,
) -> Result<CompressorNames> {
    select_impl(history, candidates, difference, quanta_counts, share, target)
}

/// Picks the best `target` compressors for an integer-valued series.
pub fn select_best_compressors_discrete(
    history: &[u8],
    candidates: &[String],
    difference: usize,
    quanta_counts: &[usize],
    share: Share,
    target: usize,
) -> Result<CompressorNames> {
    select_impl(history, candidates, difference, quanta_counts, share, target)
}
