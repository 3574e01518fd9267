//! Sampling real- and integer-valued series onto symbol alphabets.
//!
//! Real sources are bucketed into `N` equal-width intervals after widening
//! the observed range by a fractional indent, and remember the interval
//! midpoints for the inverse mapping. Integer sources are shifted so the
//! smallest value becomes symbol zero. Vector sources quantize each
//! coordinate separately and fold the digit vector into a single base-`N`
//! symbol.

use cf_common::{Error, Result, Symbol};

use crate::series::{Element, PreprocInfo, PreprocessedSeries, RealElement};

/// Fractional widening applied to the observed min/max before bucketing.
pub const DEFAULT_INDENT: f64 = 0.1;

/// Maps a series onto the zero-based symbol alphabet, recording everything
/// needed for the inverse mapping in the result's preprocessing info.
pub trait SeriesSampler {
    type Orig: InverseSample;
    type Input: Element<Original = Self::Orig>;

    /// `quanta` is the partition cardinality for real-valued sources;
    /// discrete sources derive their alphabet from the data and ignore it.
    fn transform(
        &self,
        series: &PreprocessedSeries<Self::Orig, Self::Input>,
        quanta: usize,
    ) -> Result<PreprocessedSeries<Self::Orig, Symbol>>;
}

/// Mapping from a symbol back to a representative value of the original
/// domain.
pub trait InverseSample: RealElement {
    fn inverse_sample(symbol: Symbol, info: &PreprocInfo<Self>) -> Result<Self>;
}

impl InverseSample for f64 {
    fn inverse_sample(symbol: Symbol, info: &PreprocInfo<Self>) -> Result<Self> {
        if !info.is_sampled() {
            return Ok(f64::from(symbol));
        }
        info.desample_table()
            .get(symbol as usize)
            .copied()
            .ok_or_else(|| {
                Error::Range(format!(
                    "symbol {symbol} has no entry in a desample table of {} values",
                    info.desample_table().len()
                ))
            })
    }
}

impl InverseSample for Vec<f64> {
    fn inverse_sample(symbol: Symbol, info: &PreprocInfo<Self>) -> Result<Self> {
        let tables = info.desample_table();
        let series_count = tables.len();
        if series_count == 0 {
            return Err(Error::Range(
                "vector series has no desample tables".into(),
            ));
        }
        let single_alphabet = (info.sampling_alphabet() as f64)
            .powf(1.0 / series_count as f64)
            .round() as usize;
        let digits = from_dec(symbol, single_alphabet)?;
        if digits.len() > series_count {
            return Err(Error::Range(format!(
                "symbol {symbol} decomposes into {} digits for {series_count} series",
                digits.len()
            )));
        }
        let mut point = Vec::with_capacity(series_count);
        for (coordinate, table) in tables.iter().enumerate() {
            let digit = digits.get(coordinate).copied().unwrap_or(0) as usize;
            point.push(*table.get(digit).ok_or_else(|| {
                Error::Range(format!(
                    "digit {digit} has no entry in the desample table of coordinate {coordinate}"
                ))
            })?);
        }
        Ok(point)
    }
}

fn bucket_index(value: f64, min: f64, delta: f64, quanta: usize) -> Symbol {
    let raw = ((value - min) / delta).floor();
    let index = if raw.is_finite() && raw > 0.0 {
        raw as usize
    } else {
        0
    };
    // The maximal element of the series lands one past the last bucket.
    index.min(quanta - 1) as Symbol
}

/// Equal-width bucketing of a real scalar series.
#[derive(Clone, Debug)]
pub struct RealSampler {
    indent: f64,
}

impl Default for RealSampler {
    fn default() -> Self {
        Self {
            indent: DEFAULT_INDENT,
        }
    }
}

impl SeriesSampler for RealSampler {
    type Orig = f64;
    type Input = f64;

    fn transform(
        &self,
        series: &PreprocessedSeries<f64, f64>,
        quanta: usize,
    ) -> Result<PreprocessedSeries<f64, Symbol>> {
        if series.len() == 1 {
            return Err(Error::SeriesTooShort(
                "a real series must contain at least 2 points or be empty".into(),
            ));
        }
        if series.is_empty() {
            return Ok(PreprocessedSeries::default());
        }
        if quanta == 0 {
            return Err(Error::InvalidArgument(
                "partition cardinality must be positive".into(),
            ));
        }

        let mut min = series.values().iter().cloned().fold(f64::INFINITY, f64::min);
        let mut max = series
            .values()
            .iter()
            .cloned()
            .fold(f64::NEG_INFINITY, f64::max);
        let width = (max - min).abs();
        min -= width * self.indent;
        max += width * self.indent;
        let delta = (max - min) / quanta as f64;

        let symbols = series
            .values()
            .iter()
            .map(|&value| bucket_index(value, min, delta, quanta))
            .collect();

        let mut result = PreprocessedSeries::new(symbols);
        result.copy_info_from(series);
        let table = (0..quanta)
            .map(|i| min + i as f64 * delta + delta / 2.0)
            .collect();
        result.info_mut().set_desample_table(table);
        result.info_mut().set_desample_indent(self.indent);
        result.info_mut().set_sampling_alphabet(quanta);
        Ok(result)
    }
}

/// Zero-alignment of an integer scalar series.
#[derive(Clone, Debug, Default)]
pub struct DiscreteSampler;

impl SeriesSampler for DiscreteSampler {
    type Orig = f64;
    type Input = u8;

    fn transform(
        &self,
        series: &PreprocessedSeries<f64, u8>,
        _quanta: usize,
    ) -> Result<PreprocessedSeries<f64, Symbol>> {
        if series.is_empty() {
            return Ok(PreprocessedSeries::default());
        }

        let min = *series.values().iter().min().unwrap_or(&0);
        let max = *series.values().iter().max().unwrap_or(&0);
        let symbols = series.values().iter().map(|&value| value - min).collect();

        let mut result = PreprocessedSeries::new(symbols);
        result.copy_info_from(series);
        let alphabet = (max - min) as usize + 1;
        let table = (0..alphabet).map(|i| f64::from(min) + i as f64).collect();
        result.info_mut().set_desample_table(table);
        result.info_mut().set_sampling_alphabet(alphabet);
        Ok(result)
    }
}

/// Per-coordinate bucketing of parallel real series, folded into one symbol.
#[derive(Clone, Debug)]
pub struct RealVectorSampler {
    indent: f64,
}

impl Default for RealVectorSampler {
    fn default() -> Self {
        Self {
            indent: DEFAULT_INDENT,
        }
    }
}

impl SeriesSampler for RealVectorSampler {
    type Orig = Vec<f64>;
    type Input = Vec<f64>;

    fn transform(
        &self,
        series: &PreprocessedSeries<Vec<f64>, Vec<f64>>,
        quanta: usize,
    ) -> Result<PreprocessedSeries<Vec<f64>, Symbol>> {
        if series.len() == 1 {
            return Err(Error::SeriesTooShort(
                "a real series must contain at least 2 points or be empty".into(),
            ));
        }
        if series.is_empty() {
            return Ok(PreprocessedSeries::default());
        }
        if quanta == 0 {
            return Err(Error::InvalidArgument(
                "partition cardinality must be positive".into(),
            ));
        }

        let series_count = series.values()[0].len();
        let mut alphabet: usize = 1;
        for _ in 0..series_count {
            alphabet = alphabet.saturating_mul(quanta);
            if alphabet > 256 {
                return Err(Error::IntervalsCount(format!(
                    "{quanta} intervals over {series_count} series exceed the byte alphabet"
                )));
            }
        }

        let mut mins = vec![f64::INFINITY; series_count];
        let mut maxs = vec![f64::NEG_INFINITY; series_count];
        for point in series.values() {
            debug_assert_eq!(point.len(), series_count);
            for (coordinate, &value) in point.iter().enumerate() {
                mins[coordinate] = mins[coordinate].min(value);
                maxs[coordinate] = maxs[coordinate].max(value);
            }
        }
        let mut deltas = vec![0.0; series_count];
        for coordinate in 0..series_count {
            let width = (maxs[coordinate] - mins[coordinate]).abs();
            mins[coordinate] -= width * self.indent;
            maxs[coordinate] += width * self.indent;
            deltas[coordinate] = (maxs[coordinate] - mins[coordinate]) / quanta as f64;
        }

        let mut result = PreprocessedSeries::default();
        for point in series.values() {
            let digits: Vec<Symbol> = point
                .iter()
                .enumerate()
                .map(|(coordinate, &value)| {
                    bucket_index(value, mins[coordinate], deltas[coordinate], quanta)
                })
                .collect();
            result.push(to_dec(&digits, quanta)?);
        }
        result.copy_info_from(series);

        let tables = (0..series_count)
            .map(|coordinate| {
                (0..quanta)
                    .map(|i| {
                        mins[coordinate]
                            + i as f64 * deltas[coordinate]
                            + deltas[coordinate] / 2.0
                    })
                    .collect()
            })
            .collect();
        result.info_mut().set_desample_table(tables);
        result.info_mut().set_desample_indent(self.indent);
        result.info_mut().set_sampling_alphabet(alphabet);
        Ok(result)
    }
}

/// Placeholder for integer vector sources; the transformation is not
/// implemented and callers must not depend on it.
#[derive(Clone, Debug, Default)]
pub struct DiscreteVectorSampler;

impl SeriesSampler for DiscreteVectorSampler {
    type Orig = Vec<f64>;
    type Input = Vec<u8>;

    fn transform(
        &self,
        _series: &PreprocessedSeries<Vec<f64>, Vec<u8>>,
        _quanta: usize,
    ) -> Result<PreprocessedSeries<Vec<f64>, Symbol>> {
        Err(Error::NotImplemented(
            "sampling of integer vector series is not implemented".into(),
        ))
    }
}

fn check_base(base: usize) -> Result<()> {
    if base < 2 {
        return Err(Error::InvalidBase { base });
    }
    Ok(())
}

/// Folds a little-endian digit string into one symbol: `Σ digit_i · base^i`.
pub fn to_dec(number: &[Symbol], base: usize) -> Result<Symbol> {
    check_base(base)?;
    if number.is_empty() {
        return Err(Error::EmptyInput(
            "cannot convert an empty number".into(),
        ));
    }

    let mut value: usize = 0;
    let mut base_power: usize = 1;
    for &digit in number {
        if digit as usize >= base {
            return Err(Error::InvalidDigit {
                digit: digit as usize,
                base,
            });
        }
        value += base_power * digit as usize;
        base_power = base_power.saturating_mul(base);
    }
    if value > Symbol::MAX as usize {
        return Err(Error::Range(format!(
            "folded symbol {value} exceeds the byte alphabet"
        )));
    }
    Ok(value as Symbol)
}

/// Unfolds a symbol into its little-endian digits in the given base.
pub fn from_dec(symbol: Symbol, base: usize) -> Result<Vec<Symbol>> {
    check_base(base)?;
    if symbol == 0 {
        return Ok(vec![0]);
    }

    let mut digits = Vec::new();
    let mut rest = symbol as usize;
    while rest != 0 {
        digits.push((rest % base) as Symbol);
        rest /= base;
    }
    Ok(digits)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn real_series(values: &[f64]) -> PreprocessedSeries<f64, f64> {
        PreprocessedSeries::new(values.to_vec())
    }

    #[test]
    fn test_real_sampler_symbols_stay_in_alphabet() {
        let sampled = RealSampler::default()
            .transform(&real_series(&[4.2, 5.6, 7.8, 1.4]), 4)
            .unwrap();
        assert_eq!(sampled.len(), 4);
        assert!(sampled.values().iter().all(|&s| s < 4));
        assert_eq!(sampled.info().sampling_alphabet(), 4);
    }

    #[test]
    fn test_real_sampler_known_buckets() {
        // Matches the storage expectations of the selector: two and four
        // buckets over the same series.
        let sampled = RealSampler::default()
            .transform(&real_series(&[4.2, 5.6, 7.8, 1.4]), 2)
            .unwrap();
        assert_eq!(sampled.values(), &[0, 1, 1, 0]);

        let sampled = RealSampler::default()
            .transform(&real_series(&[4.2, 5.6, 7.8, 1.4]), 4)
            .unwrap();
        assert_eq!(sampled.values(), &[1, 2, 3, 0]);
    }

    #[test]
    fn test_real_sampler_reconstruction_error_is_bounded() {
        let values = [4.2, 5.6, 7.8, 1.4, -3.0, 0.0];
        let quanta = 8;
        let sampled = RealSampler::default()
            .transform(&real_series(&values), quanta)
            .unwrap();
        let spread = 7.8 - (-3.0);
        let bound = spread * (1.0 + 2.0 * DEFAULT_INDENT) / (2.0 * quanta as f64) + 1e-9;
        for (&value, &symbol) in values.iter().zip(sampled.values()) {
            let restored = f64::inverse_sample(symbol, sampled.info()).unwrap();
            assert!((value - restored).abs() <= bound);
        }
    }

    #[test]
    fn test_real_sampler_rejects_single_point() {
        let result = RealSampler::default().transform(&real_series(&[1.0]), 4);
        assert!(matches!(result, Err(Error::SeriesTooShort(_))));
    }

    #[test]
    fn test_real_sampler_empty_series_passes_through() {
        let sampled = RealSampler::default().transform(&real_series(&[]), 4).unwrap();
        assert!(sampled.is_empty());
    }

    #[test]
    fn test_real_sampler_constant_series_maps_to_zero() {
        let sampled = RealSampler::default()
            .transform(&real_series(&[2.5, 2.5, 2.5]), 4)
            .unwrap();
        assert!(sampled.values().iter().all(|&s| s == 0));
        let restored = f64::inverse_sample(0, sampled.info()).unwrap();
        assert!((restored - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_discrete_sampler_zero_aligns_and_inverts_exactly() {
        let series = PreprocessedSeries::<f64, u8>::new(vec![9, 1, 3]);
        let sampled = DiscreteSampler.transform(&series, 0).unwrap();
        assert_eq!(sampled.values(), &[8, 0, 2]);
        assert_eq!(sampled.info().sampling_alphabet(), 9);

        for (&original, &symbol) in series.values().iter().zip(sampled.values()) {
            let restored = f64::inverse_sample(symbol, sampled.info()).unwrap();
            assert_eq!(restored, f64::from(original));
        }
    }

    #[test]
    fn test_scalar_inverse_without_sampling_is_identity() {
        let info = PreprocInfo::<f64>::default();
        assert_eq!(f64::inverse_sample(7, &info).unwrap(), 7.0);
    }

    #[test]
    fn test_vector_sampler_folds_and_unfolds() {
        let points = vec![
            vec![0.0, 10.0],
            vec![1.0, 11.0],
            vec![2.0, 12.0],
            vec![3.0, 13.0],
        ];
        let series = PreprocessedSeries::<Vec<f64>, Vec<f64>>::new(points.clone());
        let sampled = RealVectorSampler::default().transform(&series, 4).unwrap();
        assert_eq!(sampled.info().sampling_alphabet(), 16);
        assert!(sampled.values().iter().all(|&s| (s as usize) < 16));

        let quantum = (13.0 - 10.0) * 1.2 / 4.0;
        for (point, &symbol) in points.iter().zip(sampled.values()) {
            let restored = <Vec<f64>>::inverse_sample(symbol, sampled.info()).unwrap();
            assert_eq!(restored.len(), 2);
            for (coordinate, &value) in point.iter().enumerate() {
                assert!((value - restored[coordinate]).abs() <= quantum / 2.0 + 1e-9);
            }
        }
    }

    #[test]
    fn test_vector_sampler_rejects_oversized_alphabet() {
        let series = PreprocessedSeries::<Vec<f64>, Vec<f64>>::new(vec![
            vec![0.0, 0.0],
            vec![1.0, 1.0],
        ]);
        let result = RealVectorSampler::default().transform(&series, 17);
        assert!(matches!(result, Err(Error::IntervalsCount(_))));
    }

    #[test]
    fn test_vector_integer_sampling_is_not_implemented() {
        let series = PreprocessedSeries::<Vec<f64>, Vec<u8>>::new(vec![vec![1, 2]]);
        let result = DiscreteVectorSampler.transform(&series, 0);
        assert!(matches!(result, Err(Error::NotImplemented(_))));
    }

    #[test]
    fn test_to_dec_validates_input() {
        assert!(matches!(to_dec(&[], 2), Err(Error::EmptyInput(_))));
        assert!(matches!(to_dec(&[0], 1), Err(Error::InvalidBase { .. })));
        assert!(matches!(
            to_dec(&[2], 2),
            Err(Error::InvalidDigit { .. })
        ));
    }

    #[test]
    fn test_to_dec_from_dec_round_trip() {
        for base in 2..=16usize {
            for value in 0..((base * base).min(256)) {
                let symbol = value as Symbol;
                let digits = from_dec(symbol, base).unwrap();
                assert_eq!(to_dec(&digits, base).unwrap(), symbol);
            }
        }
    }

    #[test]
    fn test_from_dec_of_zero() {
        assert_eq!(from_dec(0, 7).unwrap(), vec![0]);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Discrete sampling followed by the inverse mapping is the
            /// identity.
            #[test]
            fn prop_discrete_round_trip(values in proptest::collection::vec(0u8..=255, 1..64)) {
                let series = PreprocessedSeries::<f64, u8>::new(values.clone());
                let sampled = DiscreteSampler.transform(&series, 0).unwrap();
                for (&original, &symbol) in values.iter().zip(sampled.values()) {
                    let restored = f64::inverse_sample(symbol, sampled.info()).unwrap();
                    prop_assert_eq!(restored, f64::from(original));
                }
            }

            /// Real sampling keeps symbols inside the alphabet and the
            /// reconstruction error within half a widened bucket.
            #[test]
            fn prop_real_sampling_bounds(
                values in proptest::collection::vec(-1e6f64..1e6, 2..64),
                quanta in 2usize..=256,
            ) {
                let series = PreprocessedSeries::<f64, f64>::new(values.clone());
                let sampled = RealSampler::default().transform(&series, quanta).unwrap();
                prop_assert!(sampled.values().iter().all(|&s| (s as usize) < quanta));

                let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
                let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
                let spread = max - min;
                let bound = spread * (1.0 + 2.0 * DEFAULT_INDENT) / (2.0 * quanta as f64)
                    + spread * 1e-12
                    + 1e-9;
                for (&value, &symbol) in values.iter().zip(sampled.values()) {
                    let restored = f64::inverse_sample(symbol, sampled.info()).unwrap();
                    prop_assert!((value - restored).abs() <= bound);
                }
            }
        }
    }
}
