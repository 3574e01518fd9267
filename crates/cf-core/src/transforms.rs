//! Transformations over code-length and probability tables.
//!
//! A distribution table passes through a fixed sequence: shift by the
//! minimal code length, exponentiate into code probabilities, add group
//! mixture columns, normalize columns to unit mass, and (in the
//! multi-alphabet case) merge the per-partition tables. The forecast side
//! marginalizes per step, takes pointwise means through the inverse
//! sampler, and integrates the differencing away.

use std::hash::Hash;

use cf_common::{concatenate_names, CompressorName, CompressorNames, Result};
use cf_math::{countable_weights, uniform_weights, WideF64};

use crate::distribution::{ContinuationsDistribution, Forecast, SymbolsDistribution};
use crate::sampler::InverseSample;
use crate::series::RealElement;
use crate::table::LabeledTable;

/// Which mixture weights a group combination uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WeightsKind {
    /// Equal weights, the default for compressor groups.
    Uniform,
    /// `1/i − 1/(i+1)` weights for partition mixtures.
    Countable,
}

impl WeightsKind {
    pub fn generate(&self, n: usize) -> Vec<f64> {
        match self {
            WeightsKind::Uniform => uniform_weights(n),
            WeightsKind::Countable => countable_weights(n),
        }
    }
}

/// Adds a scalar to every cell (used with the negated minimum to keep the
/// exponentiation in range, and with the message-length correction that
/// levels partitions of different cardinality).
pub fn add_to_each<R, C>(table: &mut LabeledTable<R, C, WideF64>, value: WideF64)
where
    R: Clone + Eq + Hash,
    C: Clone + Eq + Hash,
{
    for cell in table.values_mut() {
        *cell += value;
    }
}

/// The smallest cell of a table, if any.
pub fn min_cell<R, C>(table: &LabeledTable<R, C, WideF64>) -> Option<WideF64>
where
    R: Clone + Eq + Hash,
    C: Clone + Eq + Hash,
{
    table.values().min().copied()
}

/// Replaces every code length `L` by the code probability `2^(−L)`.
pub fn to_code_probabilities<R, C>(table: &mut LabeledTable<R, C, WideF64>)
where
    R: Clone + Eq + Hash,
    C: Clone + Eq + Hash,
{
    for cell in table.values_mut() {
        *cell = WideF64::exp2(-cell.to_f64());
    }
}

/// For every group of two or more names, appends a column named by the
/// joined group names holding the weighted sum of the members' columns.
pub fn form_group_mixtures<O>(
    distribution: &mut ContinuationsDistribution<O>,
    groups: &[CompressorNames],
    weights: WeightsKind,
) -> Result<()> {
    for group in groups {
        if group.len() < 2 {
            continue;
        }
        let composite_name = concatenate_names(group);
        let group_weights = weights.generate(group.len());
        let rows = distribution.rows().to_vec();
        for row in rows {
            let mut mixed = WideF64::ZERO;
            for (name, weight) in group.iter().zip(&group_weights) {
                mixed += *distribution.cell(&row, name)? * WideF64::from_f64(*weight);
            }
            *distribution.cell_mut(&row, &composite_name) = mixed;
        }
    }
    Ok(())
}

/// Rescales every column to sum to one.
pub fn normalize_columns<O>(distribution: &mut ContinuationsDistribution<O>) -> Result<()> {
    let columns = distribution.cols().to_vec();
    for column in columns {
        let mut accumulated = 0.0;
        for row in distribution.rows() {
            accumulated += distribution.cell(row, &column)?.to_f64();
        }
        let total = WideF64::from_f64(accumulated);
        let rows = distribution.rows().to_vec();
        for row in rows {
            *distribution.cell_mut(&row, &column) /= total;
        }
    }
    Ok(())
}

/// Combines per-partition tables into one over the finest alphabet.
///
/// `alphabets` must be strictly increasing with every coarser alphabet an
/// exact divisor of the finest; each merged cell is the weighted sum of the
/// contributing tables' cells at the coarsened continuation.
pub fn merge<O: Clone>(
    tables: &[ContinuationsDistribution<O>],
    alphabets: &[usize],
    weights: &[f64],
) -> Result<ContinuationsDistribution<O>> {
    debug_assert_eq!(tables.len(), alphabets.len());
    debug_assert_eq!(tables.len(), weights.len());
    debug_assert!(alphabets.windows(2).all(|pair| pair[0] < pair[1]));

    let Some(finest) = tables.last() else {
        return Err(cf_common::Error::InvalidArgument(
            "cannot merge an empty list of tables".into(),
        ));
    };
    let max_alphabet = alphabets[alphabets.len() - 1];
    let steps: Vec<u8> = alphabets
        .iter()
        .map(|&alphabet| (max_alphabet / alphabet) as u8)
        .collect();

    let mut result = finest.clone();
    let rows = result.rows().to_vec();
    let columns = result.cols().to_vec();
    for row in &rows {
        for column in &columns {
            let mut combined = WideF64::ZERO;
            for ((table, step), weight) in tables.iter().zip(&steps).zip(weights) {
                combined +=
                    *table.cell(&row.divide(*step), column)? * WideF64::from_f64(*weight);
            }
            *result.cell_mut(row, column) = combined;
        }
    }
    result.set_info(finest.info().clone());
    Ok(result)
}

/// Marginal distribution of the symbol at one horizon step.
pub fn cumulated_for_step<O: Clone>(
    table: &ContinuationsDistribution<O>,
    step: usize,
) -> Result<SymbolsDistribution<O>> {
    let mut result = SymbolsDistribution::new();
    for row in table.rows() {
        let symbol = row.symbol(step)?;
        for column in table.cols() {
            *result.cell_mut(&symbol, column) += *table.cell(row, column)?;
        }
    }
    result.set_info(table.info().clone());
    Ok(result)
}

/// Expected value of a per-step symbol distribution, mapped back into the
/// original domain through the inverse sampler.
pub fn mean<O: InverseSample>(
    distribution: &SymbolsDistribution<O>,
    name: &CompressorName,
) -> Result<O> {
    let mut expectation = O::zero_like(distribution.info());
    for symbol in distribution.rows() {
        let value = O::inverse_sample(*symbol, distribution.info())?;
        let probability = distribution.cell(symbol, name)?.to_f64();
        expectation.accumulate(&value.scaled(probability));
    }
    Ok(expectation)
}

/// Per-step pointwise forecast of a continuations-probability table.
pub fn to_pointwise_forecasts<O: InverseSample>(
    table: &ContinuationsDistribution<O>,
    horizon: usize,
) -> Result<Forecast<O>> {
    let mut result = Forecast::new();
    for step in 0..horizon {
        let marginal = cumulated_for_step(table, step)?;
        for name in marginal.cols() {
            result.cell_mut(name, &step).point = mean(&marginal, name)?;
        }
    }
    result.set_info(table.info().clone());
    Ok(result)
}

/// Undoes the differencing passes recorded in the forecast's preprocessing
/// info: each pass adds back the stored last value and prefix-sums the
/// steps.
pub fn integrate<O: RealElement>(forecast: &mut Forecast<O>) -> Result<()> {
    while forecast.info().applied_diff_count() > 0 {
        let Some(last_value) = forecast.info_mut().pop_last_diff_value() else {
            break;
        };
        let names = forecast.rows().to_vec();
        let steps = forecast.cols().to_vec();
        for name in &names {
            if let Some(first) = steps.first() {
                let cell = forecast.cell_mut(name, first);
                cell.point.accumulate(&last_value);
                cell.left_border.accumulate(&last_value);
                cell.right_border.accumulate(&last_value);
            }
            for j in 1..steps.len() {
                let previous = forecast.cell(name, &steps[j - 1])?.clone();
                let cell = forecast.cell_mut(name, &steps[j]);
                cell.point.accumulate(&previous.point);
                cell.left_border.accumulate(&previous.left_border);
                cell.right_border.accumulate(&previous.right_border);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::continuation::{Continuation, ContinuationGenerator};
    use crate::distribution::ForecastPoint;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-9
    }

    fn filled_distribution(
        alphabet: usize,
        horizon: usize,
        names: &[&str],
        lengths: &dyn Fn(usize, usize) -> f64,
    ) -> ContinuationsDistribution<f64> {
        let mut distribution = ContinuationsDistribution::<f64>::new();
        for (i, continuation) in ContinuationGenerator::new(alphabet, horizon)
            .unwrap()
            .enumerate()
        {
            for (j, name) in names.iter().enumerate() {
                *distribution.cell_mut(&continuation, &name.to_string()) =
                    WideF64::from_f64(lengths(i, j));
            }
        }
        distribution
    }

    #[test]
    fn test_shift_then_exponentiate() {
        let mut distribution =
            filled_distribution(2, 1, &["a"], &|i, _| if i == 0 { 8.0 } else { 10.0 });
        let min = min_cell(&distribution).unwrap();
        add_to_each(&mut distribution, -min);
        to_code_probabilities(&mut distribution);

        let zero = Continuation::from_digits(vec![0], 2).unwrap();
        let one = Continuation::from_digits(vec![1], 2).unwrap();
        assert!(approx_eq(
            distribution.cell(&zero, &"a".to_string()).unwrap().to_f64(),
            1.0
        ));
        assert!(approx_eq(
            distribution.cell(&one, &"a".to_string()).unwrap().to_f64(),
            0.25
        ));
    }

    #[test]
    fn test_group_mixture_uniform() {
        let mut distribution = filled_distribution(2, 1, &["a", "b"], &|i, j| {
            // Already probabilities for the purpose of this test.
            match (i, j) {
                (0, 0) => 0.75,
                (1, 0) => 0.25,
                (0, 1) => 0.25,
                _ => 0.75,
            }
        });
        let groups = vec![vec!["a".to_string(), "b".to_string()]];
        form_group_mixtures(&mut distribution, &groups, WeightsKind::Uniform).unwrap();

        let composite = "a_b".to_string();
        assert_eq!(distribution.cols().last().unwrap(), &composite);
        let zero = Continuation::from_digits(vec![0], 2).unwrap();
        assert!(approx_eq(
            distribution.cell(&zero, &composite).unwrap().to_f64(),
            0.5
        ));
    }

    #[test]
    fn test_single_member_groups_add_no_columns() {
        let mut distribution = filled_distribution(2, 1, &["a"], &|_, _| 1.0);
        let groups = vec![vec!["a".to_string()]];
        form_group_mixtures(&mut distribution, &groups, WeightsKind::Uniform).unwrap();
        assert_eq!(distribution.col_count(), 1);
    }

    #[test]
    fn test_normalize_columns_to_unit_mass() {
        let mut distribution = filled_distribution(2, 2, &["a", "b"], &|i, j| {
            (i + 1) as f64 * (j + 1) as f64
        });
        normalize_columns(&mut distribution).unwrap();
        for column in distribution.cols() {
            let total: f64 = distribution
                .rows()
                .iter()
                .map(|row| distribution.cell(row, column).unwrap().to_f64())
                .sum();
            assert!(approx_eq(total, 1.0));
        }
    }

    #[test]
    fn test_merge_combines_coarse_and_fine_tables() {
        let name = "a".to_string();
        let coarse = filled_distribution(2, 1, &["a"], &|i, _| if i == 0 { 0.6 } else { 0.4 });
        let fine = filled_distribution(4, 1, &["a"], &|i, _| 0.1 * (i + 1) as f64);

        let weights = countable_weights(2);
        let merged = merge(&[coarse, fine], &[2, 4], &weights).unwrap();

        assert_eq!(merged.row_count(), 4);
        // Fine symbols 0 and 1 coarsen to 0; 2 and 3 coarsen to 1.
        let expected = [
            0.5 * 0.6 + 0.5 * 0.1,
            0.5 * 0.6 + 0.5 * 0.2,
            0.5 * 0.4 + 0.5 * 0.3,
            0.5 * 0.4 + 0.5 * 0.4,
        ];
        for (i, expected_value) in expected.iter().enumerate() {
            let row = Continuation::from_digits(vec![i as u8], 4).unwrap();
            assert!(approx_eq(
                merged.cell(&row, &name).unwrap().to_f64(),
                *expected_value
            ));
        }
    }

    #[test]
    fn test_cumulated_for_step_sums_matching_rows() {
        let name = "a".to_string();
        let distribution = filled_distribution(2, 2, &["a"], &|i, _| 0.1 * (i + 1) as f64);
        // Rows in odometer order: 00, 10, 01, 11 with values .1, .2, .3, .4.
        let step0 = cumulated_for_step(&distribution, 0).unwrap();
        assert!(approx_eq(step0.cell(&0, &name).unwrap().to_f64(), 0.4));
        assert!(approx_eq(step0.cell(&1, &name).unwrap().to_f64(), 0.6));

        let step1 = cumulated_for_step(&distribution, 1).unwrap();
        assert!(approx_eq(step1.cell(&0, &name).unwrap().to_f64(), 0.3));
        assert!(approx_eq(step1.cell(&1, &name).unwrap().to_f64(), 0.7));
    }

    #[test]
    fn test_mean_uses_inverse_sampling() {
        let name = "a".to_string();
        let mut marginal = SymbolsDistribution::<f64>::new();
        *marginal.cell_mut(&0, &name) = WideF64::from_f64(0.25);
        *marginal.cell_mut(&1, &name) = WideF64::from_f64(0.75);
        // Without sampling info the inverse mapping is the identity cast.
        assert!(approx_eq(mean(&marginal, &name).unwrap(), 0.75));

        let mut info = crate::series::PreprocInfo::default();
        info.set_desample_table(vec![10.0, 20.0]);
        info.set_sampling_alphabet(2);
        marginal.set_info(info);
        assert!(approx_eq(mean(&marginal, &name).unwrap(), 17.5));
    }

    #[test]
    fn test_integrate_restores_differenced_constant() {
        let name = "a".to_string();
        let mut forecast = Forecast::<f64>::new();
        for step in 0..3usize {
            *forecast.cell_mut(&name, &step) = ForecastPoint::default();
        }
        forecast.info_mut().push_last_diff_value(7.0);
        integrate(&mut forecast).unwrap();

        // A zero forecast of the differenced series lifts to the constant.
        for step in 0..3usize {
            assert!(approx_eq(forecast.cell(&name, &step).unwrap().point, 7.0));
        }
        assert_eq!(forecast.info().applied_diff_count(), 0);
    }

    #[test]
    fn test_integrate_second_order() {
        let name = "a".to_string();
        let mut forecast = Forecast::<f64>::new();
        for step in 0..2usize {
            *forecast.cell_mut(&name, &step) = ForecastPoint::default();
        }
        // diff([1, 2, 4]) = [1, 2] with stack [4]; diff again = [1] with
        // stack [4, 2]. A zero second-difference forecast must continue the
        // run: next first differences 2, 2 and next values 6, 8.
        forecast.info_mut().push_last_diff_value(4.0);
        forecast.info_mut().push_last_diff_value(2.0);
        integrate(&mut forecast).unwrap();

        assert!(approx_eq(forecast.cell(&name, &0).unwrap().point, 6.0));
        assert!(approx_eq(forecast.cell(&name, &1).unwrap().point, 8.0));
    }
}
