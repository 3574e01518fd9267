//! Distribution and forecast tables with attached preprocessing info.

use std::hash::Hash;
use std::ops::{Deref, DerefMut};

use serde::{Deserialize, Serialize};

use cf_common::{CompressorName, Symbol};
use cf_math::WideF64;

use crate::continuation::Continuation;
use crate::series::PreprocInfo;
use crate::table::LabeledTable;

/// A point forecast with its confidence interval borders.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ForecastPoint<T> {
    pub point: T,
    pub left_border: T,
    pub right_border: T,
}

/// A labeled table carrying the preprocessing info of the series it was
/// derived from, so the inverse transformations stay applicable.
#[derive(Clone, Debug)]
pub struct PreprocessedTable<R, C, V, O> {
    table: LabeledTable<R, C, V>,
    info: PreprocInfo<O>,
}

impl<R, C, V, O> Default for PreprocessedTable<R, C, V, O>
where
    R: Clone + Eq + Hash,
    C: Clone + Eq + Hash,
    V: Clone + Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<R, C, V, O> PreprocessedTable<R, C, V, O>
where
    R: Clone + Eq + Hash,
    C: Clone + Eq + Hash,
    V: Clone + Default,
{
    pub fn new() -> Self {
        Self {
            table: LabeledTable::new(),
            info: PreprocInfo::default(),
        }
    }

    pub fn from_table(table: LabeledTable<R, C, V>) -> Self {
        Self {
            table,
            info: PreprocInfo::default(),
        }
    }

    pub fn info(&self) -> &PreprocInfo<O> {
        &self.info
    }

    pub fn info_mut(&mut self) -> &mut PreprocInfo<O> {
        &mut self.info
    }

    pub fn set_info(&mut self, info: PreprocInfo<O>) {
        self.info = info;
    }
}

impl<R, C, V, O> Deref for PreprocessedTable<R, C, V, O> {
    type Target = LabeledTable<R, C, V>;

    fn deref(&self) -> &LabeledTable<R, C, V> {
        &self.table
    }
}

impl<R, C, V, O> DerefMut for PreprocessedTable<R, C, V, O> {
    fn deref_mut(&mut self) -> &mut LabeledTable<R, C, V> {
        &mut self.table
    }
}

/// Rows are continuations, columns compressor (or group) names; cells hold
/// code lengths in bits early in the pipeline and probabilities later.
pub type ContinuationsDistribution<O> =
    PreprocessedTable<Continuation, CompressorName, WideF64, O>;

/// Per-step marginal: rows are symbols, columns compressor names.
pub type SymbolsDistribution<O> = PreprocessedTable<Symbol, CompressorName, WideF64, O>;

/// Rows are compressor (or group) names, columns horizon step indices.
pub type Forecast<O> = PreprocessedTable<CompressorName, usize, ForecastPoint<O>, O>;
