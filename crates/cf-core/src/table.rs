//! A double-indexed table with insertion-ordered row and column labels.
//!
//! Cells are stored densely; adding a label extends every existing row or
//! column with the zero element, so sparse cells read as zero. Mutable
//! access inserts missing labels on the fly, immutable access on an unknown
//! label is a range error.

use std::collections::HashMap;
use std::hash::Hash;

use cf_common::{Error, Result};

#[derive(Clone, Debug)]
pub struct LabeledTable<R, C, V> {
    row_labels: Vec<R>,
    col_labels: Vec<C>,
    row_index: HashMap<R, usize>,
    col_index: HashMap<C, usize>,
    cells: Vec<Vec<V>>,
}

impl<R, C, V> Default for LabeledTable<R, C, V>
where
    R: Clone + Eq + Hash,
    C: Clone + Eq + Hash,
    V: Clone + Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<R, C, V> LabeledTable<R, C, V>
where
    R: Clone + Eq + Hash,
    C: Clone + Eq + Hash,
    V: Clone + Default,
{
    pub fn new() -> Self {
        Self {
            row_labels: Vec::new(),
            col_labels: Vec::new(),
            row_index: HashMap::new(),
            col_index: HashMap::new(),
            cells: Vec::new(),
        }
    }

    pub fn with_labels(
        rows: impl IntoIterator<Item = R>,
        cols: impl IntoIterator<Item = C>,
    ) -> Self {
        let mut table = Self::new();
        for row in rows {
            table.ensure_row(&row);
        }
        for col in cols {
            table.ensure_col(&col);
        }
        table
    }

    /// Row labels in insertion order.
    pub fn rows(&self) -> &[R] {
        &self.row_labels
    }

    /// Column labels in insertion order.
    pub fn cols(&self) -> &[C] {
        &self.col_labels
    }

    pub fn row_count(&self) -> usize {
        self.row_labels.len()
    }

    pub fn col_count(&self) -> usize {
        self.col_labels.len()
    }

    fn ensure_row(&mut self, row: &R) -> usize {
        if let Some(&index) = self.row_index.get(row) {
            return index;
        }
        let index = self.row_labels.len();
        self.row_labels.push(row.clone());
        self.row_index.insert(row.clone(), index);
        self.cells.push(vec![V::default(); self.col_labels.len()]);
        index
    }

    fn ensure_col(&mut self, col: &C) -> usize {
        if let Some(&index) = self.col_index.get(col) {
            return index;
        }
        let index = self.col_labels.len();
        self.col_labels.push(col.clone());
        self.col_index.insert(col.clone(), index);
        for row in &mut self.cells {
            row.push(V::default());
        }
        index
    }

    pub fn cell(&self, row: &R, col: &C) -> Result<&V> {
        let row_pos = self
            .row_index
            .get(row)
            .ok_or_else(|| Error::Range("row label not present in table".into()))?;
        let col_pos = self
            .col_index
            .get(col)
            .ok_or_else(|| Error::Range("column label not present in table".into()))?;
        Ok(&self.cells[*row_pos][*col_pos])
    }

    /// Cell access that inserts missing labels with zero-filled cells.
    pub fn cell_mut(&mut self, row: &R, col: &C) -> &mut V {
        let row_pos = self.ensure_row(row);
        let col_pos = self.ensure_col(col);
        &mut self.cells[row_pos][col_pos]
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.cells.iter().flatten()
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut V> {
        self.cells.iter_mut().flatten()
    }
}
