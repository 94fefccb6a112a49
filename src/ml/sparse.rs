use serde::{Deserialize, Serialize};

/// One sparse row: `(column, value)` pairs sorted by column, no duplicates.
pub type SparseRow = Vec<(usize, f64)>;

/// Row-major sparse matrix produced by the featurizer.
///
/// Every row has the same logical width `n_cols`, the vocabulary size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SparseMatrix {
    n_cols: usize,
    rows:   Vec<SparseRow>,
}

impl SparseMatrix {
    pub fn new(n_cols: usize, rows: Vec<SparseRow>) -> Self {
        debug_assert!(rows.iter().flatten().all(|&(c, _)| c < n_cols));
        Self { n_cols, rows }
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    /// `(rows, cols)`
    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.n_cols)
    }

    pub fn row(&self, i: usize) -> &[(usize, f64)] {
        &self.rows[i]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[(usize, f64)]> {
        self.rows.iter().map(Vec::as_slice)
    }

    /// Value at `(row, col)`, zero when not stored.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.rows[row]
            .binary_search_by_key(&col, |&(c, _)| c)
            .map(|pos| self.rows[row][pos].1)
            .unwrap_or(0.0)
    }

    /// Number of stored (non-zero) entries.
    pub fn nnz(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }

    /// Dense copy of one row; used by tests and debugging output.
    pub fn dense_row(&self, i: usize) -> Vec<f64> {
        let mut out = vec![0.0; self.n_cols];
        for &(c, v) in &self.rows[i] {
            out[c] = v;
        }
        out
    }
}

/// Dot product of a sparse row with a dense weight vector.
pub fn sparse_dot(row: &[(usize, f64)], weights: &[f64]) -> f64 {
    row.iter()
        .map(|&(c, v)| weights.get(c).copied().unwrap_or(0.0) * v)
        .sum()
}
