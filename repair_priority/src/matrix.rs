use nalgebra::{DMatrix, DVector};
use snafu::prelude::*;

use crate::config::*;

/// A dense matrix of `f64`, backed by a `nalgebra` matrix.
///
/// All the operations produce new matrices. Nothing here mutates a matrix that
/// was handed over by a caller. Shape mismatches are reported as errors instead of
/// panicking.
#[derive(PartialEq, Debug, Clone)]
pub struct Matrix {
    inner: DMatrix<f64>,
}

impl Matrix {
    pub fn filled(rows: usize, cols: usize, value: f64) -> Matrix {
        Matrix {
            inner: DMatrix::from_element(rows, cols, value),
        }
    }

    pub fn identity(size: usize) -> Matrix {
        Matrix {
            inner: DMatrix::identity(size, size),
        }
    }

    /// Builds a matrix from its rows. All the rows must have the same length.
    pub fn from_rows(rows: &[Vec<f64>]) -> PriorityResult<Matrix> {
        let cols = rows.first().map(|r| r.len()).unwrap_or(0);
        let mut cells: Vec<f64> = Vec::with_capacity(rows.len() * cols);
        for (idx, row) in rows.iter().enumerate() {
            ensure!(
                row.len() == cols,
                InvalidInputSnafu {
                    reason: format!(
                        "row {} has {} entries, expected {}",
                        idx,
                        row.len(),
                        cols
                    )
                }
            );
            cells.extend_from_slice(row);
        }
        Ok(Matrix {
            inner: DMatrix::from_row_slice(rows.len(), cols, &cells),
        })
    }

    pub fn rows(&self) -> usize {
        self.inner.nrows()
    }

    pub fn cols(&self) -> usize {
        self.inner.ncols()
    }

    pub fn is_square(&self) -> bool {
        self.inner.is_square()
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.inner[(i, j)]
    }

    pub(crate) fn set(&mut self, i: usize, j: usize, value: f64) {
        self.inner[(i, j)] = value;
    }

    pub fn row(&self, i: usize) -> Vec<f64> {
        self.inner.row(i).iter().cloned().collect()
    }

    pub fn column(&self, j: usize) -> Vec<f64> {
        self.inner.column(j).iter().cloned().collect()
    }

    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        (0..self.rows()).map(|i| self.row(i)).collect()
    }

    /// Fails if any entry is not a strictly positive finite number.
    pub fn ensure_positive(&self) -> PriorityResult<()> {
        // Storage is column-major.
        if let Some(pos) = self.inner.iter().position(|x| !(x.is_finite() && *x > 0.0)) {
            let rows = self.rows();
            return InvalidInputSnafu {
                reason: format!(
                    "entry ({}, {}) is not strictly positive: {}",
                    pos % rows,
                    pos / rows,
                    self.inner[(pos % rows, pos / rows)]
                ),
            }
            .fail();
        }
        Ok(())
    }

    pub fn multiply(&self, other: &Matrix) -> PriorityResult<Matrix> {
        ensure!(
            self.cols() == other.rows(),
            InvalidInputSnafu {
                reason: format!(
                    "cannot multiply {}x{} by {}x{}",
                    self.rows(),
                    self.cols(),
                    other.rows(),
                    other.cols()
                )
            }
        );
        Ok(Matrix {
            inner: &self.inner * &other.inner,
        })
    }

    /// The product of this matrix with a column vector.
    pub fn apply(&self, v: &[f64]) -> PriorityResult<Vec<f64>> {
        ensure!(
            self.cols() == v.len(),
            InvalidInputSnafu {
                reason: format!(
                    "cannot apply a {}x{} matrix to a vector of length {}",
                    self.rows(),
                    self.cols(),
                    v.len()
                )
            }
        );
        let product: DVector<f64> = &self.inner * DVector::from_column_slice(v);
        Ok(product.iter().cloned().collect())
    }

    pub fn scaled(&self, factor: f64) -> Matrix {
        Matrix {
            inner: &self.inner * factor,
        }
    }

    pub fn max_abs(&self) -> f64 {
        if self.inner.is_empty() {
            return 0.0;
        }
        self.inner.amax()
    }

    /// Every column divided by its sum. Columns summing to zero are left as they are.
    pub fn column_normalized(&self) -> Matrix {
        let mut res = self.inner.clone();
        for mut col in res.column_iter_mut() {
            let total: f64 = col.sum();
            if total > 0.0 && total.is_finite() {
                col /= total;
            }
        }
        Matrix { inner: res }
    }

    /// Largest entrywise difference with a matrix of the same shape.
    pub fn max_abs_difference(&self, other: &Matrix) -> f64 {
        if self.inner.shape() != other.inner.shape() {
            return f64::INFINITY;
        }
        Matrix {
            inner: &self.inner - &other.inner,
        }
        .max_abs()
    }
}
