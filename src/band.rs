//! Compact storage for symmetric banded matrices.
//!
//! Only the upper band, diagonal included, is stored: row `r` holds the
//! entries `(r, r)` through `(r, r + bandwidth - 1)` contiguously, so entry
//! `(row, col)` lives at `bandwidth * row + (col - row)`. Lower-triangle
//! requests are answered from their mirror image.

use nalgebra::DMatrix;

use crate::errors::BandError;

/// Symmetric matrix stored as its upper band.
#[derive(Clone, Debug, PartialEq)]
pub struct BandMatrix {
    /// Number of rows (and columns).
    order: usize,
    /// Number of stored entries per row, diagonal included.
    bandwidth: usize,
    /// Row-major band entries, `order * bandwidth` long.
    data: Vec<f64>,
}

impl BandMatrix {
    /// Allocate a zero matrix.
    #[must_use]
    pub fn zeros(order: usize, bandwidth: usize) -> Self {
        Self {
            order,
            bandwidth,
            data: vec![0.0; order * bandwidth],
        }
    }

    /// Number of rows (and columns).
    #[must_use]
    pub fn order(&self) -> usize {
        self.order
    }

    /// Number of stored entries per row.
    #[must_use]
    pub fn bandwidth(&self) -> usize {
        self.bandwidth
    }

    /// Offset of `(row, col)` in `data`, with `row <= col`.
    fn offset(&self, row: usize, col: usize) -> Result<usize, BandError> {
        if row >= self.order || col >= self.order {
            return Err(BandError::OutOfRange {
                row,
                col,
                order: self.order,
            });
        }
        let (row, col) = if col < row { (col, row) } else { (row, col) };
        if col - row >= self.bandwidth {
            return Err(BandError::OutOfBand {
                row,
                col,
                bandwidth: self.bandwidth,
            });
        }
        Ok(self.bandwidth * row + (col - row))
    }

    /// Read entry `(row, col)`. Both triangles may be addressed.
    ///
    /// # Errors
    ///
    /// Returns [`BandError`] when the entry lies outside the matrix or its band.
    pub fn get(&self, row: usize, col: usize) -> Result<f64, BandError> {
        Ok(self.data[self.offset(row, col)?])
    }

    /// Overwrite entry `(row, col)`, which also sets its mirror image.
    ///
    /// # Errors
    ///
    /// Returns [`BandError`] when the entry lies outside the matrix or its band.
    pub fn set(&mut self, row: usize, col: usize, value: f64) -> Result<(), BandError> {
        let offset = self.offset(row, col)?;
        self.data[offset] = value;
        Ok(())
    }

    /// Accumulate `value` into entry `(row, col)`.
    ///
    /// # Errors
    ///
    /// Returns [`BandError`] when the entry lies outside the matrix or its band.
    pub fn add(&mut self, row: usize, col: usize, value: f64) -> Result<(), BandError> {
        let offset = self.offset(row, col)?;
        self.data[offset] += value;
        Ok(())
    }

    /// Diagonal entry of `row`.
    ///
    /// # Panics
    ///
    /// Panics when `row >= order`.
    #[must_use]
    pub fn diagonal(&self, row: usize) -> f64 {
        self.data[self.bandwidth * row]
    }

    /// Largest diagonal entry, or zero for an empty matrix.
    #[must_use]
    pub fn max_diagonal(&self) -> f64 {
        (0..self.order)
            .map(|row| self.diagonal(row))
            .fold(0.0, f64::max)
    }

    /// Entry at `offset` columns right of the diagonal of `row`, without
    /// bounds checks against the matrix order. Used by the solver.
    pub(crate) fn band(&self, row: usize, offset: usize) -> f64 {
        self.data[self.bandwidth * row + offset]
    }

    /// Mutable access to the same slot as [`BandMatrix::band`].
    pub(crate) fn band_mut(&mut self, row: usize, offset: usize) -> &mut f64 {
        &mut self.data[self.bandwidth * row + offset]
    }

    /// Number of band slots of `row` that fall inside the matrix.
    pub(crate) fn row_span(&self, row: usize) -> usize {
        (self.order - row).min(self.bandwidth)
    }

    /// Matrix-vector product `self * x`.
    ///
    /// # Panics
    ///
    /// Panics when `x.len() != order`.
    #[must_use]
    pub fn multiply(&self, x: &[f64]) -> Vec<f64> {
        assert_eq!(x.len(), self.order, "vector length must match matrix order");
        let mut product = vec![0.0; self.order];
        for row in 0..self.order {
            product[row] += self.diagonal(row) * x[row];
            for offset in 1..self.row_span(row) {
                let value = self.band(row, offset);
                let col = row + offset;
                product[row] += value * x[col];
                product[col] += value * x[row];
            }
        }
        product
    }

    /// Expand into a dense matrix, filling both triangles.
    #[must_use]
    pub fn to_dense(&self) -> DMatrix<f64> {
        let mut dense = DMatrix::zeros(self.order, self.order);
        for row in 0..self.order {
            for offset in 0..self.row_span(row) {
                let value = self.band(row, offset);
                dense[(row, row + offset)] = value;
                dense[(row + offset, row)] = value;
            }
        }
        dense
    }
}
