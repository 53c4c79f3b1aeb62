//! Gaussian elimination on a symmetric band matrix, without pivoting.

use nalgebra::DVector;

use crate::band::BandMatrix;
use crate::errors::AnalysisError;

/// Solve `matrix · x = rhs` in place: `rhs` is overwritten with `x`.
///
/// Forward elimination reduces the upper band row by row, updating the
/// right-hand side in step; back-substitution then recovers `x` from the
/// last row upward. The matrix is consumed because elimination overwrites it.
/// Work is `O(order · bandwidth²)`.
///
/// A pivot that is not finite, or whose magnitude is at or below `tolerance`,
/// aborts the solve with [`AnalysisError::SingularSystem`].
///
/// # Errors
///
/// Returns [`AnalysisError::SingularSystem`] for a zero, tiny or non-finite
/// pivot, or when the solution itself is not finite.
///
/// # Panics
///
/// Panics when `rhs.len()` differs from the matrix order.
pub fn solve_in_place(
    mut matrix: BandMatrix,
    rhs: &mut DVector<f64>,
    tolerance: f64,
) -> Result<(), AnalysisError> {
    let order = matrix.order();
    assert_eq!(rhs.len(), order, "right-hand side must match matrix order");
    if order == 0 {
        return Ok(());
    }

    // Forward elimination.
    for pivot_row in 0..order - 1 {
        let pivot = checked_pivot(&matrix, pivot_row, tolerance)?;
        let span = matrix.row_span(pivot_row);
        for i in 1..span {
            let factor = matrix.band(pivot_row, i) / pivot;
            let target = pivot_row + i;
            for j in i..span {
                let update = factor * matrix.band(pivot_row, j);
                *matrix.band_mut(target, j - i) -= update;
            }
            rhs[target] -= factor * rhs[pivot_row];
        }
    }

    // Back-substitution.
    let last = order - 1;
    rhs[last] /= checked_pivot(&matrix, last, tolerance)?;
    for row in (0..last).rev() {
        let inverse = 1.0 / matrix.diagonal(row);
        let mut value = inverse * rhs[row];
        for j in 1..matrix.row_span(row) {
            value -= inverse * matrix.band(row, j) * rhs[row + j];
        }
        rhs[row] = value;
    }

    if let Some(dof) = rhs.iter().position(|value| !value.is_finite()) {
        return Err(AnalysisError::SingularSystem {
            dof,
            pivot: rhs[dof],
        });
    }
    Ok(())
}

/// Diagonal of `row` after elimination, rejected when unusable as a pivot.
fn checked_pivot(matrix: &BandMatrix, row: usize, tolerance: f64) -> Result<f64, AnalysisError> {
    let pivot = matrix.diagonal(row);
    if !pivot.is_finite() || pivot.abs() <= tolerance {
        return Err(AnalysisError::SingularSystem { dof: row, pivot });
    }
    Ok(pivot)
}
