//! Dense square matrices and the direct linear solve used by the occupancy
//! computation.
//!
//! The occupancy system `(I - γ·Pᵗ)·x = initial` is solved by Gaussian
//! elimination with partial pivoting. The factorization is single-threaded;
//! parallelism in this crate lives in the matrix construction sweeps, not
//! here. Densifying the sparse per-state distributions costs O(n²) storage
//! but buys an exact direct solve, acceptable for moderate state counts.

use crate::error::{Error, Result};

/// Pivots with absolute value below this are treated as numerically zero.
const PIVOT_TOLERANCE: f64 = 1e-12;

/// A dense n×n matrix in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct SquareMatrix {
    size: usize,
    data: Vec<f64>,
}

impl SquareMatrix {
    /// Create a zero matrix of the given size.
    pub fn zeros(size: usize) -> Self {
        Self {
            size,
            data: vec![0.0; size * size],
        }
    }

    /// Create an identity matrix of the given size.
    pub fn identity(size: usize) -> Self {
        let mut matrix = Self::zeros(size);
        for i in 0..size {
            matrix.set(i, i, 1.0);
        }
        matrix
    }

    /// Number of rows (and columns).
    pub fn size(&self) -> usize {
        self.size
    }

    /// Entry at (row, column).
    #[inline]
    pub fn get(&self, row: usize, column: usize) -> f64 {
        debug_assert!(row < self.size && column < self.size);
        self.data[row * self.size + column]
    }

    /// Set the entry at (row, column).
    #[inline]
    pub fn set(&mut self, row: usize, column: usize, value: f64) {
        debug_assert!(row < self.size && column < self.size);
        self.data[row * self.size + column] = value;
    }

    /// Read-only view of one row.
    pub fn row(&self, row: usize) -> &[f64] {
        &self.data[row * self.size..(row + 1) * self.size]
    }

    /// Flat row-major storage, for disjoint-row parallel fills.
    pub fn data_mut(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Multiply every entry by a scalar.
    pub fn scale(&mut self, factor: f64) {
        for value in &mut self.data {
            *value *= factor;
        }
    }

    /// Add the identity matrix in place.
    pub fn add_identity(&mut self) {
        for i in 0..self.size {
            self.data[i * self.size + i] += 1.0;
        }
    }

    /// The transpose of this matrix.
    pub fn transposed(&self) -> Self {
        let mut result = Self::zeros(self.size);
        for row in 0..self.size {
            for column in 0..self.size {
                result.set(column, row, self.get(row, column));
            }
        }
        result
    }

    fn swap_rows(&mut self, first: usize, second: usize) {
        if first == second {
            return;
        }
        for column in 0..self.size {
            self.data
                .swap(first * self.size + column, second * self.size + column);
        }
    }
}

/// Solve `a·x = b` by Gaussian elimination with partial pivoting.
///
/// The matrix and right-hand side are consumed as scratch space. Returns
/// [`Error::SingularSystem`] when a pivot falls below the numeric tolerance,
/// which for the occupancy system happens when the discount approaches one
/// without the chain being absorbing.
///
/// # Panics
///
/// Panics if the right-hand side length does not match the matrix size.
pub fn solve_in_place(a: &mut SquareMatrix, mut b: Vec<f64>) -> Result<Vec<f64>> {
    let n = a.size();
    assert_eq!(b.len(), n, "right-hand side length must match the matrix size");

    // Forward elimination with row pivoting.
    for column in 0..n {
        let mut pivot_row = column;
        let mut pivot_abs = a.get(column, column).abs();
        for row in column + 1..n {
            let candidate = a.get(row, column).abs();
            if candidate > pivot_abs {
                pivot_abs = candidate;
                pivot_row = row;
            }
        }
        if pivot_abs < PIVOT_TOLERANCE {
            return Err(Error::SingularSystem { size: n });
        }

        a.swap_rows(column, pivot_row);
        b.swap(column, pivot_row);

        let pivot = a.get(column, column);
        for row in column + 1..n {
            let factor = a.get(row, column) / pivot;
            if factor == 0.0 {
                continue;
            }
            a.set(row, column, 0.0);
            for k in column + 1..n {
                let updated = a.get(row, k) - factor * a.get(column, k);
                a.set(row, k, updated);
            }
            b[row] -= factor * b[column];
        }
    }

    // Back substitution.
    for row in (0..n).rev() {
        let mut accumulator = b[row];
        for column in row + 1..n {
            accumulator -= a.get(row, column) * b[column];
        }
        b[row] = accumulator / a.get(row, row);
    }

    Ok(b)
}
