//! Dense matrix operations
//!
//! Row-major dense matrix representation. PSLQ keeps two kinds: the real
//! decomposition matrix H and the exact integer transforms A and B.

use num_bigint::BigInt;
use num_traits::{One, Signed, Zero};
use crate::real::Real;

/// Dense matrix in row-major order
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix<T> {
    data: Vec<T>,
    rows: usize,
    cols: usize,
}

impl<T: Clone> Matrix<T> {
    /// Create a matrix from a flat vector (row-major order)
    pub fn from_flat(data: Vec<T>, rows: usize, cols: usize) -> Self {
        assert_eq!(data.len(), rows * cols);
        Self { data, rows, cols }
    }

    /// Create a matrix with every entry set to `value`
    pub fn filled(value: T, rows: usize, cols: usize) -> Self {
        Self {
            data: vec![value; rows * cols],
            rows,
            cols,
        }
    }

    /// Get matrix dimensions
    pub fn dims(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Get number of rows
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Get number of columns
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Access element at (i, j)
    pub fn get(&self, i: usize, j: usize) -> &T {
        &self.data[i * self.cols + j]
    }

    /// Mutable access to element at (i, j)
    pub fn get_mut(&mut self, i: usize, j: usize) -> &mut T {
        &mut self.data[i * self.cols + j]
    }

    /// Overwrite element at (i, j)
    pub fn set(&mut self, i: usize, j: usize, value: T) {
        self.data[i * self.cols + j] = value;
    }

    /// Get a row as a slice
    pub fn row(&self, i: usize) -> &[T] {
        let start = i * self.cols;
        &self.data[start..start + self.cols]
    }

    /// Copy out column j
    pub fn column(&self, j: usize) -> Vec<T> {
        (0..self.rows).map(|i| self.get(i, j).clone()).collect()
    }

    /// Exchange rows i and k in place
    pub fn swap_rows(&mut self, i: usize, k: usize) {
        if i == k {
            return;
        }
        let (lo, hi) = if i < k { (i, k) } else { (k, i) };
        let cols = self.cols;
        let (head, tail) = self.data.split_at_mut(hi * cols);
        head[lo * cols..(lo + 1) * cols].swap_with_slice(&mut tail[..cols]);
    }

    /// Exchange columns j and k in place
    pub fn swap_cols(&mut self, j: usize, k: usize) {
        if j == k {
            return;
        }
        for i in 0..self.rows {
            self.data.swap(i * self.cols + j, i * self.cols + k);
        }
    }
}

impl Matrix<BigInt> {
    /// Create a zero matrix
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self::filled(BigInt::zero(), rows, cols)
    }

    /// Create an identity matrix
    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n, n);
        for i in 0..n {
            *m.get_mut(i, i) = BigInt::one();
        }
        m
    }

    /// row_i ← row_i − q·row_j
    pub fn sub_scaled_row(&mut self, i: usize, j: usize, q: &BigInt) {
        for k in 0..self.cols {
            let delta = q * self.get(j, k);
            *self.get_mut(i, k) -= delta;
        }
    }

    /// col_j ← col_j + q·col_i
    pub fn add_scaled_col(&mut self, j: usize, i: usize, q: &BigInt) {
        for k in 0..self.rows {
            let delta = q * self.get(k, i);
            *self.get_mut(k, j) += delta;
        }
    }

    /// Integer matrix product `self · other`
    pub fn matmul(&self, other: &Matrix<BigInt>) -> Matrix<BigInt> {
        assert_eq!(self.cols, other.rows);
        let mut out = Matrix::zeros(self.rows, other.cols);
        for i in 0..self.rows {
            for k in 0..self.cols {
                let a = self.get(i, k);
                if a.is_zero() {
                    continue;
                }
                for j in 0..other.cols {
                    let delta = a * other.get(k, j);
                    *out.get_mut(i, j) += delta;
                }
            }
        }
        out
    }

    /// Largest absolute entry
    pub fn max_abs(&self) -> BigInt {
        self.data
            .iter()
            .map(|x| x.abs())
            .max()
            .unwrap_or_else(BigInt::zero)
    }
}

impl<R: Real> Matrix<R> {
    /// Create a zero real matrix
    pub fn zeros_real(rows: usize, cols: usize) -> Self {
        Self::filled(R::zero(), rows, cols)
    }

    /// Sum of squares of all entries, ‖M‖²_F
    pub fn frobenius_norm_sq(&self) -> R {
        self.data
            .iter()
            .fold(R::zero(), |acc, v| acc + v.clone() * v.clone())
    }

    /// Row vector times matrix: vᵀM
    pub fn vec_mul(&self, v: &[R]) -> Vec<R> {
        assert_eq!(v.len(), self.rows);
        (0..self.cols)
            .map(|j| {
                v.iter()
                    .enumerate()
                    .fold(R::zero(), |acc, (i, vi)| acc + vi.clone() * self.get(i, j).clone())
            })
            .collect()
    }
}
