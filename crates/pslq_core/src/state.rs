//! Working state of one PSLQ run
//!
//! All mutable data of a run lives in [`PslqState`]: the decomposition H,
//! the integer transforms A and B, and the reduced vector y. Each pipeline
//! stage borrows it mutably in turn, so no two stages ever alias it.
//!
//! Invariants maintained by every method:
//! - `A · B = I`
//! - `yᵀ = xᵀB / ‖x‖`
//! - `A · H₀ · Q = H` for some orthogonal Q accumulated by corner removals

use num_bigint::BigInt;
use num_traits::Zero;
use crate::error::InvariantViolation;
use crate::matrix::Matrix;
use crate::real::Real;

/// Matrices and vectors threaded through one invocation
#[derive(Debug, Clone)]
pub struct PslqState<R: Real> {
    /// Validated input values
    pub x: Vec<R>,
    /// Partial sums of squares of x / x_max, s[i] = Σ_{k≥i} (x[k]/x_max)²
    pub s: Vec<R>,
    /// Lower-trapezoidal decomposition, n × (n-1)
    pub h: Matrix<R>,
    /// Accumulated integer row operations
    pub a: Matrix<BigInt>,
    /// Inverse of `a`; its columns are candidate relations
    pub b: Matrix<BigInt>,
    /// Reduced vector, updated alongside every row operation
    pub y: Vec<R>,
}

impl<R: Real> PslqState<R> {
    /// Length of the input vector
    pub fn n(&self) -> usize {
        self.x.len()
    }

    /// Size-reduce H(i, j) against H(j, j)
    ///
    /// With q = round(H(i,j)/H(j,j)): row i of H loses q·row j on columns
    /// 0..=j, row i of A loses q·row j, column j of B gains q·column i, and
    /// y[j] gains q·y[i]. Skipped when q = 0 or H(j,j) = 0.
    ///
    /// # Returns
    /// `true` if an update was applied
    pub fn reduce_entry(&mut self, i: usize, j: usize) -> bool {
        let pivot = self.h.get(j, j).clone();
        if pivot.is_zero() {
            return false;
        }
        let q = (self.h.get(i, j).clone() / pivot).round();
        if q.is_zero() {
            return false;
        }
        let q_int = match q.to_bigint() {
            Some(v) if !v.is_zero() => v,
            _ => return false,
        };

        for k in 0..=j {
            let updated = self.h.get(i, k).clone() - q.clone() * self.h.get(j, k).clone();
            self.h.set(i, k, updated);
        }
        self.a.sub_scaled_row(i, j, &q_int);
        self.b.add_scaled_col(j, i, &q_int);

        let updated = self.y[j].clone() + q * self.y[i].clone();
        self.y[j] = updated;
        true
    }

    /// Choose the row m maximizing γ^(m+1)·|H(m,m)|
    pub fn select_pivot(&self, gamma: &R) -> Result<usize, InvariantViolation> {
        let n = self.n();
        let mut gamma_pow = gamma.clone();
        let mut best = R::zero();
        let mut pivot = None;
        for i in 0..n - 1 {
            let term = gamma_pow.clone() * self.h.get(i, i).abs();
            if term > best {
                best = term;
                pivot = Some(i);
            }
            gamma_pow = gamma_pow * gamma.clone();
        }
        match pivot {
            Some(m) if m + 1 < n => Ok(m),
            Some(m) => Err(InvariantViolation::PivotOutOfRange { pivot: m, n }),
            None => Err(InvariantViolation::PivotOutOfRange { pivot: n, n }),
        }
    }

    /// Exchange entries m and m+1: y, rows of A and H, columns of B
    pub fn swap(&mut self, m: usize) {
        self.y.swap(m, m + 1);
        self.a.swap_rows(m, m + 1);
        self.h.swap_rows(m, m + 1);
        self.b.swap_cols(m, m + 1);
    }

    /// Rotate columns m and m+1 of H to clear the super-diagonal H(m, m+1)
    ///
    /// Only needed when m < n-2; after swapping the last pivot there is no
    /// column m+1.
    ///
    /// # Returns
    /// `true` if a rotation was applied
    pub fn remove_corner(&mut self, m: usize) -> bool {
        let n = self.n();
        if m + 2 >= n {
            return false;
        }
        let hmm = self.h.get(m, m).clone();
        let hmk = self.h.get(m, m + 1).clone();
        let t0 = (hmm.clone() * hmm.clone() + hmk.clone() * hmk.clone()).sqrt();
        if t0.is_zero() {
            return false;
        }
        let t1 = hmm / t0.clone();
        let t2 = hmk / t0;
        for i in m..n {
            let t3 = self.h.get(i, m).clone();
            let t4 = self.h.get(i, m + 1).clone();
            self.h.set(i, m, t1.clone() * t3.clone() + t2.clone() * t4.clone());
            self.h.set(i, m + 1, -(t2.clone() * t3) + t1.clone() * t4);
        }
        true
    }

    /// Largest |H(i,i)| over the diagonal
    pub fn max_diagonal(&self) -> R {
        (0..self.n() - 1).fold(R::zero(), |best, i| {
            let d = self.h.get(i, i).abs();
            if d > best {
                d
            } else {
                best
            }
        })
    }

    /// 1/max|H(i,i)|: no relation of smaller Euclidean norm exists
    pub fn norm_bound(&self) -> R {
        R::one() / self.max_diagonal()
    }

    /// Indices with |y[i]| below `threshold`, smallest |y[i]| first
    pub fn vanishing_components(&self, threshold: &R) -> Vec<usize> {
        let mut hits: Vec<(usize, R)> = self
            .y
            .iter()
            .enumerate()
            .map(|(i, v)| (i, v.abs()))
            .filter(|(_, a)| a < threshold)
            .collect();
        hits.sort_by(|l, r| l.1.partial_cmp(&r.1).unwrap_or(std::cmp::Ordering::Equal));
        hits.into_iter().map(|(i, _)| i).collect()
    }

    /// yᵀH, which stays ≈ 0 throughout
    pub fn orthogonality_residual(&self) -> Vec<R> {
        self.h.vec_mul(&self.y)
    }

    /// A·B, which must remain the identity
    pub fn transform_product(&self) -> Matrix<BigInt> {
        self.a.matmul(&self.b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decompose::decompose;

    fn sample() -> PslqState<f64> {
        decompose(&[1.0, 2.0f64.sqrt(), 3f64.sqrt(), 2.5]).unwrap()
    }

    #[test]
    fn test_reduce_entry_preserves_invariants() {
        let mut state = sample();
        let mut applied = 0;
        for i in 1..state.n() {
            for j in (0..i).rev() {
                if state.reduce_entry(i, j) {
                    applied += 1;
                }
            }
        }
        assert!(applied > 0);
        assert_eq!(state.transform_product(), Matrix::identity(state.n()));
        for j in 0..state.n() - 1 {
            let hjj = state.h.get(j, j).abs();
            for i in j + 1..state.n() {
                assert!(state.h.get(i, j).abs() <= hjj / 2.0 + 1e-12);
            }
        }
        for r in state.orthogonality_residual() {
            assert!(r.abs() < 1e-12);
        }
    }

    #[test]
    fn test_swap_and_corner_keep_trapezoidal_shape() {
        let mut state = sample();
        let m = 1;
        state.swap(m);
        assert!(state.h.get(m, m + 1).abs() > 0.0);
        assert!(state.remove_corner(m));
        assert!(state.h.get(m, m + 1).abs() < 1e-15);
        assert_eq!(state.transform_product(), Matrix::identity(state.n()));

        // Frobenius norm is invariant under swaps and rotations
        let fro = state.h.frobenius_norm_sq();
        assert!((fro - 3.0).abs() < 1e-12);

        // No corner to remove after swapping the last pivot
        assert!(!state.remove_corner(state.n() - 2));
    }

    #[test]
    fn test_select_pivot_weights_by_gamma_power() {
        let state = sample();
        let gamma = 2.0;
        let m = state.select_pivot(&gamma).unwrap();
        let score = |i: usize| gamma.powi(i as i32 + 1) * state.h.get(i, i).abs();
        for i in 0..state.n() - 1 {
            assert!(score(m) >= score(i));
        }
    }

    #[test]
    fn test_select_pivot_rejects_degenerate_diagonal() {
        let mut state = sample();
        for i in 0..state.n() - 1 {
            state.h.set(i, i, 0.0);
        }
        assert!(matches!(
            state.select_pivot(&1.2),
            Err(InvariantViolation::PivotOutOfRange { .. })
        ));
    }

    #[test]
    fn test_vanishing_components_sorted() {
        let mut state = sample();
        state.y = vec![0.5, 1e-10, 0.3, 1e-12];
        assert_eq!(state.vanishing_components(&1e-8), vec![3, 1]);
        assert!(state.vanishing_components(&1e-14).is_empty());
    }
}
