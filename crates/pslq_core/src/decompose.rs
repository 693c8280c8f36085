//! Partial-sum-of-squares decomposition
//!
//! Builds the lower-trapezoidal matrix H_x of Ferguson–Bailey (Lemma 1):
//!
//! ```text
//! s_i    = Σ_{k≥i} x_k²
//! H(i,i) = √(s_{i+1} / s_i)
//! H(i,j) = −x_i x_j / √(s_j s_{j+1})      i > j
//! H(i,j) = 0                              i < j
//! ```
//!
//! so that ‖H‖²_F = n − 1 and xᵀH = 0. Both identities are checked
//! numerically; a failure is a defect here, not bad input.
//!
//! H and y depend only on the direction of x, so both are built from
//! x / x_max. Squaring the caller's values directly overflows long before
//! the values themselves do.

use num_bigint::BigInt;
use crate::error::{InvariantViolation, PreconditionViolation, Result};
use crate::matrix::Matrix;
use crate::real::{sqrt_epsilon, Real};
use crate::state::PslqState;

/// Partial sums of squares, accumulated from the last element down
///
/// `decompose` feeds this x / x_max, so `s` holds scaled sums.
pub fn partial_sums_of_squares<R: Real>(x: &[R]) -> Vec<R> {
    let n = x.len();
    let mut s = vec![R::zero(); n];
    if n == 0 {
        return s;
    }
    s[n - 1] = x[n - 1].clone() * x[n - 1].clone();
    for i in (0..n - 1).rev() {
        s[i] = s[i + 1].clone() + x[i].clone() * x[i].clone();
    }
    s
}

/// Build H_x, verify Lemma 1, and set up the initial working state
///
/// `x` must already be validated: strictly positive and ascending, so the
/// last value is the largest. `PslqState::x` keeps the values unscaled.
pub fn decompose<R: Real>(x: &[R]) -> Result<PslqState<R>> {
    let n = x.len();
    if n < 2 {
        return Err(PreconditionViolation::TooFewValues { len: n }.into());
    }
    let largest = x[n - 1].clone();
    let scaled: Vec<R> = x.iter().map(|v| v.clone() / largest.clone()).collect();
    let s = partial_sums_of_squares(&scaled);

    let mut h = Matrix::zeros_real(n, n - 1);
    for j in 0..n - 1 {
        h.set(j, j, (s[j + 1].clone() / s[j].clone()).sqrt());
        let denom = (s[j].clone() * s[j + 1].clone()).sqrt();
        for i in j + 1..n {
            h.set(i, j, -(scaled[i].clone() * scaled[j].clone()) / denom.clone());
        }
    }

    let norm = s[0].sqrt();
    let y: Vec<R> = scaled.into_iter().map(|v| v / norm.clone()).collect();

    let state = PslqState {
        x: x.to_vec(),
        s,
        h,
        a: Matrix::<BigInt>::identity(n),
        b: Matrix::<BigInt>::identity(n),
        y,
    };
    verify(&state)?;
    Ok(state)
}

/// Check ‖H‖²_F/(n−1) ≈ 1 and yᵀH ≈ 0 to within √ε
pub fn verify<R: Real>(state: &PslqState<R>) -> std::result::Result<(), InvariantViolation> {
    let tol: R = sqrt_epsilon();
    let dim = R::from_i64(state.n() as i64 - 1);

    let normalized = state.h.frobenius_norm_sq() / dim.clone();
    if !((normalized.clone() - R::one()).abs() <= tol) {
        return Err(InvariantViolation::FrobeniusNorm { normalized: normalized.to_f64() });
    }

    for (column, r) in state.orthogonality_residual().into_iter().enumerate() {
        if !(r.abs() / dim.clone() <= tol) {
            return Err(InvariantViolation::NotOrthogonal { column, residual: r.to_f64() });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_sums() {
        let s = partial_sums_of_squares(&[1.0f64, 2.0, 3.0]);
        assert_eq!(s, vec![14.0, 13.0, 9.0]);
    }

    #[test]
    fn test_decomposition_shape() {
        let x = [0.5f64, 1.0, 3.0, 7.25, 11.0];
        let state = decompose(&x).unwrap();
        let (rows, cols) = state.h.dims();
        assert_eq!((rows, cols), (5, 4));

        for i in 0..rows {
            for j in i + 1..cols {
                assert_eq!(*state.h.get(i, j), 0.0);
            }
        }
        for j in 0..cols {
            assert!(*state.h.get(j, j) > 0.0);
        }
        assert!((state.h.frobenius_norm_sq() - 4.0).abs() < 1e-12);
        let y_norm: f64 = state.y.iter().map(|v| v * v).sum();
        assert!((y_norm - 1.0).abs() < 1e-14);
    }

    #[test]
    fn test_two_values() {
        // H = [2/√5, −1/√5]ᵀ for x = (1, 2)
        let state = decompose(&[1.0f64, 2.0]).unwrap();
        assert!((state.h.get(0, 0) - 2.0 / 5f64.sqrt()).abs() < 1e-15);
        assert!((state.h.get(1, 0) + 1.0 / 5f64.sqrt()).abs() < 1e-15);
    }

    #[test]
    fn test_verify_detects_corruption() {
        let mut state = decompose(&[1.0f64, 2.0, 5.0]).unwrap();
        state.h.set(0, 0, 3.0);
        assert!(matches!(verify(&state), Err(InvariantViolation::FrobeniusNorm { .. })));

        let mut state = decompose(&[1.0f64, 2.0, 5.0]).unwrap();
        // Same Frobenius norm, but no longer orthogonal to y
        let (a, b) = (*state.h.get(2, 0), *state.h.get(2, 1));
        state.h.set(2, 0, b);
        state.h.set(2, 1, a);
        assert!(matches!(verify(&state), Err(InvariantViolation::NotOrthogonal { .. })));
    }

    #[test]
    fn test_single_precision() {
        let state = decompose(&[1.0f32, 1.5, 2.25]).unwrap();
        assert!((state.h.frobenius_norm_sq() - 2.0).abs() < 1e-3);
    }

    #[test]
    fn test_state_keeps_caller_values() {
        let x = [3.0f64, 4.0];
        let state = decompose(&x).unwrap();
        assert_eq!(state.x, vec![3.0, 4.0]);
        // s is built from x / 4
        assert!((state.s[0] - 25.0 / 16.0).abs() < 1e-15);
        assert!((state.y[0] - 0.6).abs() < 1e-15);
        assert!((state.y[1] - 0.8).abs() < 1e-15);
    }

    #[test]
    fn test_huge_magnitudes() {
        let state = decompose(&[1e200f64, 2e200, 5e200]).unwrap();
        let reference = decompose(&[1.0f64, 2.0, 5.0]).unwrap();
        for i in 0..3 {
            for j in 0..2 {
                assert!((state.h.get(i, j) - reference.h.get(i, j)).abs() < 1e-12);
            }
        }
        assert!(decompose(&[1e20f32, 2e20]).is_ok());
        assert!(decompose(&[f32::MAX / 2.0, f32::MAX]).is_ok());
    }

    #[test]
    fn test_too_few_values() {
        assert!(matches!(
            decompose::<f64>(&[]),
            Err(crate::PslqError::Precondition(PreconditionViolation::TooFewValues { len: 0 }))
        ));
        assert!(decompose(&[1.0f64]).is_err());
    }
}
