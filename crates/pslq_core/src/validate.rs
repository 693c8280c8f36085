//! Input validation
//!
//! Every check runs before any matrix is allocated. Comparisons are written
//! as negated `>` so that NaN fails them.

use crate::config::PslqConfig;
use crate::error::PreconditionViolation;
use crate::real::{sqrt_epsilon, Real};

/// Check the input vector and configuration
///
/// Checks, in order: length, strict ascent, positivity and the √ε floor of
/// every element, γ > 2/√3, τ ∈ (1, 2), then the norm ceiling and the
/// iteration budget.
///
/// # Returns
/// τ = 1/√(1/4 + 1/γ²) at the working precision
pub fn validate<R: Real>(values: &[R], config: &PslqConfig) -> Result<R, PreconditionViolation> {
    if values.len() < 2 {
        return Err(PreconditionViolation::TooFewValues { len: values.len() });
    }

    for i in 1..values.len() {
        if !(values[i] > values[i - 1]) {
            return Err(PreconditionViolation::NotAscending { index: i });
        }
    }

    let floor: R = sqrt_epsilon();
    for (index, v) in values.iter().enumerate() {
        if !(*v > R::zero()) {
            return Err(PreconditionViolation::NonPositive { index });
        }
        if *v < floor {
            return Err(PreconditionViolation::BelowSqrtEpsilon { index });
        }
    }

    let gamma = R::from_f64(config.gamma);
    let gamma_min = R::from_i64(2) / R::from_i64(3).sqrt();
    if !(gamma > gamma_min) {
        return Err(PreconditionViolation::GammaTooSmall { gamma: config.gamma });
    }

    let quarter = R::one() / R::from_i64(4);
    let tau = R::one() / (quarter + R::one() / (gamma.clone() * gamma)).sqrt();
    if !(tau > R::one() && tau < R::from_i64(2)) {
        return Err(PreconditionViolation::TauOutOfRange { tau: tau.to_f64() });
    }

    if !(config.max_norm > 1.0) || !config.max_norm.is_finite() {
        return Err(PreconditionViolation::InvalidNormCeiling { max_norm: config.max_norm });
    }
    if config.max_iterations == 0 {
        return Err(PreconditionViolation::ZeroIterationBudget);
    }

    Ok(tau)
}
