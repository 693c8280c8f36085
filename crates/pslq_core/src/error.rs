//! Error types for integer relation detection
//!
//! Two failure families are kept apart: bad caller input, which the caller
//! can fix, and broken internal invariants, which indicate a defect in the
//! decomposition or iteration code. Running out of norm bound or budget is
//! not an error; see [`PslqOutcome`](crate::PslqOutcome).

use thiserror::Error;

/// Input or configuration rejected before any computation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PreconditionViolation {
    #[error("at least two values are required to find an integer relation, got {len}")]
    TooFewValues { len: usize },

    #[error("values must be strictly ascending; value {index} does not exceed its predecessor")]
    NotAscending { index: usize },

    #[error("value {index} is not positive; the algorithm is reflection invariant, drop zero and negative values")]
    NonPositive { index: usize },

    #[error("value {index} is below √ε and would give spurious relations; more precision is required")]
    BelowSqrtEpsilon { index: usize },

    #[error("γ > 2/√3 is required, got {gamma}")]
    GammaTooSmall { gamma: f64 },

    #[error("τ ∈ (1, 2) is required, got {tau}")]
    TauOutOfRange { tau: f64 },

    #[error("norm ceiling must be finite and greater than 1, got {max_norm}")]
    InvalidNormCeiling { max_norm: f64 },

    #[error("iteration budget must allow at least one iteration")]
    ZeroIterationBudget,
}

/// Internal consistency check failed; indicates an implementation bug
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvariantViolation {
    #[error("‖H‖²/(n-1) = {normalized}, expected 1; the decomposition has numerically failed")]
    FrobeniusNorm { normalized: f64 },

    #[error("yᵀH ≠ 0 in column {column} (residual {residual}); the decomposition has numerically failed")]
    NotOrthogonal { column: usize, residual: f64 },

    #[error("pivot {pivot} out of range for n = {n}")]
    PivotOutOfRange { pivot: usize, n: usize },
}

/// Top-level error returned by [`Pslq::run`](crate::Pslq::run)
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PslqError {
    #[error("precondition violated: {0}")]
    Precondition(#[from] PreconditionViolation),

    #[error("internal invariant violated (this is a bug): {0}")]
    Invariant(#[from] InvariantViolation),
}

impl PslqError {
    pub fn is_precondition(&self) -> bool {
        matches!(self, PslqError::Precondition(_))
    }

    pub fn is_invariant(&self) -> bool {
        matches!(self, PslqError::Invariant(_))
    }
}

/// Result type for PSLQ operations
pub type Result<T> = std::result::Result<T, PslqError>;
