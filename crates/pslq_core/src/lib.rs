//! PSLQ Core Library
//!
//! Integer relation detection: given real values x₁ < x₂ < … < xₙ, find
//! integers c₁…cₙ, not all zero, with Σ cᵢxᵢ ≈ 0, or establish that no
//! relation of Euclidean norm below a ceiling exists.
//!
//! # Overview
//!
//! The search is the PSLQ algorithm of Ferguson and Bailey. A run flows
//! through one owned [`PslqState`]:
//!
//! validate → decompose → initial reduction → iterate → extract
//!
//! # Key Components
//!
//! - [`real`] - Numeric seam; `f32`, `f64` and (feature `mpfr`) MPFR floats
//! - [`matrix`] - Dense row-major matrices
//! - [`validate`] - Input preconditions
//! - [`decompose`] - Partial-sum-of-squares decomposition H
//! - [`reduce`] - Hermite size reduction
//! - [`iterate`] - Main loop with norm, iteration and time budgets
//! - [`relation`] - Relations read out of the transform B
//! - [`dictionary`] - Named constants and human-readable reports
//! - [`trace`] - Injectable progress sinks
//!
//! # Example
//!
//! ```
//! use pslq_core::{find_relation, default_gamma};
//!
//! let relation = find_relation(&[1.0f64, 2.0], default_gamma());
//! let coefficients: Vec<i64> = relation
//!     .iter()
//!     .map(|(c, _)| i64::try_from(c).unwrap())
//!     .collect();
//! assert!(coefficients == vec![2, -1] || coefficients == vec![-2, 1]);
//! ```

pub mod real;
pub mod matrix;
pub mod error;
pub mod config;
pub mod trace;
pub mod validate;
pub mod state;
pub mod decompose;
pub mod reduce;
pub mod iterate;
pub mod relation;
pub mod pslq;
pub mod dictionary;
#[cfg(feature = "mpfr")]
pub mod multiprecision;

use std::time::Duration;

pub use real::{sqrt_epsilon, Real};
pub use matrix::Matrix;
pub use error::{InvariantViolation, PreconditionViolation, PslqError, Result};
pub use config::{default_gamma, PslqConfig};
pub use trace::{FnSink, NoTrace, RecordingSink, TraceEvent, TraceSink, TracingSink};
pub use state::PslqState;
pub use relation::{Relation, RelationTerm};
pub use pslq::{find_relation, find_relation_with, Pslq};
pub use dictionary::{describe_relation, describe_relation_with, render_symbolic, Dictionary};
#[cfg(feature = "mpfr")]
pub use multiprecision::{Mp256, MpFloat};

/// Counters and timing breakdown for one run
#[derive(Debug, Clone, Default)]
pub struct PslqStats {
    /// Main-loop iterations performed
    pub iterations: usize,
    /// Nonzero size-reduction updates, initial pass included
    pub reductions: usize,
    pub swaps: usize,
    pub corner_removals: usize,
    /// Norm bound when the run ended
    pub norm_bound: f64,
    pub decompose_time: f64,
    pub reduce_time: f64,
    pub iterate_time: f64,
    pub total_time: f64,
}

/// Result of a completed run
///
/// None of these is an error: a run that ends without a relation still
/// reports how far the search got.
#[derive(Debug, Clone, PartialEq)]
pub enum PslqOutcome<R> {
    /// A component of y vanished and its column of B is within the ceiling
    RelationFound {
        relation: Relation<R>,
        norm_bound: f64,
        /// How many components of y were below √ε at once
        vanishing: usize,
    },
    /// The norm bound reached the ceiling: no relation with smaller norm
    /// exists
    NoRelationFound { norm_bound: f64 },
    /// A component of y vanished, but the column of B it points at is longer
    /// than the ceiling
    ///
    /// The working precision ran out before the search could either certify
    /// a relation or rule one out; absence is proven only up to
    /// `norm_bound`. Retry with more precision.
    PrecisionExhausted { norm_bound: f64, candidate_norm: f64 },
    /// Iteration budget spent; retry with more precision or a larger budget
    MaxIterationsExceeded { iterations: usize, norm_bound: f64 },
    /// Time budget spent
    TimeLimitExceeded {
        iterations: usize,
        norm_bound: f64,
        elapsed: Duration,
    },
}

impl<R> PslqOutcome<R> {
    pub fn is_found(&self) -> bool {
        matches!(self, PslqOutcome::RelationFound { .. })
    }

    pub fn relation(&self) -> Option<&Relation<R>> {
        match self {
            PslqOutcome::RelationFound { relation, .. } => Some(relation),
            _ => None,
        }
    }

    pub fn into_relation(self) -> Option<Relation<R>> {
        match self {
            PslqOutcome::RelationFound { relation, .. } => Some(relation),
            _ => None,
        }
    }

    /// Norm bound reached when the run ended
    pub fn norm_bound(&self) -> f64 {
        match self {
            PslqOutcome::RelationFound { norm_bound, .. }
            | PslqOutcome::NoRelationFound { norm_bound }
            | PslqOutcome::PrecisionExhausted { norm_bound, .. }
            | PslqOutcome::MaxIterationsExceeded { norm_bound, .. }
            | PslqOutcome::TimeLimitExceeded { norm_bound, .. } => *norm_bound,
        }
    }
}
