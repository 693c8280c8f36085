//! PSLQ driver
//!
//! Runs the pipeline stages over one [`PslqState`] and turns the main loop's
//! exit into a [`PslqOutcome`].
//!
//! [`PslqState`]: crate::state::PslqState

use num_bigint::BigInt;
use std::time::Instant;
use tracing::error;
use crate::config::PslqConfig;
use crate::decompose::decompose;
use crate::error::{PslqError, Result};
use crate::iterate::{self, LoopExit};
use crate::real::Real;
use crate::reduce::initial_reduction;
use crate::relation::Relation;
use crate::trace::{NoTrace, TraceEvent, TraceSink, TracingSink};
use crate::validate::validate;
use crate::{PslqOutcome, PslqStats};

/// Integer relation finder
///
/// Holds only configuration and a trace sink; every run allocates its own
/// working state, so one `Pslq` can be reused for many inputs.
pub struct Pslq<S: TraceSink = NoTrace> {
    config: PslqConfig,
    sink: S,
}

impl Pslq<NoTrace> {
    /// Finder that reports nothing
    pub fn new(config: PslqConfig) -> Self {
        Self { config, sink: NoTrace }
    }
}

impl<S: TraceSink> Pslq<S> {
    pub fn with_sink(config: PslqConfig, sink: S) -> Self {
        Self { config, sink }
    }

    pub fn config(&self) -> &PslqConfig {
        &self.config
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Search for an integer relation among `values`
    ///
    /// # Arguments
    /// * `values` - Strictly ascending, positive, none below √ε
    ///
    /// # Returns
    /// The outcome and execution statistics, or an error if the input was
    /// rejected or an internal invariant failed
    pub fn run<R: Real>(&mut self, values: &[R]) -> Result<(PslqOutcome<R>, PslqStats)> {
        let start = Instant::now();
        let mut stats = PslqStats::default();

        let tau = match validate(values, &self.config) {
            Ok(tau) => tau,
            Err(violation) => {
                self.sink.emit(|| TraceEvent::PreconditionFailed(violation.clone()));
                return Err(violation.into());
            }
        };
        self.sink.emit(|| TraceEvent::Validated {
            n: values.len(),
            tau: tau.to_f64(),
        });

        let phase = Instant::now();
        let mut state = decompose(values)?;
        stats.decompose_time = phase.elapsed().as_secs_f64();
        self.sink.emit(|| TraceEvent::Decomposed {
            frobenius_sq: state.h.frobenius_norm_sq().to_f64(),
        });

        let phase = Instant::now();
        let reductions = initial_reduction(&mut state);
        stats.reductions += reductions;
        stats.reduce_time = phase.elapsed().as_secs_f64();
        self.sink.emit(|| TraceEvent::InitialReduction { reductions });

        let phase = Instant::now();
        let exit = iterate::run(&mut state, &self.config, &mut self.sink, &mut stats)?;
        stats.iterate_time = phase.elapsed().as_secs_f64();

        let norm_bound = stats.norm_bound;
        let outcome = match exit {
            LoopExit::Vanished { iteration, indices } => {
                let index = indices[0];
                let relation = Relation::extract(&state, index);
                let norm = relation.norm();
                if norm > self.config.max_norm {
                    self.sink.emit(|| TraceEvent::CandidateRejected { iteration, norm });
                    PslqOutcome::PrecisionExhausted {
                        norm_bound,
                        candidate_norm: norm,
                    }
                } else {
                    self.sink.emit(|| TraceEvent::RelationFound {
                        iteration,
                        index,
                        vanishing: indices.len(),
                    });
                    PslqOutcome::RelationFound {
                        relation,
                        norm_bound,
                        vanishing: indices.len(),
                    }
                }
            }
            LoopExit::NormBoundExceeded { .. } => PslqOutcome::NoRelationFound { norm_bound },
            LoopExit::MaxIterations { iterations } => {
                PslqOutcome::MaxIterationsExceeded { iterations, norm_bound }
            }
            LoopExit::TimeLimit { iterations, elapsed } => PslqOutcome::TimeLimitExceeded {
                iterations,
                norm_bound,
                elapsed,
            },
        };

        stats.total_time = start.elapsed().as_secs_f64();
        Ok((outcome, stats))
    }
}

/// Find an integer relation with the default norm ceiling
///
/// Diagnostics go to `tracing`; see [`find_relation_with`].
///
/// # Returns
/// (coefficient, value) pairs with zero coefficients omitted, or an empty
/// vector if the input was rejected or no relation was found
pub fn find_relation<R: Real>(values: &[R], gamma: f64) -> Vec<(BigInt, R)> {
    let config = PslqConfig::default().with_gamma(gamma);
    find_relation_with(values, &config, TracingSink)
}

/// Find an integer relation, reporting diagnostics to `sink`
///
/// Rejected input and unsuccessful searches both return an empty vector;
/// the sink tells them apart. A broken internal invariant is a bug: it
/// panics in debug builds and is logged at ERROR level in release builds.
pub fn find_relation_with<R: Real, S: TraceSink>(
    values: &[R],
    config: &PslqConfig,
    sink: S,
) -> Vec<(BigInt, R)> {
    let mut pslq = Pslq::with_sink(config.clone(), sink);
    match pslq.run(values) {
        Ok((outcome, _)) => outcome
            .into_relation()
            .map(Relation::into_pairs)
            .unwrap_or_default(),
        Err(e) => {
            report_failure(&e);
            Vec::new()
        }
    }
}

/// Surface a failed run from a convenience entry point
///
/// Rejected input has already reached the sink. A broken invariant is
/// logged at ERROR level and, in debug builds, panics.
pub(crate) fn report_failure(err: &PslqError) {
    if let PslqError::Invariant(violation) = err {
        error!(%violation, "pslq internal invariant violated");
        if cfg!(debug_assertions) {
            panic!("pslq internal invariant violated: {violation}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PreconditionViolation;
    use crate::real::sqrt_epsilon;
    use crate::trace::RecordingSink;
    use num_traits::ToPrimitive;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::f64::consts::{E, PI};

    fn coefficients(pairs: &[(BigInt, f64)]) -> Vec<i64> {
        pairs.iter().map(|(c, _)| c.to_i64().unwrap()).collect()
    }

    fn assert_genuine(values: &[f64], relation: &Relation<f64>) {
        let max = relation.max_abs_coefficient().to_f64().unwrap();
        let scale: f64 = values.iter().map(|v| v * v).sum::<f64>().sqrt();
        let tol = sqrt_epsilon::<f64>() * scale * max.max(1.0);
        assert!(
            relation.residual().abs() < tol,
            "residual {} exceeds {}",
            relation.residual(),
            tol
        );
        for t in relation.terms() {
            let c = f64::from_bigint(&t.coefficient);
            assert_eq!(Real::round(&c), c);
        }
    }

    #[test]
    fn test_exact_rational_case() {
        let pairs = find_relation(&[1.0f64, 2.0], crate::default_gamma());
        let c = coefficients(&pairs);
        assert!(c == vec![2, -1] || c == vec![-2, 1], "got {:?}", c);
        assert_eq!(pairs[0].1, 1.0);
        assert_eq!(pairs[1].1, 2.0);
    }

    #[test]
    fn test_irrational_scaled_case() {
        let pairs = find_relation(&[PI, 2.0 * PI], crate::default_gamma());
        let c = coefficients(&pairs);
        assert!(c == vec![2, -1] || c == vec![-2, 1], "got {:?}", c);
    }

    #[test]
    fn test_unsorted_input_is_rejected() {
        let mut sink = RecordingSink::new();
        let pairs = find_relation_with(&[2.0f64, 1.0], &PslqConfig::default(), &mut sink);
        assert!(pairs.is_empty());
        assert_eq!(
            sink.precondition_failure(),
            Some(&PreconditionViolation::NotAscending { index: 1 })
        );

        let err = Pslq::new(PslqConfig::default()).run(&[2.0f64, 1.0]).unwrap_err();
        assert!(err.is_precondition());
    }

    #[test]
    fn test_no_small_relation_at_double_precision() {
        let values = [1.0f64, 2f64.sqrt(), 3f64.sqrt()];
        let mut sink = RecordingSink::new();
        let mut pslq = Pslq::with_sink(PslqConfig::bounded(1e3), &mut sink);
        let (outcome, stats) = pslq.run(&values).unwrap();

        // Precision gives out before the bound reaches the ceiling; the
        // vanishing column is far too long to be trusted.
        match outcome {
            PslqOutcome::PrecisionExhausted { norm_bound, candidate_norm } => {
                assert_eq!(norm_bound, stats.norm_bound);
                assert!(norm_bound < 1e3);
                assert!(candidate_norm > 1e3);
            }
            other => panic!("expected exhausted precision, got {:?}", other),
        }
        assert!(!outcome.is_found());
        assert!(find_relation_with(&values, &PslqConfig::bounded(1e3), NoTrace).is_empty());
        assert!(sink
            .events()
            .iter()
            .any(|e| matches!(e, TraceEvent::CandidateRejected { norm, .. } if *norm > 1e3)));
    }

    #[test]
    fn test_huge_magnitudes() {
        let pairs = find_relation(&[1e200f64, 2e200], crate::default_gamma());
        let c = coefficients(&pairs);
        assert!(c == vec![2, -1] || c == vec![-2, 1], "got {:?}", c);
        assert_eq!(pairs[1].1, 2e200);

        let (outcome, _) = Pslq::new(PslqConfig::default())
            .run(&[1e20f32, 2e20])
            .unwrap();
        let relation = outcome.into_relation().unwrap();
        assert_eq!(relation.residual(), 0.0);

        let scaled: Vec<f64> = [2f64.ln(), 3f64.ln(), 6f64.ln()].iter().map(|v| v * 1e250).collect();
        let (outcome, _) = Pslq::new(PslqConfig::default()).run(&scaled).unwrap();
        let c: Vec<i64> = outcome
            .into_relation()
            .unwrap()
            .normalized()
            .coefficients()
            .iter()
            .map(|c| c.to_i64().unwrap())
            .collect();
        assert_eq!(c, vec![1, 1, -1]);
    }

    #[test]
    fn test_rejected_input_is_quiet() {
        let err: PslqError = PreconditionViolation::TooFewValues { len: 1 }.into();
        report_failure(&err);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "internal invariant")]
    fn test_broken_invariant_panics_in_debug() {
        let mut state = decompose(&[1.0f64, 2.0, 5.0]).unwrap();
        state.h.set(1, 1, 4.0);
        let violation = crate::decompose::verify(&state).unwrap_err();
        report_failure(&violation.into());
    }

    #[test]
    fn test_norm_ceiling_certifies_absence() {
        let (outcome, stats) = Pslq::new(PslqConfig::bounded(100.0)).run(&[E, PI]).unwrap();
        assert!(matches!(outcome, PslqOutcome::NoRelationFound { .. }));
        assert!(outcome.norm_bound() >= 100.0);
        assert!(stats.iterations > 0);
    }

    #[test]
    fn test_max_iterations_is_distinct() {
        let values = [1.0f64, 2f64.sqrt(), 3f64.sqrt()];
        let config = PslqConfig::default().with_max_iterations(5);
        let (outcome, stats) = Pslq::new(config).run(&values).unwrap();
        assert!(matches!(
            outcome,
            PslqOutcome::MaxIterationsExceeded { iterations: 5, .. }
        ));
        assert_eq!(stats.iterations, 5);
        assert!(!outcome.is_found());
    }

    #[test]
    fn test_logarithm_relation() {
        let values = [2f64.ln(), 3f64.ln(), 5f64.ln(), 30f64.ln()];
        let (outcome, _) = Pslq::new(PslqConfig::default()).run(&values).unwrap();
        let relation = outcome.into_relation().expect("ln 30 = ln 2 + ln 3 + ln 5");
        assert_genuine(&values, &relation);
        let c: Vec<i64> = relation
            .normalized()
            .coefficients()
            .iter()
            .map(|c| c.to_i64().unwrap())
            .collect();
        assert_eq!(c, vec![1, 1, 1, -1]);
    }

    #[test]
    fn test_mixed_constants() {
        // 3 − 2e − π + (π + 2e − 3) = 0
        let values = [1.0, E, PI, PI + 2.0 * E - 3.0];
        let (outcome, _) = Pslq::new(PslqConfig::default()).run(&values).unwrap();
        let relation = outcome.into_relation().unwrap();
        assert_genuine(&values, &relation);
        let c: Vec<i64> = relation
            .normalized()
            .coefficients()
            .iter()
            .map(|c| c.to_i64().unwrap())
            .collect();
        assert_eq!(c, vec![3, -2, -1, 1]);
    }

    #[test]
    fn test_cube_root_relation_skips_zero_terms() {
        let cbrt = 2f64.cbrt();
        let values = [1.0, cbrt, cbrt * cbrt, 2.0];
        let pairs = find_relation(&values, crate::default_gamma());
        // 2·1 − 1·2 = 0; the irrational entries get zero coefficients
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].1, 1.0);
        assert_eq!(pairs[1].1, 2.0);
    }

    #[test]
    fn test_determinism() {
        let values = [1.0f64, 2f64.sqrt(), 3f64.sqrt(), 5f64.sqrt()];
        let first = find_relation(&values, crate::default_gamma());
        let second = find_relation(&values, crate::default_gamma());
        assert_eq!(first, second);
    }

    #[test]
    fn test_single_precision() {
        let pairs = find_relation(&[1.5f32, 3.0], crate::default_gamma());
        let c: Vec<i64> = pairs.iter().map(|(c, _)| c.to_i64().unwrap()).collect();
        assert!(c == vec![2, -1] || c == vec![-2, 1], "got {:?}", c);
    }

    #[test]
    fn test_planted_relations() {
        // x_last = Σ cᵢxᵢ with small positive cᵢ keeps the vector ascending
        let mut rng = StdRng::seed_from_u64(0x5eed);
        for n in 3..=5 {
            let mut values: Vec<f64> = (0..n - 1).map(|_| rng.gen_range(1.0..2.0)).collect();
            values.sort_by(|a, b| a.partial_cmp(b).unwrap());
            let planted: Vec<i64> = (0..n - 1).map(|_| rng.gen_range(1..4)).collect();
            let last: f64 = values.iter().zip(&planted).map(|(v, &c)| v * c as f64).sum();
            values.push(last);

            let (outcome, stats) = Pslq::new(PslqConfig::default()).run(&values).unwrap();
            let relation = outcome
                .into_relation()
                .unwrap_or_else(|| panic!("n = {}: no relation ({:?})", n, stats));
            assert_genuine(&values, &relation);
            eprintln!("n = {}: {} in {} iterations", n, relation, stats.iterations);
        }
    }

    #[test]
    fn test_trace_sequence() {
        let mut sink = RecordingSink::new();
        let pairs = find_relation_with(
            &[2f64.ln(), 3f64.ln(), 6f64.ln()],
            &PslqConfig::default(),
            &mut sink,
        );
        assert_eq!(pairs.len(), 3);

        let events = sink.events();
        assert!(matches!(events[0], TraceEvent::Validated { n: 3, .. }));
        assert!(matches!(events[1], TraceEvent::Decomposed { .. }));
        assert!(matches!(events[2], TraceEvent::InitialReduction { .. }));
        assert!(matches!(
            events.last(),
            Some(TraceEvent::RelationFound { vanishing: 1, .. })
        ));
    }

    #[test]
    fn test_reusable_finder() {
        let mut pslq = Pslq::with_sink(PslqConfig::default(), RecordingSink::new());
        assert!(pslq.run(&[1.0f64, 2.0]).unwrap().0.is_found());
        assert!(pslq.run(&[1.0f64, 3.0]).unwrap().0.is_found());
        assert!(pslq.run(&[1.0f64]).is_err());
        let sink = pslq.into_sink();
        assert_eq!(
            sink.precondition_failure(),
            Some(&PreconditionViolation::TooFewValues { len: 1 })
        );
    }
}
