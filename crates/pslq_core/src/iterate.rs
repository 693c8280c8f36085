//! PSLQ main loop
//!
//! Each iteration (Ferguson–Bailey, section 3):
//! 1. pick the pivot m maximizing γ^(m+1)·|H(m,m)|
//! 2. swap entries m and m+1 of y, A, B and H
//! 3. rotate away the corner H(m, m+1) if m < n-2
//! 4. size-reduce the rows below m
//! 5. stop if some |y_i| < √ε
//! 6. recompute the norm bound 1/max|H(i,i)|
//!
//! The loop always ends: the norm ceiling, the iteration budget and the
//! optional time budget are checked before every pass.

use std::time::{Duration, Instant};
use crate::config::PslqConfig;
use crate::error::InvariantViolation;
use crate::real::{sqrt_epsilon, Real};
use crate::reduce::reduce_after_swap;
use crate::state::PslqState;
use crate::trace::{TraceEvent, TraceSink};
use crate::PslqStats;

/// How the main loop ended
#[derive(Debug, Clone, PartialEq)]
pub enum LoopExit {
    /// Components of y fell below √ε, smallest first
    Vanished { iteration: usize, indices: Vec<usize> },
    /// Every relation below the norm ceiling has been excluded
    NormBoundExceeded { iteration: usize },
    MaxIterations { iterations: usize },
    TimeLimit { iterations: usize, elapsed: Duration },
}

/// Run iterations until a component of y vanishes or a budget runs out
///
/// `state` must be decomposed and initially reduced. The final norm bound
/// and iteration count are written to `stats`.
pub fn run<R: Real, S: TraceSink>(
    state: &mut PslqState<R>,
    config: &PslqConfig,
    sink: &mut S,
    stats: &mut PslqStats,
) -> Result<LoopExit, InvariantViolation> {
    let start = Instant::now();
    let gamma = R::from_f64(config.gamma);
    let ceiling = R::from_f64(config.max_norm);
    let threshold: R = sqrt_epsilon();

    let mut norm_bound = state.norm_bound();
    let mut iteration = 0usize;

    loop {
        stats.norm_bound = norm_bound.to_f64();

        if !(norm_bound < ceiling) {
            sink.emit(|| TraceEvent::NormBoundExceeded {
                iteration,
                norm_bound: norm_bound.to_f64(),
            });
            return Ok(LoopExit::NormBoundExceeded { iteration });
        }
        if iteration >= config.max_iterations {
            sink.emit(|| TraceEvent::IterationBudgetExhausted { iterations: iteration });
            return Ok(LoopExit::MaxIterations { iterations: iteration });
        }
        if let Some(limit) = config.time_limit {
            let elapsed = start.elapsed();
            if elapsed >= limit {
                sink.emit(|| TraceEvent::TimeBudgetExhausted { iterations: iteration, elapsed });
                return Ok(LoopExit::TimeLimit { iterations: iteration, elapsed });
            }
        }

        iteration += 1;
        stats.iterations = iteration;

        let m = state.select_pivot(&gamma)?;
        state.swap(m);
        stats.swaps += 1;
        if state.remove_corner(m) {
            stats.corner_removals += 1;
        }
        stats.reductions += reduce_after_swap(state, m);

        let indices = state.vanishing_components(&threshold);
        if !indices.is_empty() {
            return Ok(LoopExit::Vanished { iteration, indices });
        }

        norm_bound = state.norm_bound();
        sink.emit(|| TraceEvent::Iteration {
            iteration,
            pivot: m,
            norm_bound: norm_bound.to_f64(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decompose::decompose;
    use crate::matrix::Matrix;
    use crate::reduce::initial_reduction;
    use crate::trace::{NoTrace, RecordingSink};

    fn prepared(x: &[f64]) -> PslqState<f64> {
        let mut state = decompose(x).unwrap();
        initial_reduction(&mut state);
        state
    }

    #[test]
    fn test_finds_exact_rational_relation() {
        let mut state = prepared(&[1.0, 2.0]);
        let mut stats = PslqStats::default();
        let exit = run(&mut state, &PslqConfig::default(), &mut NoTrace, &mut stats).unwrap();
        match exit {
            LoopExit::Vanished { iteration, indices } => {
                assert_eq!(iteration, 1);
                assert_eq!(indices.len(), 1);
                let col = state.b.column(indices[0]);
                let c0 = i64::try_from(&col[0]).unwrap();
                let c1 = i64::try_from(&col[1]).unwrap();
                assert!((c0, c1) == (2, -1) || (c0, c1) == (-2, 1));
            }
            other => panic!("unexpected exit {:?}", other),
        }
    }

    #[test]
    fn test_norm_ceiling_stops_search() {
        let mut state = prepared(&[std::f64::consts::E, std::f64::consts::PI]);
        let mut stats = PslqStats::default();
        let config = PslqConfig::bounded(100.0);
        let exit = run(&mut state, &config, &mut NoTrace, &mut stats).unwrap();
        assert!(matches!(exit, LoopExit::NormBoundExceeded { .. }));
        assert!(stats.norm_bound >= 100.0);
    }

    #[test]
    fn test_iteration_budget() {
        let x = [1.0, 2f64.sqrt(), 3f64.sqrt()];
        let mut state = prepared(&x);
        let mut stats = PslqStats::default();
        let mut sink = RecordingSink::new();
        let config = PslqConfig::default().with_max_iterations(5);
        let exit = run(&mut state, &config, &mut sink, &mut stats).unwrap();

        assert_eq!(exit, LoopExit::MaxIterations { iterations: 5 });
        assert_eq!(stats.iterations, 5);
        assert_eq!(sink.iterations(), 5);
        assert_eq!(
            sink.events().last(),
            Some(&TraceEvent::IterationBudgetExhausted { iterations: 5 })
        );
        assert_eq!(state.transform_product(), Matrix::identity(3));
    }

    #[test]
    fn test_zero_time_budget() {
        let x = [1.0, 2f64.sqrt(), 3f64.sqrt()];
        let mut state = prepared(&x);
        let mut stats = PslqStats::default();
        let config = PslqConfig::default().with_time_limit(Duration::ZERO);
        let exit = run(&mut state, &config, &mut NoTrace, &mut stats).unwrap();
        assert!(matches!(exit, LoopExit::TimeLimit { iterations: 0, .. }));
    }

    #[test]
    fn test_norm_bound_never_decreases_much() {
        // The bound is monotone in exact arithmetic
        let x = [1.0, 2f64.sqrt(), 3f64.sqrt(), 5f64.sqrt()];
        let mut state = prepared(&x);
        let mut stats = PslqStats::default();
        let mut sink = RecordingSink::new();
        let config = PslqConfig::default().with_max_iterations(8);
        let _ = run(&mut state, &config, &mut sink, &mut stats).unwrap();

        let bounds: Vec<f64> = sink
            .events()
            .iter()
            .filter_map(|e| match e {
                TraceEvent::Iteration { norm_bound, .. } => Some(*norm_bound),
                _ => None,
            })
            .collect();
        assert!(!bounds.is_empty());
        for pair in bounds.windows(2) {
            assert!(pair[1] >= pair[0] * (1.0 - 1e-9));
        }
    }
}
