//! Diagnostic trace sinks
//!
//! The search loop reports progress through a [`TraceSink`] chosen by the
//! caller instead of writing to the console. [`NoTrace`] sets
//! `ENABLED = false`, which lets the compiler drop event construction
//! entirely; [`TracingSink`] forwards to the `tracing` ecosystem and
//! [`RecordingSink`] keeps events for inspection in tests.

use crate::error::PreconditionViolation;
use std::time::Duration;
use tracing::{debug, trace, warn};

/// Progress event emitted by the PSLQ pipeline
///
/// Real-valued quantities are reported as `f64` regardless of the working
/// precision.
#[derive(Debug, Clone, PartialEq)]
pub enum TraceEvent {
    /// Input accepted
    Validated { n: usize, tau: f64 },
    /// Input rejected
    PreconditionFailed(PreconditionViolation),
    /// Decomposition built and checked
    Decomposed { frobenius_sq: f64 },
    /// Initial triangular reduction finished
    InitialReduction { reductions: usize },
    /// One pass of the main loop completed
    Iteration { iteration: usize, pivot: usize, norm_bound: f64 },
    /// A component of y vanished but the relation exceeds the norm ceiling
    CandidateRejected { iteration: usize, norm: f64 },
    /// A relation was read out of column `index` of B
    RelationFound { iteration: usize, index: usize, vanishing: usize },
    /// The norm bound reached the ceiling
    NormBoundExceeded { iteration: usize, norm_bound: f64 },
    IterationBudgetExhausted { iterations: usize },
    TimeBudgetExhausted { iterations: usize, elapsed: Duration },
}

/// Receiver for [`TraceEvent`]s
pub trait TraceSink {
    /// Sinks that discard everything set this to `false`
    const ENABLED: bool = true;

    fn record(&mut self, event: &TraceEvent);

    /// Build and record an event only when the sink is enabled
    #[inline]
    fn emit<F>(&mut self, make: F)
    where
        Self: Sized,
        F: FnOnce() -> TraceEvent,
    {
        if Self::ENABLED {
            self.record(&make());
        }
    }
}

impl<S: TraceSink> TraceSink for &mut S {
    const ENABLED: bool = S::ENABLED;

    fn record(&mut self, event: &TraceEvent) {
        (**self).record(event);
    }
}

/// Discards all events at zero cost
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTrace;

impl TraceSink for NoTrace {
    const ENABLED: bool = false;

    #[inline]
    fn record(&mut self, _event: &TraceEvent) {}
}

/// Forwards events to `tracing`
///
/// Per-iteration events go to TRACE, pipeline milestones to DEBUG, and
/// rejected input or exhausted budgets to WARN.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl TraceSink for TracingSink {
    fn record(&mut self, event: &TraceEvent) {
        match event {
            TraceEvent::Validated { n, tau } => debug!(n, tau, "pslq input validated"),
            TraceEvent::PreconditionFailed(violation) => warn!(%violation, "pslq input rejected"),
            TraceEvent::Decomposed { frobenius_sq } => {
                debug!(frobenius_sq, "pslq decomposition built")
            }
            TraceEvent::InitialReduction { reductions } => {
                debug!(reductions, "pslq initial reduction done")
            }
            TraceEvent::Iteration { iteration, pivot, norm_bound } => {
                trace!(iteration, pivot, norm_bound, "pslq iteration")
            }
            TraceEvent::CandidateRejected { iteration, norm } => {
                debug!(iteration, norm, "pslq candidate exceeds norm ceiling")
            }
            TraceEvent::RelationFound { iteration, index, vanishing } => {
                debug!(iteration, index, vanishing, "pslq relation found")
            }
            TraceEvent::NormBoundExceeded { iteration, norm_bound } => {
                debug!(iteration, norm_bound, "pslq norm bound reached ceiling")
            }
            TraceEvent::IterationBudgetExhausted { iterations } => {
                warn!(iterations, "pslq iteration budget exhausted")
            }
            TraceEvent::TimeBudgetExhausted { iterations, elapsed } => {
                warn!(iterations, ?elapsed, "pslq time budget exhausted")
            }
        }
    }
}

/// Keeps every event in memory
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    pub events: Vec<TraceEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }

    /// Number of main-loop iterations reported
    pub fn iterations(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, TraceEvent::Iteration { .. }))
            .count()
    }

    /// First precondition failure, if any
    pub fn precondition_failure(&self) -> Option<&PreconditionViolation> {
        self.events.iter().find_map(|e| match e {
            TraceEvent::PreconditionFailed(v) => Some(v),
            _ => None,
        })
    }
}

impl TraceSink for RecordingSink {
    fn record(&mut self, event: &TraceEvent) {
        self.events.push(event.clone());
    }
}

/// Adapts a closure into a sink
pub struct FnSink<F>(pub F);

impl<F: FnMut(&TraceEvent)> TraceSink for FnSink<F> {
    fn record(&mut self, event: &TraceEvent) {
        (self.0)(event);
    }
}
