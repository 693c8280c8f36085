//! PSLQ run configuration

use std::time::Duration;

/// Default γ: just above the 2/√3 lower limit, as in Ferguson–Bailey
pub fn default_gamma() -> f64 {
    2.0 / 3f64.sqrt() + 0.01
}

/// PSLQ configuration parameters
#[derive(Debug, Clone, PartialEq)]
pub struct PslqConfig {
    /// Pivot weight γ; must exceed 2/√3
    pub gamma: f64,
    /// Norm ceiling. The search stops once every relation below this
    /// Euclidean norm has been excluded, and candidates above it are
    /// rejected.
    pub max_norm: f64,
    /// Maximum iterations of the main loop (safety limit)
    pub max_iterations: usize,
    /// Wall-clock budget for the main loop
    pub time_limit: Option<Duration>,
}

impl Default for PslqConfig {
    fn default() -> Self {
        Self {
            gamma: default_gamma(),
            max_norm: 1e11,
            max_iterations: 100_000,
            time_limit: None,
        }
    }
}

impl PslqConfig {
    /// Default configuration with the given norm ceiling
    pub fn bounded(max_norm: f64) -> Self {
        Self {
            max_norm,
            ..Default::default()
        }
    }

    pub fn with_gamma(mut self, gamma: f64) -> Self {
        self.gamma = gamma;
        self
    }

    pub fn with_max_norm(mut self, max_norm: f64) -> Self {
        self.max_norm = max_norm;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }
}
