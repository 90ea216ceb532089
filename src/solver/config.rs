//! Search and refinement settings.

use crate::circuit::{require_count, require_non_negative, require_positive};
use crate::error::{LedCalcError, Result};

use super::{
    DEFAULT_ERROR_THRESHOLD, DEFAULT_INITIAL_SAMPLES, DEFAULT_MAX_ITERATIONS, DEFAULT_SEARCH_MAX,
    DEFAULT_SEARCH_MIN, DEFAULT_STEP_RATE,
};

/// Configuration for a full solve.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverConfig {
    /// Lowest total current sampled by the initial scan (A).
    pub search_min: f64,
    /// Highest total current sampled by the initial scan (A).
    pub search_max: f64,
    /// Number of steps the scan range is divided into.
    pub initial_samples: usize,
    /// Multiplier applied to the error gradient on each refinement step.
    pub step_rate: f64,
    /// Maximum refinement iterations.
    pub max_iterations: usize,
    /// Refinement stops once the voltage error is at or below this (V).
    pub error_threshold: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            search_min: DEFAULT_SEARCH_MIN,
            search_max: DEFAULT_SEARCH_MAX,
            initial_samples: DEFAULT_INITIAL_SAMPLES,
            step_rate: DEFAULT_STEP_RATE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            error_threshold: DEFAULT_ERROR_THRESHOLD,
        }
    }
}

impl SolverConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the scan range (A).
    pub fn with_search_range(mut self, min: f64, max: f64) -> Self {
        self.search_min = min;
        self.search_max = max;
        self
    }

    /// Set the number of scan steps.
    pub fn with_initial_samples(mut self, initial_samples: usize) -> Self {
        self.initial_samples = initial_samples;
        self
    }

    /// Set the refinement step rate.
    ///
    /// Larger rates move further per iteration but overshoot more easily
    /// around the V-shaped minimum of the error.
    pub fn with_step_rate(mut self, step_rate: f64) -> Self {
        self.step_rate = step_rate;
        self
    }

    /// Set the maximum refinement iterations.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the convergence threshold (in volts).
    pub fn with_error_threshold(mut self, error_threshold: f64) -> Self {
        self.error_threshold = error_threshold;
        self
    }

    /// Check every setting before a solve starts.
    pub fn validate(&self) -> Result<()> {
        require_non_negative("search_min", self.search_min)?;
        require_positive("search_max", self.search_max)?;
        if self.search_max <= self.search_min {
            return Err(LedCalcError::empty_range(
                self.search_min,
                self.search_max,
                self.initial_samples,
            ));
        }
        require_count("initial_samples", self.initial_samples)?;
        require_positive("step_rate", self.step_rate)?;
        require_count("max_iterations", self.max_iterations)?;
        require_non_negative("error_threshold", self.error_threshold)?;
        Ok(())
    }
}
