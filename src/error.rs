//! Error types for the LED current calculator.
//!
//! This module provides a unified error type [`LedCalcError`] that covers
//! all error conditions that can occur while building emitter tables,
//! validating the circuit description, and running a solve.

use thiserror::Error;

/// Result type alias using [`LedCalcError`].
pub type Result<T> = std::result::Result<T, LedCalcError>;

/// Unified error type for all calculator operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedCalcError {
    // ============ Emitter Data Errors ============
    /// Emitter table has too few samples to interpolate
    #[error("Emitter table needs at least 2 samples, got {samples}")]
    InvalidTable { samples: usize },

    /// A measured sample is unusable
    #[error("Invalid emitter sample at index {index}: {message}")]
    InvalidSample { index: usize, message: String },

    /// Emitter name not present in the registry
    #[error("Unknown emitter '{name}'")]
    UnknownEmitter { name: String },

    /// Emitter name registered twice
    #[error("Duplicate emitter name '{name}'")]
    DuplicateEmitter { name: String },

    // ============ Solver Errors ============
    /// Scan range is empty or inverted, or has no samples
    #[error("Empty search range [{min}, {max}] with {samples} samples")]
    EmptyRange { min: f64, max: f64, samples: usize },

    /// Invalid circuit or solver parameter
    #[error("Invalid parameter '{param}': {message}")]
    InvalidParameter { param: String, message: String },
}

impl LedCalcError {
    /// Create an invalid sample error
    pub fn invalid_sample(index: usize, message: impl Into<String>) -> Self {
        Self::InvalidSample {
            index,
            message: message.into(),
        }
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter(param: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            param: param.into(),
            message: message.into(),
        }
    }

    /// Create an empty range error
    pub fn empty_range(min: f64, max: f64, samples: usize) -> Self {
        Self::EmptyRange { min, max, samples }
    }
}
