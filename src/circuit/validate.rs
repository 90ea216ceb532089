//! Circuit validation.

use crate::error::{LedCalcError, Result};

use super::CircuitModel;

/// Validate a circuit for solving.
///
/// Checks:
/// - Battery voltage is finite and positive
/// - Internal resistance is finite and not negative
/// - There is at least one emitter
pub fn validate_circuit(circuit: &CircuitModel) -> Result<()> {
    require_positive("open_circuit_voltage", circuit.open_circuit_voltage)?;
    require_non_negative("internal_resistance", circuit.internal_resistance)?;
    require_count("emitter_count", circuit.emitter_count)?;
    Ok(())
}

pub(crate) fn require_positive(param: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(LedCalcError::invalid_parameter(
            param,
            format!("must be a positive number, got {value}"),
        ))
    }
}

pub(crate) fn require_non_negative(param: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(LedCalcError::invalid_parameter(
            param,
            format!("must be zero or positive, got {value}"),
        ))
    }
}

pub(crate) fn require_count(param: &str, value: usize) -> Result<()> {
    if value >= 1 {
        Ok(())
    } else {
        Err(LedCalcError::invalid_parameter(param, "must be at least 1"))
    }
}
