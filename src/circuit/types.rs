//! Core types for circuit representation.

use std::fmt;
use std::str::FromStr;

use crate::error::{LedCalcError, Result};

use super::validate::{require_count, require_non_negative, require_positive};

/// How a group of identical parts is connected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum Wiring {
    /// Parts share a voltage and split the current
    #[default]
    Parallel,
    /// Parts share a current and add their voltages
    Series,
}

impl fmt::Display for Wiring {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Wiring::Parallel => write!(f, "parallel"),
            Wiring::Series => write!(f, "series"),
        }
    }
}

impl FromStr for Wiring {
    type Err = LedCalcError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "parallel" | "p" => Ok(Wiring::Parallel),
            "series" | "s" => Ok(Wiring::Series),
            _ => Err(LedCalcError::invalid_parameter(
                "wiring",
                format!("expected 'parallel' or 'series', got '{s}'"),
            )),
        }
    }
}

/// A single equivalent battery.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Battery {
    /// Open-circuit voltage (V)
    pub voltage: f64,
    /// Internal resistance (ohms)
    pub internal_resistance: f64,
}

impl Battery {
    /// Create a new battery.
    pub fn new(voltage: f64, internal_resistance: f64) -> Self {
        Self {
            voltage,
            internal_resistance,
        }
    }

    /// Terminal voltage while delivering `current` (A).
    pub fn terminal_voltage(&self, current: f64) -> f64 {
        self.voltage - current * self.internal_resistance
    }
}

/// A bank of identical cells.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellBank {
    /// Per-cell open-circuit voltage (V)
    pub cell_voltage: f64,
    /// Per-cell internal resistance (ohms)
    pub cell_resistance: f64,
    pub cell_count: usize,
    pub wiring: Wiring,
}

impl Default for CellBank {
    /// A single freshly charged lithium-ion cell.
    fn default() -> Self {
        Self {
            cell_voltage: 4.2,
            cell_resistance: 0.05,
            cell_count: 1,
            wiring: Wiring::Parallel,
        }
    }
}

impl CellBank {
    /// Create a new cell bank.
    pub fn new(cell_voltage: f64, cell_resistance: f64, cell_count: usize, wiring: Wiring) -> Self {
        Self {
            cell_voltage,
            cell_resistance,
            cell_count,
            wiring,
        }
    }

    /// Reduce the bank to a single equivalent battery.
    ///
    /// Parallel cells keep the cell voltage and divide the resistance by
    /// the count. Series cells multiply both by the count.
    pub fn reduce(&self) -> Result<Battery> {
        require_positive("cell_voltage", self.cell_voltage)?;
        require_non_negative("cell_resistance", self.cell_resistance)?;
        require_count("cell_count", self.cell_count)?;

        let n = self.cell_count as f64;
        Ok(match self.wiring {
            Wiring::Parallel => Battery::new(self.cell_voltage, self.cell_resistance / n),
            Wiring::Series => Battery::new(self.cell_voltage * n, self.cell_resistance * n),
        })
    }
}

/// A battery driving a group of identical emitters with no regulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircuitModel {
    /// Open-circuit voltage of the equivalent battery (V)
    pub open_circuit_voltage: f64,
    /// Internal resistance of the equivalent battery (ohms)
    pub internal_resistance: f64,
    pub emitter_count: usize,
    pub emitter_wiring: Wiring,
}

impl CircuitModel {
    /// Create a circuit from an equivalent battery and emitter wiring.
    ///
    /// # Errors
    ///
    /// Returns [`LedCalcError::InvalidParameter`] if the battery voltage is
    /// not positive, the resistance is negative, or there are no emitters.
    pub fn new(battery: Battery, emitter_count: usize, emitter_wiring: Wiring) -> Result<Self> {
        let model = Self {
            open_circuit_voltage: battery.voltage,
            internal_resistance: battery.internal_resistance,
            emitter_count,
            emitter_wiring,
        };
        super::validate_circuit(&model)?;
        Ok(model)
    }

    /// The equivalent battery.
    pub fn battery(&self) -> Battery {
        Battery::new(self.open_circuit_voltage, self.internal_resistance)
    }

    /// Current through each emitter when the battery delivers `total_current`.
    pub fn current_per_emitter(&self, total_current: f64) -> f64 {
        match self.emitter_wiring {
            Wiring::Parallel => total_current / self.emitter_count as f64,
            Wiring::Series => total_current,
        }
    }

    /// Voltage across the whole emitter group given one emitter's forward voltage.
    pub fn string_voltage(&self, emitter_voltage: f64) -> f64 {
        match self.emitter_wiring {
            Wiring::Parallel => emitter_voltage,
            Wiring::Series => emitter_voltage * self.emitter_count as f64,
        }
    }
}
