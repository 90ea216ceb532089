//! # Ledcalc Core
//!
//! Current draw calculator for LEDs driven directly from a battery.
//!
//! With no driver in between, the current through the emitters settles
//! wherever the battery's sagging terminal voltage meets the emitters'
//! rising forward voltage. This library provides:
//! - Measured emitter curves with interpolated and extrapolated lookup
//! - Reduction of parallel or series cell banks to one equivalent battery
//! - A two-stage solver (coarse scan, then secant-style refinement) that
//!   records every trial it makes
//! - Text rendering of the solve history for the CLI
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`emitter`] - Emitter data tables and the named registry
//! - [`circuit`] - Battery, cell bank and emitter wiring
//! - [`solver`] - Residual evaluation, scan and refinement
//! - [`calculator`] - End-to-end calculation from user settings
//! - [`report`] - Trace table and summary rendering
//!
//! ## Usage
//!
//! ### Native CLI
//!
//! ```bash
//! ledcalc --cell-voltage 4.2 --cell-resistance 0.05 --emitter-count 3
//! ```
//!
//! ### Library
//!
//! ```
//! use ledcalc_core::{Calculation, EmitterRegistry};
//!
//! let registry = EmitterRegistry::builtin()?;
//! let report = Calculation::new().run(&registry)?;
//! println!("{:.3} A", report.trace.final_result().current_draw);
//! # Ok::<(), ledcalc_core::LedCalcError>(())
//! ```
//!
//! ### WASM
//!
//! ```javascript
//! import { WasmCalculator } from 'ledcalc_core';
//!
//! const calc = new WasmCalculator();
//! calc.set_cells(4.2, 0.05, 1, true);
//! const trace = calc.run();
//! ```

pub mod calculator;
pub mod circuit;
pub mod emitter;
pub mod error;
pub mod report;
pub mod solver;

// Re-export main types for convenience
pub use calculator::{Calculation, CalculationReport};
pub use circuit::{CircuitModel, Wiring};
pub use emitter::{EmitterDataTable, EmitterRegistry, EmitterSample};
pub use error::{LedCalcError, Result};
pub use solver::{CurrentSolver, SolveTrace, SolverConfig, TrialResult};

// WASM bindings
#[cfg(feature = "wasm")]
mod wasm;

#[cfg(feature = "wasm")]
pub use wasm::WasmCalculator;
