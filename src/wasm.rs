//! WASM bindings for Ledcalc Core.
//!
//! This module provides JavaScript-friendly bindings so a web page can host
//! the calculator form and render the results table itself.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { WasmCalculator, emitter_names } from 'ledcalc_core';
//!
//! await init();
//!
//! const calc = new WasmCalculator();
//! calc.set_cells(4.2, 0.05, 2, false);
//! calc.set_emitters(emitter_names()[0], 3, true);
//! calc.set_search(0.01, 30, 60);
//! calc.set_refinement(0.1, 200, 0.0005);
//!
//! const trace = calc.run();
//! for (let i = 0; i < trace.length; i++) {
//!   console.log(i, trace.current(i), trace.error(i), trace.derivation(i));
//! }
//! ```

use wasm_bindgen::prelude::*;

use crate::calculator::{Calculation, CalculationReport};
use crate::circuit::{CellBank, Wiring};
use crate::emitter::EmitterRegistry;
use crate::error::LedCalcError;
use crate::report;

/// Initialize panic hook for better error messages in browser console.
#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

fn to_js(error: LedCalcError) -> JsValue {
    JsValue::from_str(&error.to_string())
}

fn wiring(parallel: bool) -> Wiring {
    if parallel {
        Wiring::Parallel
    } else {
        Wiring::Series
    }
}

/// WASM-compatible calculator holding the form state.
#[wasm_bindgen]
pub struct WasmCalculator {
    registry: EmitterRegistry,
    calculation: Calculation,
}

#[wasm_bindgen]
impl WasmCalculator {
    /// Create a calculator with the built-in emitters and default settings.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<WasmCalculator, JsValue> {
        let registry = EmitterRegistry::builtin().map_err(to_js)?;
        Ok(WasmCalculator {
            registry,
            calculation: Calculation::default(),
        })
    }

    /// Set the battery cells.
    ///
    /// # Arguments
    /// * `voltage` - Per-cell voltage (V)
    /// * `resistance` - Per-cell internal resistance (ohms)
    /// * `count` - Number of cells
    /// * `parallel` - `true` for parallel cells, `false` for series
    #[wasm_bindgen]
    pub fn set_cells(&mut self, voltage: f64, resistance: f64, count: usize, parallel: bool) {
        self.calculation.cells = CellBank::new(voltage, resistance, count, wiring(parallel));
    }

    /// Set the emitter type, count and wiring.
    #[wasm_bindgen]
    pub fn set_emitters(&mut self, name: &str, count: usize, parallel: bool) {
        self.calculation.emitter = name.to_string();
        self.calculation.emitter_count = count;
        self.calculation.emitter_wiring = wiring(parallel);
    }

    /// Set the initial scan range (A) and step count.
    #[wasm_bindgen]
    pub fn set_search(&mut self, min: f64, max: f64, samples: usize) {
        let solver = &mut self.calculation.solver;
        solver.search_min = min;
        solver.search_max = max;
        solver.initial_samples = samples;
    }

    /// Set the refinement step rate, iteration cap and error threshold (V).
    #[wasm_bindgen]
    pub fn set_refinement(&mut self, step_rate: f64, iterations: usize, threshold: f64) {
        let solver = &mut self.calculation.solver;
        solver.step_rate = step_rate;
        solver.max_iterations = iterations;
        solver.error_threshold = threshold;
    }

    /// Run the calculation.
    ///
    /// # Returns
    /// The solve trace, or an error message if a setting is invalid.
    #[wasm_bindgen]
    pub fn run(&self) -> Result<WasmTrace, JsValue> {
        let report = self.calculation.run(&self.registry).map_err(to_js)?;
        Ok(WasmTrace { report })
    }
}

/// Result of a calculation, indexed by iteration.
#[wasm_bindgen]
pub struct WasmTrace {
    report: CalculationReport,
}

#[wasm_bindgen]
impl WasmTrace {
    /// Number of trials, seeds included.
    #[wasm_bindgen(getter)]
    pub fn length(&self) -> usize {
        self.report.trace.len()
    }

    /// Total current of trial `index` (A), or `undefined` past the end.
    #[wasm_bindgen]
    pub fn current(&self, index: usize) -> Option<f64> {
        self.report.trace.entries().get(index).map(|r| r.current_draw)
    }

    /// Voltage error of trial `index` (V), or `undefined` past the end.
    #[wasm_bindgen]
    pub fn error(&self, index: usize) -> Option<f64> {
        self.report.trace.entries().get(index).map(|r| r.voltage_error)
    }

    /// "Interpolated" or "Extrapolated" for trial `index`.
    #[wasm_bindgen]
    pub fn derivation(&self, index: usize) -> Option<String> {
        self.report
            .trace
            .entries()
            .get(index)
            .map(|r| r.derivation().to_string())
    }

    /// Whether the error threshold was met.
    #[wasm_bindgen(getter)]
    pub fn converged(&self) -> bool {
        self.report.trace.is_converged()
    }

    /// Estimated total output at the final trial (lm).
    #[wasm_bindgen(getter)]
    pub fn luminous_output(&self) -> f64 {
        self.report.operating_point.luminous_output
    }

    /// The trace table as plain text.
    #[wasm_bindgen]
    pub fn render(&self) -> String {
        report::render_trace(&self.report.trace)
    }

    /// The operating point summary as plain text.
    #[wasm_bindgen]
    pub fn summary(&self) -> String {
        report::render_summary(&self.report)
    }
}

/// Names of the built-in emitters.
#[wasm_bindgen]
pub fn emitter_names() -> Vec<String> {
    EmitterRegistry::builtin()
        .map(|registry| registry.names().map(str::to_string).collect())
        .unwrap_or_default()
}

/// Get the library version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
