//! End-to-end calculation from user-facing settings.
//!
//! A [`Calculation`] carries everything the calculator form asks for: the
//! cells, which emitter and how many, and how hard to search. Running it
//! against an [`EmitterRegistry`] reduces the cells to one battery, picks
//! the emitter curve by name and solves for the current.

use log::debug;

use crate::circuit::{CellBank, CircuitModel, Wiring};
use crate::emitter::{EmitterRegistry, DEFAULT_EMITTER};
use crate::error::Result;
use crate::solver::{CurrentSolver, OperatingPoint, SolveTrace, SolverConfig};

/// Settings for one calculation.
#[derive(Debug, Clone, PartialEq)]
pub struct Calculation {
    pub cells: CellBank,
    /// Registry name of the emitter
    pub emitter: String,
    pub emitter_count: usize,
    pub emitter_wiring: Wiring,
    pub solver: SolverConfig,
}

impl Default for Calculation {
    /// One 4.2 V cell driving three Nichia 319A emitters in parallel.
    fn default() -> Self {
        Self {
            cells: CellBank::default(),
            emitter: DEFAULT_EMITTER.to_string(),
            emitter_count: 3,
            emitter_wiring: Wiring::Parallel,
            solver: SolverConfig::default(),
        }
    }
}

impl Calculation {
    /// Create a calculation with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the battery cells.
    pub fn with_cells(mut self, cells: CellBank) -> Self {
        self.cells = cells;
        self
    }

    /// Set the emitter type, count and wiring.
    pub fn with_emitters(mut self, emitter: impl Into<String>, count: usize, wiring: Wiring) -> Self {
        self.emitter = emitter.into();
        self.emitter_count = count;
        self.emitter_wiring = wiring;
        self
    }

    /// Set the search and refinement settings.
    pub fn with_solver(mut self, solver: SolverConfig) -> Self {
        self.solver = solver;
        self
    }

    /// The circuit these settings describe.
    pub fn circuit(&self) -> Result<CircuitModel> {
        let battery = self.cells.reduce()?;
        CircuitModel::new(battery, self.emitter_count, self.emitter_wiring)
    }

    /// Solve for the current draw.
    ///
    /// # Errors
    ///
    /// Fails if the emitter is not in `registry` or any setting is invalid.
    /// A solve that does not reach the error threshold is not an error; see
    /// [`SolveTrace::outcome`].
    pub fn run(&self, registry: &EmitterRegistry) -> Result<CalculationReport> {
        let circuit = self.circuit()?;
        let table = registry.get(&self.emitter)?;
        debug!("Using emitter '{}' ({} samples)", self.emitter, table.samples().len());

        let solver = CurrentSolver::new(circuit, table)?;
        let trace = solver.solve(&self.solver)?;
        let operating_point = solver.operating_point(trace.final_result());

        Ok(CalculationReport {
            emitter: self.emitter.clone(),
            circuit,
            trace,
            operating_point,
        })
    }
}

/// Everything a calculation produced.
#[derive(Debug, Clone, PartialEq)]
pub struct CalculationReport {
    pub emitter: String,
    pub circuit: CircuitModel,
    pub trace: SolveTrace,
    /// Circuit state at the final trial
    pub operating_point: OperatingPoint,
}
