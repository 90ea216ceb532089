//! Operating point solver.
//!
//! This module provides the numerical engine of the calculator.
//!
//! ## Method
//!
//! A battery with open-circuit voltage `V` and internal resistance `R`
//! driving emitters directly settles at the total current `I` where
//!
//! ```text
//! V - I * R = V_string(I)
//! ```
//!
//! `V_string` comes from measured emitter data, so there is no closed form
//! to differentiate. The solve runs in two stages:
//!
//! 1. Scan: evaluate the residual at evenly spaced currents and keep the
//!    best trial together with the one it displaced
//! 2. Refine: step along the discrete gradient of the residual between the
//!    two latest trials until the error drops below a threshold or the
//!    iteration budget runs out
//!
//! Every trial is kept, in order, in a [`SolveTrace`] returned to the caller.

mod config;
mod current;
mod trace;

pub use config::SolverConfig;
pub use current::CurrentSolver;
pub use trace::{OperatingPoint, SeedPair, SolveOutcome, SolveTrace, TrialResult};

/// Default lower end of the scan range (A).
pub const DEFAULT_SEARCH_MIN: f64 = 0.01;

/// Default upper end of the scan range (A).
pub const DEFAULT_SEARCH_MAX: f64 = 30.0;

/// Default number of scan steps.
pub const DEFAULT_INITIAL_SAMPLES: usize = 60;

/// Default refinement step rate.
pub const DEFAULT_STEP_RATE: f64 = 0.1;

/// Default maximum refinement iterations.
pub const DEFAULT_MAX_ITERATIONS: usize = 200;

/// Default convergence threshold on the voltage error (V).
pub const DEFAULT_ERROR_THRESHOLD: f64 = 0.0005;
