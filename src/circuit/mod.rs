//! Battery and emitter wiring.
//!
//! This module describes the circuit the solver works on: a battery,
//! reduced to a single open-circuit voltage behind an internal resistance,
//! driving a group of identical emitters wired in parallel or in series.

mod types;
mod validate;

pub use types::*;
pub use validate::validate_circuit;

pub(crate) use validate::{require_count, require_non_negative, require_positive};
