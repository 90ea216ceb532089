//! Emitter characteristics.
//!
//! An LED's forward voltage depends on the current through it, but the
//! relationship is only known from bench measurements. This module holds
//! those measurements and answers voltage and output lookups at arbitrary
//! currents:
//! - [`EmitterDataTable`] - one emitter's measured curve
//! - [`EmitterRegistry`] - named curves available to a calculation

mod registry;
mod table;

pub use registry::{EmitterRegistry, DEFAULT_EMITTER};
pub use table::{EmitterDataTable, EmitterSample, Estimate};
