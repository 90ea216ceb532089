//! Named emitter characteristics.
//!
//! The registry is plain data handed to whatever builds a calculation.
//! Nothing in the solver reaches for it directly, so tests can supply
//! synthetic tables instead of the measured ones.

use std::collections::BTreeMap;

use crate::error::{LedCalcError, Result};

use super::{EmitterDataTable, EmitterSample};

/// Name of the emitter used when none is specified.
pub const DEFAULT_EMITTER: &str = "Nichia 319A 6500K R7000 D440 (Texas_Ace)";

/// Nichia 319A measurements as (forward voltage V, current A, output lm).
const NICHIA_319A: [EmitterSample; 29] = [
    EmitterSample::new(2.75, 0.15, 91.0),
    EmitterSample::new(2.79, 0.25, 140.0),
    EmitterSample::new(2.89, 0.50, 249.0),
    EmitterSample::new(2.95, 0.75, 350.0),
    EmitterSample::new(3.00, 1.00, 445.0),
    EmitterSample::new(3.05, 1.25, 531.0),
    EmitterSample::new(3.09, 1.50, 616.0),
    EmitterSample::new(3.12, 1.75, 695.0),
    EmitterSample::new(3.15, 2.00, 772.0),
    EmitterSample::new(3.18, 2.25, 843.0),
    EmitterSample::new(3.20, 2.50, 911.0),
    EmitterSample::new(3.22, 2.75, 975.0),
    EmitterSample::new(3.25, 3.00, 1038.0),
    EmitterSample::new(3.26, 3.25, 1095.0),
    EmitterSample::new(3.28, 3.50, 1151.0),
    EmitterSample::new(3.30, 3.75, 1200.0),
    EmitterSample::new(3.32, 4.00, 1248.0),
    EmitterSample::new(3.32, 4.25, 1291.0),
    EmitterSample::new(3.34, 4.50, 1331.0),
    EmitterSample::new(3.35, 4.75, 1365.0),
    EmitterSample::new(3.36, 5.00, 1394.0),
    EmitterSample::new(3.37, 5.25, 1419.0),
    EmitterSample::new(3.39, 5.50, 1441.0),
    EmitterSample::new(3.40, 5.75, 1453.0),
    EmitterSample::new(3.40, 6.00, 1462.0),
    EmitterSample::new(3.42, 6.25, 1462.0),
    EmitterSample::new(3.43, 6.50, 1460.0),
    EmitterSample::new(3.43, 6.75, 1449.0),
    EmitterSample::new(3.44, 7.00, 1434.0),
];

/// Read-only mapping from emitter name to its measured characteristic.
#[derive(Debug, Clone, Default)]
pub struct EmitterRegistry {
    tables: BTreeMap<String, EmitterDataTable>,
}

impl EmitterRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the measured curves shipped with the crate.
    pub fn builtin() -> Result<Self> {
        let mut registry = Self::new();
        registry.insert(DEFAULT_EMITTER, EmitterDataTable::new(NICHIA_319A)?)?;
        Ok(registry)
    }

    /// Register a table under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`LedCalcError::DuplicateEmitter`] if the name is taken.
    pub fn insert(&mut self, name: impl Into<String>, table: EmitterDataTable) -> Result<()> {
        let name = name.into();
        if self.tables.contains_key(&name) {
            return Err(LedCalcError::DuplicateEmitter { name });
        }
        self.tables.insert(name, table);
        Ok(())
    }

    /// Look up a table by name.
    pub fn get(&self, name: &str) -> Result<&EmitterDataTable> {
        self.tables
            .get(name)
            .ok_or_else(|| LedCalcError::UnknownEmitter {
                name: name.to_string(),
            })
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
