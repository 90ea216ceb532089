//! Trial evaluations and the history of a solve.

use std::fmt;

/// One evaluation of the circuit residual at a candidate total current.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrialResult {
    /// Total current drawn from the battery (A)
    pub current_draw: f64,
    /// |battery terminal voltage - emitter string voltage| (V)
    pub voltage_error: f64,
    /// Whether the emitter lookup fell outside the measured range
    pub was_extrapolated: bool,
}

impl TrialResult {
    /// How the emitter voltage for this trial was derived.
    pub fn derivation(&self) -> &'static str {
        if self.was_extrapolated {
            "Extrapolated"
        } else {
            "Interpolated"
        }
    }
}

/// Starting pair produced by the initial scan.
///
/// `previous_best` is whatever `best` held just before its final
/// improvement, not the second-lowest error of the scan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeedPair {
    pub best: TrialResult,
    pub previous_best: TrialResult,
}

/// How refinement ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveOutcome {
    /// An appended trial met the error threshold
    Converged,
    /// The iteration cap was reached first
    Exhausted,
    /// The last two trials share a current, so no step could be taken
    Stalled,
}

impl fmt::Display for SolveOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveOutcome::Converged => write!(f, "converged"),
            SolveOutcome::Exhausted => write!(f, "iteration limit reached"),
            SolveOutcome::Stalled => write!(f, "stalled"),
        }
    }
}

/// Every trial of a solve in the order it was evaluated, seeds first.
#[derive(Debug, Clone, PartialEq)]
pub struct SolveTrace {
    entries: Vec<TrialResult>,
    outcome: SolveOutcome,
}

impl SolveTrace {
    pub(crate) fn new(entries: Vec<TrialResult>, outcome: SolveOutcome) -> Self {
        debug_assert!(entries.len() >= 2, "trace always holds the seed pair");
        Self { entries, outcome }
    }

    pub fn entries(&self) -> &[TrialResult] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<TrialResult> {
        self.entries
    }

    pub fn outcome(&self) -> SolveOutcome {
        self.outcome
    }

    pub fn is_converged(&self) -> bool {
        self.outcome == SolveOutcome::Converged
    }

    /// The most recent trial, which is the solver's answer.
    pub fn final_result(&self) -> &TrialResult {
        &self.entries[self.entries.len() - 1]
    }

    /// Number of refinement iterations performed after the seeds.
    pub fn iterations(&self) -> usize {
        self.entries.len() - 2
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// A trace holds at least the seed pair, so this is false.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TrialResult> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a SolveTrace {
    type Item = &'a TrialResult;
    type IntoIter = std::slice::Iter<'a, TrialResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Circuit state at a solved current.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OperatingPoint {
    /// Total current drawn from the battery (A)
    pub total_current: f64,
    /// Current through each emitter (A)
    pub current_per_emitter: f64,
    /// Battery terminal voltage at this current (V)
    pub battery_voltage: f64,
    /// Voltage across the emitter group as read from the table (V)
    pub string_voltage: f64,
    /// Estimated output of all emitters together (lm)
    pub luminous_output: f64,
    pub was_extrapolated: bool,
}
