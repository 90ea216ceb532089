//! Steady-state current solver.
//!
//! The following equation describes the circuit:
//!
//! ```text
//! V_bat - I * R_internal = V_string(I)
//! ```
//!
//! where `V_string` is the forward voltage of the emitter group at total
//! current `I`. Since `V_string` only exists as a table of measurements,
//! the solver works on the residual
//!
//! ```text
//! e(I) = |V_bat - I * R_internal - V_string(I)|
//! ```
//!
//! in two stages: an evenly spaced scan that picks a starting pair, then
//! secant-style steps along the discrete gradient of `e`.
//!
//! The residual is unsigned, so `e` has a V-shaped, non-differentiable
//! minimum at the operating point. The refinement step is therefore a local
//! narrowing heuristic rather than a true secant method, and convergence is
//! not guaranteed for every input. Callers judge the result by the error of
//! the final trial.

use log::{debug, info, trace, warn};

use crate::circuit::{require_count, require_non_negative, require_positive, validate_circuit, CircuitModel};
use crate::emitter::EmitterDataTable;
use crate::error::{LedCalcError, Result};

use super::{
    OperatingPoint, SeedPair, SolveOutcome, SolveTrace, SolverConfig, TrialResult,
    DEFAULT_MAX_ITERATIONS,
};

/// Finds the current a battery pushes through a group of emitters.
#[derive(Debug, Clone, Copy)]
pub struct CurrentSolver<'a> {
    circuit: CircuitModel,
    table: &'a EmitterDataTable,
}

impl<'a> CurrentSolver<'a> {
    /// Create a solver for `circuit` using the emitter characteristic `table`.
    pub fn new(circuit: CircuitModel, table: &'a EmitterDataTable) -> Result<Self> {
        validate_circuit(&circuit)?;
        Ok(Self { circuit, table })
    }

    pub fn circuit(&self) -> &CircuitModel {
        &self.circuit
    }

    pub fn table(&self) -> &'a EmitterDataTable {
        self.table
    }

    /// Evaluate the circuit residual at a total battery current (A).
    pub fn evaluate(&self, total_current: f64) -> TrialResult {
        let battery_voltage = self.circuit.battery().terminal_voltage(total_current);

        let per_emitter = self.circuit.current_per_emitter(total_current);
        let lookup = self.table.forward_voltage_at(per_emitter);
        let string_voltage = self.circuit.string_voltage(lookup.value);

        TrialResult {
            current_draw: total_current,
            voltage_error: (battery_voltage - string_voltage).abs(),
            was_extrapolated: lookup.was_extrapolated,
        }
    }

    /// Sample the residual at evenly spaced currents to find a starting pair.
    ///
    /// The range `[min_current, max_current]` is split into `sample_count`
    /// steps and both endpoints are evaluated. The returned pair holds the
    /// lowest-error trial and whatever was best just before it took over.
    /// If the first trial is never beaten there is no such predecessor, and
    /// the second trial is paired with it instead.
    ///
    /// # Errors
    ///
    /// Returns [`LedCalcError::EmptyRange`] if the range is not finite, has
    /// zero width, is inverted, or `sample_count` is zero.
    pub fn scan(&self, min_current: f64, max_current: f64, sample_count: usize) -> Result<SeedPair> {
        if !(min_current.is_finite() && max_current.is_finite())
            || max_current <= min_current
            || sample_count < 1
        {
            return Err(LedCalcError::empty_range(min_current, max_current, sample_count));
        }

        let step = (max_current - min_current) / sample_count as f64;
        let mut best: Option<TrialResult> = None;
        let mut previous_best: Option<TrialResult> = None;
        let mut second_trial: Option<TrialResult> = None;

        for i in 0..=sample_count {
            // Pin the last sample to the range end so rounding never skips it
            let current = if i == sample_count {
                max_current
            } else {
                min_current + step * i as f64
            };
            let result = self.evaluate(current);

            if i == 1 {
                second_trial = Some(result);
            }
            if best.map_or(true, |b| result.voltage_error < b.voltage_error) {
                previous_best = best;
                best = Some(result);
            }
        }

        let (Some(best), Some(previous_best)) = (best, previous_best.or(second_trial)) else {
            return Err(LedCalcError::empty_range(min_current, max_current, sample_count));
        };

        debug!(
            "Scan of [{min_current}, {max_current}] A in {sample_count} steps: best {:.5} A ({:.5} V), previous {:.5} A ({:.5} V)",
            best.current_draw, best.voltage_error, previous_best.current_draw, previous_best.voltage_error
        );

        Ok(SeedPair {
            best,
            previous_best,
        })
    }

    /// Iterate from a seed pair towards the operating point.
    ///
    /// Each iteration takes the two latest trials `a` and `b`, forms the
    /// discrete gradient `g = (e_b - e_a) / (I_b - I_a)` and evaluates
    /// `I_b - g * step_rate`. The trace starts as `[best, previous_best]`.
    ///
    /// The threshold is only checked against trials appended here, so at
    /// least one iteration always runs even if a seed already meets it.
    /// Refinement stops early with [`SolveOutcome::Stalled`] when the two
    /// latest currents coincide or the next current is not finite.
    ///
    /// # Errors
    ///
    /// Returns [`LedCalcError::InvalidParameter`] if `step_rate` is not
    /// positive, `max_iterations` is zero, or `error_threshold` is negative.
    pub fn refine(
        &self,
        seed: SeedPair,
        step_rate: f64,
        max_iterations: usize,
        error_threshold: f64,
    ) -> Result<SolveTrace> {
        require_positive("step_rate", step_rate)?;
        require_count("max_iterations", max_iterations)?;
        require_non_negative("error_threshold", error_threshold)?;

        // Typical solves stop far short of the cap
        let mut history = Vec::with_capacity(max_iterations.min(DEFAULT_MAX_ITERATIONS) + 2);
        history.push(seed.best);
        history.push(seed.previous_best);
        let mut outcome = SolveOutcome::Exhausted;

        for iteration in 1..=max_iterations {
            let a = history[history.len() - 2];
            let b = history[history.len() - 1];

            let d_current = b.current_draw - a.current_draw;
            if d_current == 0.0 {
                outcome = SolveOutcome::Stalled;
                break;
            }

            let gradient = (b.voltage_error - a.voltage_error) / d_current;
            let next_current = b.current_draw - gradient * step_rate;
            if !next_current.is_finite() {
                outcome = SolveOutcome::Stalled;
                break;
            }

            let result = self.evaluate(next_current);
            trace!(
                "Iteration {iteration}: gradient {gradient:.5} V/A, {:.5} A -> {:.5} V",
                result.current_draw,
                result.voltage_error
            );
            history.push(result);

            if result.voltage_error <= error_threshold {
                outcome = SolveOutcome::Converged;
                break;
            }
        }

        let solve = SolveTrace::new(history, outcome);
        let last = solve.final_result();
        match outcome {
            SolveOutcome::Converged => info!(
                "Converged after {} iterations: {:.5} A ({:.5} V error)",
                solve.iterations(),
                last.current_draw,
                last.voltage_error
            ),
            SolveOutcome::Exhausted | SolveOutcome::Stalled => warn!(
                "Refinement {} after {} iterations: {:.5} A ({:.5} V error, threshold {error_threshold} V)",
                outcome,
                solve.iterations(),
                last.current_draw,
                last.voltage_error
            ),
        }
        if last.was_extrapolated {
            warn!(
                "Final current {:.5} A lies outside the measured emitter data",
                last.current_draw
            );
        }

        Ok(solve)
    }

    /// Scan then refine using the settings in `config`.
    pub fn solve(&self, config: &SolverConfig) -> Result<SolveTrace> {
        config.validate()?;
        debug!(
            "Solving {} {} emitter(s) on {:.3} V / {:.4} ohm",
            self.circuit.emitter_count,
            self.circuit.emitter_wiring,
            self.circuit.open_circuit_voltage,
            self.circuit.internal_resistance
        );

        let seed = self.scan(config.search_min, config.search_max, config.initial_samples)?;
        self.refine(
            seed,
            config.step_rate,
            config.max_iterations,
            config.error_threshold,
        )
    }

    /// Describe the circuit at the current of `result`.
    pub fn operating_point(&self, result: &TrialResult) -> OperatingPoint {
        let total_current = result.current_draw;
        let per_emitter = self.circuit.current_per_emitter(total_current);
        let voltage = self.table.forward_voltage_at(per_emitter);
        let output = self.table.luminous_output_at(per_emitter);

        OperatingPoint {
            total_current,
            current_per_emitter: per_emitter,
            battery_voltage: self.circuit.battery().terminal_voltage(total_current),
            string_voltage: self.circuit.string_voltage(voltage.value),
            luminous_output: output.value * self.circuit.emitter_count as f64,
            was_extrapolated: voltage.was_extrapolated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::{assert_abs_diff_eq, assert_relative_eq};

    use crate::circuit::{Battery, Wiring};
    use crate::emitter::{EmitterRegistry, EmitterSample, DEFAULT_EMITTER};

    /// V = 2.9 + 0.1 * I everywhere, since both boundary slopes match.
    fn linear_table() -> EmitterDataTable {
        EmitterDataTable::new([
            EmitterSample::new(3.00, 1.00, 400.0),
            EmitterSample::new(3.30, 4.00, 1000.0),
        ])
        .unwrap()
    }

    fn nichia() -> EmitterDataTable {
        EmitterRegistry::builtin()
            .unwrap()
            .get(DEFAULT_EMITTER)
            .unwrap()
            .clone()
    }

    fn circuit(count: usize, wiring: Wiring) -> CircuitModel {
        CircuitModel::new(Battery::new(4.2, 0.05), count, wiring).unwrap()
    }

    fn trial(current_draw: f64, voltage_error: f64) -> TrialResult {
        TrialResult {
            current_draw,
            voltage_error,
            was_extrapolated: false,
        }
    }

    #[test]
    fn test_evaluate_nichia_three_parallel() {
        let table = nichia();
        let solver = CurrentSolver::new(circuit(3, Wiring::Parallel), &table).unwrap();

        // 1.0 A per emitter reads 3.00 V, battery sags to 4.2 - 3.0 * 0.05
        let result = solver.evaluate(3.0);
        assert_relative_eq!(result.current_draw, 3.0);
        assert_abs_diff_eq!(result.voltage_error, 4.05 - 3.00, epsilon = 1e-9);
        assert!(!result.was_extrapolated);
    }

    #[test]
    fn test_evaluate_matches_manual_lookup() {
        let table = nichia();
        let total = 6.0;
        for count in 1..=4 {
            let solver = CurrentSolver::new(circuit(count, Wiring::Parallel), &table).unwrap();
            let lookup = table.forward_voltage_at(total / count as f64);
            let expected = (4.2 - total * 0.05 - lookup.value).abs();

            let result = solver.evaluate(total);
            assert_abs_diff_eq!(result.voltage_error, expected, epsilon = 1e-12);
            assert_eq!(result.was_extrapolated, lookup.was_extrapolated);
        }
    }

    #[test]
    fn test_evaluate_series_multiplies_voltage() {
        let table = linear_table();
        let circuit = CircuitModel::new(Battery::new(12.0, 0.1), 3, Wiring::Series).unwrap();
        let solver = CurrentSolver::new(circuit, &table).unwrap();

        // Each emitter carries the full 2.0 A and drops 3.1 V
        let result = solver.evaluate(2.0);
        assert_abs_diff_eq!(result.voltage_error, (11.8_f64 - 9.3).abs(), epsilon = 1e-9);
        assert!(!result.was_extrapolated);
    }

    #[test]
    fn test_evaluate_is_pure() {
        let table = nichia();
        let solver = CurrentSolver::new(circuit(3, Wiring::Parallel), &table).unwrap();
        let first = solver.evaluate(12.345);
        let second = solver.evaluate(12.345);
        assert_eq!(first.current_draw.to_bits(), second.current_draw.to_bits());
        assert_eq!(first.voltage_error.to_bits(), second.voltage_error.to_bits());
        assert_eq!(first.was_extrapolated, second.was_extrapolated);
    }

    #[test]
    fn test_scan_tracks_previous_best() {
        let table = linear_table();
        let solver = CurrentSolver::new(circuit(1, Wiring::Parallel), &table).unwrap();

        // Errors at 0, 2, 4, 6, 8, 10 A: 1.3, 1.0, 0.7, 0.4, 0.1, 0.2
        let seed = solver.scan(0.0, 10.0, 5).unwrap();
        assert_relative_eq!(seed.best.current_draw, 8.0, epsilon = 1e-12);
        assert_abs_diff_eq!(seed.best.voltage_error, 0.1, epsilon = 1e-9);
        // The true runner-up is 10 A, but 6 A was best before 8 A took over
        assert_relative_eq!(seed.previous_best.current_draw, 6.0, epsilon = 1e-12);
        assert_abs_diff_eq!(seed.previous_best.voltage_error, 0.4, epsilon = 1e-9);
    }

    #[test]
    fn test_scan_first_sample_best_pairs_with_second() {
        let table = linear_table();
        let solver = CurrentSolver::new(circuit(1, Wiring::Parallel), &table).unwrap();

        // Entirely above the 8.67 A root, so the error only grows
        let seed = solver.scan(9.0, 10.0, 2).unwrap();
        assert_relative_eq!(seed.best.current_draw, 9.0);
        assert_relative_eq!(seed.previous_best.current_draw, 9.5);
        assert!(seed.best.voltage_error <= seed.previous_best.voltage_error);
    }

    #[test]
    fn test_scan_best_not_worse_than_previous() {
        let table = nichia();
        let solver = CurrentSolver::new(circuit(3, Wiring::Parallel), &table).unwrap();
        for samples in [1, 2, 7, 60, 250] {
            let seed = solver.scan(0.01, 30.0, samples).unwrap();
            assert!(seed.best.voltage_error <= seed.previous_best.voltage_error);
            assert_ne!(seed.best.current_draw, seed.previous_best.current_draw);
        }
    }

    #[test]
    fn test_scan_rejects_empty_range() {
        let table = linear_table();
        let solver = CurrentSolver::new(circuit(1, Wiring::Parallel), &table).unwrap();

        for (min, max, samples) in [(5.0, 1.0, 10), (2.0, 2.0, 10), (0.0, 10.0, 0), (0.0, f64::NAN, 10)] {
            assert!(
                matches!(solver.scan(min, max, samples), Err(LedCalcError::EmptyRange { .. })),
                "[{min}, {max}] x {samples}"
            );
        }
    }

    #[test]
    fn test_refine_iterates_before_checking_threshold() {
        let table = linear_table();
        let solver = CurrentSolver::new(circuit(1, Wiring::Parallel), &table).unwrap();

        // Both seeds already satisfy the threshold
        let seed = SeedPair {
            best: trial(8.6, 0.01),
            previous_best: trial(8.7, 0.005),
        };
        let solve = solver.refine(seed, 0.1, 10, 1.0).unwrap();
        assert_eq!(solve.len(), 3);
        assert_eq!(solve.iterations(), 1);
        assert_eq!(solve.outcome(), SolveOutcome::Converged);
    }

    #[test]
    fn test_refine_step_follows_gradient() {
        let table = linear_table();
        let solver = CurrentSolver::new(circuit(1, Wiring::Parallel), &table).unwrap();

        let seed = SeedPair {
            best: trial(2.0, 1.0),
            previous_best: trial(4.0, 0.5),
        };
        let solve = solver.refine(seed, 2.0, 1, 0.0).unwrap();
        assert_eq!(solve.outcome(), SolveOutcome::Exhausted);
        assert_eq!(solve.entries()[0], seed.best);
        assert_eq!(solve.entries()[1], seed.previous_best);
        // g = (0.5 - 1.0) / (4.0 - 2.0) = -0.25, so 4.0 + 0.25 * 2.0
        assert_relative_eq!(solve.final_result().current_draw, 4.5, epsilon = 1e-12);
    }

    #[test]
    fn test_refine_length_bounds() {
        let table = nichia();
        let solver = CurrentSolver::new(circuit(3, Wiring::Parallel), &table).unwrap();
        let seed = solver.scan(0.01, 30.0, 60).unwrap();

        for max_iterations in [1, 2, 5, 20, 200] {
            let solve = solver.refine(seed, 0.1, max_iterations, 0.0005).unwrap();
            assert!(solve.len() >= 2);
            assert!(solve.len() <= 2 + max_iterations);
            if solve.outcome() == SolveOutcome::Exhausted {
                assert_eq!(solve.len(), 2 + max_iterations);
            }
        }
    }

    #[test]
    fn test_refine_stalls_on_coincident_seeds() {
        let table = linear_table();
        let solver = CurrentSolver::new(circuit(1, Wiring::Parallel), &table).unwrap();

        let seed = SeedPair {
            best: trial(5.0, 0.55),
            previous_best: trial(5.0, 0.55),
        };
        let solve = solver.refine(seed, 0.1, 10, 0.0005).unwrap();
        assert_eq!(solve.outcome(), SolveOutcome::Stalled);
        assert_eq!(solve.len(), 2);
    }

    #[test]
    fn test_refine_rejects_bad_parameters() {
        let table = linear_table();
        let solver = CurrentSolver::new(circuit(1, Wiring::Parallel), &table).unwrap();
        let seed = solver.scan(0.0, 10.0, 5).unwrap();

        assert!(solver.refine(seed, 0.0, 10, 0.001).is_err());
        assert!(solver.refine(seed, 0.1, 0, 0.001).is_err());
        assert!(solver.refine(seed, 0.1, 10, -0.001).is_err());
    }

    #[test]
    fn test_solve_nichia_defaults_converges() {
        let table = nichia();
        let solver = CurrentSolver::new(circuit(3, Wiring::Parallel), &table).unwrap();

        let solve = solver.solve(&SolverConfig::default()).unwrap();
        assert!(solve.is_converged());
        assert!(solve.len() <= 202);

        let last = solve.final_result();
        assert!(last.voltage_error <= 0.0005);
        assert_abs_diff_eq!(last.current_draw, 16.3, epsilon = 0.05);
        assert!(!last.was_extrapolated);
    }

    #[test]
    fn test_refine_huge_iteration_cap() {
        let table = nichia();
        let solver = CurrentSolver::new(circuit(3, Wiring::Parallel), &table).unwrap();
        let seed = solver.scan(0.01, 30.0, 60).unwrap();

        let solve = solver.refine(seed, 0.1, 1usize << 40, 0.0005).unwrap();
        assert_eq!(solve.outcome(), SolveOutcome::Converged);
        assert_eq!(solve.len(), 42);

        let solve = solver.refine(seed, 0.1, usize::MAX, 0.0005).unwrap();
        assert_eq!(solve.outcome(), SolveOutcome::Converged);
        assert_eq!(solve.len(), 42);
    }

    #[test]
    fn test_solve_nichia_defaults_trajectory() {
        let table = nichia();
        let solver = CurrentSolver::new(circuit(3, Wiring::Parallel), &table).unwrap();

        let solve = solver.solve(&SolverConfig::default()).unwrap();
        assert_eq!(solve.outcome(), SolveOutcome::Converged);
        assert_eq!(solve.len(), 42);
        assert_eq!(solve.iterations(), 40);

        let rounded: Vec<(String, String)> = solve
            .iter()
            .map(|r| (format!("{:.5}", r.current_draw), format!("{:.5}", r.voltage_error)))
            .collect();
        let pair = |current: &str, error: &str| (current.to_string(), error.to_string());
        assert_eq!(rounded[0], pair("16.50450", "0.01528"));
        assert_eq!(rounded[1], pair("16.00467", "0.02298"));
        assert_eq!(rounded[2].0, "16.00621");
        assert_eq!(rounded[41], pair("16.30521", "0.00007"));
    }

    #[test]
    fn test_solve_is_deterministic() {
        let table = nichia();
        let solver = CurrentSolver::new(circuit(3, Wiring::Parallel), &table).unwrap();
        let config = SolverConfig::default();
        assert_eq!(solver.solve(&config).unwrap(), solver.solve(&config).unwrap());
    }

    #[test]
    fn test_operating_point() {
        let table = linear_table();
        let solver = CurrentSolver::new(circuit(2, Wiring::Parallel), &table).unwrap();

        let point = solver.operating_point(&trial(5.0, 0.0));
        assert_relative_eq!(point.total_current, 5.0);
        assert_relative_eq!(point.current_per_emitter, 2.5);
        assert_relative_eq!(point.battery_voltage, 3.95, epsilon = 1e-12);
        assert_relative_eq!(point.string_voltage, 3.15, epsilon = 1e-12);
        assert_relative_eq!(point.luminous_output, 1400.0, epsilon = 1e-9);
        assert!(!point.was_extrapolated);
    }
}
