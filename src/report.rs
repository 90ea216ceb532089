//! Text rendering of solve results.
//!
//! The trace table lists every trial in evaluation order with its current,
//! voltage error and whether the emitter voltage was read inside the
//! measured data or extrapolated past it.

use std::fmt;

use crate::calculator::CalculationReport;
use crate::solver::{SolveTrace, TrialResult};

const HEADERS: [&str; 4] = [
    "Iteration Number",
    "Estimated Current Draw (A)",
    "Calculator Error (V)",
    "Derivation Method",
];

/// Format one trace row as (index, current, error, derivation).
pub fn format_row(index: usize, result: &TrialResult) -> [String; 4] {
    [
        index.to_string(),
        format!("{:.5}", result.current_draw),
        format!("{:.5}", result.voltage_error),
        result.derivation().to_string(),
    ]
}

/// Aligned text table of a solve trace, one row per trial.
#[derive(Debug, Clone, Copy)]
pub struct TraceTable<'a>(pub &'a SolveTrace);

impl fmt::Display for TraceTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows: Vec<[String; 4]> = self
            .0
            .iter()
            .enumerate()
            .map(|(index, result)| format_row(index, result))
            .collect();

        let mut widths = HEADERS.map(str::len);
        for row in &rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.len());
            }
        }

        write_line(f, &HEADERS.map(String::from), &widths)?;
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        writeln!(f, "{}", rule.join("  "))?;
        for row in &rows {
            write_line(f, row, &widths)?;
        }
        Ok(())
    }
}

fn write_line(f: &mut fmt::Formatter<'_>, cells: &[String; 4], widths: &[usize; 4]) -> fmt::Result {
    let line = format!(
        "{:>w0$}  {:>w1$}  {:>w2$}  {:<w3$}",
        cells[0],
        cells[1],
        cells[2],
        cells[3],
        w0 = widths[0],
        w1 = widths[1],
        w2 = widths[2],
        w3 = widths[3],
    );
    writeln!(f, "{}", line.trim_end())
}

/// Short description of a solved operating point.
#[derive(Debug, Clone, Copy)]
pub struct Summary<'a>(pub &'a CalculationReport);

impl fmt::Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.0;
        let circuit = &report.circuit;
        let point = &report.operating_point;
        let last = report.trace.final_result();

        writeln!(
            f,
            "Battery: {:.3} V, {:.4} ohm",
            circuit.open_circuit_voltage, circuit.internal_resistance
        )?;
        writeln!(
            f,
            "Emitters: {} x {} ({})",
            circuit.emitter_count, report.emitter, circuit.emitter_wiring
        )?;
        writeln!(
            f,
            "Result: {} after {} iterations, error {:.5} V",
            report.trace.outcome(),
            report.trace.iterations(),
            last.voltage_error
        )?;
        writeln!(
            f,
            "Current draw: {:.5} A total, {:.5} A per emitter",
            point.total_current, point.current_per_emitter
        )?;
        writeln!(
            f,
            "Voltage: {:.3} V at battery, {:.3} V across emitters",
            point.battery_voltage, point.string_voltage
        )?;
        writeln!(f, "Estimated output: {:.0} lm", point.luminous_output)?;
        if point.was_extrapolated {
            writeln!(f, "Warning: result lies outside the measured emitter data")?;
        }
        Ok(())
    }
}

/// Render the whole trace as an aligned text table.
pub fn render_trace(trace: &SolveTrace) -> String {
    TraceTable(trace).to_string()
}

/// Render a short description of the solved operating point.
pub fn render_summary(report: &CalculationReport) -> String {
    Summary(report).to_string()
}
