//! Ledcalc - LED Current Draw Calculator
//!
//! Estimates the current a battery pushes through directly driven LEDs.
//!
//! # Usage
//!
//! ```bash
//! ledcalc --cell-voltage 4.2 --cell-count 2 --cell-wiring parallel --emitter-count 3
//! ```

use clap::Parser;
use ledcalc_core::{
    circuit::{CellBank, Wiring},
    emitter::{EmitterRegistry, DEFAULT_EMITTER},
    error::Result,
    report, solver, Calculation, SolverConfig,
};
use log::LevelFilter;

/// Direct-drive LED current calculator
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Open-circuit voltage of one cell (V)
    #[arg(long, default_value_t = 4.2)]
    cell_voltage: f64,

    /// Internal resistance of one cell (ohms)
    #[arg(long, default_value_t = 0.05)]
    cell_resistance: f64,

    /// Number of cells
    #[arg(long, default_value_t = 1)]
    cell_count: usize,

    /// How the cells are connected
    #[arg(long, value_enum, default_value_t = Wiring::Parallel)]
    cell_wiring: Wiring,

    /// Emitter name, see --list-emitters
    #[arg(short, long, default_value = DEFAULT_EMITTER)]
    emitter: String,

    /// Number of emitters
    #[arg(short = 'n', long, default_value_t = 3)]
    emitter_count: usize,

    /// How the emitters are connected
    #[arg(long, value_enum, default_value_t = Wiring::Parallel)]
    emitter_wiring: Wiring,

    /// Lowest total current in the initial scan (A)
    #[arg(long, default_value_t = solver::DEFAULT_SEARCH_MIN)]
    search_min: f64,

    /// Highest total current in the initial scan (A)
    #[arg(long, default_value_t = solver::DEFAULT_SEARCH_MAX)]
    search_max: f64,

    /// Number of steps in the initial scan
    #[arg(long, default_value_t = solver::DEFAULT_INITIAL_SAMPLES)]
    initial_samples: usize,

    /// Refinement step rate
    #[arg(long, default_value_t = solver::DEFAULT_STEP_RATE)]
    step_rate: f64,

    /// Maximum refinement iterations
    #[arg(long, default_value_t = solver::DEFAULT_MAX_ITERATIONS)]
    iterations: usize,

    /// Stop refining once the voltage error is at or below this (V)
    #[arg(long, default_value_t = solver::DEFAULT_ERROR_THRESHOLD)]
    threshold: f64,

    /// Print the known emitters and exit
    #[arg(long)]
    list_emitters: bool,

    /// Only print the summary, not every iteration
    #[arg(short, long)]
    quiet: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = match args.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let registry = EmitterRegistry::builtin()?;

    if args.list_emitters {
        for name in registry.names() {
            println!("{name}");
        }
        return Ok(());
    }

    let calculation = Calculation::new()
        .with_cells(CellBank::new(
            args.cell_voltage,
            args.cell_resistance,
            args.cell_count,
            args.cell_wiring,
        ))
        .with_emitters(args.emitter, args.emitter_count, args.emitter_wiring)
        .with_solver(
            SolverConfig::new()
                .with_search_range(args.search_min, args.search_max)
                .with_initial_samples(args.initial_samples)
                .with_step_rate(args.step_rate)
                .with_max_iterations(args.iterations)
                .with_error_threshold(args.threshold),
        );

    let outcome = calculation.run(&registry)?;

    if !args.quiet {
        print!("{}", report::TraceTable(&outcome.trace));
        println!();
    }
    print!("{}", report::Summary(&outcome));

    Ok(())
}
