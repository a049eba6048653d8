/*!
 * MLFQ Simulator - Main Entry Point
 *
 * Usage: mlfq-sim [CONFIG.json] [--json]
 *
 * Loads the config (or defaults), applies MLFQ_* environment overrides,
 * reads traces from the configured directory and runs to completion.
 * Events are logged; with --json they are also written to stdout as JSON lines.
 */

use miette::{IntoDiagnostic, Result};
use std::io::Write;
use tracing::info;

use mlfq_sim::{
    init_tracing, run_simulation, EventSink, FileTraceSource, JsonLinesSink, LogSink,
    SimulationConfig,
};

fn main() -> Result<()> {
    init_tracing();

    let mut config_path = None;
    let mut json_events = false;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--json" => json_events = true,
            _ => config_path = Some(arg),
        }
    }

    let mut config = match &config_path {
        Some(path) => {
            info!(path = %path, "Loading config");
            SimulationConfig::from_file(path)?
        }
        None => SimulationConfig::default(),
    };
    config.apply_env_overrides()?;

    info!(
        levels = config.levels,
        boost_threshold = ?config.boost_threshold,
        trace_dir = %config.trace_dir.display(),
        processes = config.processes.len(),
        "Starting simulation"
    );

    let source = FileTraceSource::with_extension(&config.trace_dir, config.trace_extension.as_str());
    let stdout = std::io::stdout();

    let sink: Box<dyn EventSink> = if json_events {
        Box::new((LogSink, JsonLinesSink::new(stdout.lock())))
    } else {
        Box::new(LogSink)
    };

    let (report, _) = run_simulation(&config, &source, sink)?;

    for excluded in &report.excluded {
        tracing::warn!(
            name = %excluded.name,
            trace_index = excluded.trace_index,
            error = %excluded.error,
            "Process was not scheduled"
        );
    }

    let mut out = stdout.lock();
    serde_json::to_writer_pretty(&mut out, &report).into_diagnostic()?;
    writeln!(out).into_diagnostic()?;

    info!(
        quanta = report.stats.quanta_executed,
        boosts = report.stats.boosts,
        terminated = report.stats.terminated,
        anomalies = report.stats.anomalies,
        "Simulation complete"
    );
    Ok(())
}
