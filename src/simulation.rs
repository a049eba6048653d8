/*!
 * Simulation Setup
 * Turns a config and a trace source into a ready engine
 */

use crate::config::{ProcessSpec, SimulationConfig};
use crate::core::errors::{SimulationResult, TraceError};
use crate::core::types::ProcessId;
use crate::io::{EventSink, TraceSource};
use crate::process::ProcessRecord;
use crate::scheduler::{SchedulerStats, SchedulingEngine};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// A configured process left out because its trace could not be loaded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExcludedProcess {
    pub name: String,
    pub trace_index: usize,
    pub error: TraceError,
}

/// Outcome of admitting the configured processes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetupReport {
    pub admitted: Vec<ProcessId>,
    pub excluded: Vec<ExcludedProcess>,
}

impl SetupReport {
    pub fn is_complete(&self) -> bool {
        self.excluded.is_empty()
    }
}

/// Summary of a finished run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationReport {
    pub stats: SchedulerStats,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub excluded: Vec<ExcludedProcess>,
}

/// Build an engine and admit every process whose trace loads
///
/// Process ids are assigned from 1 in config order. Trace failures exclude the
/// process and are collected in the report; config and level errors are fatal.
pub fn build_engine<S, T>(
    config: &SimulationConfig,
    source: &T,
    sink: S,
) -> SimulationResult<(SchedulingEngine<S>, SetupReport)>
where
    S: EventSink,
    T: TraceSource + ?Sized,
{
    config.validate()?;
    let mut engine = config.engine_builder().build(sink)?;
    let mut report = SetupReport::default();

    for (position, spec) in config.processes.iter().enumerate() {
        let pid = (position + 1) as ProcessId;
        match source.load_trace(spec.trace_index) {
            Ok(trace) => {
                let level = config.initial_level(spec);
                engine.admit(ProcessRecord::new(pid, spec.name.as_str(), level, trace))?;
                report.admitted.push(pid);
            }
            Err(error) => {
                warn!(
                    name = %spec.name,
                    trace_index = spec.trace_index,
                    error = %error,
                    "Process excluded from scheduling"
                );
                report.excluded.push(excluded(spec, error));
            }
        }
    }

    info!(
        admitted = report.admitted.len(),
        excluded = report.excluded.len(),
        "Simulation setup complete"
    );
    Ok((engine, report))
}

fn excluded(spec: &ProcessSpec, error: TraceError) -> ExcludedProcess {
    ExcludedProcess {
        name: spec.name.clone(),
        trace_index: spec.trace_index,
        error,
    }
}

/// Set up and run to completion, returning the report and the sink
pub fn run_simulation<S, T>(
    config: &SimulationConfig,
    source: &T,
    sink: S,
) -> SimulationResult<(SimulationReport, S)>
where
    S: EventSink,
    T: TraceSource + ?Sized,
{
    let (mut engine, setup) = build_engine(config, source, sink)?;
    let stats = engine.run()?;

    Ok((
        SimulationReport {
            stats,
            excluded: setup.excluded,
        },
        engine.into_sink(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::{ConfigError, SimulationError};
    use crate::io::{MemoryTraceSource, RecordingSink};
    use crate::process::Symbol;
    use pretty_assertions::assert_eq;

    fn config(processes: Vec<ProcessSpec>) -> SimulationConfig {
        SimulationConfig {
            levels: 4,
            boost_threshold: None,
            processes,
            ..SimulationConfig::default()
        }
    }

    #[test]
    fn test_missing_trace_is_reported() {
        let source = MemoryTraceSource::new().with_trace(0, vec![Symbol::Terminate]);
        let config = config(vec![ProcessSpec::new("P", 0), ProcessSpec::new("Q", 3)]);

        let (engine, report) = build_engine(&config, &source, RecordingSink::new()).unwrap();
        assert_eq!(report.admitted, vec![1]);
        assert_eq!(
            report.excluded,
            vec![ExcludedProcess {
                name: "Q".to_string(),
                trace_index: 3,
                error: TraceError::NotFound(3),
            }]
        );
        assert!(!report.is_complete());
        assert_eq!(engine.resident(), 1);
    }

    #[test]
    fn test_initial_levels() {
        let source = MemoryTraceSource::new()
            .with_trace(0, vec![Symbol::Terminate])
            .with_trace(1, vec![Symbol::Terminate]);
        let config = config(vec![
            ProcessSpec::new("P", 0),
            ProcessSpec::new("Q", 1).at_level(2),
        ]);

        let (engine, _) = build_engine(&config, &source, RecordingSink::new()).unwrap();
        assert_eq!(engine.level_of(1), Some(4));
        assert_eq!(engine.level_of(2), Some(2));
    }

    #[test]
    fn test_invalid_config_is_fatal() {
        let source = MemoryTraceSource::new();
        let config = config(vec![ProcessSpec::new("P", 0).at_level(9)]);

        let result = build_engine(&config, &source, RecordingSink::new());
        assert!(matches!(
            result,
            Err(SimulationError::Config(ConfigError::InvalidInitialLevel { .. }))
        ));
    }

    #[test]
    fn test_run_simulation() {
        let mut source = MemoryTraceSource::new();
        source.insert_text(0, "1 0 -").unwrap();
        let config = config(vec![ProcessSpec::new("P", 0), ProcessSpec::new("Q", 1)]);

        let (report, sink) = run_simulation(&config, &source, RecordingSink::new()).unwrap();
        assert_eq!(report.stats.quanta_executed, 3);
        assert_eq!(report.stats.terminated, 1);
        assert_eq!(report.excluded.len(), 1);
        assert_eq!(sink.records().len(), 3);
    }
}
