/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use super::types::{Level, ProcessId};
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Trace loading and consumption errors
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum TraceError {
    #[error("No trace data for process index {0}")]
    #[diagnostic(
        code(trace::not_found),
        help("Check the trace directory and the process's trace_index.")
    )]
    NotFound(usize),

    #[error("Trace {index} has invalid symbol '{token}' at position {position}")]
    #[diagnostic(
        code(trace::malformed),
        help("Valid symbols are '1' (continue), '0' (yield) and '-' (terminate).")
    )]
    Malformed {
        index: usize,
        position: usize,
        token: String,
    },

    #[error("Failed to read trace {index}: {message}")]
    #[diagnostic(code(trace::io))]
    Io { index: usize, message: String },

    #[error("Trace exhausted before a terminate symbol")]
    #[diagnostic(
        code(trace::exhausted),
        help("Every trace should end with '-'. The process was force-terminated.")
    )]
    Exhausted,
}

/// Scheduler-related errors
///
/// Every variant here is fatal: it signals a configuration or programming error.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum SchedulerError {
    #[error("Level {level} outside valid range 1..={levels}")]
    #[diagnostic(
        code(scheduler::invalid_level),
        help("Levels are numbered from 1 (lowest) to N (highest).")
    )]
    InvalidLevel { level: Level, levels: Level },

    #[error("Process {0} not found in scheduler")]
    #[diagnostic(code(scheduler::unknown_process))]
    UnknownProcess(ProcessId),

    #[error("Process {0} already admitted")]
    #[diagnostic(
        code(scheduler::duplicate_process),
        help("Process ids must be unique for the lifetime of a simulation.")
    )]
    DuplicateProcess(ProcessId),

    #[error("Event sink failed: {0}")]
    #[diagnostic(code(scheduler::sink))]
    Sink(String),

    #[error("Simulation already finished")]
    #[diagnostic(
        code(scheduler::finished),
        help("An idle engine is terminal. Build a new engine for another run.")
    )]
    Finished,

    #[error("Queue invariant violated: {0}")]
    #[diagnostic(code(scheduler::invariant_violation))]
    InvariantViolation(String),
}

/// Configuration errors, all fatal at setup
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    #[diagnostic(code(config::io))]
    Io(String),

    #[error("Failed to parse config: {0}")]
    #[diagnostic(code(config::parse), help("The config file must be valid JSON."))]
    Parse(String),

    #[error("Invalid number of levels: {0}")]
    #[diagnostic(code(config::invalid_levels), help("Use between 1 and 32 levels."))]
    InvalidLevels(u32),

    #[error("Process '{name}' has initial level {level} outside 1..={levels}")]
    #[diagnostic(code(config::invalid_initial_level))]
    InvalidInitialLevel {
        name: String,
        level: Level,
        levels: Level,
    },

    #[error("Expected {expected} demotes_on_continue flags, got {actual}")]
    #[diagnostic(
        code(config::invalid_flags),
        help("Provide one flag per level, or none to demote at every level.")
    )]
    InvalidFlags { expected: usize, actual: usize },

    #[error("Process at position {0} has an empty name")]
    #[diagnostic(code(config::empty_name))]
    EmptyName(usize),

    #[error("Invalid boost threshold: {0}")]
    #[diagnostic(
        code(config::invalid_threshold),
        help("Use a positive number of quanta, or 'never' to disable boosting.")
    )]
    InvalidThreshold(String),
}

/// Sink write errors
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[error("Failed to write event: {0}")]
#[diagnostic(code(sink::write))]
pub struct SinkError(pub String);

impl From<std::io::Error> for SinkError {
    fn from(err: std::io::Error) -> Self {
        SinkError(err.to_string())
    }
}

impl From<serde_json::Error> for SinkError {
    fn from(err: serde_json::Error) -> Self {
        SinkError(err.to_string())
    }
}

impl From<SinkError> for SchedulerError {
    fn from(err: SinkError) -> Self {
        SchedulerError::Sink(err.0)
    }
}

/// Unified simulation error type with miette diagnostics
#[derive(Error, Debug, Diagnostic)]
pub enum SimulationError {
    #[error("Configuration error: {0}")]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error("Scheduler error: {0}")]
    #[diagnostic(transparent)]
    Scheduler(#[from] SchedulerError),

    #[error("Trace error: {0}")]
    #[diagnostic(transparent)]
    Trace(#[from] TraceError),

    #[error("Output error: {0}")]
    #[diagnostic(transparent)]
    Sink(#[from] SinkError),
}

pub type TraceResult<T> = Result<T, TraceError>;
pub type SchedulerResult<T> = Result<T, SchedulerError>;
pub type ConfigResult<T> = Result<T, ConfigError>;
pub type SimulationResult<T> = Result<T, SimulationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let err = SchedulerError::InvalidLevel { level: 9, levels: 4 };
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("invalid_level"));

        let back: SchedulerError = serde_json::from_str(&json).unwrap();
        assert_eq!(back, err);
    }

    #[test]
    fn test_error_display() {
        let err = TraceError::NotFound(3);
        assert_eq!(err.to_string(), "No trace data for process index 3");

        let err = SchedulerError::InvalidLevel { level: 0, levels: 4 };
        assert_eq!(err.to_string(), "Level 0 outside valid range 1..=4");
    }

    #[test]
    fn test_sink_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let err: SchedulerError = SinkError::from(io).into();
        assert!(matches!(err, SchedulerError::Sink(msg) if msg.contains("pipe closed")));
    }

    #[test]
    fn test_simulation_error_from() {
        let err: SimulationError = ConfigError::InvalidLevels(0).into();
        assert!(matches!(err, SimulationError::Config(_)));
    }
}
