/*!
 * MLFQ Simulator Library
 * Deterministic multi-level feedback queue scheduling over recorded traces
 */

pub mod config;
pub mod core;
pub mod io;
pub mod monitoring;
pub mod process;
pub mod scheduler;
pub mod simulation;

// Re-exports
pub use config::{ProcessSpec, SimulationConfig};
pub use crate::core::errors::*;
pub use crate::core::types::{Level, ProcessId, ProcessName, QuantumCount};
pub use io::{
    EventRecord, EventSink, FileTraceSource, JsonLinesSink, LogSink, MemoryTraceSource,
    RecordingSink, SchedEvent, TraceSource,
};
pub use monitoring::init_tracing;
pub use process::{ProcessRecord, Symbol, Trace};
pub use scheduler::{
    Disposition, EngineBuilder, EngineState, LevelQueueSet, SchedulerStats, SchedulingEngine,
    SharedEngine, StepOutcome,
};
pub use simulation::{build_engine, run_simulation, SetupReport, SimulationReport};
