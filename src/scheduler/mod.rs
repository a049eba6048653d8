/*!
 * Scheduler Module
 * Multi-level feedback queue: queues, policies, and the control loop
 */

pub mod boost;
pub mod engine;
pub mod queues;
pub mod shared;
pub mod stats;
pub mod transition;

// Re-export public API
pub use boost::{BoostDecision, BoostPolicy};
pub use engine::{EngineBuilder, EngineState, QuantumReport, SchedulingEngine, StepOutcome};
pub use queues::LevelQueueSet;
pub use shared::SharedEngine;
pub use stats::SchedulerStats;
pub use transition::{Disposition, TransitionPolicy};
