/*!
 * Scheduling Engine
 * Single-owner, strictly sequential MLFQ control loop
 *
 * One call to [`SchedulingEngine::step`] processes exactly one quantum:
 * dequeue, consume a trace symbol, requeue or drop, check boost, then emit
 * the quantum event followed by any boost event.
 * The engine owns the queues and every live record, so there is no other
 * mutation path into scheduling state.
 */

use super::boost::{BoostDecision, BoostPolicy};
use super::queues::LevelQueueSet;
use super::stats::SchedulerStats;
use super::transition::{Disposition, TransitionPolicy};
use crate::core::errors::{SchedulerError, SchedulerResult};
use crate::core::types::{level_label, Level, ProcessId, QuantumCount};
use crate::io::{EventSink, SchedEvent};
use crate::process::{ProcessRecord, Symbol};
use ahash::{AHashMap, AHashSet};
use tracing::{debug, info, warn};

/// Engine lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Queues may be non-empty
    Running,
    /// All queues drained; terminal
    Idle,
}

/// Result of one executed quantum
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuantumReport {
    pub pid: ProcessId,
    /// Level the process was dequeued from
    pub served_at: Level,
    /// `None` when the trace ran out before Terminate
    pub symbol: Option<Symbol>,
    pub disposition: Disposition,
    /// Ids relocated by a boost triggered by this quantum
    pub boosted: Option<Vec<ProcessId>>,
}

impl QuantumReport {
    #[inline]
    pub fn is_anomaly(&self) -> bool {
        self.symbol.is_none()
    }
}

/// Outcome of [`SchedulingEngine::step`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Executed(QuantumReport),
    Idle,
}

/// MLFQ simulation engine
pub struct SchedulingEngine<S: EventSink> {
    queues: LevelQueueSet,
    records: AHashMap<ProcessId, ProcessRecord>,
    terminated: AHashSet<ProcessId>,
    transition: TransitionPolicy,
    boost: BoostPolicy,
    sink: S,
    stats: SchedulerStats,
    state: EngineState,
}

impl<S: EventSink> SchedulingEngine<S> {
    fn new(
        queues: LevelQueueSet,
        transition: TransitionPolicy,
        boost: BoostPolicy,
        sink: S,
    ) -> Self {
        let stats = SchedulerStats::new(queues.levels());
        Self {
            queues,
            records: AHashMap::new(),
            terminated: AHashSet::new(),
            transition,
            boost,
            sink,
            stats,
            state: EngineState::Running,
        }
    }

    /// Admit a process at its record's level
    pub fn admit(&mut self, record: ProcessRecord) -> SchedulerResult<()> {
        if self.state == EngineState::Idle {
            return Err(SchedulerError::Finished);
        }

        let pid = record.id();
        if self.records.contains_key(&pid) || self.terminated.contains(&pid) {
            return Err(SchedulerError::DuplicateProcess(pid));
        }

        let level = record.level();
        self.queues.enqueue(level, pid)?;

        info!(
            pid,
            name = %record.name(),
            level,
            trace_len = record.trace().remaining(),
            "Process admitted"
        );
        self.records.insert(pid, record);
        self.stats.admitted += 1;
        self.stats.resident = self.records.len();
        Ok(())
    }

    /// Execute one quantum
    ///
    /// An `Err` is always fatal (invalid level, sink failure). Sink failures are
    /// raised only after the quantum's queue, boost and stats updates are done,
    /// so scheduling state is consistent at every return.
    pub fn step(&mut self) -> SchedulerResult<StepOutcome> {
        if self.state == EngineState::Idle {
            return Ok(StepOutcome::Idle);
        }

        let Some((served_at, pid)) = self.queues.dequeue_highest_non_empty() else {
            self.state = EngineState::Idle;
            self.sink.flush()?;
            info!(
                quanta = self.stats.quanta_executed,
                terminated = self.stats.terminated,
                "All queues empty, engine idle"
            );
            return Ok(StepOutcome::Idle);
        };

        let record = self
            .records
            .get_mut(&pid)
            .ok_or(SchedulerError::UnknownProcess(pid))?;

        let (symbol, disposition) = match record.consume_next() {
            Ok(symbol) => (Some(symbol), self.transition.decide(served_at, symbol)),
            Err(_) => (None, Disposition::Terminate),
        };

        let event = match (symbol, disposition) {
            (Some(symbol), Disposition::Requeue(level)) => {
                self.queues.enqueue(level, pid)?;
                record.set_level(level);

                debug!(
                    pid,
                    name = %record.name(),
                    symbol = %symbol,
                    from = served_at,
                    to = level,
                    "Quantum executed"
                );
                SchedEvent::Quantum {
                    pid,
                    name: record.name().clone(),
                    symbol,
                    level: served_at,
                }
            }
            _ => self.terminate(pid, served_at, symbol.is_none())?,
        };

        self.stats.record_quantum(served_at);
        let boosted = match self.boost.on_quantum_executed() {
            BoostDecision::Idle => None,
            BoostDecision::Boost { target } => Some((target, self.apply_boost(target)?)),
        };

        // All state for this quantum is settled; a sink failure below leaves it consistent
        self.sink.emit(&event)?;
        if let Some((target, relocated)) = &boosted {
            self.sink.emit(&SchedEvent::Boost {
                target: *target,
                relocated: relocated.clone(),
            })?;
        }
        let boosted = boosted.map(|(_, relocated)| relocated);

        Ok(StepOutcome::Executed(QuantumReport {
            pid,
            served_at,
            symbol,
            disposition,
            boosted,
        }))
    }

    fn terminate(
        &mut self,
        pid: ProcessId,
        served_at: Level,
        anomaly: bool,
    ) -> SchedulerResult<SchedEvent> {
        let record = self
            .records
            .remove(&pid)
            .ok_or(SchedulerError::UnknownProcess(pid))?;
        self.terminated.insert(pid);

        self.stats.terminated += 1;
        self.stats.resident = self.records.len();

        if anomaly {
            self.stats.anomalies += 1;
            warn!(
                pid,
                name = %record.name(),
                level = served_at,
                "Trace exhausted without terminate symbol, forcing termination"
            );
        } else {
            info!(pid, name = %record.name(), level = served_at, "Process terminated");
        }

        Ok(SchedEvent::Terminated {
            pid,
            name: record.name().clone(),
            level: served_at,
            anomaly,
        })
    }

    fn apply_boost(&mut self, target: Level) -> SchedulerResult<Vec<ProcessId>> {
        let relocated = self.queues.relocate_all(target)?;

        for pid in &relocated {
            self.records
                .get_mut(pid)
                .ok_or(SchedulerError::UnknownProcess(*pid))?
                .set_level(target);
        }

        self.stats.boosts += 1;
        info!(
            to = %level_label(target),
            count = relocated.len(),
            "Boost: all queued processes relocated"
        );
        Ok(relocated)
    }

    /// Step until idle
    pub fn run(&mut self) -> SchedulerResult<SchedulerStats> {
        while let StepOutcome::Executed(_) = self.step()? {}
        Ok(self.stats())
    }

    /// Execute at most `max_steps` quanta; returns how many ran
    pub fn run_for(&mut self, max_steps: usize) -> SchedulerResult<usize> {
        let mut executed = 0;
        while executed < max_steps {
            match self.step()? {
                StepOutcome::Executed(_) => executed += 1,
                StepOutcome::Idle => break,
            }
        }
        Ok(executed)
    }

    #[inline]
    pub fn state(&self) -> EngineState {
        self.state
    }

    #[inline]
    pub fn levels(&self) -> Level {
        self.queues.levels()
    }

    /// Read-only view of the live queues
    #[inline]
    pub fn queues(&self) -> &LevelQueueSet {
        &self.queues
    }

    pub fn record(&self, pid: ProcessId) -> Option<&ProcessRecord> {
        self.records.get(&pid)
    }

    /// Current level of a live process
    pub fn level_of(&self, pid: ProcessId) -> Option<Level> {
        self.records.get(&pid).map(ProcessRecord::level)
    }

    pub fn is_terminated(&self, pid: ProcessId) -> bool {
        self.terminated.contains(&pid)
    }

    /// Number of live processes
    pub fn resident(&self) -> usize {
        self.records.len()
    }

    /// Quanta executed since the last boost
    pub fn quanta_since_boost(&self) -> QuantumCount {
        self.boost.elapsed()
    }

    pub fn transition_policy(&self) -> &TransitionPolicy {
        &self.transition
    }

    pub fn stats(&self) -> SchedulerStats {
        self.stats.clone()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Verify that every live process is queued exactly once, at its own level,
    /// and that no terminated process is queued
    pub fn check_conservation(&self) -> SchedulerResult<()> {
        let violation = |msg: String| Err(SchedulerError::InvariantViolation(msg));

        if self.queues.len() != self.records.len() {
            return violation(format!(
                "{} queued entries for {} live processes",
                self.queues.len(),
                self.records.len()
            ));
        }

        for (pid, record) in &self.records {
            let count = self.queues.occurrences(*pid);
            if count != 1 {
                return violation(format!("process {} queued {} times", pid, count));
            }
            if self.queues.position(*pid) != Some(record.level()) {
                return violation(format!(
                    "process {} recorded at {} but queued at {:?}",
                    pid,
                    record.level(),
                    self.queues.position(*pid)
                ));
            }
        }

        if let Some(pid) = self.terminated.iter().find(|pid| self.queues.contains(**pid)) {
            return violation(format!("terminated process {} still queued", pid));
        }

        Ok(())
    }
}

/// Builder for [`SchedulingEngine`]
#[derive(Debug, Clone)]
pub struct EngineBuilder {
    levels: Level,
    boost_threshold: Option<QuantumCount>,
    overrides: Vec<(Level, bool)>,
}

impl EngineBuilder {
    pub const DEFAULT_LEVELS: Level = 8;

    pub fn new() -> Self {
        Self {
            levels: Self::DEFAULT_LEVELS,
            boost_threshold: Some(BoostPolicy::DEFAULT_THRESHOLD),
            overrides: Vec::new(),
        }
    }

    /// Number of priority levels
    pub fn with_levels(mut self, levels: Level) -> Self {
        self.levels = levels;
        self
    }

    /// Quanta between boosts; `None` disables boosting
    pub fn with_boost_threshold(mut self, threshold: Option<QuantumCount>) -> Self {
        self.boost_threshold = threshold;
        self
    }

    /// Whether Continue demotes at `level` (default: true everywhere)
    pub fn with_demotes_on_continue(mut self, level: Level, demotes: bool) -> Self {
        self.overrides.push((level, demotes));
        self
    }

    pub fn build<S: EventSink>(self, sink: S) -> SchedulerResult<SchedulingEngine<S>> {
        let queues = LevelQueueSet::new(self.levels)?;

        let mut transition = TransitionPolicy::new(self.levels);
        for (level, demotes) in self.overrides {
            if !queues.is_valid_level(level) {
                return Err(SchedulerError::InvalidLevel {
                    level,
                    levels: self.levels,
                });
            }
            transition.set_demotes_on_continue(level, demotes);
        }

        let boost = BoostPolicy::new(self.boost_threshold, queues.top());

        info!(
            levels = self.levels,
            boost_threshold = ?self.boost_threshold,
            "Scheduling engine initialized"
        );
        Ok(SchedulingEngine::new(queues, transition, boost, sink))
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::{EventRecord, RecordingSink};
    use crate::process::Trace;
    use pretty_assertions::assert_eq;

    fn record(pid: ProcessId, name: &str, level: Level, trace: &str) -> ProcessRecord {
        ProcessRecord::new(pid, name, level, Trace::parse(pid as usize, trace).unwrap())
    }

    fn engine(levels: Level, threshold: Option<QuantumCount>) -> SchedulingEngine<RecordingSink> {
        EngineBuilder::new()
            .with_levels(levels)
            .with_boost_threshold(threshold)
            .build(RecordingSink::new())
            .unwrap()
    }

    #[test]
    fn test_end_to_end_scenario() {
        let mut engine = engine(4, None);
        engine.admit(record(1, "P", 4, "1 0 -")).unwrap();

        let stats = engine.run().unwrap();
        assert_eq!(engine.state(), EngineState::Idle);
        assert_eq!(
            engine.sink().records(),
            vec![
                EventRecord::new("1", "P", "Q4"),
                EventRecord::new("0", "P", "Q3"),
                EventRecord::new("E", "P", "QX"),
            ]
        );
        assert_eq!(stats.quanta_executed, 3);
        assert_eq!(stats.terminated, 1);
        assert!(engine.is_terminated(1));
    }

    #[test]
    fn test_step_reports_served_level() {
        let mut engine = engine(4, None);
        engine.admit(record(1, "P", 4, "1 -")).unwrap();

        let StepOutcome::Executed(report) = engine.step().unwrap() else {
            panic!("expected a quantum");
        };
        assert_eq!(report.served_at, 4);
        assert_eq!(report.symbol, Some(Symbol::Continue));
        assert_eq!(report.disposition, Disposition::Requeue(3));
        assert_eq!(engine.level_of(1), Some(3));
        engine.check_conservation().unwrap();
    }

    #[test]
    fn test_exhausted_trace_is_forced_termination() {
        let mut engine = engine(4, None);
        engine.admit(record(1, "P", 2, "0")).unwrap();

        let StepOutcome::Executed(first) = engine.step().unwrap() else {
            panic!("expected a quantum");
        };
        assert!(!first.is_anomaly());
        assert_eq!(first.disposition, Disposition::Requeue(2));

        let StepOutcome::Executed(last) = engine.step().unwrap() else {
            panic!("expected a quantum");
        };
        assert!(last.is_anomaly());
        assert_eq!(last.symbol, None);
        assert_eq!(last.disposition, Disposition::Terminate);
        assert_eq!(engine.step().unwrap(), StepOutcome::Idle);

        let events = engine.sink().events();
        assert_eq!(events.len(), 2);
        assert_eq!(
            events[1],
            SchedEvent::Terminated {
                pid: 1,
                name: "P".into(),
                level: 2,
                anomaly: true,
            }
        );
        assert_eq!(engine.stats().anomalies, 1);
    }

    #[test]
    fn test_boost_after_threshold() {
        let mut engine = engine(4, Some(3));
        engine.admit(record(1, "A", 2, "1 1 1 1 -")).unwrap();
        engine.admit(record(2, "B", 1, "0 0 0 0 -")).unwrap();

        assert_eq!(engine.run_for(3).unwrap(), 3);
        assert_eq!(engine.level_of(1), Some(4));
        assert_eq!(engine.level_of(2), Some(4));
        assert_eq!(engine.quanta_since_boost(), 0);
        assert_eq!(engine.stats().boosts, 1);
        engine.check_conservation().unwrap();
    }

    #[test]
    fn test_admit_rejects_duplicates_and_bad_levels() {
        let mut engine = engine(4, None);
        engine.admit(record(1, "P", 4, "-")).unwrap();
        assert_eq!(
            engine.admit(record(1, "P2", 4, "-")),
            Err(SchedulerError::DuplicateProcess(1))
        );
        assert_eq!(
            engine.admit(record(2, "Q", 5, "-")),
            Err(SchedulerError::InvalidLevel { level: 5, levels: 4 })
        );
        assert_eq!(engine.resident(), 1);
    }

    #[test]
    fn test_idle_is_terminal() {
        let mut engine = engine(2, None);
        assert_eq!(engine.step().unwrap(), StepOutcome::Idle);
        assert_eq!(engine.state(), EngineState::Idle);
        assert_eq!(
            engine.admit(record(1, "P", 1, "-")),
            Err(SchedulerError::Finished)
        );
    }

    #[test]
    fn test_builder_rejects_out_of_range_override() {
        let result = EngineBuilder::new()
            .with_levels(4)
            .with_demotes_on_continue(5, false)
            .build(RecordingSink::new());
        assert!(matches!(
            result,
            Err(SchedulerError::InvalidLevel { level: 5, levels: 4 })
        ));
    }
}
