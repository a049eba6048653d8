/*!
 * Event Sinks
 * Structured scheduling events and their consumers
 */

use crate::core::errors::SinkError;
use crate::core::types::{
    level_label, Level, ProcessId, ProcessName, TERMINATED_LABEL, TERMINATED_SYMBOL,
};
use crate::process::Symbol;
use serde::{Deserialize, Serialize};
use std::io::Write;
use tracing::info;

/// One scheduling event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SchedEvent {
    /// A quantum that ended in Continue or Yield, attributed to the level it was served at
    Quantum {
        pid: ProcessId,
        name: ProcessName,
        symbol: Symbol,
        level: Level,
    },
    /// Permanent removal; `anomaly` marks a trace that ran out before Terminate
    Terminated {
        pid: ProcessId,
        name: ProcessName,
        level: Level,
        anomaly: bool,
    },
    /// Every queued process moved to `target`, in queue order
    Boost {
        target: Level,
        relocated: Vec<ProcessId>,
    },
}

/// Flat `(symbol, process name, level label)` view of a process event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub symbol: String,
    pub process_name: String,
    pub level_label: String,
}

impl EventRecord {
    pub fn new(symbol: &str, process_name: &str, level_label: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            process_name: process_name.to_string(),
            level_label: level_label.to_string(),
        }
    }
}

impl SchedEvent {
    /// Flat record for process events; `None` for boosts
    pub fn record(&self) -> Option<EventRecord> {
        match self {
            Self::Quantum {
                name,
                symbol,
                level,
                ..
            } => Some(EventRecord::new(
                symbol.as_str(),
                name.as_str(),
                &level_label(*level),
            )),
            Self::Terminated { name, .. } => Some(EventRecord::new(
                TERMINATED_SYMBOL,
                name.as_str(),
                TERMINATED_LABEL,
            )),
            Self::Boost { .. } => None,
        }
    }

    /// Process the event is about, if any
    pub fn pid(&self) -> Option<ProcessId> {
        match self {
            Self::Quantum { pid, .. } | Self::Terminated { pid, .. } => Some(*pid),
            Self::Boost { .. } => None,
        }
    }
}

/// Consumer of scheduling events
pub trait EventSink {
    fn emit(&mut self, event: &SchedEvent) -> Result<(), SinkError>;

    /// Flush buffered output; called once the engine goes idle
    fn flush(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn emit(&mut self, event: &SchedEvent) -> Result<(), SinkError> {
        (**self).emit(event)
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        (**self).flush()
    }
}

impl<S: EventSink + ?Sized> EventSink for Box<S> {
    fn emit(&mut self, event: &SchedEvent) -> Result<(), SinkError> {
        (**self).emit(event)
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        (**self).flush()
    }
}

/// Forward every event to both sinks
impl<A: EventSink, B: EventSink> EventSink for (A, B) {
    fn emit(&mut self, event: &SchedEvent) -> Result<(), SinkError> {
        self.0.emit(event)?;
        self.1.emit(event)
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        self.0.flush()?;
        self.1.flush()
    }
}

/// Keeps every event in memory
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    events: Vec<SchedEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[SchedEvent] {
        &self.events
    }

    /// Flat records of process events, boosts skipped
    pub fn records(&self) -> Vec<EventRecord> {
        self.events.iter().filter_map(SchedEvent::record).collect()
    }

    pub fn into_events(self) -> Vec<SchedEvent> {
        self.events
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &SchedEvent) -> Result<(), SinkError> {
        self.events.push(event.clone());
        Ok(())
    }
}

/// Reports events through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl EventSink for LogSink {
    fn emit(&mut self, event: &SchedEvent) -> Result<(), SinkError> {
        match event {
            SchedEvent::Boost { target, relocated } => {
                info!(
                    target_level = *target,
                    relocated = ?relocated,
                    "Boost: {} processes moved to {}",
                    relocated.len(),
                    level_label(*target)
                );
            }
            _ => {
                if let Some(record) = event.record() {
                    info!(
                        pid = event.pid(),
                        "{} {} {}",
                        record.symbol,
                        record.process_name,
                        record.level_label
                    );
                }
            }
        }
        Ok(())
    }
}

/// Writes one JSON object per event
#[derive(Debug)]
pub struct JsonLinesSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> EventSink for JsonLinesSink<W> {
    fn emit(&mut self, event: &SchedEvent) -> Result<(), SinkError> {
        serde_json::to_writer(&mut self.writer, event)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn quantum(symbol: Symbol, level: Level) -> SchedEvent {
        SchedEvent::Quantum {
            pid: 1,
            name: "P".into(),
            symbol,
            level,
        }
    }

    #[test]
    fn test_quantum_record() {
        let record = quantum(Symbol::Continue, 4).record().unwrap();
        assert_eq!(record, EventRecord::new("1", "P", "Q4"));
    }

    #[test]
    fn test_termination_record() {
        let event = SchedEvent::Terminated {
            pid: 1,
            name: "P".into(),
            level: 3,
            anomaly: false,
        };
        assert_eq!(event.record().unwrap(), EventRecord::new("E", "P", "QX"));
    }

    #[test]
    fn test_boost_has_no_flat_record() {
        let event = SchedEvent::Boost {
            target: 4,
            relocated: vec![1, 2],
        };
        assert!(event.record().is_none());
        assert_eq!(event.pid(), None);
    }

    #[test]
    fn test_recording_sink() {
        let mut sink = RecordingSink::new();
        sink.emit(&quantum(Symbol::Yield, 2)).unwrap();
        sink.emit(&SchedEvent::Boost {
            target: 4,
            relocated: vec![1],
        })
        .unwrap();

        assert_eq!(sink.events().len(), 2);
        assert_eq!(sink.records(), vec![EventRecord::new("0", "P", "Q2")]);
    }

    #[test]
    fn test_json_lines_sink() {
        let mut sink = JsonLinesSink::new(Vec::new());
        sink.emit(&quantum(Symbol::Continue, 4)).unwrap();
        sink.emit(&SchedEvent::Boost {
            target: 4,
            relocated: vec![1, 2],
        })
        .unwrap();
        sink.flush().unwrap();

        let output = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: SchedEvent = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first, quantum(Symbol::Continue, 4));
        assert!(lines[0].contains("\"kind\":\"quantum\""));
        assert!(lines[0].contains("\"symbol\":\"1\""));
        assert!(lines[1].contains("\"relocated\":[1,2]"));
    }

    #[test]
    fn test_tee_sink() {
        let mut sink = (RecordingSink::new(), RecordingSink::new());
        sink.emit(&quantum(Symbol::Yield, 1)).unwrap();
        assert_eq!(sink.0.events().len(), 1);
        assert_eq!(sink.1.events().len(), 1);
    }
}
