/*!
 * I/O Boundary
 * Trace sources feeding the engine and event sinks draining it
 */

pub mod sink;
pub mod source;

pub use sink::{EventRecord, EventSink, JsonLinesSink, LogSink, RecordingSink, SchedEvent};
pub use source::{FileTraceSource, MemoryTraceSource, TraceSource};
