/*!
 * Process Records
 * A scheduled entity: identity, current level, and remaining trace
 */

use super::trace::{Symbol, Trace};
use crate::core::errors::TraceResult;
use crate::core::types::{Level, ProcessId, ProcessName};

/// A simulated process
///
/// Owned exclusively by the scheduling engine once admitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessRecord {
    id: ProcessId,
    name: ProcessName,
    level: Level,
    trace: Trace,
}

impl ProcessRecord {
    pub fn new(id: ProcessId, name: impl Into<ProcessName>, level: Level, trace: Trace) -> Self {
        Self {
            id,
            name: name.into(),
            level,
            trace,
        }
    }

    #[inline(always)]
    pub fn id(&self) -> ProcessId {
        self.id
    }

    #[inline(always)]
    pub fn name(&self) -> &ProcessName {
        &self.name
    }

    #[inline(always)]
    pub fn level(&self) -> Level {
        self.level
    }

    #[inline]
    pub fn trace(&self) -> &Trace {
        &self.trace
    }

    /// Consume the next trace symbol
    pub fn consume_next(&mut self) -> TraceResult<Symbol> {
        self.trace.consume_next()
    }

    pub(crate) fn set_level(&mut self, level: Level) {
        self.level = level;
    }
}
