/*!
 * Scheduler Statistics
 * Counters describing a simulation run
 */

use crate::core::types::{Level, QuantumCount};
use serde::{Deserialize, Serialize};

fn is_zero(value: &u64) -> bool {
    *value == 0
}

/// Snapshot of engine counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerStats {
    pub quanta_executed: QuantumCount,
    /// Quanta served per level, index 0 = level 1
    pub quanta_per_level: Vec<QuantumCount>,
    #[serde(skip_serializing_if = "is_zero", default)]
    pub boosts: u64,
    pub admitted: u64,
    pub terminated: u64,
    #[serde(skip_serializing_if = "is_zero", default)]
    pub anomalies: u64,
    pub resident: usize,
}

impl SchedulerStats {
    pub(crate) fn new(levels: Level) -> Self {
        Self {
            quanta_per_level: vec![0; usize::from(levels)],
            ..Self::default()
        }
    }

    pub(crate) fn record_quantum(&mut self, level: Level) {
        self.quanta_executed += 1;
        if let Some(count) = usize::from(level)
            .checked_sub(1)
            .and_then(|slot| self.quanta_per_level.get_mut(slot))
        {
            *count += 1;
        }
    }

    /// Quanta served at `level`
    pub fn quanta_at(&self, level: Level) -> QuantumCount {
        usize::from(level)
            .checked_sub(1)
            .and_then(|slot| self.quanta_per_level.get(slot))
            .copied()
            .unwrap_or(0)
    }
}
