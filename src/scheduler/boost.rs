/*!
 * Boost Policy
 * Quantum-count driven anti-starvation
 */

use crate::core::types::{Level, QuantumCount};

/// Decision returned after each executed quantum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoostDecision {
    Idle,
    /// Relocate every queued process to `target`
    Boost { target: Level },
}

/// Counts quanta since the last boost
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoostPolicy {
    threshold: Option<QuantumCount>,
    target: Level,
    elapsed: QuantumCount,
}

impl BoostPolicy {
    /// Threshold observed in recorded runs
    pub const DEFAULT_THRESHOLD: QuantumCount = 7;

    /// Boost to `target` every `threshold` quanta; `None` never boosts
    pub fn new(threshold: Option<QuantumCount>, target: Level) -> Self {
        Self {
            threshold: threshold.filter(|&t| t > 0),
            target,
            elapsed: 0,
        }
    }

    /// Record one executed quantum
    pub fn on_quantum_executed(&mut self) -> BoostDecision {
        let Some(threshold) = self.threshold else {
            return BoostDecision::Idle;
        };

        self.elapsed += 1;
        if self.elapsed >= threshold {
            self.elapsed = 0;
            BoostDecision::Boost {
                target: self.target,
            }
        } else {
            BoostDecision::Idle
        }
    }

    /// Quanta executed since the last boost
    #[inline]
    pub fn elapsed(&self) -> QuantumCount {
        self.elapsed
    }

    #[inline]
    pub fn threshold(&self) -> Option<QuantumCount> {
        self.threshold
    }

    #[inline]
    pub fn target(&self) -> Level {
        self.target
    }
}
