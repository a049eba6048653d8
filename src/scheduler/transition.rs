/*!
 * Transition Policy
 * Maps (current level, consumed symbol) to a disposition
 */

use crate::core::types::{Level, MIN_LEVEL};
use crate::process::Symbol;

/// What happens to a process after its quantum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Append to the tail of this level
    Requeue(Level),
    /// Remove permanently
    Terminate,
}

/// Pure transition rules, parameterized per level
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionPolicy {
    // Index 0 holds level 1
    demotes_on_continue: Vec<bool>,
}

impl TransitionPolicy {
    /// Demote on Continue at every level
    pub fn new(levels: Level) -> Self {
        Self {
            demotes_on_continue: vec![true; usize::from(levels)],
        }
    }

    /// Use explicit per-level flags (index 0 = level 1)
    pub fn with_flags(flags: Vec<bool>) -> Self {
        Self {
            demotes_on_continue: flags,
        }
    }

    /// Override the flag for a single level; ignored outside the range
    pub fn set_demotes_on_continue(&mut self, level: Level, demotes: bool) {
        if let Some(flag) = usize::from(level)
            .checked_sub(1)
            .and_then(|slot| self.demotes_on_continue.get_mut(slot))
        {
            *flag = demotes;
        }
    }

    /// Whether Continue demotes at `level`; unknown levels demote
    #[inline]
    pub fn demotes_on_continue(&self, level: Level) -> bool {
        usize::from(level)
            .checked_sub(1)
            .and_then(|slot| self.demotes_on_continue.get(slot))
            .copied()
            .unwrap_or(true)
    }

    /// Decide the disposition of a process served at `level`
    pub fn decide(&self, level: Level, symbol: Symbol) -> Disposition {
        match symbol {
            Symbol::Continue if self.demotes_on_continue(level) => {
                Disposition::Requeue(level.saturating_sub(1).max(MIN_LEVEL))
            }
            Symbol::Continue | Symbol::Yield => Disposition::Requeue(level),
            Symbol::Terminate => Disposition::Terminate,
        }
    }
}
