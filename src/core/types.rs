/*!
 * Core Types
 * Common types used across the simulator
 */

use serde::{Deserialize, Serialize};
use smartstring::alias::String as SmartString;
use std::fmt;

/// Process ID type
pub type ProcessId = u32;

/// Priority level (1 = lowest, N = highest)
pub type Level = u8;

/// Count of executed quanta
pub type QuantumCount = u64;

/// Lowest priority level; demotion never goes below it
pub const MIN_LEVEL: Level = 1;

/// Upper bound accepted for the number of levels
pub const MAX_LEVELS: Level = 32;

/// Label attached to termination events
pub const TERMINATED_LABEL: &str = "QX";

/// Symbol attached to termination events
pub const TERMINATED_SYMBOL: &str = "E";

/// Label for an ordinary quantum served at `level`
#[inline]
pub fn level_label(level: Level) -> String {
    format!("Q{}", level)
}

/// Display label of a process
///
/// Short names (≤23 bytes) are stored inline without heap allocation.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct ProcessName {
    inner: SmartString,
}

impl ProcessName {
    #[inline(always)]
    pub fn as_str(&self) -> &str {
        self.inner.as_str()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.inner.trim().is_empty()
    }
}

impl From<&str> for ProcessName {
    #[inline]
    fn from(s: &str) -> Self {
        Self {
            inner: SmartString::from(s),
        }
    }
}

impl From<String> for ProcessName {
    #[inline]
    fn from(s: String) -> Self {
        Self {
            inner: SmartString::from(s),
        }
    }
}

impl AsRef<str> for ProcessName {
    #[inline(always)]
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl PartialEq<str> for ProcessName {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for ProcessName {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl fmt::Display for ProcessName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
