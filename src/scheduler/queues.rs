/*!
 * Level Queues
 * One FIFO queue of process ids per priority level
 */

use crate::core::errors::{SchedulerError, SchedulerResult};
use crate::core::types::{Level, ProcessId, MAX_LEVELS, MIN_LEVEL};
use std::collections::VecDeque;

/// N ordered FIFO queues indexed 1..=N (N = highest priority)
///
/// Holds identities only. This is the single authoritative copy of the queue
/// contents; callers inspect it through borrowing iterators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelQueueSet {
    // Index 0 holds level 1
    queues: Vec<VecDeque<ProcessId>>,
}

impl LevelQueueSet {
    /// Create `levels` empty queues
    pub fn new(levels: Level) -> SchedulerResult<Self> {
        if !(MIN_LEVEL..=MAX_LEVELS).contains(&levels) {
            return Err(SchedulerError::InvalidLevel {
                level: levels,
                levels: MAX_LEVELS,
            });
        }

        Ok(Self {
            queues: (0..levels).map(|_| VecDeque::new()).collect(),
        })
    }

    /// Number of levels
    #[inline(always)]
    pub fn levels(&self) -> Level {
        self.queues.len() as Level
    }

    /// Highest priority level
    #[inline(always)]
    pub fn top(&self) -> Level {
        self.levels()
    }

    #[inline]
    pub fn is_valid_level(&self, level: Level) -> bool {
        (MIN_LEVEL..=self.levels()).contains(&level)
    }

    fn slot(&self, level: Level) -> SchedulerResult<usize> {
        if self.is_valid_level(level) {
            Ok(usize::from(level - 1))
        } else {
            Err(SchedulerError::InvalidLevel {
                level,
                levels: self.levels(),
            })
        }
    }

    /// Append `pid` to the tail of `level`'s queue
    pub fn enqueue(&mut self, level: Level, pid: ProcessId) -> SchedulerResult<()> {
        let slot = self.slot(level)?;
        self.queues[slot].push_back(pid);
        Ok(())
    }

    /// Pop the head of the highest non-empty level, scanning N down to 1
    pub fn dequeue_highest_non_empty(&mut self) -> Option<(Level, ProcessId)> {
        self.queues
            .iter_mut()
            .enumerate()
            .rev()
            .find_map(|(slot, queue)| queue.pop_front().map(|pid| ((slot + 1) as Level, pid)))
    }

    /// Move every queued id to the tail of `to`'s queue
    ///
    /// Source levels are swept from 1 up to N, each in FIFO order. Returns the
    /// relocated ids in the order they were appended.
    pub fn relocate_all(&mut self, to: Level) -> SchedulerResult<Vec<ProcessId>> {
        let target = self.slot(to)?;

        let moved: Vec<ProcessId> = self
            .queues
            .iter_mut()
            .flat_map(|queue| queue.drain(..))
            .collect();

        self.queues[target].extend(moved.iter().copied());
        Ok(moved)
    }

    /// Total number of queued ids
    pub fn len(&self) -> usize {
        self.queues.iter().map(VecDeque::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.queues.iter().all(VecDeque::is_empty)
    }

    /// Number of ids queued at `level` (0 for levels outside the range)
    pub fn level_len(&self, level: Level) -> usize {
        self.slot(level).map(|slot| self.queues[slot].len()).unwrap_or(0)
    }

    /// Ids queued at `level`, head first
    pub fn iter_level(&self, level: Level) -> impl Iterator<Item = ProcessId> + '_ {
        self.slot(level)
            .ok()
            .into_iter()
            .flat_map(move |slot| self.queues[slot].iter().copied())
    }

    /// Level at which `pid` is queued, if any
    pub fn position(&self, pid: ProcessId) -> Option<Level> {
        self.queues
            .iter()
            .position(|queue| queue.contains(&pid))
            .map(|slot| (slot + 1) as Level)
    }

    /// Whether `pid` is queued at any level
    #[inline]
    pub fn contains(&self, pid: ProcessId) -> bool {
        self.queues.iter().any(|queue| queue.contains(&pid))
    }

    /// Number of times `pid` occurs across all levels
    pub fn occurrences(&self, pid: ProcessId) -> usize {
        self.queues
            .iter()
            .map(|queue| queue.iter().filter(|&&p| p == pid).count())
            .sum()
    }
}
