/*!
 * Shared Engine
 * Serialized access to one engine from several threads
 *
 * Every operation takes the same exclusive lock for its whole duration, so a
 * quantum is never interleaved with another mutation. Inspection happens
 * through a borrowed reference inside the lock; no copy of the queues is ever
 * handed out to be written back.
 */

use super::engine::{SchedulingEngine, StepOutcome};
use super::stats::SchedulerStats;
use crate::core::errors::SchedulerResult;
use crate::io::EventSink;
use crate::process::ProcessRecord;
use parking_lot::Mutex;
use std::sync::Arc;

/// Cloneable handle to a single engine
pub struct SharedEngine<S: EventSink> {
    inner: Arc<Mutex<SchedulingEngine<S>>>,
}

impl<S: EventSink> SharedEngine<S> {
    pub fn new(engine: SchedulingEngine<S>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    pub fn admit(&self, record: ProcessRecord) -> SchedulerResult<()> {
        self.inner.lock().admit(record)
    }

    /// Execute one quantum under the lock
    pub fn step(&self) -> SchedulerResult<StepOutcome> {
        self.inner.lock().step()
    }

    /// Run to completion while holding the lock
    pub fn run(&self) -> SchedulerResult<SchedulerStats> {
        self.inner.lock().run()
    }

    /// Read the live engine without releasing the lock in between
    pub fn inspect<R>(&self, f: impl FnOnce(&SchedulingEngine<S>) -> R) -> R {
        f(&self.inner.lock())
    }

    pub fn stats(&self) -> SchedulerStats {
        self.inner.lock().stats()
    }

    /// Recover the engine once every other handle is gone
    pub fn try_into_inner(self) -> Result<SchedulingEngine<S>, Self> {
        Arc::try_unwrap(self.inner)
            .map(Mutex::into_inner)
            .map_err(|inner| Self { inner })
    }
}

impl<S: EventSink> Clone for SharedEngine<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}
