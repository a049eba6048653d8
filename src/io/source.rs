/*!
 * Trace Sources
 * Where per-process execution traces come from
 */

use crate::core::errors::{TraceError, TraceResult};
use crate::process::{Symbol, Trace};
use ahash::AHashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Supplies the trace for a process index
pub trait TraceSource {
    /// Fails with [`TraceError::NotFound`] when no data exists for `index`
    fn load_trace(&self, index: usize) -> TraceResult<Trace>;
}

impl<T: TraceSource + ?Sized> TraceSource for &T {
    fn load_trace(&self, index: usize) -> TraceResult<Trace> {
        (**self).load_trace(index)
    }
}

/// Reads `{dir}/{index}.{extension}` text files
#[derive(Debug, Clone)]
pub struct FileTraceSource {
    dir: PathBuf,
    extension: String,
}

impl FileTraceSource {
    pub const DEFAULT_EXTENSION: &'static str = "txt";

    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_extension(dir, Self::DEFAULT_EXTENSION)
    }

    pub fn with_extension(dir: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            extension: extension.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File holding the trace for `index`
    pub fn path_for(&self, index: usize) -> PathBuf {
        self.dir.join(format!("{}.{}", index, self.extension))
    }
}

impl TraceSource for FileTraceSource {
    fn load_trace(&self, index: usize) -> TraceResult<Trace> {
        let path = self.path_for(index);
        let contents = std::fs::read_to_string(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => TraceError::NotFound(index),
            _ => TraceError::Io {
                index,
                message: format!("{}: {}", path.display(), e),
            },
        })?;

        let trace = Trace::parse(index, &contents)?;
        debug!(index, path = %path.display(), symbols = trace.remaining(), "Loaded trace");
        Ok(trace)
    }
}

/// Traces held in memory, keyed by process index
#[derive(Debug, Clone, Default)]
pub struct MemoryTraceSource {
    traces: AHashMap<usize, Vec<Symbol>>,
}

impl MemoryTraceSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, index: usize, symbols: Vec<Symbol>) {
        self.traces.insert(index, symbols);
    }

    /// Add a trace in its textual encoding
    pub fn insert_text(&mut self, index: usize, text: &str) -> TraceResult<()> {
        let mut trace = Trace::parse(index, text)?;
        let mut symbols = Vec::with_capacity(trace.remaining());
        while let Ok(symbol) = trace.consume_next() {
            symbols.push(symbol);
        }
        self.insert(index, symbols);
        Ok(())
    }

    pub fn with_trace(mut self, index: usize, symbols: Vec<Symbol>) -> Self {
        self.insert(index, symbols);
        self
    }

    pub fn len(&self) -> usize {
        self.traces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.traces.is_empty()
    }
}

impl TraceSource for MemoryTraceSource {
    fn load_trace(&self, index: usize) -> TraceResult<Trace> {
        self.traces
            .get(&index)
            .cloned()
            .map(Trace::new)
            .ok_or(TraceError::NotFound(index))
    }
}
