/*!
 * Simulation Configuration
 * JSON config file with environment overrides
 *
 * Environment variables:
 * - MLFQ_TRACE_DIR: Directory holding `{index}.{ext}` trace files
 * - MLFQ_LEVELS: Number of priority levels
 * - MLFQ_BOOST_THRESHOLD: Quanta between boosts, or `never`
 * - MLFQ_PROCESS_COUNT: Generate P1..Pn when the config lists no processes
 */

use crate::core::errors::{ConfigError, ConfigResult};
use crate::core::types::{Level, QuantumCount, MAX_LEVELS, MIN_LEVEL};
use crate::scheduler::{BoostPolicy, EngineBuilder};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ENV_TRACE_DIR: &str = "MLFQ_TRACE_DIR";
pub const ENV_LEVELS: &str = "MLFQ_LEVELS";
pub const ENV_BOOST_THRESHOLD: &str = "MLFQ_BOOST_THRESHOLD";
pub const ENV_PROCESS_COUNT: &str = "MLFQ_PROCESS_COUNT";

/// One process to schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessSpec {
    pub name: String,
    pub trace_index: usize,
    /// Defaults to the top level
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_level: Option<Level>,
}

impl ProcessSpec {
    pub fn new(name: impl Into<String>, trace_index: usize) -> Self {
        Self {
            name: name.into(),
            trace_index,
            initial_level: None,
        }
    }

    pub fn at_level(mut self, level: Level) -> Self {
        self.initial_level = Some(level);
        self
    }
}

/// Everything needed to set up a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub levels: Level,
    pub boost_threshold: Option<QuantumCount>,
    /// One flag per level, index 0 = level 1; empty means demote everywhere
    pub demotes_on_continue: Vec<bool>,
    pub trace_dir: PathBuf,
    pub trace_extension: String,
    pub processes: Vec<ProcessSpec>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            levels: EngineBuilder::DEFAULT_LEVELS,
            boost_threshold: Some(BoostPolicy::DEFAULT_THRESHOLD),
            demotes_on_continue: Vec::new(),
            trace_dir: PathBuf::from("traces"),
            trace_extension: "txt".to_string(),
            processes: Vec::new(),
        }
    }
}

impl SimulationConfig {
    /// Parse a JSON config
    pub fn from_json(input: &str) -> ConfigResult<Self> {
        serde_json::from_str(input).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load a JSON config file
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&contents)
    }

    /// Apply `MLFQ_*` overrides from the process environment
    pub fn apply_env_overrides(&mut self) -> ConfigResult<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key lookup
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> ConfigResult<()> {
        if let Some(dir) = lookup(ENV_TRACE_DIR) {
            self.trace_dir = PathBuf::from(dir);
        }

        if let Some(levels) = lookup(ENV_LEVELS) {
            let levels = levels.trim();
            self.levels = levels.parse().map_err(|_| {
                ConfigError::InvalidLevels(levels.parse::<u32>().unwrap_or(u32::MAX))
            })?;
        }

        if let Some(threshold) = lookup(ENV_BOOST_THRESHOLD) {
            self.boost_threshold = parse_threshold(&threshold)?;
        }

        if let Some(count) = lookup(ENV_PROCESS_COUNT) {
            let count: usize = count
                .trim()
                .parse()
                .map_err(|_| ConfigError::Parse(format!("{}={}", ENV_PROCESS_COUNT, count)))?;
            if self.processes.is_empty() {
                self.processes = generated_processes(count);
            }
        }

        Ok(())
    }

    /// Check every value against the level range
    pub fn validate(&self) -> ConfigResult<()> {
        if !(MIN_LEVEL..=MAX_LEVELS).contains(&self.levels) {
            return Err(ConfigError::InvalidLevels(u32::from(self.levels)));
        }

        if self.boost_threshold == Some(0) {
            return Err(ConfigError::InvalidThreshold("0".to_string()));
        }

        if !self.demotes_on_continue.is_empty()
            && self.demotes_on_continue.len() != usize::from(self.levels)
        {
            return Err(ConfigError::InvalidFlags {
                expected: usize::from(self.levels),
                actual: self.demotes_on_continue.len(),
            });
        }

        for (position, spec) in self.processes.iter().enumerate() {
            if spec.name.trim().is_empty() {
                return Err(ConfigError::EmptyName(position));
            }
            let level = self.initial_level(spec);
            if !(MIN_LEVEL..=self.levels).contains(&level) {
                return Err(ConfigError::InvalidInitialLevel {
                    name: spec.name.clone(),
                    level,
                    levels: self.levels,
                });
            }
        }

        Ok(())
    }

    /// Starting level of `spec`
    #[inline]
    pub fn initial_level(&self, spec: &ProcessSpec) -> Level {
        spec.initial_level.unwrap_or(self.levels)
    }

    /// Engine builder carrying the level count, threshold and flags
    pub fn engine_builder(&self) -> EngineBuilder {
        let builder = EngineBuilder::new()
            .with_levels(self.levels)
            .with_boost_threshold(self.boost_threshold);

        self.demotes_on_continue
            .iter()
            .enumerate()
            .fold(builder, |builder, (slot, &demotes)| {
                builder.with_demotes_on_continue((slot + 1) as Level, demotes)
            })
    }
}

/// Parse a boost threshold; `never`, `none` and `off` disable boosting
pub fn parse_threshold(value: &str) -> ConfigResult<Option<QuantumCount>> {
    let value = value.trim();
    match value.to_lowercase().as_str() {
        "never" | "none" | "off" => Ok(None),
        _ => match value.parse::<QuantumCount>() {
            Ok(0) | Err(_) => Err(ConfigError::InvalidThreshold(value.to_string())),
            Ok(threshold) => Ok(Some(threshold)),
        },
    }
}

/// `P1..Pn` reading traces `0..n`
pub fn generated_processes(count: usize) -> Vec<ProcessSpec> {
    (0..count)
        .map(|index| ProcessSpec::new(format!("P{}", index + 1), index))
        .collect()
}
