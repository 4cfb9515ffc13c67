// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine configuration.
//!
//! Loaded from TOML; every section and field has a default, so an empty
//! document is a valid configuration. A few values can be overridden from
//! the environment (see [`EngineConfig::apply_env`]).

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Root of the persisted state; `None` keeps the host's choice
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_dir: Option<PathBuf>,
    pub walking: WalkingConfig,
    pub mining: MiningConfig,
    pub placement: PlacementConfig,
    pub snapshot: SnapshotConfig,
    pub journal: JournalConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalkingConfig {
    pub arrive_radius: f64,
    pub waypoint_radius: f64,
    pub stall_ticks: u32,
    pub max_replans: u32,
}

impl Default for WalkingConfig {
    fn default() -> Self {
        Self { arrive_radius: 1.0, waypoint_radius: 0.5, stall_ticks: 30, max_replans: 3 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MiningConfig {
    pub stall_ticks: u32,
}

impl Default for MiningConfig {
    fn default() -> Self {
        Self { stall_ticks: 120 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    pub max_plan_len: usize,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self { max_plan_len: 512 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    pub chunk_size: u32,
    /// Chunk-phase-steps per tick, across all chunks
    pub budget_per_tick: usize,
    /// Rows handled by one serialize or write step
    pub rows_per_step: usize,
    /// Consecutive failed steps before a chunk is marked failed
    pub max_retries: u32,
    /// Emit `snapshot_state` for every phase, not only `complete`
    pub notify_intermediate_phases: bool,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            chunk_size: tw_core::DEFAULT_CHUNK_SIZE,
            budget_per_tick: 8,
            rows_per_step: 200,
            max_retries: 5,
            notify_intermediate_phases: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JournalConfig {
    pub actions: bool,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self { actions: true }
    }
}

impl EngineConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Apply `TW_SNAPSHOT_BUDGET`, `TW_ROWS_PER_STEP` and `TW_STATE_DIR`.
    pub fn apply_env(self) -> Result<Self, ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup. Unset or empty keys leave
    /// the configured value alone.
    pub fn apply_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(v) = get("TW_SNAPSHOT_BUDGET") {
            self.snapshot.budget_per_tick = parse_usize("TW_SNAPSHOT_BUDGET", &v)?;
        }
        if let Some(v) = get("TW_ROWS_PER_STEP") {
            self.snapshot.rows_per_step = parse_usize("TW_ROWS_PER_STEP", &v)?;
        }
        if let Some(v) = get("TW_STATE_DIR") {
            self.state_dir = Some(PathBuf::from(v));
        }
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field, reason: &str| Err(ConfigError::Invalid { field, reason: reason.to_string() });
        if self.snapshot.chunk_size == 0 {
            return invalid("snapshot.chunk_size", "must be positive");
        }
        if self.snapshot.budget_per_tick == 0 {
            return invalid("snapshot.budget_per_tick", "must be positive");
        }
        if self.snapshot.rows_per_step == 0 {
            return invalid("snapshot.rows_per_step", "must be positive");
        }
        if self.snapshot.max_retries == 0 {
            return invalid("snapshot.max_retries", "must be positive");
        }
        let radius = self.walking.arrive_radius;
        if radius.is_nan() || radius <= 0.0 {
            return invalid("walking.arrive_radius", "must be positive");
        }
        if self.walking.stall_ticks == 0 || self.mining.stall_ticks == 0 {
            return invalid("stall_ticks", "must be positive");
        }
        Ok(())
    }
}

fn parse_usize(field: &'static str, value: &str) -> Result<usize, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { field, reason: format!("not a number: {value:?}") })
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
