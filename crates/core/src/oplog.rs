// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Operation log entries and the records they carry.

use crate::clock::Tick;
use crate::geometry::{Direction, Position};
use serde::{Deserialize, Serialize};

/// Kind of world-state delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogOp {
    Upsert,
    Remove,
    Rotate,
    ConfigurationChanged,
}

crate::simple_display! {
    LogOp {
        Upsert => "upsert",
        Remove => "remove",
        Rotate => "rotate",
        ConfigurationChanged => "configuration_changed",
    }
}

/// One immutable, appended log line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpLogEntry {
    pub op: LogOp,
    pub tick: Tick,
    pub key: String,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub payload: serde_json::Value,
}

/// Serialized form of one world entity, as stored in a chunk's log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    /// Stable identity within the world (unit number, or name@position)
    pub key: String,
    pub name: String,
    pub position: Position,
    #[serde(default)]
    pub direction: Direction,
    /// Entity-specific configuration (recipe, filters, ...)
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub config: serde_json::Value,
}

impl EntityRecord {
    /// Classify the change from `previous` to `self`.
    ///
    /// Returns `None` when nothing changed. A change touching only the
    /// direction is a rotation, one touching only the configuration is a
    /// configuration change, anything else is a full upsert.
    pub fn diff_op(&self, previous: &EntityRecord) -> Option<LogOp> {
        if self == previous {
            return None;
        }
        let same_body = self.name == previous.name && self.position == previous.position;
        if same_body && self.config == previous.config {
            return Some(LogOp::Rotate);
        }
        if same_body && self.direction == previous.direction {
            return Some(LogOp::ConfigurationChanged);
        }
        Some(LogOp::Upsert)
    }
}

/// One resource tile in a chunk's bulk resource file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceTile {
    pub name: String,
    pub position: Position,
    pub amount: u32,
}

#[cfg(test)]
#[path = "oplog_tests.rs"]
mod tests;
