// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Entity serialization: world handle in, stored record out.

use crate::world::WorldEntity;
use thiserror::Error;
use tw_core::EntityRecord;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot serialize {entity}: {reason}")]
pub struct SerializeError {
    pub entity: String,
    pub reason: String,
}

/// Pure conversion from a live entity to its stored form.
pub trait EntitySerializer {
    fn serialize(&self, entity: &WorldEntity) -> Result<EntityRecord, SerializeError>;
}

/// Keys entities by unit number when they have one, else by
/// `name@x,y`, and copies the rest verbatim.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultSerializer;

impl DefaultSerializer {
    pub fn key(entity: &WorldEntity) -> String {
        match entity.unit_number {
            Some(n) => n.to_string(),
            None => format!("{}@{},{}", entity.name, entity.position.x, entity.position.y),
        }
    }
}

impl EntitySerializer for DefaultSerializer {
    fn serialize(&self, entity: &WorldEntity) -> Result<EntityRecord, SerializeError> {
        if !entity.position.x.is_finite() || !entity.position.y.is_finite() {
            return Err(SerializeError { entity: entity.name.clone(), reason: "non-finite position".into() });
        }
        Ok(EntityRecord {
            key: Self::key(entity),
            name: entity.name.clone(),
            position: entity.position,
            direction: entity.direction,
            config: entity.config.clone(),
        })
    }
}

#[cfg(test)]
#[path = "serializer_tests.rs"]
mod tests;
