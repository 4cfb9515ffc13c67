// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! World coordinates, orientations, and chunk partitioning.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Default edge length of a chunk, in tiles.
pub const DEFAULT_CHUNK_SIZE: u32 = 32;

/// A point in world space (tile units).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Position) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    /// Center of the tile containing this position.
    pub fn tile_center(&self) -> Position {
        Position::new(self.x.floor() + 0.5, self.y.floor() + 0.5)
    }

    /// Move up to `max_step` toward `target`, stopping on it if closer.
    pub fn step_toward(&self, target: &Position, max_step: f64) -> Position {
        let dist = self.distance(target);
        if dist <= max_step || dist == 0.0 {
            return *target;
        }
        let f = max_step / dist;
        Position::new(self.x + (target.x - self.x) * f, self.y + (target.y - self.y) * f)
    }

    /// Chunk containing this position.
    pub fn chunk(&self, chunk_size: u32) -> ChunkPos {
        let size = f64::from(chunk_size.max(1));
        ChunkPos::new((self.x / size).floor() as i32, (self.y / size).floor() as i32)
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.1}, {:.1})", self.x, self.y)
    }
}

/// Entity orientation, in eighths of a turn clockwise from north.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

crate::simple_display! {
    Direction {
        North => "north",
        NorthEast => "northeast",
        East => "east",
        SouthEast => "southeast",
        South => "south",
        SouthWest => "southwest",
        West => "west",
        NorthWest => "northwest",
    }
}

impl Direction {
    /// Cardinal direction best matching travel from `from` to `to`.
    ///
    /// World y grows southward. Ties between axes favour the horizontal.
    pub fn cardinal_between(from: &Position, to: &Position) -> Direction {
        let dx = to.x - from.x;
        let dy = to.y - from.y;
        if dx.abs() >= dy.abs() {
            if dx >= 0.0 {
                Direction::East
            } else {
                Direction::West
            }
        } else if dy >= 0.0 {
            Direction::South
        } else {
            Direction::North
        }
    }
}

/// Coordinate of one chunk (spatial partition).
///
/// Ordered in raster order: row by row from north to south, west to east
/// within a row, so that a chunk's northern and western neighbours sort
/// before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChunkPos {
    pub x: i32,
    pub y: i32,
}

impl ChunkPos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Stable key used for storage directories (`{x}_{y}`).
    pub fn key(&self) -> String {
        format!("{}_{}", self.x, self.y)
    }

    /// Parse a storage key produced by [`ChunkPos::key`].
    pub fn parse_key(key: &str) -> Option<ChunkPos> {
        let (x, y) = key.split_once('_')?;
        Some(ChunkPos::new(x.parse().ok()?, y.parse().ok()?))
    }

    /// Top-left world position of this chunk.
    pub fn origin(&self, chunk_size: u32) -> Position {
        let size = f64::from(chunk_size);
        Position::new(f64::from(self.x) * size, f64::from(self.y) * size)
    }

    /// Whether `pos` falls inside this chunk.
    pub fn contains(&self, pos: &Position, chunk_size: u32) -> bool {
        pos.chunk(chunk_size) == *self
    }
}

impl Ord for ChunkPos {
    fn cmp(&self, other: &Self) -> Ordering {
        self.y.cmp(&other.y).then(self.x.cmp(&other.x))
    }
}

impl PartialOrd for ChunkPos {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl std::fmt::Display for ChunkPos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.x, self.y)
    }
}

#[cfg(test)]
#[path = "geometry_tests.rs"]
mod tests;
