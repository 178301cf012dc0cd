//! Common components used across multiple entity types.

use serde::{Deserialize, Serialize};

/// Grid cell on a vessel deck.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Tile {
    pub x: i32,
    pub y: i32,
}

impl Tile {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Self) -> f32 {
        let dx = (self.x - other.x) as f32;
        let dy = (self.y - other.y) as f32;
        (dx * dx + dy * dy).sqrt()
    }

    /// The eight tiles around this one, row by row.
    pub fn neighbours(&self) -> Vec<Tile> {
        let mut out = Vec::with_capacity(8);
        for dy in -1..=1 {
            for dx in -1..=1 {
                if dx != 0 || dy != 0 {
                    out.push(Tile::new(self.x + dx, self.y + dy));
                }
            }
        }
        out
    }
}

/// Vessel handle. Every vessel owns exactly one deck grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VesselId(pub u32);

/// Where a free-standing entity is. Stored items have no position; they
/// take their holder's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub vessel: VesselId,
    pub tile: Tile,
}

impl Position {
    pub fn new(vessel: VesselId, x: i32, y: i32) -> Self {
        Self {
            vessel,
            tile: Tile::new(x, y),
        }
    }
}

/// Stable id, definition id and display name. Every entity has one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub def: String,
    pub name: String,
}

impl Identity {
    pub fn new(id: impl Into<String>, def: impl Into<String>) -> Self {
        let def = def.into();
        Self {
            id: id.into(),
            name: def.clone(),
            def,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}
