//! Vessel decks: the walkable grid, stockpile zones and room atmosphere.

use std::collections::{BTreeSet, HashSet, VecDeque};

use serde::{Deserialize, Serialize};
use stowage_logic::host::Cond;

use super::common::{Tile, VesselId};
use super::items::Conditions;

/// One deck per vessel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deck {
    pub vessel: VesselId,
    pub name: String,
    pub width: i32,
    pub height: i32,
    pub walls: BTreeSet<Tile>,
    pub stockpile: BTreeSet<Tile>,
    /// Conditions of the air on this deck.
    pub atmosphere: Conditions,
    pub docked: Vec<VesselId>,
    /// Owned by the player's company.
    pub player_owned: bool,
}

impl Deck {
    pub fn new(vessel: VesselId, name: impl Into<String>, width: i32, height: i32) -> Self {
        Self {
            vessel,
            name: name.into(),
            width,
            height,
            walls: BTreeSet::new(),
            stockpile: BTreeSet::new(),
            atmosphere: Conditions::default(),
            docked: Vec::new(),
            player_owned: true,
        }
    }

    /// Standard breathable air.
    pub fn with_breathable_air(mut self) -> Self {
        self.atmosphere = Conditions::of(&[Cond::GasPpO2, Cond::GasTempOk]);
        self
    }

    pub fn in_bounds(&self, tile: Tile) -> bool {
        tile.x >= 0 && tile.y >= 0 && tile.x < self.width && tile.y < self.height
    }

    pub fn is_walkable(&self, tile: Tile) -> bool {
        self.in_bounds(tile) && !self.walls.contains(&tile)
    }

    /// Wall a rectangle's outline.
    pub fn wall_rect(&mut self, min: Tile, max: Tile) {
        for x in min.x..=max.x {
            self.walls.insert(Tile::new(x, min.y));
            self.walls.insert(Tile::new(x, max.y));
        }
        for y in min.y..=max.y {
            self.walls.insert(Tile::new(min.x, y));
            self.walls.insert(Tile::new(max.x, y));
        }
    }

    /// Bresenham line between two tiles; walls on either end do not block.
    pub fn line_of_sight(&self, from: Tile, to: Tile) -> bool {
        let (mut x, mut y) = (from.x, from.y);
        let dx = (to.x - from.x).abs();
        let dy = -(to.y - from.y).abs();
        let sx = if from.x < to.x { 1 } else { -1 };
        let sy = if from.y < to.y { 1 } else { -1 };
        let mut err = dx + dy;

        loop {
            if (x, y) == (to.x, to.y) {
                return true;
            }
            let here = Tile::new(x, y);
            if here != from && self.walls.contains(&here) {
                return false;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Breadth-first search over walkable tiles, 8-connected. Reaching any
    /// tile in `goals` succeeds.
    pub fn path_exists(&self, from: Tile, goals: &[Tile]) -> bool {
        if goals.contains(&from) {
            return true;
        }
        let mut seen = HashSet::from([from]);
        let mut queue = VecDeque::from([from]);
        while let Some(tile) = queue.pop_front() {
            for next in tile.neighbours() {
                if !self.is_walkable(next) || !seen.insert(next) {
                    continue;
                }
                if goals.contains(&next) {
                    return true;
                }
                queue.push_back(next);
            }
        }
        false
    }
}
