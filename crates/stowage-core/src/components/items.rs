//! Item components: stacks, storage grids, conditions and stats.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use stowage_logic::host::{Cond, Stat};

/// Stack size of an item. Entities without one count as a single unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stack {
    pub count: u32,
    pub max: u32,
}

impl Stack {
    pub fn new(count: u32, max: u32) -> Self {
        Self { count, max }
    }

    pub fn room(&self) -> u32 {
        self.max.saturating_sub(self.count)
    }
}

/// Storage grid. Every stored stack occupies one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Storage {
    pub width: u32,
    pub height: u32,
}

impl Storage {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn cells(&self) -> usize {
        (self.width * self.height) as usize
    }
}

/// Condition set packed into a bitmask.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conditions(u32);

impl Conditions {
    pub fn of(conds: &[Cond]) -> Self {
        let mut set = Self::default();
        for &c in conds {
            set.set(c);
        }
        set
    }

    /// Build from the host's string names. Unknown names are skipped.
    pub fn from_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        let mut set = Self::default();
        for name in names {
            match Cond::from_name(name) {
                Some(c) => set.set(c),
                None => log::debug!("Ignoring unknown condition {}", name),
            }
        }
        set
    }

    pub fn has(&self, cond: Cond) -> bool {
        self.0 & cond.bit() != 0
    }

    pub fn set(&mut self, cond: Cond) {
        self.0 |= cond.bit();
    }

    pub fn clear(&mut self, cond: Cond) {
        self.0 &= !cond.bit();
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

/// Numeric stats such as battery power and bottle gas.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats(BTreeMap<Stat, f64>);

impl Stats {
    pub fn with(mut self, stat: Stat, value: f64) -> Self {
        self.0.insert(stat, value);
        self
    }

    pub fn get(&self, stat: Stat) -> f64 {
        self.0.get(&stat).copied().unwrap_or(0.0)
    }

    pub fn set(&mut self, stat: Stat, value: f64) {
        self.0.insert(stat, value);
    }
}

/// Link to the holder of a stored or equipped item, by stable id.
///
/// `slot` is set for equipment (a worn suit, a pocket on a suit, a tool
/// in hand) and empty for grid storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainedIn {
    pub parent_id: String,
    pub slot: Option<String>,
}

impl ContainedIn {
    pub fn stored(parent_id: impl Into<String>) -> Self {
        Self {
            parent_id: parent_id.into(),
            slot: None,
        }
    }

    pub fn equipped(parent_id: impl Into<String>, slot: impl Into<String>) -> Self {
        Self {
            parent_id: parent_id.into(),
            slot: Some(slot.into()),
        }
    }
}
