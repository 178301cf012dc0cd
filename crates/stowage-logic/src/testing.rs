//! In-memory [`Host`] used by the unit tests of this crate.

use std::collections::{HashMap, HashSet};

use crate::error::HostError;
use crate::host::{Cond, Host, Stat};

pub type Tile = (i32, i32);

#[derive(Debug, Clone, Default)]
pub struct MockEntity {
    pub id: String,
    pub def: String,
    pub name: String,
    pub stack: u32,
    pub max_stack: u32,
    pub parent: Option<usize>,
    pub slot: Option<String>,
    pub vessel: Option<u32>,
    pub tile: Option<Tile>,
    pub conds: HashSet<Cond>,
    pub stats: HashMap<Stat, f64>,
    pub cells: Option<usize>,
    pub player_company: bool,
    pub alive: bool,
}

impl MockEntity {
    pub fn item(id: &str, def: &str, stack: u32) -> Self {
        Self {
            id: id.into(),
            def: def.into(),
            name: id.into(),
            stack,
            max_stack: 100,
            alive: true,
            ..Default::default()
        }
    }

    pub fn container(id: &str, cells: usize) -> Self {
        Self {
            cells: Some(cells),
            max_stack: 1,
            ..Self::item(id, "ItmLocker", 1)
        }
    }

    pub fn character(id: &str) -> Self {
        Self {
            player_company: true,
            max_stack: 1,
            ..Self::item(id, "Crew", 1)
        }
    }

    pub fn on(mut self, vessel: u32, tile: Tile) -> Self {
        self.vessel = Some(vessel);
        self.tile = Some(tile);
        self
    }

    pub fn with(mut self, cond: Cond) -> Self {
        self.conds.insert(cond);
        self
    }

    pub fn stat(mut self, stat: Stat, value: f64) -> Self {
        self.stats.insert(stat, value);
        self
    }
}

#[derive(Debug, Default)]
pub struct MockHost {
    pub entities: Vec<MockEntity>,
    pub blocked_sight: HashSet<(usize, usize)>,
    pub walls: HashSet<Tile>,
    pub unreachable: HashSet<usize>,
    pub docked: Vec<(u32, u32)>,
    pub owned: HashSet<(usize, u32)>,
    pub stockpile: HashSet<usize>,
    pub room_conds: HashSet<Cond>,
    pub fail_adds: bool,
    split_serial: u32,
}

impl MockHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self, entity: MockEntity) -> usize {
        self.entities.push(entity);
        self.entities.len() - 1
    }

    pub fn put_in(&mut self, item: usize, container: usize) {
        self.entities[item].parent = Some(container);
        self.entities[item].slot = None;
    }

    pub fn equip(&mut self, item: usize, character: usize, slot: &str) {
        self.entities[item].parent = Some(character);
        self.entities[item].slot = Some(slot.to_string());
    }

    pub fn entity(&self, e: usize) -> &MockEntity {
        &self.entities[e]
    }

    fn children(&self, parent: usize) -> impl Iterator<Item = usize> + '_ {
        self.entities
            .iter()
            .enumerate()
            .filter(move |(_, c)| c.alive && c.parent == Some(parent))
            .map(|(i, _)| i)
    }

    fn detach(&mut self, item: usize) {
        let e = &mut self.entities[item];
        e.parent = None;
        e.slot = None;
        e.tile = None;
    }

    fn live(&self, e: usize) -> Result<(), HostError> {
        match self.entities.get(e) {
            Some(ent) if ent.alive => Ok(()),
            _ => Err(HostError::MissingEntity(e.to_string())),
        }
    }

    fn nested_contents(&self, root: usize, out: &mut Vec<usize>) {
        for child in self.children(root).collect::<Vec<_>>() {
            if self.entities[root].cells.is_some() && self.entities[child].slot.is_none() {
                out.push(child);
            }
            if self.entities[child].cells.is_some() {
                self.nested_contents(child, out);
            }
        }
    }
}

impl Host for MockHost {
    type Entity = usize;
    type Vessel = u32;
    type Tile = Tile;

    fn lookup(&self, id: &str) -> Option<usize> {
        self.entities.iter().position(|e| e.alive && e.id == id)
    }

    fn stable_id(&self, e: usize) -> Option<String> {
        self.entities.get(e).map(|e| e.id.clone())
    }

    fn def_id(&self, e: usize) -> Option<String> {
        self.entities
            .get(e)
            .filter(|e| !e.def.is_empty())
            .map(|e| e.def.clone())
    }

    fn display_name(&self, e: usize) -> String {
        self.entities[e].name.clone()
    }

    fn stack_count(&self, e: usize) -> u32 {
        self.entities[e].stack
    }

    fn parent(&self, e: usize) -> Option<usize> {
        self.entities[e].parent
    }

    fn slot_of(&self, e: usize) -> Option<String> {
        self.entities[e].slot.clone()
    }

    fn vessel(&self, e: usize) -> Option<u32> {
        let ent = &self.entities[e];
        ent.vessel.or_else(|| ent.parent.and_then(|p| self.vessel(p)))
    }

    fn vessel_entities(&self, vessel: u32) -> Vec<usize> {
        (0..self.entities.len())
            .filter(|&e| self.entities[e].alive && self.vessel(e) == Some(vessel))
            .collect()
    }

    fn has_cond(&self, e: usize, cond: Cond) -> bool {
        self.entities[e].conds.contains(&cond)
    }

    fn stat(&self, e: usize, stat: Stat) -> f64 {
        self.entities[e].stats.get(&stat).copied().unwrap_or(0.0)
    }

    fn has_storage(&self, e: usize) -> bool {
        self.entities[e].cells.is_some()
    }

    fn contents(&self, container: usize) -> Vec<usize> {
        self.children(container)
            .filter(|&c| self.entities[c].slot.is_none())
            .collect()
    }

    fn can_fit(&self, container: usize, _item: usize) -> bool {
        self.empty_cells(container) > 0
    }

    fn can_stack_onto(&self, existing: usize, item: usize) -> bool {
        let a = &self.entities[existing];
        let b = &self.entities[item];
        existing != item
            && a.def == b.def
            && a.stack < a.max_stack
            && a.conds.contains(&Cond::Damaged) == b.conds.contains(&Cond::Damaged)
    }

    fn empty_cells(&self, container: usize) -> usize {
        let cells = self.entities[container].cells.unwrap_or(0);
        cells.saturating_sub(self.contents(container).len())
    }

    fn remove_from_home(&mut self, item: usize) -> Result<(), HostError> {
        self.live(item)?;
        self.detach(item);
        Ok(())
    }

    fn add_to_storage(&mut self, container: usize, item: usize) -> Result<Option<usize>, HostError> {
        self.live(container)?;
        self.live(item)?;
        if self.entities[container].cells.is_none() {
            return Err(HostError::NoStorage(self.entities[container].id.clone()));
        }
        if self.fail_adds {
            return Err(HostError::Rejected("add failed".into()));
        }
        self.detach(item);

        let targets: Vec<usize> = self
            .contents(container)
            .into_iter()
            .filter(|&c| self.can_stack_onto(c, item))
            .collect();
        for target in targets {
            let room = self.entities[target].max_stack - self.entities[target].stack;
            let moved = room.min(self.entities[item].stack);
            self.entities[target].stack += moved;
            self.entities[item].stack -= moved;
            if self.entities[item].stack == 0 {
                self.entities[item].alive = false;
                return Ok(None);
            }
        }

        if self.empty_cells(container) > 0 {
            self.entities[item].parent = Some(container);
            Ok(None)
        } else {
            Ok(Some(item))
        }
    }

    fn set_down_near(&mut self, anchor: usize, item: usize) -> Result<(), HostError> {
        self.live(item)?;
        let tile = self.tile_of(anchor);
        let vessel = self.vessel(anchor);
        self.detach(item);
        self.entities[item].tile = tile;
        self.entities[item].vessel = vessel;
        Ok(())
    }

    fn split_unit(&mut self, stack: usize) -> Result<usize, HostError> {
        self.live(stack)?;
        if self.entities[stack].stack <= 1 {
            return Ok(stack);
        }
        self.entities[stack].stack -= 1;
        self.split_serial += 1;
        let mut unit = self.entities[stack].clone();
        unit.id = format!("{}#{}", unit.id, self.split_serial);
        unit.stack = 1;
        Ok(self.spawn(unit))
    }

    fn equipped_items(&self, character: usize) -> Vec<usize> {
        let mut items: Vec<usize> = self
            .children(character)
            .filter(|&c| self.entities[c].slot.is_some())
            .collect();
        items.sort_by_key(|&c| self.entities[c].slot.as_deref() != Some("hand"));
        items
    }

    fn slot_items(&self, character: usize, slot: &str) -> Vec<usize> {
        self.children(character)
            .filter(|&c| self.entities[c].slot.as_deref() == Some(slot))
            .collect()
    }

    fn inventory_items(&self, character: usize) -> Vec<usize> {
        let mut out = Vec::new();
        for child in self.children(character).collect::<Vec<_>>() {
            if self.entities[child].cells.is_some() {
                self.nested_contents(child, &mut out);
            }
        }
        out
    }

    fn line_of_sight(&self, from: usize, to: usize) -> bool {
        !self.blocked_sight.contains(&(from, to))
    }

    fn tile_of(&self, e: usize) -> Option<Tile> {
        let ent = &self.entities[e];
        ent.tile.or_else(|| ent.parent.and_then(|p| self.tile_of(p)))
    }

    fn surrounding_tiles(&self, (x, y): Tile) -> Vec<Tile> {
        let mut out = Vec::new();
        for dy in -1..=1 {
            for dx in -1..=1 {
                if dx != 0 || dy != 0 {
                    out.push((x + dx, y + dy));
                }
            }
        }
        out
    }

    fn is_walkable(&self, _character: usize, tile: Tile) -> bool {
        !self.walls.contains(&tile)
    }

    fn tile_distance(&self, a: Tile, b: Tile) -> f32 {
        let dx = (a.0 - b.0) as f32;
        let dy = (a.1 - b.1) as f32;
        (dx * dx + dy * dy).sqrt()
    }

    fn is_reachable(&self, _character: usize, target: usize) -> bool {
        !self.unreachable.contains(&target)
    }

    fn in_player_company(&self, character: usize) -> bool {
        self.entities[character].player_company
    }

    fn docked_vessels(&self, vessel: u32) -> Vec<u32> {
        self.docked
            .iter()
            .filter_map(|&(a, b)| match (a == vessel, b == vessel) {
                (true, _) => Some(b),
                (_, true) => Some(a),
                _ => None,
            })
            .collect()
    }

    fn owns_vessel(&self, character: usize, vessel: u32) -> bool {
        self.owned.contains(&(character, vessel))
    }

    fn stockpile_items(&self, vessel: u32) -> Vec<usize> {
        let mut items: Vec<usize> = self
            .stockpile
            .iter()
            .copied()
            .filter(|&e| self.entities[e].alive && self.vessel(e) == Some(vessel))
            .collect();
        items.sort_unstable();
        items
    }

    fn room_has_cond(&self, _character: usize, cond: Cond) -> bool {
        self.room_conds.contains(&cond)
    }
}
