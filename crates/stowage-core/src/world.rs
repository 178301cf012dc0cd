//! [`ShipWorld`]: the hecs world of vessels, characters, containers and
//! items, exposed to the stowage logic through [`Host`].
//!
//! Entities are addressed by their [`Identity`] id. Containment is stored
//! as a parent id ([`ContainedIn`]) rather than an `Entity`, so the whole
//! graph survives save/load unchanged. Only free-standing entities carry a
//! [`Position`]; stored and equipped items resolve theirs through the
//! holder chain.

use std::collections::{BTreeMap, HashMap};

use hecs::{Entity, EntityBuilder, World};
use stowage_logic::host::{Cond, Host, Stat};
use stowage_logic::HostError;

use crate::components::*;
use crate::error::WorldError;

/// Holder chains deeper than this are treated as broken.
const MAX_NESTING: usize = 32;

#[derive(Default)]
pub struct ShipWorld {
    pub world: World,
    decks: BTreeMap<VesselId, Deck>,
    index: HashMap<String, Entity>,
    split_serial: u32,
}

impl ShipWorld {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Decks ───────────────────────────────────────────────────────

    pub fn add_deck(&mut self, deck: Deck) {
        self.decks.insert(deck.vessel, deck);
    }

    pub fn deck(&self, vessel: VesselId) -> Option<&Deck> {
        self.decks.get(&vessel)
    }

    pub fn deck_mut(&mut self, vessel: VesselId) -> Option<&mut Deck> {
        self.decks.get_mut(&vessel)
    }

    pub fn decks(&self) -> impl Iterator<Item = &Deck> {
        self.decks.values()
    }

    /// Dock two vessels to each other.
    pub fn dock(&mut self, a: VesselId, b: VesselId) -> Result<(), WorldError> {
        if let Some(missing) = [a, b].into_iter().find(|v| !self.decks.contains_key(v)) {
            return Err(WorldError::UnknownVessel(missing));
        }
        for (from, to) in [(a, b), (b, a)] {
            let deck = self
                .decks
                .get_mut(&from)
                .ok_or(WorldError::UnknownVessel(from))?;
            if !deck.docked.contains(&to) {
                deck.docked.push(to);
            }
        }
        Ok(())
    }

    // ── Entities ────────────────────────────────────────────────────

    /// Spawn an entity with `identity` plus whatever `builder` holds.
    pub fn spawn(
        &mut self,
        identity: Identity,
        mut builder: EntityBuilder,
    ) -> Result<Entity, WorldError> {
        if self.index.contains_key(&identity.id) {
            return Err(WorldError::DuplicateId(identity.id));
        }
        let id = identity.id.clone();
        builder.add(identity);
        let entity = self.world.spawn(builder.build());
        self.index.insert(id, entity);
        Ok(entity)
    }

    pub fn despawn(&mut self, entity: Entity) -> Option<Identity> {
        let identity = self.world.get::<&Identity>(entity).ok().map(|i| (*i).clone())?;
        self.index.remove(&identity.id);
        let _ = self.world.despawn(entity);
        Some(identity)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Drop every entity and deck.
    pub fn clear(&mut self) {
        self.world.clear();
        self.decks.clear();
        self.index.clear();
        self.split_serial = 0;
    }

    /// Stand a free entity on a deck tile.
    pub fn place(&mut self, entity: Entity, position: Position) -> Result<(), WorldError> {
        self.require(entity)?;
        let _ = self.world.remove_one::<ContainedIn>(entity);
        let _ = self.world.insert_one(entity, position);
        Ok(())
    }

    /// Put `item` in `container`'s grid without any fit check.
    pub fn store_in(&mut self, item: Entity, container: Entity) -> Result<(), WorldError> {
        let parent_id = self.require(container)?;
        self.attach(item, ContainedIn::stored(parent_id))
    }

    /// Equip `item` on `holder` in a named slot.
    pub fn equip(&mut self, item: Entity, holder: Entity, slot: &str) -> Result<(), WorldError> {
        let parent_id = self.require(holder)?;
        self.attach(item, ContainedIn::equipped(parent_id, slot))
    }

    pub fn set_cond(&mut self, entity: Entity, cond: Cond, on: bool) {
        if let Ok(mut conds) = self.world.get::<&mut Conditions>(entity) {
            if on {
                conds.set(cond);
            } else {
                conds.clear(cond);
            }
            return;
        }
        if on {
            let _ = self.world.insert_one(entity, Conditions::of(&[cond]));
        }
    }

    pub fn set_stat(&mut self, entity: Entity, stat: Stat, value: f64) {
        if let Ok(mut stats) = self.world.get::<&mut Stats>(entity) {
            stats.set(stat, value);
            return;
        }
        let _ = self.world.insert_one(entity, Stats::default().with(stat, value));
    }

    pub fn set_stack_count(&mut self, entity: Entity, count: u32) {
        if let Ok(mut stack) = self.world.get::<&mut Stack>(entity) {
            stack.count = count;
        }
    }

    pub fn position(&self, entity: Entity) -> Option<Position> {
        self.root_position(entity)
    }

    /// Every character, in spawn order.
    pub fn characters(&self) -> Vec<Entity> {
        let mut out: Vec<Entity> = self
            .world
            .query::<&Character>()
            .iter()
            .map(|(e, _)| e)
            .collect();
        out.sort_by_key(|e| e.id());
        out
    }

    // ── Internals ───────────────────────────────────────────────────

    fn id_of(&self, entity: Entity) -> Option<String> {
        self.world.get::<&Identity>(entity).ok().map(|i| i.id.clone())
    }

    fn require(&self, entity: Entity) -> Result<String, WorldError> {
        self.id_of(entity)
            .ok_or_else(|| WorldError::UnknownEntity(format!("{:?}", entity)))
    }

    fn live(&self, entity: Entity) -> Result<(), HostError> {
        if self.world.contains(entity) {
            Ok(())
        } else {
            Err(HostError::MissingEntity(format!("{:?}", entity)))
        }
    }

    fn attach(&mut self, item: Entity, link: ContainedIn) -> Result<(), WorldError> {
        self.require(item)?;
        let _ = self.world.remove_one::<Position>(item);
        let _ = self.world.insert_one(item, link);
        Ok(())
    }

    fn detach(&mut self, item: Entity) {
        let _ = self.world.remove_one::<ContainedIn>(item);
        let _ = self.world.remove_one::<Position>(item);
    }

    fn link(&self, entity: Entity) -> Option<ContainedIn> {
        self.world.get::<&ContainedIn>(entity).ok().map(|c| (*c).clone())
    }

    fn holder(&self, entity: Entity) -> Option<Entity> {
        let link = self.link(entity)?;
        self.index.get(&link.parent_id).copied()
    }

    fn ancestors(&self, entity: Entity) -> impl Iterator<Item = Entity> + '_ {
        std::iter::successors(self.holder(entity), move |&e| self.holder(e)).take(MAX_NESTING)
    }

    fn root_position(&self, entity: Entity) -> Option<Position> {
        std::iter::once(entity)
            .chain(self.ancestors(entity))
            .find_map(|e| self.world.get::<&Position>(e).ok().map(|p| *p))
    }

    fn is_carried(&self, entity: Entity) -> bool {
        self.ancestors(entity)
            .any(|e| self.world.get::<&Character>(e).is_ok())
    }

    /// Direct children of `parent` with their slot, in spawn order.
    fn children(&self, parent: Entity) -> Vec<(Entity, Option<String>)> {
        let Some(parent_id) = self.id_of(parent) else {
            return Vec::new();
        };
        let mut out: Vec<(Entity, Option<String>)> = self
            .world
            .query::<&ContainedIn>()
            .iter()
            .filter(|(_, link)| link.parent_id == parent_id)
            .map(|(e, link)| (e, link.slot.clone()))
            .collect();
        out.sort_by_key(|(e, _)| e.id());
        out
    }

    fn stack(&self, entity: Entity) -> Option<Stack> {
        self.world.get::<&Stack>(entity).ok().map(|s| *s)
    }

    fn conds(&self, entity: Entity) -> Conditions {
        self.world
            .get::<&Conditions>(entity)
            .ok()
            .map(|c| *c)
            .unwrap_or_default()
    }

    fn deck_of(&self, entity: Entity) -> Option<&Deck> {
        self.decks.get(&self.root_position(entity)?.vessel)
    }

    fn nested_contents(&self, root: Entity, out: &mut Vec<Entity>) {
        let root_stores = self.has_storage(root);
        for (child, slot) in self.children(root) {
            if root_stores && slot.is_none() {
                out.push(child);
            }
            if self.has_storage(child) {
                self.nested_contents(child, out);
            }
        }
    }
}

impl Host for ShipWorld {
    type Entity = Entity;
    type Vessel = VesselId;
    type Tile = Tile;

    fn lookup(&self, id: &str) -> Option<Entity> {
        self.index.get(id).copied().filter(|&e| self.world.contains(e))
    }

    fn stable_id(&self, entity: Entity) -> Option<String> {
        self.id_of(entity)
    }

    fn def_id(&self, entity: Entity) -> Option<String> {
        self.world.get::<&Identity>(entity).ok().map(|i| i.def.clone())
    }

    fn display_name(&self, entity: Entity) -> String {
        self.world
            .get::<&Identity>(entity)
            .ok()
            .map(|i| i.name.clone())
            .unwrap_or_else(|| format!("{:?}", entity))
    }

    fn stack_count(&self, entity: Entity) -> u32 {
        self.stack(entity).map_or(1, |s| s.count)
    }

    fn parent(&self, entity: Entity) -> Option<Entity> {
        self.holder(entity)
    }

    fn slot_of(&self, entity: Entity) -> Option<String> {
        self.link(entity).and_then(|link| link.slot)
    }

    fn vessel(&self, entity: Entity) -> Option<VesselId> {
        self.root_position(entity).map(|p| p.vessel)
    }

    fn vessel_entities(&self, vessel: VesselId) -> Vec<Entity> {
        let mut out: Vec<Entity> = self
            .world
            .iter()
            .map(|e| e.entity())
            .filter(|&e| self.vessel(e) == Some(vessel))
            .collect();
        out.sort_by_key(|e| e.id());
        out
    }

    fn has_cond(&self, entity: Entity, cond: Cond) -> bool {
        if cond == Cond::Carried && self.is_carried(entity) {
            return true;
        }
        self.conds(entity).has(cond)
    }

    fn stat(&self, entity: Entity, stat: Stat) -> f64 {
        self.world
            .get::<&Stats>(entity)
            .ok()
            .map_or(0.0, |s| s.get(stat))
    }

    // ── Storage ─────────────────────────────────────────────────────

    fn has_storage(&self, entity: Entity) -> bool {
        self.world.get::<&Storage>(entity).is_ok()
    }

    fn contents(&self, container: Entity) -> Vec<Entity> {
        self.children(container)
            .into_iter()
            .filter(|(_, slot)| slot.is_none())
            .map(|(e, _)| e)
            .collect()
    }

    fn can_fit(&self, container: Entity, _item: Entity) -> bool {
        self.has_storage(container) && self.empty_cells(container) > 0
    }

    fn can_stack_onto(&self, existing: Entity, item: Entity) -> bool {
        if existing == item || self.def_id(existing) != self.def_id(item) {
            return false;
        }
        let (Some(target), Some(_)) = (self.stack(existing), self.stack(item)) else {
            return false;
        };
        target.room() > 0
            && self.conds(existing).has(Cond::Damaged) == self.conds(item).has(Cond::Damaged)
    }

    fn empty_cells(&self, container: Entity) -> usize {
        let Ok(storage) = self.world.get::<&Storage>(container).map(|s| *s) else {
            return 0;
        };
        storage.cells().saturating_sub(self.contents(container).len())
    }

    fn remove_from_home(&mut self, item: Entity) -> Result<(), HostError> {
        self.live(item)?;
        self.detach(item);
        Ok(())
    }

    fn add_to_storage(
        &mut self,
        container: Entity,
        item: Entity,
    ) -> Result<Option<Entity>, HostError> {
        self.live(container)?;
        self.live(item)?;
        if !self.has_storage(container) {
            return Err(HostError::NoStorage(self.display_name(container)));
        }
        let Some(parent_id) = self.id_of(container) else {
            return Err(HostError::MissingEntity(format!("{:?}", container)));
        };
        self.detach(item);

        let targets: Vec<Entity> = self
            .contents(container)
            .into_iter()
            .filter(|&c| self.can_stack_onto(c, item))
            .collect();
        for target in targets {
            let (Some(mut into), Some(mut from)) = (self.stack(target), self.stack(item)) else {
                continue;
            };
            let moved = into.room().min(from.count);
            into.count += moved;
            from.count -= moved;
            self.set_stack_count(target, into.count);
            self.set_stack_count(item, from.count);
            if from.count == 0 {
                self.despawn(item);
                return Ok(None);
            }
        }

        if self.empty_cells(container) > 0 {
            let _ = self.world.insert_one(item, ContainedIn::stored(parent_id));
            Ok(None)
        } else {
            Ok(Some(item))
        }
    }

    fn set_down_near(&mut self, anchor: Entity, item: Entity) -> Result<(), HostError> {
        self.live(item)?;
        let Some(position) = self.root_position(anchor) else {
            let name = self.display_name(anchor);
            return Err(HostError::Rejected(format!("{} has no position", name)));
        };
        self.detach(item);
        let _ = self.world.insert_one(item, position);
        Ok(())
    }

    fn split_unit(&mut self, stack: Entity) -> Result<Entity, HostError> {
        self.live(stack)?;
        let Some(mut whole) = self.stack(stack).filter(|s| s.count > 1) else {
            return Ok(stack);
        };
        let Ok(identity) = self.world.get::<&Identity>(stack).map(|i| (*i).clone()) else {
            return Err(HostError::MissingEntity(format!("{:?}", stack)));
        };
        whole.count -= 1;
        self.set_stack_count(stack, whole.count);

        self.split_serial += 1;
        let unit_id = format!("{}#{}", identity.id, self.split_serial);
        let mut builder = EntityBuilder::new();
        builder.add(Stack::new(1, whole.max)).add(self.conds(stack));
        if let Ok(stats) = self.world.get::<&Stats>(stack).map(|s| (*s).clone()) {
            builder.add(stats);
        }
        self.spawn(
            Identity {
                id: unit_id,
                ..identity
            },
            builder,
        )
        .map_err(|e| HostError::Rejected(e.to_string()))
    }

    // ── Inventory ───────────────────────────────────────────────────

    fn equipped_items(&self, character: Entity) -> Vec<Entity> {
        let mut items: Vec<(Entity, String)> = self
            .children(character)
            .into_iter()
            .filter_map(|(e, slot)| slot.map(|s| (e, s)))
            .collect();
        items.sort_by_key(|(_, slot)| slot != "hand");
        items.into_iter().map(|(e, _)| e).collect()
    }

    fn slot_items(&self, character: Entity, slot: &str) -> Vec<Entity> {
        self.children(character)
            .into_iter()
            .filter(|(_, s)| s.as_deref() == Some(slot))
            .map(|(e, _)| e)
            .collect()
    }

    fn inventory_items(&self, character: Entity) -> Vec<Entity> {
        let mut out = Vec::new();
        for (child, _) in self.children(character) {
            if self.has_storage(child) {
                self.nested_contents(child, &mut out);
            }
        }
        out
    }

    // ── Space ───────────────────────────────────────────────────────

    fn line_of_sight(&self, from: Entity, to: Entity) -> bool {
        let (Some(a), Some(b)) = (self.root_position(from), self.root_position(to)) else {
            return false;
        };
        if a.vessel != b.vessel {
            return false;
        }
        self.decks
            .get(&a.vessel)
            .is_some_and(|deck| deck.line_of_sight(a.tile, b.tile))
    }

    fn tile_of(&self, entity: Entity) -> Option<Tile> {
        self.root_position(entity).map(|p| p.tile)
    }

    fn surrounding_tiles(&self, tile: Tile) -> Vec<Tile> {
        tile.neighbours()
    }

    fn is_walkable(&self, character: Entity, tile: Tile) -> bool {
        self.deck_of(character).is_some_and(|deck| deck.is_walkable(tile))
    }

    fn tile_distance(&self, a: Tile, b: Tile) -> f32 {
        a.distance(&b)
    }

    fn is_reachable(&self, character: Entity, target: Entity) -> bool {
        let (Some(from), Some(to)) = (self.root_position(character), self.root_position(target))
        else {
            return false;
        };
        if from.vessel != to.vessel {
            // Docked vessels connect through their airlocks.
            return self
                .decks
                .get(&from.vessel)
                .is_some_and(|deck| deck.docked.contains(&to.vessel));
        }
        let Some(deck) = self.decks.get(&from.vessel) else {
            return false;
        };
        let mut goals: Vec<Tile> = to
            .tile
            .neighbours()
            .into_iter()
            .filter(|&t| deck.is_walkable(t))
            .collect();
        goals.push(to.tile);
        deck.path_exists(from.tile, &goals)
    }

    // ── Ownership & environment ─────────────────────────────────────

    fn in_player_company(&self, character: Entity) -> bool {
        self.world
            .get::<&Character>(character)
            .is_ok_and(|c| c.player_company)
    }

    fn docked_vessels(&self, vessel: VesselId) -> Vec<VesselId> {
        self.decks
            .get(&vessel)
            .map(|deck| deck.docked.clone())
            .unwrap_or_default()
    }

    fn owns_vessel(&self, character: Entity, vessel: VesselId) -> bool {
        self.in_player_company(character)
            && self.decks.get(&vessel).is_some_and(|deck| deck.player_owned)
    }

    fn stockpile_items(&self, vessel: VesselId) -> Vec<Entity> {
        let Some(deck) = self.decks.get(&vessel) else {
            return Vec::new();
        };
        let mut out: Vec<Entity> = self
            .world
            .query::<&Position>()
            .without::<&Character>()
            .iter()
            .filter(|(_, p)| p.vessel == vessel && deck.stockpile.contains(&p.tile))
            .map(|(e, _)| e)
            .collect();
        out.sort_by_key(|e| e.id());
        out
    }

    fn room_has_cond(&self, character: Entity, cond: Cond) -> bool {
        self.deck_of(character).is_some_and(|deck| deck.atmosphere.has(cond))
    }
}
