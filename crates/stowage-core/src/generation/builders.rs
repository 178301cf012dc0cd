//! Entity builders for items, containers, characters and EVA suits.

use hecs::{Entity, EntityBuilder};
use stowage_logic::host::{Cond, Host, Stat, HELMET_SLOT, SUIT_SLOT};

use crate::components::*;
use crate::error::WorldError;
use crate::world::ShipWorld;

/// Definition id used for generic storage lockers.
pub const LOCKER_DEF: &str = "ItmLocker";
pub const CHARGER_DEF: &str = "ItmChargerEVA";
pub const BATTERY_DEF: &str = "ItmBatteryEVA";
pub const O2_BOTTLE_DEF: &str = "ItmO2BottleEVA";

/// Description of an item-like entity before it is spawned.
#[derive(Debug, Clone)]
pub struct ItemSpec {
    identity: Identity,
    stack: Stack,
    conds: Conditions,
    stats: Stats,
    storage: Option<Storage>,
}

impl ItemSpec {
    pub fn new(id: impl Into<String>, def: impl Into<String>) -> Self {
        Self {
            identity: Identity::new(id, def),
            stack: Stack::new(1, 1),
            conds: Conditions::default(),
            stats: Stats::default(),
            storage: None,
        }
    }

    /// A storage locker with a `width` x `height` grid.
    pub fn locker(id: impl Into<String>, width: u32, height: u32) -> Self {
        Self::new(id, LOCKER_DEF).named("Locker").storage(width, height)
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.identity.name = name.into();
        self
    }

    pub fn count(mut self, count: u32, max_stack: u32) -> Self {
        self.stack = Stack::new(count, max_stack);
        self
    }

    pub fn cond(mut self, cond: Cond) -> Self {
        self.conds.set(cond);
        self
    }

    pub fn stat(mut self, stat: Stat, value: f64) -> Self {
        self.stats.set(stat, value);
        self
    }

    pub fn storage(mut self, width: u32, height: u32) -> Self {
        self.storage = Some(Storage::new(width, height));
        self
    }

    /// Spawn without a position; place, store or equip it afterwards.
    pub fn spawn(self, world: &mut ShipWorld) -> Result<Entity, WorldError> {
        let mut builder = EntityBuilder::new();
        builder.add(self.stack).add(self.conds).add(self.stats);
        if let Some(storage) = self.storage {
            builder.add(storage);
        }
        world.spawn(self.identity, builder)
    }

    pub fn spawn_at(self, world: &mut ShipWorld, at: Position) -> Result<Entity, WorldError> {
        let entity = self.spawn(world)?;
        world.place(entity, at)?;
        Ok(entity)
    }

    pub fn spawn_in(self, world: &mut ShipWorld, container: Entity) -> Result<Entity, WorldError> {
        let entity = self.spawn(world)?;
        world.store_in(entity, container)?;
        Ok(entity)
    }
}

pub fn spawn_character(
    world: &mut ShipWorld,
    id: &str,
    name: &str,
    character: Character,
    at: Position,
) -> Result<Entity, WorldError> {
    let mut builder = EntityBuilder::new();
    builder.add(character).add(Conditions::default()).add(at);
    world.spawn(Identity::new(id, "CrewBase").named(name), builder)
}

/// A battery at `charge` (0..=1) of a 100 unit capacity.
pub fn battery(id: impl Into<String>, charge: f64) -> ItemSpec {
    ItemSpec::new(id, BATTERY_DEF)
        .named("EVA Battery")
        .cond(Cond::EvaBattery)
        .stat(Stat::PowerMax, 100.0)
        .stat(Stat::Power, 100.0 * charge)
}

/// An O2 bottle at `charge` (0..=1) of a 50 mol reference.
pub fn o2_bottle(id: impl Into<String>, charge: f64) -> ItemSpec {
    ItemSpec::new(id, O2_BOTTLE_DEF)
        .named("O2 Bottle")
        .cond(Cond::EvaBottle)
        .stat(Stat::GasRef, 50.0)
        .stat(Stat::GasMolO2, 50.0 * charge)
}

/// A battery charger holding `slots` batteries.
pub fn charger(id: impl Into<String>, slots: u32) -> ItemSpec {
    ItemSpec::new(id, CHARGER_DEF)
        .named("EVA Charger")
        .cond(Cond::EvaCharger)
        .storage(slots, 1)
}

/// Entities making up a worn EVA suit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvaSuit {
    pub suit: Entity,
    pub helmet: Entity,
    pub battery: Entity,
    pub bottle: Entity,
}

/// Dress `character` in a sealed suit and helmet with a battery and a
/// bottle at the given charge levels.
pub fn fit_eva_suit(
    world: &mut ShipWorld,
    character: Entity,
    battery_charge: f64,
    o2_charge: f64,
) -> Result<EvaSuit, WorldError> {
    let owner = world
        .stable_id(character)
        .ok_or_else(|| WorldError::UnknownEntity(format!("{:?}", character)))?;
    let suit = ItemSpec::new(format!("{}-suit", owner), "OutfitEVA01")
        .named("EVA Suit")
        .cond(Cond::EvaOn)
        .spawn(world)?;
    world.equip(suit, character, SUIT_SLOT)?;
    let helmet = ItemSpec::new(format!("{}-helmet", owner), "OutfitHelmetEVA01")
        .named("EVA Helmet")
        .spawn(world)?;
    world.equip(helmet, character, HELMET_SLOT)?;

    let battery_pocket = ItemSpec::new(format!("{}-suit-battery", owner), "SlotEVABattery")
        .storage(1, 1)
        .spawn(world)?;
    world.equip(battery_pocket, suit, "battery")?;
    let bottle_pocket = ItemSpec::new(format!("{}-suit-bottle", owner), "SlotEVABottle")
        .storage(1, 1)
        .spawn(world)?;
    world.equip(bottle_pocket, suit, "bottle")?;

    let battery =
        battery(format!("{}-battery", owner), battery_charge).spawn_in(world, battery_pocket)?;
    let bottle =
        o2_bottle(format!("{}-bottle", owner), o2_charge).spawn_in(world, bottle_pocket)?;
    Ok(EvaSuit {
        suit,
        helmet,
        battery,
        bottle,
    })
}
