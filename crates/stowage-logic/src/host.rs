//! The collaborator surface the logic consumes from the host simulation.
//!
//! Everything the hauling, delivery and EVA code knows about items,
//! containers, characters and vessels goes through [`Host`]. The host owns
//! the object graph; the logic only queries it and asks it to move things.
//!
//! Condition and stat identifiers are data-driven strings in the host. They
//! are mapped once onto the [`Cond`] and [`Stat`] enums so matching never
//! compares strings.

use std::fmt::Debug;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::error::HostError;

/// Named boolean conditions the logic tests on entities and rooms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Cond {
    Carried = 0,
    Damaged = 1,
    Loose = 2,
    Locked = 3,
    TraderNpc = 4,
    Haulable = 5,
    AiManual = 6,
    InCombat = 7,
    Busy = 8,
    EvaOn = 9,
    EvaBattery = 10,
    EvaBottle = 11,
    EvaCharger = 12,
    GasPpO2 = 13,
    GasPpCo2 = 14,
    GasPpH2So4 = 15,
    GasPpCh4 = 16,
    GasPpNh3 = 17,
    GasTempOk = 18,
}

impl Cond {
    pub const ALL: [Cond; 19] = [
        Cond::Carried,
        Cond::Damaged,
        Cond::Loose,
        Cond::Locked,
        Cond::TraderNpc,
        Cond::Haulable,
        Cond::AiManual,
        Cond::InCombat,
        Cond::Busy,
        Cond::EvaOn,
        Cond::EvaBattery,
        Cond::EvaBottle,
        Cond::EvaCharger,
        Cond::GasPpO2,
        Cond::GasPpCo2,
        Cond::GasPpH2So4,
        Cond::GasPpCh4,
        Cond::GasPpNh3,
        Cond::GasTempOk,
    ];

    /// The host's string identifier for this condition or trigger.
    pub fn name(self) -> &'static str {
        match self {
            Cond::Carried => "IsCarried",
            Cond::Damaged => "IsDamaged",
            Cond::Loose => "TIsLoose",
            Cond::Locked => "Locked",
            Cond::TraderNpc => "IsTraderNPC",
            Cond::Haulable => "TIsHaulable",
            Cond::AiManual => "IsAIManual",
            Cond::InCombat => "IsInCombat",
            Cond::Busy => "IsBusy",
            Cond::EvaOn => "TIsEVAOn",
            Cond::EvaBattery => "TIsFitContainerEVABattery",
            Cond::EvaBottle => "TIsFitContainerEVABottle",
            Cond::EvaCharger => "IsChargerEVA",
            Cond::GasPpO2 => "DcGasPpO2",
            Cond::GasPpCo2 => "DcGasPpCO2",
            Cond::GasPpH2So4 => "DcGasPpH2SO4",
            Cond::GasPpCh4 => "DcGasPpCH4",
            Cond::GasPpNh3 => "DcGasPpNH3",
            Cond::GasTempOk => "DcGasTemp02",
        }
    }

    pub fn from_name(name: &str) -> Option<Cond> {
        Cond::ALL.iter().copied().find(|c| c.name() == name)
    }

    /// Bit position used by compact condition sets.
    pub fn bit(self) -> u32 {
        1 << (self as u8)
    }
}

/// Numeric stats read from consumables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Stat {
    Power,
    PowerMax,
    GasMolO2,
    GasRef,
}

impl Stat {
    pub fn name(self) -> &'static str {
        match self {
            Stat::Power => "StatPower",
            Stat::PowerMax => "StatPowerMax",
            Stat::GasMolO2 => "StatGasMolO2",
            Stat::GasRef => "StatRef",
        }
    }
}

/// Slot name an EVA suit is worn in.
pub const SUIT_SLOT: &str = "shirt_out";
/// Slot name an EVA helmet is worn in.
pub const HELMET_SLOT: &str = "head_out";
/// Slot holding whatever a character is dragging.
pub const DRAG_SLOT: &str = "drag";

/// Host simulation capabilities.
///
/// All calls are synchronous and run on the host's simulation thread.
/// Mutating calls are fallible; a failure is reported as [`HostError`].
pub trait Host {
    type Entity: Copy + Eq + Hash + Debug;
    type Vessel: Copy + Eq + Debug;
    type Tile: Copy + Eq + Debug;

    // ── Attributes ──────────────────────────────────────────────────

    /// Resolve a stable identifier to a live entity.
    fn lookup(&self, id: &str) -> Option<Self::Entity>;
    fn stable_id(&self, entity: Self::Entity) -> Option<String>;
    /// Type (definition) identifier shared by every instance of an item.
    fn def_id(&self, entity: Self::Entity) -> Option<String>;
    fn display_name(&self, entity: Self::Entity) -> String;
    fn stack_count(&self, entity: Self::Entity) -> u32;
    /// The entity this one is stored in or equipped on.
    fn parent(&self, entity: Self::Entity) -> Option<Self::Entity>;
    /// Name of the equipment slot the entity occupies, if any.
    fn slot_of(&self, entity: Self::Entity) -> Option<String>;
    fn vessel(&self, entity: Self::Entity) -> Option<Self::Vessel>;
    /// Every entity on the vessel, nested ones included.
    fn vessel_entities(&self, vessel: Self::Vessel) -> Vec<Self::Entity>;
    fn has_cond(&self, entity: Self::Entity, cond: Cond) -> bool;
    fn stat(&self, entity: Self::Entity, stat: Stat) -> f64;

    // ── Storage ─────────────────────────────────────────────────────

    fn has_storage(&self, entity: Self::Entity) -> bool;
    /// Items directly inside a storage entity.
    fn contents(&self, container: Self::Entity) -> Vec<Self::Entity>;
    /// Whether `item` fits into unused space of `container`.
    fn can_fit(&self, container: Self::Entity, item: Self::Entity) -> bool;
    /// Whether `item` can be merged onto the `existing` stack.
    fn can_stack_onto(&self, existing: Self::Entity, item: Self::Entity) -> bool;
    /// Number of unoccupied grid cells in a container.
    fn empty_cells(&self, container: Self::Entity) -> usize;
    fn remove_from_home(&mut self, item: Self::Entity) -> Result<(), HostError>;
    /// Add an item, detaching it from its current home first. Merges onto a
    /// compatible stack when possible. Returns what the container refused.
    fn add_to_storage(
        &mut self,
        container: Self::Entity,
        item: Self::Entity,
    ) -> Result<Option<Self::Entity>, HostError>;
    /// Put an item loose on the floor next to `anchor`.
    fn set_down_near(&mut self, anchor: Self::Entity, item: Self::Entity) -> Result<(), HostError>;
    /// Split a single unit off a stack. A stack of one is returned as is.
    fn split_unit(&mut self, stack: Self::Entity) -> Result<Self::Entity, HostError>;

    // ── Inventory ───────────────────────────────────────────────────

    /// Items in the character's equipment slots, hands first.
    fn equipped_items(&self, character: Self::Entity) -> Vec<Self::Entity>;
    fn slot_items(&self, character: Self::Entity, slot: &str) -> Vec<Self::Entity>;
    /// Items anywhere in the character's carried containers.
    fn inventory_items(&self, character: Self::Entity) -> Vec<Self::Entity>;

    // ── Space ───────────────────────────────────────────────────────

    fn line_of_sight(&self, from: Self::Entity, to: Self::Entity) -> bool;
    fn tile_of(&self, entity: Self::Entity) -> Option<Self::Tile>;
    fn surrounding_tiles(&self, tile: Self::Tile) -> Vec<Self::Tile>;
    fn is_walkable(&self, character: Self::Entity, tile: Self::Tile) -> bool;
    fn tile_distance(&self, a: Self::Tile, b: Self::Tile) -> f32;
    fn is_reachable(&self, character: Self::Entity, target: Self::Entity) -> bool;

    // ── Ownership & environment ─────────────────────────────────────

    fn in_player_company(&self, character: Self::Entity) -> bool;
    fn docked_vessels(&self, vessel: Self::Vessel) -> Vec<Self::Vessel>;
    fn owns_vessel(&self, character: Self::Entity, vessel: Self::Vessel) -> bool;
    /// Loose items lying in the vessel's stockpile zones.
    fn stockpile_items(&self, vessel: Self::Vessel) -> Vec<Self::Entity>;
    /// Condition test on the room the character stands in.
    fn room_has_cond(&self, character: Self::Entity, cond: Cond) -> bool;
}
