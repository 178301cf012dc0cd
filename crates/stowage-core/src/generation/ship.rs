//! Deck generation - a walled deck with lockers, a charger and a stockpile
//! zone.

use hecs::Entity;
use rand::Rng;
use stowage_logic::host::Cond;

use super::builders::{battery, charger, o2_bottle, ItemSpec};
use crate::components::{Deck, Position, Tile, VesselId};
use crate::error::WorldError;
use crate::world::ShipWorld;

/// Configuration for deck generation
#[derive(Debug, Clone)]
pub struct ShipConfig {
    pub name: String,
    pub width: i32,
    pub height: i32,
    pub lockers: u32,
    /// Spare batteries placed in the charger.
    pub spare_batteries: u32,
    /// Spare O2 bottles lying in the stockpile zone.
    pub spare_bottles: u32,
}

impl Default for ShipConfig {
    fn default() -> Self {
        Self {
            name: "Salvage Tug".to_string(),
            width: 24,
            height: 16,
            lockers: 4,
            spare_batteries: 2,
            spare_bottles: 2,
        }
    }
}

/// What was generated on a vessel.
#[derive(Debug, Clone, Default)]
pub struct ShipLayout {
    pub lockers: Vec<Entity>,
    pub charger: Option<Entity>,
    pub spares: Vec<Entity>,
}

/// Generate a deck for `vessel` in the world.
///
/// Lockers line the top wall, the charger sits in the top-right corner and
/// the bottom-left corner is a 3x3 stockpile zone.
pub fn generate_ship(
    world: &mut ShipWorld,
    vessel: VesselId,
    config: &ShipConfig,
    rng: &mut impl Rng,
) -> Result<ShipLayout, WorldError> {
    let mut deck =
        Deck::new(vessel, &config.name, config.width, config.height).with_breathable_air();
    deck.wall_rect(Tile::new(0, 0), Tile::new(config.width - 1, config.height - 1));
    for x in 1..4 {
        for y in (config.height - 4)..(config.height - 1) {
            deck.stockpile.insert(Tile::new(x, y));
        }
    }
    world.add_deck(deck);

    let prefix = format!("V{}", vessel.0);
    let mut layout = ShipLayout::default();

    let max_lockers = ((config.width - 4) / 2).max(0) as u32;
    for i in 0..config.lockers.min(max_lockers) {
        let (w, h) = (rng.gen_range(2..=4), rng.gen_range(1..=3));
        let at = Position::new(vessel, 2 + 2 * i as i32, 1);
        let locker =
            ItemSpec::locker(format!("{}-locker{}", prefix, i + 1), w, h).spawn_at(world, at)?;
        layout.lockers.push(locker);
    }

    let charger_at = Position::new(vessel, config.width - 2, 1);
    let unit = charger(format!("{}-charger", prefix), config.spare_batteries.max(1))
        .spawn_at(world, charger_at)?;
    for i in 0..config.spare_batteries {
        let charge = rng.gen_range(0.4..=1.0);
        let spare = battery(format!("{}-battery{}", prefix, i + 1), charge).spawn_in(world, unit)?;
        layout.spares.push(spare);
    }
    layout.charger = Some(unit);

    for i in 0..config.spare_bottles {
        let charge = rng.gen_range(0.4..=1.0);
        let at = Position::new(vessel, 1 + (i % 3) as i32, config.height - 2);
        let spare = o2_bottle(format!("{}-bottle{}", prefix, i + 1), charge)
            .cond(Cond::Loose)
            .spawn_at(world, at)?;
        layout.spares.push(spare);
    }

    log::info!(
        "Generated {} with {} lockers and {} spares",
        config.name,
        layout.lockers.len(),
        layout.spares.len()
    );
    Ok(layout)
}
