//! Cargo generation - loose haulable stacks scattered over a deck.

use hecs::Entity;
use rand::seq::SliceRandom;
use rand::Rng;
use stowage_logic::host::Cond;

use super::builders::ItemSpec;
use crate::components::{Position, Tile, VesselId};
use crate::error::WorldError;
use crate::world::ShipWorld;

/// Cargo definitions: (definition id, display name, max stack).
pub static CARGO_DEFS: &[(&str, &str, u32)] = &[
    ("ItmWrench01", "Wrench", 10),
    ("ItmScrewdriver01", "Screwdriver", 10),
    ("ItmSteelPlate", "Steel Plate", 20),
    ("ItmWireSpool", "Wire Spool", 15),
    ("ItmRationPack", "Ration Pack", 30),
    ("ItmMedkit", "Medkit", 5),
    ("ItmFuseBox", "Fuse Box", 8),
];

/// Scatter `count` haulable stacks on free walkable tiles of `vessel`.
pub fn generate_cargo(
    world: &mut ShipWorld,
    vessel: VesselId,
    count: u32,
    rng: &mut impl Rng,
) -> Result<Vec<Entity>, WorldError> {
    let deck = world
        .deck(vessel)
        .ok_or(WorldError::UnknownVessel(vessel))?;
    let mut tiles: Vec<Tile> = (0..deck.height)
        .flat_map(|y| (0..deck.width).map(move |x| Tile::new(x, y)))
        .filter(|&t| deck.is_walkable(t) && !deck.stockpile.contains(&t))
        // Keep the row in front of the lockers clear.
        .filter(|t| t.y > 2)
        .collect();
    tiles.shuffle(rng);

    let mut cargo = Vec::new();
    for (i, tile) in tiles.into_iter().take(count as usize).enumerate() {
        let Some(&(def, name, max)) = CARGO_DEFS.choose(rng) else {
            break;
        };
        let stack = rng.gen_range(1..=max);
        let item = ItemSpec::new(format!("V{}-cargo{}", vessel.0, i + 1), def)
            .named(name)
            .count(stack, max)
            .cond(Cond::Haulable)
            .spawn_at(world, Position { vessel, tile })?;
        cargo.push(item);
    }
    log::debug!("Scattered {} cargo stacks on vessel {}", cargo.len(), vessel.0);
    Ok(cargo)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::{generate_ship, ShipConfig};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use stowage_logic::host::Host;

    #[test]
    fn test_generate_cargo() {
        let mut world = ShipWorld::new();
        let mut rng = StdRng::seed_from_u64(3);
        generate_ship(&mut world, VesselId(1), &ShipConfig::default(), &mut rng).unwrap();
        let cargo = generate_cargo(&mut world, VesselId(1), 12, &mut rng).unwrap();

        assert_eq!(cargo.len(), 12);
        let deck = world.deck(VesselId(1)).unwrap();
        for &item in &cargo {
            assert!(world.has_cond(item, Cond::Haulable));
            assert!(deck.is_walkable(world.tile_of(item).unwrap()));
            assert!(world.stack_count(item) >= 1);
        }
    }

    #[test]
    fn test_unknown_vessel_is_an_error() {
        let mut world = ShipWorld::new();
        let mut rng = StdRng::seed_from_u64(3);
        assert!(generate_cargo(&mut world, VesselId(9), 1, &mut rng).is_err());
    }
}
