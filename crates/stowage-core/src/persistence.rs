//! Save/Load functionality for persisting a whole session
//!
//! Uses bincode for efficient binary serialization of the ship world plus
//! the storage preferences. Components are serialized individually then
//! reconstructed on load. Haul jobs and EVA timers are session scratch and
//! are not saved.

use std::io::{Read, Write};

use hecs::EntityBuilder;
use serde::{Deserialize, Serialize};
use stowage_logic::prefs::StoragePrefs;

use crate::components::*;
use crate::error::SaveError;
use crate::world::ShipWorld;

/// Version number for save file format (increment when format changes)
const SAVE_VERSION: u32 = 1;

/// Serializable snapshot of a session
#[derive(Serialize, Deserialize)]
pub struct SaveData {
    pub version: u32,
    /// Simulation time in seconds
    pub sim_time: f64,
    pub time_scale: f32,
    pub decks: Vec<Deck>,
    pub entities: Vec<SerializableEntity>,
    pub prefs: Vec<StoragePrefs>,
}

/// All possible components for an entity, serialized as optionals
#[derive(Serialize, Deserialize)]
pub struct SerializableEntity {
    pub identity: Identity,
    pub position: Option<Position>,
    pub contained_in: Option<ContainedIn>,
    pub stack: Option<Stack>,
    pub storage: Option<Storage>,
    pub conditions: Option<Conditions>,
    pub stats: Option<Stats>,
    pub character: Option<Character>,
}

/// Extract all entities from a world into serializable form, in spawn order
fn serialize_entities(world: &ShipWorld) -> Vec<SerializableEntity> {
    let mut entities: Vec<(u32, SerializableEntity)> = Vec::new();

    for entity_ref in world.world.iter() {
        let Some(identity) = entity_ref.get::<&Identity>() else {
            continue;
        };
        let se = SerializableEntity {
            identity: (*identity).clone(),
            position: entity_ref.get::<&Position>().map(|c| *c),
            contained_in: entity_ref.get::<&ContainedIn>().map(|c| (*c).clone()),
            stack: entity_ref.get::<&Stack>().map(|c| *c),
            storage: entity_ref.get::<&Storage>().map(|c| *c),
            conditions: entity_ref.get::<&Conditions>().map(|c| *c),
            stats: entity_ref.get::<&Stats>().map(|c| (*c).clone()),
            character: entity_ref.get::<&Character>().map(|c| *c),
        };
        entities.push((entity_ref.entity().id(), se));
    }

    entities.sort_by_key(|(id, _)| *id);
    entities.into_iter().map(|(_, se)| se).collect()
}

/// Spawn an entity with all its components
fn spawn_entity(world: &mut ShipWorld, se: SerializableEntity) -> Result<(), SaveError> {
    let mut builder = EntityBuilder::new();
    if let Some(c) = se.position {
        builder.add(c);
    }
    if let Some(c) = se.contained_in {
        builder.add(c);
    }
    if let Some(c) = se.stack {
        builder.add(c);
    }
    if let Some(c) = se.storage {
        builder.add(c);
    }
    if let Some(c) = se.conditions {
        builder.add(c);
    }
    if let Some(c) = se.stats {
        builder.add(c);
    }
    if let Some(c) = se.character {
        builder.add(c);
    }
    world.spawn(se.identity, builder)?;
    Ok(())
}

/// Save the session to a writer
pub fn save_session<W: Write>(
    writer: W,
    world: &ShipWorld,
    prefs: Vec<StoragePrefs>,
    sim_time: f64,
    time_scale: f32,
) -> Result<(), SaveError> {
    let save_data = SaveData {
        version: SAVE_VERSION,
        sim_time,
        time_scale,
        decks: world.decks().cloned().collect(),
        entities: serialize_entities(world),
        prefs,
    };

    bincode::serialize_into(writer, &save_data)?;
    log::info!(
        "Saved session: {} entities, {} storage preferences",
        save_data.entities.len(),
        save_data.prefs.len()
    );
    Ok(())
}

/// Load a session from a reader
pub fn load_session<R: Read>(reader: R) -> Result<LoadedSession, SaveError> {
    let save_data: SaveData = bincode::deserialize_from(reader)?;

    if save_data.version != SAVE_VERSION {
        return Err(SaveError::VersionMismatch {
            expected: SAVE_VERSION,
            found: save_data.version,
        });
    }

    let mut world = ShipWorld::new();
    for deck in save_data.decks {
        world.add_deck(deck);
    }
    for se in save_data.entities {
        spawn_entity(&mut world, se)?;
    }

    Ok(LoadedSession {
        world,
        prefs: save_data.prefs,
        sim_time: save_data.sim_time,
        time_scale: save_data.time_scale,
    })
}

/// Result of loading a session
pub struct LoadedSession {
    pub world: ShipWorld,
    pub prefs: Vec<StoragePrefs>,
    pub sim_time: f64,
    pub time_scale: f32,
}
