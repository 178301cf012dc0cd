//! Stowage engine - main entry point for running a session
//!
//! Owns the ship world and the [`Stowage`] service and routes the world's
//! events through it: haul assignment, item drops, EVA interactions,
//! container destruction and the periodic suit check.

use std::io::{Read, Write};
use std::path::Path;

use hecs::Entity;
use rand::rngs::StdRng;
use rand::SeedableRng;
use stowage_logic::categories::CategoryTree;
use stowage_logic::config::StowageConfig;
use stowage_logic::effects::{
    EffectOutcome, Interaction, DROP_ITEM_STACK, SWAP_EVA_BATTERY, SWAP_EVA_O2_BOTTLE,
};
use stowage_logic::eva::MaintenanceAction;
use stowage_logic::hauling::HaulPlan;
use stowage_logic::host::Host;
use stowage_logic::persistence::{self as prefs_file, PREFS_FILE_NAME};
use stowage_logic::store::LoadReport;
use stowage_logic::{Stowage, StowageError};

use crate::components::{Tile, VesselId};
use crate::error::{SaveError, WorldError};
use crate::generation::{generate_cargo, generate_ship, ShipConfig, ShipLayout};
use crate::persistence::{load_session, save_session};
use crate::world::ShipWorld;

/// Seconds of simulation time between EVA suit checks.
const EVA_CHECK_INTERVAL: f64 = 1.0;

/// Main session engine
pub struct StowageEngine {
    /// ECS world containing all entities
    pub world: ShipWorld,
    /// Hauling, storage preference and EVA state
    pub stowage: Stowage,
    /// Simulation time in seconds since start
    sim_time: f64,
    last_eva_update: f64,
    next_interaction: u64,
    time_scale: f32,
}

impl StowageEngine {
    pub fn new(config: StowageConfig, categories: CategoryTree) -> Self {
        Self {
            world: ShipWorld::new(),
            stowage: Stowage::new(config, categories),
            sim_time: 0.0,
            last_eva_update: 0.0,
            next_interaction: 1,
            time_scale: 1.0,
        }
    }

    /// Start a fresh session and generate a vessel with cargo.
    pub fn generate(
        &mut self,
        vessel: VesselId,
        config: &ShipConfig,
        cargo: u32,
        seed: u64,
    ) -> Result<(ShipLayout, Vec<Entity>), WorldError> {
        self.new_session();
        let mut rng = StdRng::seed_from_u64(seed);
        let layout = generate_ship(&mut self.world, vessel, config, &mut rng)?;
        let items = generate_cargo(&mut self.world, vessel, cargo, &mut rng)?;
        Ok((layout, items))
    }

    /// Reset the world and every stowage registry.
    pub fn new_session(&mut self) {
        self.world.clear();
        self.stowage.clear_session();
        self.sim_time = 0.0;
        self.last_eva_update = 0.0;
    }

    // ── Hauling ─────────────────────────────────────────────────────

    /// Preferred container for `item` on its own vessel.
    pub fn find_destination(&self, item: Entity) -> Option<Entity> {
        self.stowage
            .find_best_haul_destination(&self.world, item, self.world.vessel(item))
    }

    /// Pick a destination for `item` and register a haul job for `hauler`.
    ///
    /// `None` means the preferences have no opinion and the default
    /// zone-based hauling should run.
    pub fn assign_haul(&mut self, hauler: Entity, item: Entity) -> Option<HaulPlan<Entity, Tile>> {
        let plan = self.stowage.plan_haul(&self.world, hauler, item);
        if plan.is_none() {
            log::debug!(
                "{} hauls {} with default zones",
                self.world.display_name(hauler),
                self.world.display_name(item)
            );
        }
        plan
    }

    /// A character drops a held stack. Without a matching haul job the
    /// stack is set down where the character stands.
    pub fn drop_item(&mut self, character: Entity, item: Entity) -> EffectOutcome {
        let mut interaction = self.interaction(DROP_ITEM_STACK, character, Some(item));
        let outcome = self.stowage.dispatch(&mut self.world, &mut interaction);
        if !interaction.default_suppressed {
            if let Err(err) = self.world.set_down_near(character, item) {
                log::error!("Default drop failed: {}", err);
            }
        }
        outcome
    }

    /// Run a named interaction through the effect pipeline.
    pub fn interact(
        &mut self,
        name: &str,
        actor: Entity,
        target: Option<Entity>,
        third: Option<Entity>,
    ) -> EffectOutcome {
        let mut interaction = self.interaction(name, actor, target);
        interaction.third = third;
        self.stowage.dispatch(&mut self.world, &mut interaction)
    }

    fn interaction(
        &mut self,
        name: &str,
        actor: Entity,
        target: Option<Entity>,
    ) -> Interaction<Entity> {
        let id = self.next_interaction;
        self.next_interaction += 1;
        Interaction::new(id, name, actor, target)
    }

    /// Destroy a container. Its contents spill onto the floor and its
    /// storage preference goes with it.
    pub fn destroy_container(&mut self, container: Entity) -> Result<(), WorldError> {
        let id = self
            .world
            .stable_id(container)
            .ok_or_else(|| WorldError::UnknownEntity(format!("{:?}", container)))?;
        for item in self.world.contents(container) {
            if let Err(err) = self.world.set_down_near(container, item) {
                let name = self.world.display_name(item);
                log::warn!("Could not spill {} from {}: {}", name, id, err);
            }
        }
        self.world.despawn(container);
        self.stowage.prefs_mut().on_container_destroyed(&id);
        Ok(())
    }

    // ── Time ────────────────────────────────────────────────────────

    /// Advance the session by `delta_seconds`. Returns the EVA actions
    /// carried out this tick.
    pub fn update(&mut self, delta_seconds: f32) -> Vec<(Entity, MaintenanceAction<Entity>)> {
        self.sim_time += (delta_seconds * self.time_scale) as f64;

        if self.sim_time - self.last_eva_update >= EVA_CHECK_INTERVAL {
            self.last_eva_update = self.sim_time;
            return self.run_eva_checks();
        }
        Vec::new()
    }

    /// Plan and carry out suit upkeep for every character.
    pub fn run_eva_checks(&mut self) -> Vec<(Entity, MaintenanceAction<Entity>)> {
        let mut done = Vec::new();
        for character in self.world.characters() {
            let Some(action) = self
                .stowage
                .plan_eva_maintenance(&self.world, character, self.sim_time)
            else {
                continue;
            };
            self.apply_maintenance(character, action);
            done.push((character, action));
        }
        done
    }

    fn apply_maintenance(&mut self, character: Entity, action: MaintenanceAction<Entity>) {
        match action {
            MaintenanceAction::SwapBattery { battery } => {
                self.interact(SWAP_EVA_BATTERY, character, Some(battery), Some(battery));
            }
            MaintenanceAction::SwapO2 { bottle } => {
                self.interact(SWAP_EVA_O2_BOTTLE, character, Some(bottle), Some(bottle));
            }
            MaintenanceAction::RemoveHelmet { helmet } => self.stow_helmet(character, helmet),
        }
    }

    /// Put a removed helmet in the first carried container with room, or
    /// on the floor.
    fn stow_helmet(&mut self, character: Entity, helmet: Entity) {
        let bag = self
            .world
            .equipped_items(character)
            .into_iter()
            .find(|&e| e != helmet && self.world.can_fit(e, helmet));
        let result = match bag {
            Some(bag) => self.world.add_to_storage(bag, helmet).and_then(|left| match left {
                Some(left) => self.world.set_down_near(character, left),
                None => Ok(()),
            }),
            None => self.world.set_down_near(character, helmet),
        };
        if let Err(err) = result {
            log::error!("Removing helmet failed: {}", err);
        }
    }

    /// Set time scale (1.0 = real-time, 2.0 = 2x speed, etc.)
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale.max(0.0);
    }

    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// Current simulation time in seconds
    pub fn sim_time(&self) -> f64 {
        self.sim_time
    }

    // ── Persistence ─────────────────────────────────────────────────

    /// Save the session to a writer
    pub fn save<W: Write>(&self, writer: W) -> Result<(), SaveError> {
        save_session(
            writer,
            &self.world,
            self.stowage.prefs().records(),
            self.sim_time,
            self.time_scale,
        )
    }

    /// Load a session from a reader, replacing the current one
    pub fn load<R: Read>(&mut self, reader: R) -> Result<LoadReport, SaveError> {
        let loaded = load_session(reader)?;
        self.stowage.clear_session();
        self.world = loaded.world;
        self.sim_time = loaded.sim_time;
        self.last_eva_update = loaded.sim_time;
        self.time_scale = loaded.time_scale;
        Ok(self.stowage.prefs_mut().load_records(loaded.prefs))
    }

    /// Write the storage preferences next to a save as JSON.
    pub fn export_prefs(&self, dir: &Path) -> Result<(), StowageError> {
        prefs_file::save_prefs(self.stowage.prefs(), dir)
    }

    /// Replace the storage preferences from a save folder's JSON file.
    pub fn import_prefs(&mut self, dir: &Path) -> Result<LoadReport, StowageError> {
        log::debug!("Reading {}", dir.join(PREFS_FILE_NAME).display());
        prefs_file::load_prefs(self.stowage.prefs_mut(), dir)
    }
}
