//! The [`Stowage`] service: every per-session registry in one owned value.
//!
//! The host keeps one `Stowage` per game session and calls into it from
//! its hooks: haul assignment, interaction preparation and execution, and
//! the periodic EVA check. `clear_session` must run on new game and load.

use std::collections::HashMap;

use crate::categories::CategoryTree;
use crate::config::StowageConfig;
use crate::effects::{EffectOutcome, Interaction, InteractionEffect, Prepared};
use crate::eva::{EvaMaintenance, MaintenanceAction};
use crate::hauling::{self, HaulPlan};
use crate::host::Host;
use crate::jobs::HaulJobTable;
use crate::search::{self, DefinitionCatalog, SearchQuery, SearchResults};
use crate::store::{PrefsStore, PrefsView};

pub struct Stowage {
    config: StowageConfig,
    categories: CategoryTree,
    prefs: PrefsStore,
    jobs: HaulJobTable,
    effects: Vec<InteractionEffect>,
    /// Effects prepared per interaction id, awaiting execution.
    pending: HashMap<u64, Vec<(InteractionEffect, Prepared)>>,
    eva: EvaMaintenance,
}

impl Stowage {
    pub fn new(config: StowageConfig, categories: CategoryTree) -> Self {
        let eva = EvaMaintenance::new(config.eva);
        Self {
            config,
            categories,
            prefs: PrefsStore::new(),
            jobs: HaulJobTable::new(),
            effects: InteractionEffect::ALL.to_vec(),
            pending: HashMap::new(),
            eva,
        }
    }

    /// Replace the effect list. Order is dispatch order.
    pub fn with_effects(mut self, effects: Vec<InteractionEffect>) -> Self {
        self.effects = effects;
        self
    }

    pub fn config(&self) -> &StowageConfig {
        &self.config
    }

    pub fn categories(&self) -> &CategoryTree {
        &self.categories
    }

    pub fn prefs(&self) -> &PrefsStore {
        &self.prefs
    }

    pub fn prefs_mut(&mut self) -> &mut PrefsStore {
        &mut self.prefs
    }

    pub fn jobs(&self) -> &HaulJobTable {
        &self.jobs
    }

    pub fn jobs_mut(&mut self) -> &mut HaulJobTable {
        &mut self.jobs
    }

    pub fn pending_interactions(&self) -> usize {
        self.pending.len()
    }

    /// Reset every registry for a new or loaded session.
    pub fn clear_session(&mut self) {
        self.prefs.clear();
        self.jobs.clear();
        self.pending.clear();
        self.eva.clear();
        log::info!("Stowage session state cleared");
    }

    // ── Hauling ─────────────────────────────────────────────────────

    /// Pre-hook for the host's haul destination lookup.
    pub fn find_best_haul_destination<H: Host>(
        &self,
        host: &H,
        item: H::Entity,
        vessel: Option<H::Vessel>,
    ) -> Option<H::Entity> {
        let view = PrefsView::new(&self.prefs, &self.categories);
        hauling::find_best_haul_destination(host, item, vessel, view, self.config.debug_logging)
    }

    /// Pre-hook for the host's haul zone selection. Registers a job on
    /// success.
    pub fn plan_haul<H: Host>(
        &mut self,
        host: &H,
        hauler: H::Entity,
        item: H::Entity,
    ) -> Option<HaulPlan<H::Entity, H::Tile>> {
        let view = PrefsView::new(&self.prefs, &self.categories);
        hauling::plan_haul(
            host,
            &mut self.jobs,
            view,
            hauler,
            item,
            self.config.debug_logging,
        )
    }

    // ── Interactions ────────────────────────────────────────────────

    /// Run the prepare step of every effect that applies.
    pub fn prepare<H: Host>(&mut self, host: &H, interaction: &Interaction<H::Entity>) {
        let prepared: Vec<(InteractionEffect, Prepared)> = self
            .effects
            .iter()
            .filter(|e| e.matches(host, interaction, &self.jobs))
            .map(|&e| (e, e.prepare(host, interaction)))
            .collect();
        if !prepared.is_empty() {
            self.pending.insert(interaction.id, prepared);
        }
    }

    /// Execute prepared effects in order until one handles the interaction.
    ///
    /// An interaction that was never prepared is prepared first.
    pub fn execute<H: Host>(
        &mut self,
        host: &mut H,
        interaction: &mut Interaction<H::Entity>,
    ) -> EffectOutcome {
        if !self.pending.contains_key(&interaction.id) {
            self.prepare(&*host, &*interaction);
        }
        let Some(prepared) = self.pending.remove(&interaction.id) else {
            return EffectOutcome::Continue;
        };

        let view = PrefsView::new(&self.prefs, &self.categories);
        for (effect, state) in prepared {
            if !effect.matches(&*host, &*interaction, &self.jobs) {
                continue;
            }
            if effect.execute(host, interaction, &state, &mut self.jobs, view)
                == EffectOutcome::Handled
            {
                return EffectOutcome::Handled;
            }
        }
        EffectOutcome::Continue
    }

    /// Prepare and execute in one go.
    pub fn dispatch<H: Host>(
        &mut self,
        host: &mut H,
        interaction: &mut Interaction<H::Entity>,
    ) -> EffectOutcome {
        self.prepare(&*host, &*interaction);
        self.execute(host, interaction)
    }

    /// Forget a prepared interaction the host abandoned.
    pub fn discard(&mut self, interaction_id: u64) {
        self.pending.remove(&interaction_id);
    }

    // ── EVA ─────────────────────────────────────────────────────────

    pub fn plan_eva_maintenance<H: Host>(
        &mut self,
        host: &H,
        character: H::Entity,
        now: f64,
    ) -> Option<MaintenanceAction<H::Entity>> {
        self.eva.plan(host, character, now)
    }

    // ── Console ─────────────────────────────────────────────────────

    pub fn search(&self, catalog: &DefinitionCatalog, query: &SearchQuery) -> SearchResults {
        search::search(catalog, &self.categories, query, self.config.search_limit)
    }
}
