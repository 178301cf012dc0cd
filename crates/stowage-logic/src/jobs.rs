//! Outstanding haul obligations, one per character.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::StowageError;

/// "Deliver N units of this item type into that container."
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HaulJob {
    pub character_id: String,
    pub item_def: String,
    /// Units still to deliver. A job at or below zero is complete and is
    /// never left in the table.
    pub quantity_remaining: i64,
    pub target_container_id: String,
}

#[derive(Debug, Clone, Default)]
pub struct HaulJobTable {
    jobs: HashMap<String, HaulJob>,
}

impl HaulJobTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a job, replacing any job the character already had.
    ///
    /// Empty ids and quantities below one are rejected without touching
    /// the table.
    pub fn track(
        &mut self,
        character_id: &str,
        item_def: &str,
        quantity: i64,
        container_id: &str,
    ) -> Result<(), StowageError> {
        if character_id.is_empty() || item_def.is_empty() || container_id.is_empty() {
            log::warn!(
                "Rejected haul job with missing ids: character={:?} item={:?} container={:?}",
                character_id,
                item_def,
                container_id
            );
            return Err(StowageError::InvalidJob {
                character: character_id.to_string(),
                item: item_def.to_string(),
                container: container_id.to_string(),
            });
        }

        if quantity <= 0 {
            log::warn!(
                "Rejected haul job for {} with quantity {} ({} into {})",
                character_id,
                quantity,
                item_def,
                container_id
            );
            return Err(StowageError::NonPositiveQuantity {
                character: character_id.to_string(),
                quantity,
            });
        }

        let job = HaulJob {
            character_id: character_id.to_string(),
            item_def: item_def.to_string(),
            quantity_remaining: quantity,
            target_container_id: container_id.to_string(),
        };
        if let Some(old) = self.jobs.insert(character_id.to_string(), job) {
            log::debug!(
                "Haul job for {} replaced (was {} x{})",
                character_id,
                old.item_def,
                old.quantity_remaining
            );
        }
        log::info!(
            "Tracking haul job: {} -> {} x{} into {}",
            character_id,
            item_def,
            quantity,
            container_id
        );
        Ok(())
    }

    /// Drop a character's job regardless of what is left to deliver.
    pub fn cancel(&mut self, character_id: &str) -> Option<HaulJob> {
        let job = self.jobs.remove(character_id);
        if job.is_some() {
            log::info!("Haul job for {} removed", character_id);
        }
        job
    }

    pub fn get(&self, character_id: &str) -> Option<&HaulJob> {
        self.jobs.get(character_id)
    }

    pub fn get_mut(&mut self, character_id: &str) -> Option<&mut HaulJob> {
        self.jobs.get_mut(character_id)
    }

    pub fn contains(&self, character_id: &str) -> bool {
        self.jobs.contains_key(character_id)
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn clear(&mut self) {
        self.jobs.clear();
    }

    /// Active jobs sorted by character id.
    pub fn jobs(&self) -> Vec<&HaulJob> {
        let mut jobs: Vec<&HaulJob> = self.jobs.values().collect();
        jobs.sort_by(|a, b| a.character_id.cmp(&b.character_id));
        jobs
    }
}
