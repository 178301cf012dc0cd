//! Session-wide registry of storage preferences, keyed by container id.

use std::collections::BTreeMap;

use crate::categories::CategoryResolver;
use crate::error::StowageError;
use crate::prefs::StoragePrefs;

/// Outcome of restoring preferences from persisted records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub loaded: usize,
    pub skipped: usize,
}

/// Keyed preference store. Mutations are visible to the next read.
#[derive(Debug, Clone, Default)]
pub struct PrefsStore {
    prefs: BTreeMap<String, StoragePrefs>,
}

impl PrefsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, container_id: &str) -> Option<&StoragePrefs> {
        self.prefs.get(container_id)
    }

    pub fn get_mut(&mut self, container_id: &str) -> Option<&mut StoragePrefs> {
        self.prefs.get_mut(container_id)
    }

    pub fn contains(&self, container_id: &str) -> bool {
        self.prefs.contains_key(container_id)
    }

    /// Store or delete a preference. `None` deletes.
    pub fn set(&mut self, container_id: &str, prefs: Option<StoragePrefs>) {
        if container_id.is_empty() {
            return;
        }
        match prefs {
            None => {
                self.prefs.remove(container_id);
            }
            Some(mut prefs) => {
                if prefs.container_id.is_empty() {
                    prefs.container_id = container_id.to_string();
                }
                self.prefs.insert(container_id.to_string(), prefs);
            }
        }
    }

    pub fn get_or_create(&mut self, container_id: &str) -> Result<&mut StoragePrefs, StowageError> {
        if container_id.is_empty() {
            return Err(StowageError::InvalidId(container_id.to_string()));
        }
        Ok(self
            .prefs
            .entry(container_id.to_string())
            .or_insert_with(|| StoragePrefs::new(container_id)))
    }

    pub fn remove(&mut self, container_id: &str) -> Option<StoragePrefs> {
        self.prefs.remove(container_id)
    }

    /// Drop the preference of a container that no longer exists.
    pub fn on_container_destroyed(&mut self, container_id: &str) {
        if self.prefs.remove(container_id).is_some() {
            log::debug!("Removed storage preference of destroyed container {}", container_id);
        }
    }

    pub fn clear(&mut self) {
        let count = self.prefs.len();
        self.prefs.clear();
        log::info!("Cleared {} storage preferences", count);
    }

    pub fn len(&self) -> usize {
        self.prefs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prefs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &StoragePrefs)> {
        self.prefs.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Whether an item may go into a container. No preference means yes.
    pub fn is_item_allowed(
        &self,
        container_id: &str,
        item_def: &str,
        resolver: &dyn CategoryResolver,
    ) -> bool {
        match self.prefs.get(container_id) {
            None => true,
            Some(prefs) => prefs.is_item_allowed(item_def, resolver),
        }
    }

    /// Snapshot of every preference, ordered by container id.
    pub fn records(&self) -> Vec<StoragePrefs> {
        self.prefs.values().cloned().collect()
    }

    /// Replace the store contents with persisted records.
    ///
    /// Records without a container id are skipped.
    pub fn load_records(&mut self, records: Vec<StoragePrefs>) -> LoadReport {
        self.clear();
        let mut report = LoadReport::default();
        for record in records {
            if record.container_id.is_empty() {
                log::warn!("Skipping storage preference with empty container id");
                report.skipped += 1;
                continue;
            }
            log::debug!(
                "Loading storage preference for {} with {} entries",
                record.container_id,
                record.allowed_categories.len()
            );
            self.prefs.insert(record.container_id.clone(), record);
            report.loaded += 1;
        }
        log::info!(
            "Loaded {} storage preferences ({} skipped)",
            report.loaded,
            report.skipped
        );
        report
    }
}

/// Read-only pairing of the store with the category resolver.
#[derive(Clone, Copy)]
pub struct PrefsView<'a> {
    pub store: &'a PrefsStore,
    pub resolver: &'a dyn CategoryResolver,
}

impl<'a> PrefsView<'a> {
    pub fn new(store: &'a PrefsStore, resolver: &'a dyn CategoryResolver) -> Self {
        Self { store, resolver }
    }

    pub fn is_item_allowed(&self, container_id: &str, item_def: &str) -> bool {
        self.store.is_item_allowed(container_id, item_def, self.resolver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::categories::{CategoryTree, ItemHint};

    #[test]
    fn missing_preference_is_unrestricted() {
        let store = PrefsStore::new();
        let tree = CategoryTree::default();
        assert!(store.is_item_allowed("C1", "ItmAnything", &tree));
    }

    #[test]
    fn explicit_empty_preference_blocks_everything() {
        let mut store = PrefsStore::new();
        let tree = CategoryTree::default();
        store.get_or_create("C1").unwrap();
        assert!(store.contains("C1"));
        assert!(!store.is_item_allowed("C1", "ItmAnything", &tree));
    }

    #[test]
    fn set_backfills_container_id_and_none_deletes() {
        let mut store = PrefsStore::new();
        store.set("C1", Some(StoragePrefs::default()));
        assert_eq!(store.get("C1").unwrap().container_id, "C1");
        store.set("C1", None);
        assert!(store.get("C1").is_none());
        store.set("", Some(StoragePrefs::default()));
        assert!(store.is_empty());
    }

    #[test]
    fn get_or_create_returns_existing() {
        let mut store = PrefsStore::new();
        store
            .get_or_create("C1")
            .unwrap()
            .add_item(ItemHint::new("ItmSteel"));
        assert_eq!(store.get_or_create("C1").unwrap().len(), 1);
        assert_eq!(store.len(), 1);
        assert!(store.get_or_create("").is_err());
    }

    #[test]
    fn load_replaces_contents_and_skips_invalid_records() {
        let mut store = PrefsStore::new();
        store.get_or_create("Old").unwrap();

        let mut a = StoragePrefs::new("A");
        a.add_item(ItemHint::new("ItmSteel"));
        a.add_item(ItemHint::new("ItmCopper"));
        let report = store.load_records(vec![a.clone(), StoragePrefs::new("")]);

        assert_eq!(report, LoadReport { loaded: 1, skipped: 1 });
        assert!(!store.contains("Old"));
        assert_eq!(store.get("A"), Some(&a));
    }

    #[test]
    fn destroyed_container_loses_its_preference() {
        let mut store = PrefsStore::new();
        store.get_or_create("C1").unwrap();
        store.on_container_destroyed("C1");
        store.on_container_destroyed("C2");
        assert!(store.is_empty());
    }
}
