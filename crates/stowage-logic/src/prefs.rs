//! Per-container storage preferences (the allow-list).

use serde::{Deserialize, Serialize};

use crate::categories::{CategoryResolver, ItemHint};

/// Which items a container accepts.
///
/// An empty allow-list accepts nothing. Containers without a preference
/// at all are unrestricted; that case is handled by the store.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StoragePrefs {
    pub container_id: String,
    #[serde(default)]
    pub allowed_categories: Vec<ItemHint>,
}

impl StoragePrefs {
    pub fn new(container_id: impl Into<String>) -> Self {
        Self {
            container_id: container_id.into(),
            allowed_categories: Vec::new(),
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.allowed_categories.iter().any(|c| c.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.allowed_categories.is_empty()
    }

    pub fn len(&self) -> usize {
        self.allowed_categories.len()
    }

    /// Allow a whole category. Unknown categories and duplicates are ignored.
    pub fn add_category(&mut self, hint: ItemHint, resolver: &dyn CategoryResolver) -> bool {
        if hint.id.is_empty() || !resolver.has_category(&hint.id) {
            return false;
        }
        self.push_unique(hint)
    }

    /// Allow a single item type.
    pub fn add_item(&mut self, hint: ItemHint) -> bool {
        if hint.id.is_empty() {
            return false;
        }
        self.push_unique(hint)
    }

    fn push_unique(&mut self, hint: ItemHint) -> bool {
        if self.contains(&hint.id) {
            return false;
        }
        self.allowed_categories.push(hint);
        true
    }

    /// Remove every entry with this id. Returns whether anything was removed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.allowed_categories.len();
        self.allowed_categories.retain(|c| c.id != id);
        before != self.allowed_categories.len()
    }

    /// Match an item type against the allow-list.
    ///
    /// Direct and alternative-id matches win before any category lookup.
    pub fn is_item_allowed(&self, item_def: &str, resolver: &dyn CategoryResolver) -> bool {
        if item_def.is_empty() || self.allowed_categories.is_empty() {
            return false;
        }

        if self.allowed_categories.iter().any(|c| c.matches(item_def)) {
            return true;
        }

        let ids: Vec<&str> = self
            .allowed_categories
            .iter()
            .map(|c| c.id.as_str())
            .collect();
        resolver.matches_any(&ids, item_def)
    }

    /// One-line label for tooltips and logs.
    pub fn summary(&self, resolver: &dyn CategoryResolver) -> String {
        match self.allowed_categories.as_slice() {
            [] => "Nothing".to_string(),
            [only] => resolver
                .display_name(&only.id)
                .unwrap_or_else(|| only.id.clone()),
            many => format!("{} categories", many.len()),
        }
    }
}
