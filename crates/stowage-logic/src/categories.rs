//! Item categories and the resolver that decides category membership.
//!
//! Categories form a tree: each one lists item hints directly and may hold
//! subcategories. A category contains its own items (and their alternative
//! ids) plus everything contained by its subcategories.
//!
//! [`CategoryTree`] compiles the tree once at load time. Identifiers are
//! interned into [`Symbol`]s and every category gets a flattened member set,
//! so a membership test is one hash lookup per allow-list entry.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::StowageError;

/// An allow-list entry or category member: an id plus equivalent ids.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ItemHint {
    pub id: String,
    #[serde(default)]
    pub alternative_ids: Vec<String>,
}

impl ItemHint {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            alternative_ids: Vec::new(),
        }
    }

    pub fn with_alternatives(id: impl Into<String>, alternatives: &[&str]) -> Self {
        Self {
            id: id.into(),
            alternative_ids: alternatives.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// Direct match on the primary id or any alternative id.
    pub fn matches(&self, def_id: &str) -> bool {
        self.id == def_id || self.alternative_ids.iter().any(|alt| alt == def_id)
    }
}

/// A category as authored in data files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub display_name: String,
    #[serde(default)]
    pub items: Vec<ItemHint>,
    #[serde(default)]
    pub subcategories: Vec<Category>,
}

/// Interned identifier handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(u32);

/// String to [`Symbol`] table.
#[derive(Debug, Clone, Default)]
pub struct Interner {
    ids: HashMap<String, Symbol>,
    names: Vec<String>,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, name: &str) -> Symbol {
        if let Some(&sym) = self.ids.get(name) {
            return sym;
        }
        let sym = Symbol(self.names.len() as u32);
        self.names.push(name.to_string());
        self.ids.insert(name.to_string(), sym);
        sym
    }

    pub fn get(&self, name: &str) -> Option<Symbol> {
        self.ids.get(name).copied()
    }

    pub fn resolve(&self, sym: Symbol) -> &str {
        &self.names[sym.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Category membership service consulted by storage preferences.
pub trait CategoryResolver {
    fn has_category(&self, id: &str) -> bool;
    fn display_name(&self, id: &str) -> Option<String>;
    /// Whether `item_def` belongs to any of the listed categories.
    fn matches_any(&self, category_ids: &[&str], item_def: &str) -> bool;
}

/// Compiled category hierarchy.
#[derive(Debug, Clone, Default)]
pub struct CategoryTree {
    roots: Vec<Category>,
    interner: Interner,
    /// category → every item def it contains, at any depth
    members: HashMap<Symbol, HashSet<Symbol>>,
    names: HashMap<Symbol, String>,
    /// categories in pre-order, for stable listings
    order: Vec<Symbol>,
}

impl CategoryTree {
    pub fn new(roots: Vec<Category>) -> Self {
        let mut tree = Self {
            roots: Vec::new(),
            ..Default::default()
        };
        for root in &roots {
            tree.compile(root);
        }
        tree.roots = roots;
        tree
    }

    pub fn from_json_str(json: &str) -> Result<Self, StowageError> {
        let roots: Vec<Category> = serde_json::from_str(json)?;
        Ok(Self::new(roots))
    }

    fn compile(&mut self, category: &Category) -> HashSet<Symbol> {
        let sym = self.interner.intern(&category.id);
        self.order.push(sym);
        self.names.insert(sym, category.display_name.clone());

        let mut set = HashSet::new();
        for hint in &category.items {
            set.insert(self.interner.intern(&hint.id));
            for alt in &hint.alternative_ids {
                set.insert(self.interner.intern(alt));
            }
        }
        for sub in &category.subcategories {
            let child = self.compile(sub);
            set.extend(child);
        }
        self.members.entry(sym).or_default().extend(set.iter().copied());
        set
    }

    pub fn roots(&self) -> &[Category] {
        &self.roots
    }

    /// Number of distinct categories.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Display names of every category containing the item, in tree order.
    pub fn categories_containing(&self, item_def: &str) -> Vec<String> {
        let Some(item) = self.interner.get(item_def) else {
            return Vec::new();
        };
        let mut seen = HashSet::new();
        self.order
            .iter()
            .filter(|sym| seen.insert(**sym))
            .filter(|sym| self.members.get(*sym).is_some_and(|m| m.contains(&item)))
            .filter_map(|sym| self.names.get(sym).cloned())
            .collect()
    }
}

impl CategoryResolver for CategoryTree {
    fn has_category(&self, id: &str) -> bool {
        self.interner
            .get(id)
            .is_some_and(|sym| self.members.contains_key(&sym))
    }

    fn display_name(&self, id: &str) -> Option<String> {
        let sym = self.interner.get(id)?;
        self.names.get(&sym).cloned()
    }

    fn matches_any(&self, category_ids: &[&str], item_def: &str) -> bool {
        let Some(item) = self.interner.get(item_def) else {
            return false;
        };
        category_ids.iter().any(|id| {
            self.interner
                .get(id)
                .and_then(|sym| self.members.get(&sym))
                .is_some_and(|members| members.contains(&item))
        })
    }
}
