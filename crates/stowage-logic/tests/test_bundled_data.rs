//! Integration tests against the bundled category and definition data.
//!
//! Exercises: category JSON → CategoryTree → PrefsStore allow-lists,
//! preference documents, config files and the definition search.

use stowage_logic::categories::{CategoryResolver, CategoryTree, ItemHint};
use stowage_logic::config::StowageConfig;
use stowage_logic::persistence::PrefsDocument;
use stowage_logic::search::{self, DefinitionCatalog, SearchQuery};
use stowage_logic::store::{PrefsStore, PrefsView};

const CATEGORIES_JSON: &str = include_str!("../../../data/categories.json");
const DEFINITIONS_JSON: &str = include_str!("../../../data/definitions.json");

// ── Helpers ────────────────────────────────────────────────────────────

fn tree() -> CategoryTree {
    CategoryTree::from_json_str(CATEGORIES_JSON).expect("categories.json parses")
}

fn catalog() -> DefinitionCatalog {
    DefinitionCatalog::from_json_str(DEFINITIONS_JSON).expect("definitions.json parses")
}

// ── Allow-lists ────────────────────────────────────────────────────────

#[test]
fn tools_locker_takes_power_tools_but_not_plates() {
    let tree = tree();
    let mut store = PrefsStore::new();
    assert!(store
        .get_or_create("C1")
        .unwrap()
        .add_category(ItemHint::new("Tools"), &tree));

    let view = PrefsView::new(&store, &tree);
    assert!(view.is_item_allowed("C1", "ItmWrench01"));
    assert!(view.is_item_allowed("C1", "ItmWrench02"));
    assert!(view.is_item_allowed("C1", "ItmGrinder01"));
    assert!(!view.is_item_allowed("C1", "ItmSteelPlate"));
    // No preference at all means unrestricted.
    assert!(view.is_item_allowed("C2", "ItmSteelPlate"));
}

#[test]
fn unknown_category_is_not_added() {
    let tree = tree();
    let mut store = PrefsStore::new();
    let prefs = store.get_or_create("C1").unwrap();
    assert!(!prefs.add_category(ItemHint::new("Weapons"), &tree));
    assert!(prefs.is_empty());
    assert!(!store.is_item_allowed("C1", "ItmWrench01", &tree));
}

#[test]
fn summary_uses_category_display_name() {
    let tree = tree();
    let mut store = PrefsStore::new();
    let prefs = store.get_or_create("C1").unwrap();
    prefs.add_category(ItemHint::new("EVA"), &tree);
    assert_eq!(prefs.summary(&tree), "EVA Gear");
    prefs.add_category(ItemHint::new("Supplies"), &tree);
    assert_eq!(prefs.summary(&tree), "2 categories");
}

#[test]
fn categorised_items_are_defined() {
    let tree = tree();
    let catalog = catalog();
    for id in ["ItmWrench01", "ItmDrill01", "ItmMedkit", "ItmO2BottleEVA"] {
        assert!(catalog.definition(id).is_some(), "{} is undefined", id);
        assert!(!tree.categories_containing(id).is_empty(), "{} is uncategorised", id);
    }
    assert!(tree.matches_any(&["Tools"], "ItmDrill01"));
    assert_eq!(
        tree.categories_containing("ItmDrill01"),
        vec!["Tools".to_string(), "Power Tools".to_string()]
    );
}

// ── Documents ──────────────────────────────────────────────────────────

#[test]
fn preference_document_survives_json() {
    let tree = tree();
    let mut store = PrefsStore::new();
    store
        .get_or_create("C1")
        .unwrap()
        .add_category(ItemHint::new("Materials"), &tree);
    store
        .get_or_create("C2")
        .unwrap()
        .add_item(ItemHint::new("ItmMedkit"));

    let json = PrefsDocument::from_store(&store).to_json().unwrap();
    let mut restored = PrefsStore::new();
    PrefsDocument::from_json(&json).unwrap().apply(&mut restored);
    assert_eq!(restored.records(), store.records());
    assert!(restored.is_item_allowed("C1", "ItmFuseBox", &tree));
}

#[test]
fn partial_config_keeps_defaults() {
    let config = StowageConfig::from_json_str(r#"{"search_limit": 10, "eva": {"normal": 0.3}}"#)
        .unwrap();
    assert_eq!(config.search_limit, 10);
    assert!((config.eva.normal - 0.3).abs() < 1e-9);
    assert!((config.eva.emergency - 0.05).abs() < 1e-9);
    assert!(!config.debug_logging);
}

// ── Search ─────────────────────────────────────────────────────────────

#[test]
fn search_over_bundled_definitions() {
    let tree = tree();
    let catalog = catalog();

    let items = SearchQuery::parse("searchitems wrench").unwrap();
    let results = search::search(&catalog, &tree, &items, 50);
    assert_eq!(results.total, 3);
    let names: Vec<_> = results.hits.iter().map(|h| h.display_name.as_str()).collect();
    assert_eq!(names, vec!["Heavy Wrench", "Rusty Wrench", "Wrench"]);

    let all = SearchQuery::parse("searchitems wrench --all").unwrap();
    assert_eq!(search::search(&catalog, &tree, &all, 50).total, 5);

    let lines = search::render(&items, &results);
    assert_eq!(lines[0], "Searching items matching 'wrench'...");
    assert!(lines.contains(&"    Categories: Tools".to_string()));
}
