//! Stowage Headless Harness
//!
//! Runs hauling, EVA and persistence scenarios against the reference ship
//! world, and exposes the `searchitems` console command.
//!
//! Usage:
//!   cargo run -p stowage-simtest
//!   cargo run -p stowage-simtest -- --verbose --seed 7
//!   cargo run -p stowage-simtest -- search wrench --all

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;
use stowage_core::generation::{battery, fit_eva_suit, o2_bottle, spawn_character};
use stowage_core::prelude::*;
use stowage_logic::categories::{Category, CategoryResolver, CategoryTree, ItemHint};
use stowage_logic::config::StowageConfig;
use stowage_logic::effects::EffectOutcome;
use stowage_logic::eva::{self, MaintenanceAction};
use stowage_logic::host::Host;
use stowage_logic::search::{self, DefinitionCatalog, SearchQuery};

// ── Data (same JSON a host would ship) ──────────────────────────────────
const CATEGORIES_JSON: &str = include_str!("../../../data/categories.json");
const DEFINITIONS_JSON: &str = include_str!("../../../data/definitions.json");

#[derive(Parser)]
#[command(name = "stowage-simtest", about = "Headless harness for Stowage")]
struct Cli {
    /// Print every check, not only failures, and enable debug logging
    #[arg(short, long)]
    verbose: bool,
    /// Seed for ship and cargo generation
    #[arg(long, default_value_t = 42)]
    seed: u64,
    /// JSON file with a StowageConfig
    #[arg(long)]
    config: Option<PathBuf>,
    /// Print the results as a JSON report instead of the text summary
    #[arg(long)]
    json: bool,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Search item definitions by id or name
    Search {
        term: Vec<String>,
        /// Include every definition type, not only items
        #[arg(long)]
        all: bool,
    },
}

// ── Test harness ────────────────────────────────────────────────────────

#[derive(Serialize)]
struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

#[derive(Serialize)]
struct Report<'a> {
    seed: u64,
    passed: usize,
    failed: usize,
    results: &'a [TestResult],
}

impl TestResult {
    fn check(name: &str, passed: bool, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed,
            detail: detail.into(),
        }
    }
}

struct Data {
    config: StowageConfig,
    categories: CategoryTree,
    catalog: DefinitionCatalog,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => match StowageConfig::load(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Cannot read config {}: {}", path.display(), e);
                std::process::exit(2);
            }
        },
        None => StowageConfig::default(),
    };
    config.debug_logging |= cli.verbose;

    let (categories, catalog) = match (
        CategoryTree::from_json_str(CATEGORIES_JSON),
        DefinitionCatalog::from_json_str(DEFINITIONS_JSON),
    ) {
        (Ok(c), Ok(d)) => (c, d),
        (Err(e), _) | (_, Err(e)) => {
            eprintln!("Bundled data is malformed: {}", e);
            std::process::exit(2);
        }
    };
    let data = Data {
        config,
        categories,
        catalog,
    };

    if let Some(Command::Search { term, all }) = cli.command {
        run_search(&data, term.join(" "), all);
        return;
    }

    if !cli.json {
        println!("=== Stowage Harness (seed {}) ===\n", cli.seed);
    }
    tracing::info!(seed = cli.seed, "running harness");
    let mut results = Vec::new();

    // 1. Category and definition data
    section(cli.json, "Category Data");
    results.extend(validate_data(&data));

    // 2. searchitems
    section(cli.json, "searchitems");
    results.extend(validate_search(&data));

    // 3. Preference-driven hauling on a generated ship
    section(cli.json, "Hauling");
    results.extend(validate_hauling(&data, cli.seed));

    // 4. EVA suit upkeep
    section(cli.json, "EVA Upkeep");
    results.extend(validate_eva(&data, cli.seed));

    // 5. Session save/load and preference files
    section(cli.json, "Persistence");
    results.extend(validate_persistence(&data, cli.seed));

    // ── Summary ──
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.len() - passed;

    if cli.json {
        let report = Report {
            seed: cli.seed,
            passed,
            failed,
            results: &results,
        };
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Cannot encode report: {}", e),
        }
        std::process::exit(if failed > 0 { 1 } else { 0 });
    }

    println!();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || cli.verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed,
        results.len(),
        failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

/// `RUST_LOG` wins over the verbosity flag. Records from the `log` facade
/// are forwarded to the subscriber.
fn init_logging(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn section(quiet: bool, title: &str) {
    if !quiet {
        println!("--- {} ---", title);
    }
}

fn engine(data: &Data) -> StowageEngine {
    StowageEngine::new(data.config.clone(), data.categories.clone())
}

// ── searchitems command ─────────────────────────────────────────────────

fn run_search(data: &Data, term: String, all: bool) {
    let term = term.trim().to_string();
    if term.is_empty() {
        println!("Usage: searchitems <search_term> [--all]");
        return;
    }
    let query = SearchQuery { term, all };
    let results = engine(data).stowage.search(&data.catalog, &query);
    for line in search::render(&query, &results) {
        println!("{}", line);
    }
}

// ── 1. Data ─────────────────────────────────────────────────────────────

fn collect_members(category: &Category, out: &mut Vec<String>) {
    for hint in &category.items {
        out.push(hint.id.clone());
        out.extend(hint.alternative_ids.iter().cloned());
    }
    for sub in &category.subcategories {
        collect_members(sub, out);
    }
}

fn validate_data(data: &Data) -> Vec<TestResult> {
    let tree = &data.categories;
    let mut results = Vec::new();

    results.push(TestResult::check(
        "categories_not_empty",
        tree.len() >= 4,
        format!("{} categories", tree.len()),
    ));
    results.push(TestResult::check(
        "subcategory_members_roll_up",
        tree.matches_any(&["Tools"], "ItmDrill01"),
        "ItmDrill01 via PowerTools",
    ));
    results.push(TestResult::check(
        "alternative_ids_match",
        tree.matches_any(&["Tools"], "ItmWrench02"),
        "ItmWrench02 as alternative of ItmWrench01",
    ));

    let mut members = Vec::new();
    for root in tree.roots() {
        collect_members(root, &mut members);
    }
    let undefined: Vec<&String> = members
        .iter()
        .filter(|id| data.catalog.definition(id).is_none())
        .collect();
    results.push(TestResult::check(
        "category_members_defined",
        undefined.is_empty(),
        format!("{} members, undefined: {:?}", members.len(), undefined),
    ));
    results
}

// ── 2. Search ───────────────────────────────────────────────────────────

fn validate_search(data: &Data) -> Vec<TestResult> {
    let stowage = engine(data).stowage;
    let mut results = Vec::new();

    let items = SearchQuery::parse("searchitems wrench");
    let all = SearchQuery::parse("searchitems wrench --all");
    let (Some(items), Some(all)) = (items, all) else {
        results.push(TestResult::check("search_parse", false, "query did not parse"));
        return results;
    };
    let item_hits = stowage.search(&data.catalog, &items);
    let all_hits = stowage.search(&data.catalog, &all);
    results.push(TestResult::check(
        "search_items_only",
        item_hits.total == 3,
        format!("{} item hits", item_hits.total),
    ));
    results.push(TestResult::check(
        "search_all_types",
        all_hits.total == 5,
        format!("{} hits with --all", all_hits.total),
    ));

    let limited = search::search(&data.catalog, &data.categories, &items, 2);
    let lines = search::render(&items, &limited);
    results.push(TestResult::check(
        "search_limit_reported",
        lines.last().is_some_and(|l| l.starts_with("... and 1 more")),
        format!("{:?}", lines.last()),
    ));

    let none = SearchQuery {
        term: "zzz".into(),
        all: false,
    };
    let lines = search::render(&none, &stowage.search(&data.catalog, &none));
    results.push(TestResult::check(
        "search_no_match",
        lines.iter().any(|l| l.starts_with("No items found")),
        format!("{} lines", lines.len()),
    ));
    results
}

// ── 3. Hauling ──────────────────────────────────────────────────────────

fn validate_hauling(data: &Data, seed: u64) -> Vec<TestResult> {
    let mut results = Vec::new();
    let mut e = engine(data);

    let vessel = VesselId(1);
    let (layout, cargo) = match e.generate(vessel, &ShipConfig::default(), 16, seed) {
        Ok(g) => g,
        Err(err) => {
            results.push(TestResult::check("haul_generate", false, err.to_string()));
            return results;
        }
    };

    let tree = e.stowage.categories().clone();
    let mut locker_ids = Vec::new();
    for (&locker, category) in layout.lockers.iter().zip(["Tools", "Materials", "Supplies"]) {
        let Some(id) = e.world.stable_id(locker) else {
            continue;
        };
        if let Ok(prefs) = e.stowage.prefs_mut().get_or_create(&id) {
            prefs.add_category(ItemHint::new(category), &tree);
        }
        locker_ids.push((locker, id));
    }

    let hauler = match spawn_character(
        &mut e.world,
        "H1",
        "Hauler",
        Character::crew(),
        Position::new(vessel, 5, 5),
    ) {
        Ok(h) => h,
        Err(err) => {
            results.push(TestResult::check("haul_spawn", false, err.to_string()));
            return results;
        }
    };

    let (mut planned, mut handled, mut defaulted, mut stale_jobs) = (0, 0, 0, 0);
    for &item in &cargo {
        let plan = e.assign_haul(hauler, item);
        if plan.is_some() {
            planned += 1;
        }
        if e.world.equip(item, hauler, "hand").is_err() {
            continue;
        }
        match e.drop_item(hauler, item) {
            EffectOutcome::Handled => handled += 1,
            EffectOutcome::Continue => defaulted += 1,
        }
        if e.stowage.jobs().contains("H1") {
            stale_jobs += 1;
        }
    }

    results.push(TestResult::check(
        "haul_plans_made",
        planned > 0,
        format!("{} of {} stacks planned", planned, cargo.len()),
    ));
    results.push(TestResult::check(
        "haul_drops_handled",
        handled == planned,
        format!("{} handled, {} default drops", handled, defaulted),
    ));
    results.push(TestResult::check(
        "haul_jobs_closed",
        stale_jobs == 0,
        format!("{} jobs left open", stale_jobs),
    ));

    let mut misplaced = Vec::new();
    for (locker, id) in &locker_ids {
        for stored in e.world.contents(*locker) {
            let def = e.world.def_id(stored).unwrap_or_default();
            if !e.stowage.prefs().is_item_allowed(id, &def, e.stowage.categories()) {
                misplaced.push(format!("{} in {}", def, id));
            }
        }
    }
    results.push(TestResult::check(
        "haul_respects_prefs",
        misplaced.is_empty(),
        format!("misplaced: {:?}", misplaced),
    ));

    let unrestricted = layout.lockers.get(3).copied();
    let untouched = unrestricted.map_or(true, |l| e.world.contents(l).is_empty());
    results.push(TestResult::check(
        "haul_skips_unconfigured_lockers",
        untouched,
        "locker without preferences stays empty",
    ));
    results
}

// ── 4. EVA ──────────────────────────────────────────────────────────────

fn validate_eva(data: &Data, seed: u64) -> Vec<TestResult> {
    let mut results = Vec::new();
    let mut e = engine(data);
    let vessel = VesselId(1);
    let config = ShipConfig {
        spare_batteries: 0,
        spare_bottles: 0,
        ..ShipConfig::default()
    };

    let setup = (|| {
        let (layout, _) = e.generate(vessel, &config, 0, seed)?;
        let at = Position::new(vessel, 5, 5);
        let crew = spawn_character(&mut e.world, "E1", "Eva", Character::crew(), at)?;
        let kit = fit_eva_suit(&mut e.world, crew, 0.1, 0.15)?;
        if let Some(charger) = layout.charger {
            battery("fresh-battery", 1.0).spawn_in(&mut e.world, charger)?;
        }
        let stockpile = Position::new(vessel, 1, config.height - 2);
        o2_bottle("fresh-bottle", 0.95).spawn_at(&mut e.world, stockpile)?;
        Ok::<_, WorldError>(kit)
    })();
    let kit = match setup {
        Ok(kit) => kit,
        Err(err) => {
            results.push(TestResult::check("eva_setup", false, err.to_string()));
            return results;
        }
    };

    let mut actions = Vec::new();
    for _ in 0..40 {
        actions.extend(e.update(1.0).into_iter().map(|(_, a)| a));
    }
    let kinds: Vec<&str> = actions
        .iter()
        .map(|a| match a {
            MaintenanceAction::SwapBattery { .. } => "battery",
            MaintenanceAction::SwapO2 { .. } => "o2",
            MaintenanceAction::RemoveHelmet { .. } => "helmet",
        })
        .collect();
    results.push(TestResult::check(
        "eva_battery_before_o2",
        kinds == ["battery", "o2"],
        format!("{:?}", kinds),
    ));

    let levels = eva::suit_levels(&e.world, kit.suit);
    results.push(TestResult::check(
        "eva_suit_topped_up",
        levels.battery.is_some_and(|b| b > 0.99) && levels.o2.is_some_and(|o| o > 0.9),
        format!("{:?}", levels),
    ));
    results.push(TestResult::check(
        "eva_helmet_kept",
        e.world.parent(kit.helmet).is_some(),
        "helmet still worn",
    ));
    results
}

// ── 5. Persistence ──────────────────────────────────────────────────────

fn validate_persistence(data: &Data, seed: u64) -> Vec<TestResult> {
    let mut results = Vec::new();
    let mut e = engine(data);
    let layout = match e.generate(VesselId(1), &ShipConfig::default(), 8, seed) {
        Ok((layout, _)) => layout,
        Err(err) => {
            results.push(TestResult::check("persist_generate", false, err.to_string()));
            return results;
        }
    };
    let tree = e.stowage.categories().clone();
    for &locker in &layout.lockers {
        if let Some(id) = e.world.stable_id(locker) {
            if let Ok(prefs) = e.stowage.prefs_mut().get_or_create(&id) {
                prefs.add_category(ItemHint::new("Tools"), &tree);
            }
        }
    }

    let mut buffer = Vec::new();
    let saved = e.save(&mut buffer);
    let mut restored = engine(data);
    let loaded = saved.map_err(|e| e.to_string()).and_then(|_| {
        restored.load(&buffer[..]).map_err(|e| e.to_string())
    });
    results.push(TestResult::check(
        "session_roundtrip",
        loaded.is_ok()
            && restored.world.len() == e.world.len()
            && restored.stowage.prefs().len() == e.stowage.prefs().len(),
        format!("{} bytes, {:?}", buffer.len(), loaded.map(|r| r.loaded)),
    ));

    let dir = std::env::temp_dir().join(format!("stowage-simtest-{}", std::process::id()));
    let imported = std::fs::create_dir_all(&dir)
        .map_err(|e| e.to_string())
        .and_then(|_| e.export_prefs(&dir).map_err(|e| e.to_string()))
        .and_then(|_| {
            let mut fresh = engine(data);
            fresh.import_prefs(&dir).map_err(|e| e.to_string())
        });
    let _ = std::fs::remove_dir_all(&dir);
    results.push(TestResult::check(
        "prefs_json_roundtrip",
        imported
            .as_ref()
            .is_ok_and(|r| r.loaded == layout.lockers.len()),
        format!("{:?}", imported.map(|r| r.loaded)),
    ));
    results
}
