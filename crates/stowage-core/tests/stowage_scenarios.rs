//! End-to-end scenarios on the ECS ship world.

use hecs::Entity;
use stowage_core::generation::{battery, charger, fit_eva_suit, o2_bottle, spawn_character};
use stowage_core::prelude::*;
use stowage_logic::categories::{Category, CategoryTree, ItemHint};
use stowage_logic::config::StowageConfig;
use stowage_logic::effects::EffectOutcome;
use stowage_logic::eva::{self, MaintenanceAction};
use stowage_logic::host::{Cond, Host};

const TUG: VesselId = VesselId(1);

struct Scenario {
    engine: StowageEngine,
    hauler: Entity,
    locker: Entity,
}

fn tools() -> CategoryTree {
    CategoryTree::new(vec![Category {
        id: "Tools".into(),
        display_name: "Tools".into(),
        items: vec![ItemHint::new("ItmWrench01")],
        subcategories: vec![],
    }])
}

fn scenario() -> Scenario {
    let mut engine = StowageEngine::new(StowageConfig::default(), tools());
    let mut deck = Deck::new(TUG, "Tug", 10, 10).with_breathable_air();
    deck.stockpile.insert(Tile::new(1, 8));
    engine.world.add_deck(deck);

    let hauler = spawn_character(
        &mut engine.world,
        "A1",
        "Ada",
        Character::crew(),
        Position::new(TUG, 1, 1),
    )
    .unwrap();
    let locker = ItemSpec::locker("C1", 4, 2)
        .spawn_at(&mut engine.world, Position::new(TUG, 5, 1))
        .unwrap();

    let tree = engine.stowage.categories().clone();
    engine
        .stowage
        .prefs_mut()
        .get_or_create("C1")
        .unwrap()
        .add_category(ItemHint::new("Tools"), &tree);

    Scenario {
        engine,
        hauler,
        locker,
    }
}

fn wrench(world: &mut ShipWorld, id: &str, count: u32) -> Entity {
    ItemSpec::new(id, "ItmWrench01")
        .named("Wrench")
        .count(count, 10)
        .cond(Cond::Haulable)
        .spawn_at(world, Position::new(TUG, 2, 3))
        .unwrap()
}

fn stored_units(world: &ShipWorld, container: Entity) -> u32 {
    world
        .contents(container)
        .into_iter()
        .map(|e| world.stack_count(e))
        .sum()
}

// ── Hauling ─────────────────────────────────────────────────────────

#[test]
fn haul_delivered_over_two_drops() {
    let mut s = scenario();
    let w = wrench(&mut s.engine.world, "wrench01", 5);

    let plan = s.engine.assign_haul(s.hauler, w).unwrap();
    assert_eq!(plan.container, s.locker);
    assert_eq!(plan.walk_tile, Tile::new(4, 1));
    assert_eq!(s.engine.stowage.jobs().get("A1").unwrap().quantity_remaining, 5);

    // Picked up, two units dropped first.
    s.engine.world.equip(w, s.hauler, "hand").unwrap();
    s.engine.world.set_stack_count(w, 2);
    assert_eq!(s.engine.drop_item(s.hauler, w), EffectOutcome::Handled);
    assert_eq!(s.engine.stowage.jobs().get("A1").unwrap().quantity_remaining, 3);
    assert_eq!(stored_units(&s.engine.world, s.locker), 2);

    let rest = wrench(&mut s.engine.world, "wrench02", 3);
    s.engine.world.equip(rest, s.hauler, "hand").unwrap();
    assert_eq!(s.engine.drop_item(s.hauler, rest), EffectOutcome::Handled);
    assert!(!s.engine.stowage.jobs().contains("A1"));

    // Both stacks merged into one.
    assert_eq!(s.engine.world.contents(s.locker).len(), 1);
    assert_eq!(stored_units(&s.engine.world, s.locker), 5);
    assert_eq!(s.engine.world.lookup("wrench02"), None);
}

#[test]
fn delivery_splits_reserve_stack_in_pouch() {
    let mut s = scenario();
    let w = wrench(&mut s.engine.world, "wrench01", 5);
    s.engine.assign_haul(s.hauler, w).unwrap();

    let pouch = ItemSpec::new("A1-pouch", "ItmPouch")
        .storage(2, 2)
        .spawn(&mut s.engine.world)
        .unwrap();
    s.engine.world.equip(pouch, s.hauler, "pocket").unwrap();
    let reserve = ItemSpec::new("wrench-reserve", "ItmWrench01")
        .count(10, 10)
        .spawn_in(&mut s.engine.world, pouch)
        .unwrap();

    s.engine.world.equip(w, s.hauler, "hand").unwrap();
    s.engine.world.set_stack_count(w, 2);
    assert_eq!(s.engine.drop_item(s.hauler, w), EffectOutcome::Handled);

    assert!(!s.engine.stowage.jobs().contains("A1"));
    assert_eq!(s.engine.world.stack_count(reserve), 7);
    assert_eq!(stored_units(&s.engine.world, s.locker), 5);
}

#[test]
fn disallowed_item_uses_default_hauling() {
    let mut s = scenario();
    let plate = ItemSpec::new("plate01", "ItmSteelPlate")
        .count(3, 20)
        .cond(Cond::Haulable)
        .spawn_at(&mut s.engine.world, Position::new(TUG, 2, 2))
        .unwrap();

    assert!(s.engine.assign_haul(s.hauler, plate).is_none());
    assert!(s.engine.stowage.jobs().is_empty());

    // An untracked drop lands at the character's feet.
    s.engine.world.equip(plate, s.hauler, "hand").unwrap();
    assert_eq!(s.engine.drop_item(s.hauler, plate), EffectOutcome::Continue);
    assert_eq!(s.engine.world.parent(plate), None);
    assert_eq!(s.engine.world.tile_of(plate), Some(Tile::new(1, 1)));
}

#[test]
fn wall_between_hauler_and_locker_cancels_job() {
    let mut s = scenario();
    let w = wrench(&mut s.engine.world, "wrench01", 5);
    s.engine.assign_haul(s.hauler, w).unwrap();

    if let Some(deck) = s.engine.world.deck_mut(TUG) {
        deck.walls.insert(Tile::new(3, 1));
    }
    s.engine.world.equip(w, s.hauler, "hand").unwrap();
    assert_eq!(s.engine.drop_item(s.hauler, w), EffectOutcome::Continue);

    assert!(!s.engine.stowage.jobs().contains("A1"));
    assert_eq!(stored_units(&s.engine.world, s.locker), 0);
    assert_eq!(s.engine.world.tile_of(w), Some(Tile::new(1, 1)));
}

#[test]
fn destroying_container_drops_its_preference() {
    let mut s = scenario();
    let w = wrench(&mut s.engine.world, "wrench01", 2);
    s.engine.world.store_in(w, s.locker).unwrap();

    s.engine.destroy_container(s.locker).unwrap();
    assert!(!s.engine.stowage.prefs().contains("C1"));
    assert_eq!(s.engine.world.lookup("C1"), None);
    assert_eq!(s.engine.world.parent(w), None);
    assert_eq!(s.engine.world.tile_of(w), Some(Tile::new(5, 1)));
}

#[test]
fn load_restores_preferences_and_forgets_jobs() {
    let mut s = scenario();
    let w = wrench(&mut s.engine.world, "wrench01", 5);
    s.engine.assign_haul(s.hauler, w).unwrap();

    let mut buffer = Vec::new();
    s.engine.save(&mut buffer).unwrap();

    let mut restored = StowageEngine::new(StowageConfig::default(), tools());
    restored.load(&buffer[..]).unwrap();
    assert!(restored.stowage.jobs().is_empty());
    let locker = restored.world.lookup("C1").unwrap();
    let wrench = restored.world.lookup("wrench01").unwrap();
    assert_eq!(restored.find_destination(wrench), Some(locker));
}

// ── EVA upkeep ──────────────────────────────────────────────────────

#[test]
fn low_battery_is_swapped_from_charger() {
    let mut s = scenario();
    let kit = fit_eva_suit(&mut s.engine.world, s.hauler, 0.2, 0.9).unwrap();
    let unit = charger("charger1", 2)
        .spawn_at(&mut s.engine.world, Position::new(TUG, 6, 4))
        .unwrap();
    let spare = battery("spare1", 0.9)
        .spawn_in(&mut s.engine.world, unit)
        .unwrap();

    let actions = s.engine.update(1.0);
    assert_eq!(
        actions,
        vec![(s.hauler, MaintenanceAction::SwapBattery { battery: spare })]
    );

    let levels = eva::suit_levels(&s.engine.world, kit.suit);
    assert!((levels.battery.unwrap() - 0.9).abs() < 1e-9);
    assert_eq!(s.engine.world.parent(kit.battery), Some(unit));

    // Cooldown holds the next check back.
    assert!(s.engine.update(1.0).is_empty());
}

#[test]
fn low_o2_is_swapped_from_stockpile() {
    let mut s = scenario();
    let kit = fit_eva_suit(&mut s.engine.world, s.hauler, 0.9, 0.1).unwrap();
    let spare = o2_bottle("bottle1", 0.8)
        .spawn_at(&mut s.engine.world, Position::new(TUG, 1, 8))
        .unwrap();

    let actions = s.engine.update(1.0);
    assert_eq!(
        actions,
        vec![(s.hauler, MaintenanceAction::SwapO2 { bottle: spare })]
    );
    let levels = eva::suit_levels(&s.engine.world, kit.suit);
    assert!((levels.o2.unwrap() - 0.8).abs() < 1e-9);
    // The empty bottle is left where the spare was.
    assert_eq!(s.engine.world.tile_of(kit.bottle), Some(Tile::new(1, 8)));
    assert!(!s.engine.world.has_cond(kit.bottle, Cond::Carried));
}

#[test]
fn helmet_comes_off_in_breathable_air_when_nothing_is_left() {
    let mut s = scenario();
    let kit = fit_eva_suit(&mut s.engine.world, s.hauler, 0.02, 0.9).unwrap();

    let actions = s.engine.update(1.0);
    assert_eq!(
        actions,
        vec![(s.hauler, MaintenanceAction::RemoveHelmet { helmet: kit.helmet })]
    );
    assert_eq!(s.engine.world.parent(kit.helmet), None);
    assert_eq!(s.engine.world.tile_of(kit.helmet), Some(Tile::new(1, 1)));
}

#[test]
fn helmet_stays_on_in_vacuum() {
    let mut s = scenario();
    if let Some(deck) = s.engine.world.deck_mut(TUG) {
        deck.atmosphere = Conditions::default();
    }
    let kit = fit_eva_suit(&mut s.engine.world, s.hauler, 0.02, 0.9).unwrap();

    assert!(s.engine.update(1.0).is_empty());
    assert_eq!(s.engine.world.parent(kit.helmet), Some(s.hauler));
}
