//! Preference-aware haul destination lookup and haul planning.
//!
//! The host asks [`find_best_haul_destination`] before running its own
//! zone-based selection. `None` means "fall back to the default".

use crate::candidates::scan_candidates;
use crate::host::{Cond, Host};
use crate::jobs::HaulJobTable;
use crate::selector::select_best_container;
use crate::store::PrefsView;

/// Where a hauler should take an item, and where to stand while doing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HaulPlan<E, T> {
    pub container: E,
    pub walk_tile: T,
}

/// The preferred container on `vessel` for `item`, if any.
///
/// With `verbose` set, the per-candidate counters are logged.
pub fn find_best_haul_destination<H: Host>(
    host: &H,
    item: H::Entity,
    vessel: Option<H::Vessel>,
    prefs: PrefsView<'_>,
    verbose: bool,
) -> Option<H::Entity> {
    let item_def = host.def_id(item)?;
    let vessel = vessel?;
    let entities = host.vessel_entities(vessel);
    if entities.is_empty() {
        return None;
    }

    let scan = scan_candidates(host, entities);
    let selection = select_best_container(
        host,
        item,
        &item_def,
        &scan.candidates,
        prefs.store,
        prefs.resolver,
    );

    if verbose {
        let (s, c) = (scan.stats, selection.stats);
        log::debug!(
            "Haul destination for {}: checked={} carried={} hidden={} no_container={} no_prefs={} not_allowed={} full={} matching={} -> {:?}",
            item_def,
            s.checked,
            s.carried,
            s.hidden,
            s.no_storage,
            c.no_prefs,
            c.not_allowed,
            c.full,
            c.matching,
            selection.container
        );
    }
    selection.container
}

/// Tile the hauler should walk to in order to use `container`.
///
/// The walkable neighbour closest to the hauler wins; the container's own
/// tile is the fallback when no neighbour is walkable.
pub fn walk_target<H: Host>(host: &H, hauler: H::Entity, container: H::Entity) -> Option<H::Tile> {
    let target = host.tile_of(container)?;
    let origin = host.tile_of(hauler)?;

    let mut best: Option<(H::Tile, f32)> = None;
    for tile in host.surrounding_tiles(target) {
        if !host.is_walkable(hauler, tile) {
            continue;
        }
        let dist = host.tile_distance(origin, tile);
        if best.map_or(true, |(_, d)| dist < d) {
            best = Some((tile, dist));
        }
    }

    match best {
        Some((tile, _)) => Some(tile),
        None if host.is_walkable(hauler, target) => Some(target),
        None => None,
    }
}

/// Plan a haul and register the job for it.
pub fn plan_haul<H: Host>(
    host: &H,
    jobs: &mut HaulJobTable,
    prefs: PrefsView<'_>,
    hauler: H::Entity,
    item: H::Entity,
    verbose: bool,
) -> Option<HaulPlan<H::Entity, H::Tile>> {
    if !host.has_cond(item, Cond::Haulable) {
        return None;
    }
    let container = find_best_haul_destination(host, item, host.vessel(hauler), prefs, verbose)?;
    let Some(walk_tile) = walk_target(host, hauler, container) else {
        log::debug!("No walkable tile next to {:?}, using default hauling", container);
        return None;
    };

    let hauler_id = host.stable_id(hauler)?;
    let item_def = host.def_id(item)?;
    let container_id = host.stable_id(container)?;
    jobs.track(
        &hauler_id,
        &item_def,
        i64::from(host.stack_count(item)),
        &container_id,
    )
    .ok()?;

    Some(HaulPlan {
        container,
        walk_tile,
    })
}
