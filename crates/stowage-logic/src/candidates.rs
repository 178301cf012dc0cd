//! Storage candidate filter.
//!
//! Narrows every entity on a vessel down to the containers a hauler may
//! deliver into. The visibility rule is the same one that decides whether
//! a container's storage settings are offered to the player.

use crate::host::{Cond, Host, DRAG_SLOT};

/// Conditions that hide a container's storage from hauling and settings.
const HIDING_CONDS: [Cond; 4] = [Cond::Damaged, Cond::Loose, Cond::Locked, Cond::TraderNpc];

/// Portable containers that keep their storage settings while loose.
pub const PORTABLE_CONTAINERS: [&str; 6] = [
    "ItmCrate01",
    "ItmCrate01Lock",
    "ItmToolBox01",
    "ItmToolBox02",
    "ItmBackpack02",
    "ItmBackpack03",
];

/// Exclusion counters gathered while scanning.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub checked: usize,
    pub carried: usize,
    pub hidden: usize,
    pub no_storage: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateScan<E> {
    pub candidates: Vec<E>,
    pub stats: ScanStats,
}

/// Whether the entity's type is one of [`PORTABLE_CONTAINERS`].
pub fn is_portable_container<H: Host>(host: &H, entity: H::Entity) -> bool {
    host.def_id(entity)
        .is_some_and(|def| PORTABLE_CONTAINERS.contains(&def.as_str()))
}

fn hidden_by_state<H: Host>(host: &H, entity: H::Entity) -> bool {
    if host.slot_of(entity).as_deref() == Some(DRAG_SLOT) {
        return true;
    }
    HIDING_CONDS.iter().any(|&c| {
        host.has_cond(entity, c) && !(c == Cond::Loose && is_portable_container(host, entity))
    })
}

/// Whether a container's storage settings should be shown for `entity`.
pub fn is_storage_visible<H: Host>(host: &H, entity: H::Entity) -> bool {
    host.has_storage(entity)
        && !host.has_cond(entity, Cond::Carried)
        && !hidden_by_state(host, entity)
}

/// Filter `entities` down to usable storage, keeping input order.
pub fn scan_candidates<H, I>(host: &H, entities: I) -> CandidateScan<H::Entity>
where
    H: Host,
    I: IntoIterator<Item = H::Entity>,
{
    let mut stats = ScanStats::default();
    let mut candidates = Vec::new();

    for entity in entities {
        stats.checked += 1;
        if host.has_cond(entity, Cond::Carried) {
            stats.carried += 1;
            continue;
        }
        if hidden_by_state(host, entity) {
            stats.hidden += 1;
            continue;
        }
        if !host.has_storage(entity) {
            stats.no_storage += 1;
            continue;
        }
        candidates.push(entity);
    }

    CandidateScan { candidates, stats }
}
