//! Best-fit destination selection.

use crate::categories::CategoryResolver;
use crate::host::Host;
use crate::store::PrefsStore;

/// Per-candidate outcome counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectionStats {
    pub no_prefs: usize,
    pub not_allowed: usize,
    pub full: usize,
    pub matching: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection<E> {
    pub container: Option<E>,
    pub stats: SelectionStats,
}

/// Whether `item` can go into `container` right now.
///
/// Stacking onto existing contents needs no free cell, so it is tried
/// before the fit test.
pub fn can_accept<H: Host>(host: &H, container: H::Entity, item: H::Entity) -> bool {
    host.contents(container)
        .into_iter()
        .any(|existing| host.can_stack_onto(existing, item))
        || host.can_fit(container, item)
}

/// Pick the container with the most empty cells among those whose
/// preference allows the item and that can take it.
///
/// Containers without a preference, or with an empty one, are not hauling
/// targets. Ties keep the first candidate encountered.
pub fn select_best_container<H: Host>(
    host: &H,
    item: H::Entity,
    item_def: &str,
    candidates: &[H::Entity],
    store: &PrefsStore,
    resolver: &dyn CategoryResolver,
) -> Selection<H::Entity> {
    let mut stats = SelectionStats::default();
    let mut best: Option<(H::Entity, usize)> = None;

    for &container in candidates {
        let prefs = host
            .stable_id(container)
            .and_then(|id| store.get(&id))
            .filter(|p| !p.is_empty());
        let Some(prefs) = prefs else {
            stats.no_prefs += 1;
            continue;
        };

        if !prefs.is_item_allowed(item_def, resolver) {
            stats.not_allowed += 1;
            continue;
        }

        if !can_accept(host, container, item) {
            stats.full += 1;
            continue;
        }

        stats.matching += 1;
        let empty = host.empty_cells(container);
        if best.map_or(true, |(_, most)| empty > most) {
            best = Some((container, empty));
        }
    }

    Selection {
        container: best.map(|(c, _)| c),
        stats,
    }
}
