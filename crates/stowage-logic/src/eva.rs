//! EVA suit upkeep: battery and O2 bottle swaps, and the planner that
//! decides when a character should swap or take the helmet off.
//!
//! A suit is the item worn in [`SUIT_SLOT`] with [`Cond::EvaOn`]. Its
//! battery and bottle sit inside pocket containers equipped on the suit.

use std::collections::HashMap;

use crate::config::EvaThresholds;
use crate::error::HostError;
use crate::host::{Cond, Host, Stat, HELMET_SLOT, SUIT_SLOT};

/// Which consumable a helper is looking at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Consumable {
    Battery,
    O2Bottle,
}

impl Consumable {
    pub fn cond(self) -> Cond {
        match self {
            Consumable::Battery => Cond::EvaBattery,
            Consumable::O2Bottle => Cond::EvaBottle,
        }
    }

    fn stats(self) -> (Stat, Stat) {
        match self {
            Consumable::Battery => (Stat::Power, Stat::PowerMax),
            Consumable::O2Bottle => (Stat::GasMolO2, Stat::GasRef),
        }
    }
}

// ── Suit helpers ────────────────────────────────────────────────────

pub fn find_suit<H: Host>(host: &H, character: H::Entity) -> Option<H::Entity> {
    host.slot_items(character, SUIT_SLOT)
        .into_iter()
        .find(|&e| host.has_cond(e, Cond::EvaOn))
}

/// The suit's consumable and the pocket holding it.
pub fn suit_consumable<H: Host>(
    host: &H,
    suit: H::Entity,
    kind: Consumable,
) -> Option<(H::Entity, H::Entity)> {
    host.equipped_items(suit)
        .into_iter()
        .filter(|&pocket| host.has_storage(pocket))
        .find_map(|pocket| {
            host.contents(pocket)
                .into_iter()
                .find(|&e| host.has_cond(e, kind.cond()))
                .map(|item| (item, pocket))
        })
}

/// Charge as a fraction of capacity. `None` when the capacity is not
/// positive.
pub fn charge_fraction<H: Host>(host: &H, item: H::Entity, kind: Consumable) -> Option<f64> {
    let (level, max) = kind.stats();
    let max = host.stat(item, max);
    if max <= 0.0 {
        return None;
    }
    Some(host.stat(item, level) / max)
}

/// Replacement check used by the planner. Only "not carried" is tested,
/// so an item installed elsewhere but not carried still qualifies.
pub fn is_valid_replacement<H: Host>(host: &H, item: H::Entity) -> bool {
    !host.has_cond(item, Cond::Carried)
}

/// Whether the character's room is safe to breathe without a helmet.
pub fn is_atmosphere_breathable<H: Host>(host: &H, character: H::Entity) -> bool {
    const TOXIC: [Cond; 4] = [Cond::GasPpCo2, Cond::GasPpH2So4, Cond::GasPpCh4, Cond::GasPpNh3];
    host.room_has_cond(character, Cond::GasPpO2)
        && !TOXIC.iter().any(|&c| host.room_has_cond(character, c))
        && host.room_has_cond(character, Cond::GasTempOk)
}

/// Best by charge fraction, first encountered on ties.
fn best_by_charge<H: Host>(
    host: &H,
    items: impl IntoIterator<Item = H::Entity>,
    kind: Consumable,
) -> Option<H::Entity> {
    let mut best: Option<(H::Entity, f64)> = None;
    for item in items {
        let Some(fraction) = charge_fraction(host, item, kind) else {
            continue;
        };
        if best.map_or(true, |(_, top)| fraction > top) {
            best = Some((item, fraction));
        }
    }
    best.map(|(e, _)| e)
}

/// Result of a completed swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapReport<E> {
    pub removed: E,
    pub installed: E,
}

// ── Battery swap ────────────────────────────────────────────────────

/// The charger an interaction points at: the target, or the parent of a
/// targeted battery, walked up to the first entity flagged as a charger.
pub fn resolve_charger<H: Host>(host: &H, target: H::Entity) -> H::Entity {
    let mut charger = target;
    if host.has_cond(charger, Cond::EvaBattery) {
        charger = host.parent(charger).unwrap_or(charger);
    }
    if !host.has_cond(charger, Cond::EvaCharger) {
        let mut parent = host.parent(charger);
        while let Some(p) = parent {
            if host.has_cond(p, Cond::EvaCharger) {
                return p;
            }
            parent = host.parent(p);
        }
    }
    charger
}

/// The explicitly chosen consumable: the third party, else a target that
/// is itself of the right kind.
pub fn preferred_consumable<H: Host>(
    host: &H,
    target: Option<H::Entity>,
    third: Option<H::Entity>,
    kind: Consumable,
) -> Option<H::Entity> {
    third.or_else(|| target.filter(|&t| host.has_cond(t, kind.cond())))
}

pub fn select_replacement_battery<H: Host>(
    host: &H,
    charger: H::Entity,
    current: H::Entity,
    preferred: Option<H::Entity>,
) -> Option<H::Entity> {
    let candidates: Vec<H::Entity> = host
        .contents(charger)
        .into_iter()
        .filter(|&e| host.has_cond(e, Cond::EvaBattery))
        .collect();
    if let Some(p) = preferred {
        if p != current && candidates.contains(&p) {
            return Some(p);
        }
    }
    best_by_charge(
        host,
        candidates.into_iter().filter(|&b| b != current),
        Consumable::Battery,
    )
}

/// Swap the actor's suit battery for one from `charger`.
///
/// `Ok(None)` means nothing was swapped; the reason is logged.
/// Put `item` into `container`, or on the floor next to `actor` when the
/// container refuses it.
fn store_or_set_down<H: Host>(
    host: &mut H,
    container: H::Entity,
    item: H::Entity,
    actor: H::Entity,
) -> Result<(), HostError> {
    if let Some(left) = host.add_to_storage(container, item)? {
        host.set_down_near(actor, left)?;
    }
    Ok(())
}

pub fn swap_battery<H: Host>(
    host: &mut H,
    actor: H::Entity,
    charger: H::Entity,
    preferred: Option<H::Entity>,
) -> Result<Option<SwapReport<H::Entity>>, HostError> {
    let name = host.display_name(actor);
    if !host.in_player_company(actor) {
        log::debug!("{} is not in the player's company, skipping battery swap", name);
        return Ok(None);
    }
    let Some(suit) = find_suit(host, actor) else {
        log::warn!("Battery swap: no EVA suit on {}", name);
        return Ok(None);
    };
    let Some((current, pocket)) = suit_consumable(host, suit, Consumable::Battery) else {
        log::warn!("Battery swap: suit of {} has no reachable battery", name);
        return Ok(None);
    };
    let Some(replacement) = select_replacement_battery(host, charger, current, preferred) else {
        log::warn!("Battery swap: no replacement battery in charger");
        return Ok(None);
    };

    host.remove_from_home(current)?;
    if host.add_to_storage(pocket, replacement)?.is_some() {
        log::warn!("Battery swap: replacement did not fit the suit pocket");
        store_or_set_down(host, charger, replacement, actor)?;
        store_or_set_down(host, pocket, current, actor)?;
        return Ok(None);
    }
    store_or_set_down(host, charger, current, actor)?;

    log::info!("{} swapped to battery {}", name, host.display_name(replacement));
    Ok(Some(SwapReport {
        removed: current,
        installed: replacement,
    }))
}

// ── O2 bottle swap ──────────────────────────────────────────────────

/// A preferred bottle above half charge wins; otherwise the fullest loose
/// bottle lying in a stockpile zone of the actor's vessel.
pub fn select_replacement_bottle<H: Host>(
    host: &H,
    actor: H::Entity,
    current: H::Entity,
    preferred: Option<H::Entity>,
) -> Option<H::Entity> {
    let vessel = host.vessel(actor)?;

    if let Some(p) = preferred.filter(|&p| p != current) {
        if charge_fraction(host, p, Consumable::O2Bottle).is_some_and(|f| f > 0.5) {
            return Some(p);
        }
    }

    let loose = host.stockpile_items(vessel).into_iter().filter(|&b| {
        b != current && host.has_cond(b, Cond::EvaBottle) && host.parent(b).is_none()
    });
    let best = best_by_charge(host, loose, Consumable::O2Bottle);
    if best.is_none() {
        log::debug!("No spare O2 bottle in stockpile zones");
    }
    best
}

/// Swap the actor's suit bottle. The depleted bottle goes where the
/// replacement came from.
pub fn swap_o2_bottle<H: Host>(
    host: &mut H,
    actor: H::Entity,
    preferred: Option<H::Entity>,
) -> Result<Option<SwapReport<H::Entity>>, HostError> {
    let name = host.display_name(actor);
    if !host.in_player_company(actor) {
        log::debug!("{} is not in the player's company, skipping O2 swap", name);
        return Ok(None);
    }
    let Some(suit) = find_suit(host, actor) else {
        log::warn!("O2 swap: no EVA suit on {}", name);
        return Ok(None);
    };
    let Some((current, pocket)) = suit_consumable(host, suit, Consumable::O2Bottle) else {
        log::warn!("O2 swap: suit of {} has no reachable bottle", name);
        return Ok(None);
    };
    let Some(replacement) = select_replacement_bottle(host, actor, current, preferred) else {
        log::warn!("O2 swap: no replacement bottle for {}", name);
        return Ok(None);
    };

    let origin = host.parent(replacement);
    host.remove_from_home(current)?;
    match origin {
        Some(parent) => {
            if let Some(left) = host.add_to_storage(parent, current)? {
                host.set_down_near(replacement, left)?;
            }
        }
        None => host.set_down_near(replacement, current)?,
    }
    if let Some(left) = host.add_to_storage(pocket, replacement)? {
        log::warn!("O2 swap: replacement did not fit the suit pocket");
        host.set_down_near(actor, left)?;
        return Ok(None);
    }

    log::info!("{} swapped to O2 bottle {}", name, host.display_name(replacement));
    Ok(Some(SwapReport {
        removed: current,
        installed: replacement,
    }))
}

// ── Maintenance planner ─────────────────────────────────────────────

/// Current suit levels. `None` when the consumable is missing or has no
/// capacity.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EvaLevels {
    pub battery: Option<f64>,
    pub o2: Option<f64>,
}

pub fn suit_levels<H: Host>(host: &H, suit: H::Entity) -> EvaLevels {
    let level = |kind| {
        suit_consumable(host, suit, kind).and_then(|(item, _)| charge_fraction(host, item, kind))
    };
    EvaLevels {
        battery: level(Consumable::Battery),
        o2: level(Consumable::O2Bottle),
    }
}

/// What a character should do about its suit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaintenanceAction<E> {
    SwapBattery { battery: E },
    SwapO2 { bottle: E },
    RemoveHelmet { helmet: E },
}

/// Per-character suit upkeep planner, throttled by a cooldown.
#[derive(Debug, Clone, Default)]
pub struct EvaMaintenance {
    thresholds: EvaThresholds,
    last_check: HashMap<String, f64>,
}

impl EvaMaintenance {
    pub fn new(thresholds: EvaThresholds) -> Self {
        Self {
            thresholds,
            last_check: HashMap::new(),
        }
    }

    pub fn clear(&mut self) {
        self.last_check.clear();
    }

    /// Decide on an action for `character` at simulation time `now`.
    pub fn plan<H: Host>(
        &mut self,
        host: &H,
        character: H::Entity,
        now: f64,
    ) -> Option<MaintenanceAction<H::Entity>> {
        if host.has_cond(character, Cond::AiManual) || host.vessel(character).is_none() {
            return None;
        }
        if host.has_cond(character, Cond::InCombat) || host.has_cond(character, Cond::Busy) {
            return None;
        }
        let suit = find_suit(host, character)?;

        let id = host.stable_id(character)?;
        if let Some(&last) = self.last_check.get(&id) {
            if now - last < self.thresholds.cooldown_secs {
                return None;
            }
        }
        self.last_check.insert(id, now);

        let t = self.thresholds;
        let levels = suit_levels(host, suit);
        let below = |level: Option<f64>, limit: f64| level.is_some_and(|l| l < limit);
        let battery_emergency = below(levels.battery, t.emergency);
        let o2_emergency = below(levels.o2, t.emergency);

        if battery_emergency {
            if let Some(battery) = self.find_battery(host, character, true) {
                return Some(MaintenanceAction::SwapBattery { battery });
            }
            if let Some(action) = self.helmet_off(host, character) {
                return Some(action);
            }
        }
        if o2_emergency {
            if let Some(bottle) = self.find_bottle(host, character, true) {
                return Some(MaintenanceAction::SwapO2 { bottle });
            }
            if let Some(action) = self.helmet_off(host, character) {
                return Some(action);
            }
        }
        if below(levels.battery, t.normal) {
            if let Some(battery) = self.find_battery(host, character, battery_emergency) {
                return Some(MaintenanceAction::SwapBattery { battery });
            }
        }
        if below(levels.o2, t.normal) {
            if let Some(bottle) = self.find_bottle(host, character, o2_emergency) {
                return Some(MaintenanceAction::SwapO2 { bottle });
            }
        }
        None
    }

    fn helmet_off<H: Host>(
        &self,
        host: &H,
        character: H::Entity,
    ) -> Option<MaintenanceAction<H::Entity>> {
        if !is_atmosphere_breathable(host, character) {
            return None;
        }
        let helmet = host.slot_items(character, HELMET_SLOT).into_iter().next()?;
        log::warn!(
            "{} is out of EVA supplies, removing helmet",
            host.display_name(character)
        );
        Some(MaintenanceAction::RemoveHelmet { helmet })
    }

    /// Vessels to search: the character's own, plus owned docked vessels
    /// in an emergency.
    fn search_vessels<H: Host>(host: &H, character: H::Entity, emergency: bool) -> Vec<H::Vessel> {
        let Some(home) = host.vessel(character) else {
            return Vec::new();
        };
        let mut vessels = vec![home];
        if emergency {
            vessels.extend(
                host.docked_vessels(home)
                    .into_iter()
                    .filter(|&v| host.owns_vessel(character, v)),
            );
        }
        vessels
    }

    fn good_replacement<H: Host>(
        &self,
        host: &H,
        character: H::Entity,
        item: H::Entity,
        kind: Consumable,
    ) -> bool {
        is_valid_replacement(host, item)
            && charge_fraction(host, item, kind).is_some_and(|f| f >= self.thresholds.replacement_min)
            && host.is_reachable(character, item)
    }

    fn find_battery<H: Host>(
        &self,
        host: &H,
        character: H::Entity,
        emergency: bool,
    ) -> Option<H::Entity> {
        Self::search_vessels(host, character, emergency)
            .into_iter()
            .flat_map(|v| host.vessel_entities(v))
            .filter(|&e| host.has_cond(e, Cond::EvaCharger))
            .flat_map(|charger| host.contents(charger))
            .filter(|&b| host.has_cond(b, Cond::EvaBattery))
            .find(|&b| self.good_replacement(host, character, b, Consumable::Battery))
    }

    fn find_bottle<H: Host>(
        &self,
        host: &H,
        character: H::Entity,
        emergency: bool,
    ) -> Option<H::Entity> {
        Self::search_vessels(host, character, emergency)
            .into_iter()
            .flat_map(|v| host.vessel_entities(v))
            .filter(|&b| host.has_cond(b, Cond::EvaBottle))
            .find(|&b| self.good_replacement(host, character, b, Consumable::O2Bottle))
    }
}
