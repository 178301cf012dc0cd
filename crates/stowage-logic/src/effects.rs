//! Interaction effects hooked into the host's interaction pipeline.
//!
//! Each effect answers three questions about an interaction: does it
//! apply, what does it need to remember before the interaction runs, and
//! what happens when it executes. Effects are plain enum variants kept in
//! an ordered list; the first one returning [`EffectOutcome::Handled`]
//! stops the rest.

use crate::delivery::deliver_drop;
use crate::eva::{self, Consumable};
use crate::host::Host;
use crate::jobs::HaulJobTable;
use crate::store::PrefsView;

pub const DROP_ITEM_STACK: &str = "DropItemStack";
pub const SWAP_EVA_BATTERY: &str = "ACTSwapEVABattery";
pub const SWAP_EVA_O2_BOTTLE: &str = "ACTSwapEVAO2Bottle";

/// An interaction as the host reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interaction<E> {
    pub id: u64,
    pub name: String,
    /// The character performing it.
    pub actor: Option<E>,
    /// What it is performed on.
    pub target: Option<E>,
    pub third: Option<E>,
    /// Set when an effect took over; the host must skip its own handling.
    pub default_suppressed: bool,
}

impl<E> Interaction<E> {
    pub fn new(id: u64, name: &str, actor: E, target: Option<E>) -> Self {
        Self {
            id,
            name: name.to_string(),
            actor: Some(actor),
            target,
            third: None,
            default_suppressed: false,
        }
    }

    pub fn with_third(mut self, third: E) -> Self {
        self.third = Some(third);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectOutcome {
    /// Let later effects and the host's default run.
    Continue,
    Handled,
}

/// Stable ids captured when an interaction is prepared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Prepared {
    pub charger: Option<String>,
    pub preferred: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionEffect {
    ContainerDrop,
    BatterySwap,
    O2BottleSwap,
}

impl InteractionEffect {
    /// Registration order used by default.
    pub const ALL: [InteractionEffect; 3] = [
        InteractionEffect::ContainerDrop,
        InteractionEffect::BatterySwap,
        InteractionEffect::O2BottleSwap,
    ];

    pub fn interaction_name(self) -> &'static str {
        match self {
            InteractionEffect::ContainerDrop => DROP_ITEM_STACK,
            InteractionEffect::BatterySwap => SWAP_EVA_BATTERY,
            InteractionEffect::O2BottleSwap => SWAP_EVA_O2_BOTTLE,
        }
    }

    pub fn matches<H: Host>(
        self,
        host: &H,
        interaction: &Interaction<H::Entity>,
        jobs: &HaulJobTable,
    ) -> bool {
        if interaction.name != self.interaction_name() {
            return false;
        }
        match self {
            InteractionEffect::ContainerDrop => {
                let (Some(actor), Some(item)) = (interaction.actor, interaction.target) else {
                    return false;
                };
                let Some(job) = host.stable_id(actor).and_then(|id| jobs.get(&id)) else {
                    return false;
                };
                host.def_id(item).as_deref() == Some(job.item_def.as_str())
            }
            InteractionEffect::BatterySwap | InteractionEffect::O2BottleSwap => {
                interaction.actor.is_some()
            }
        }
    }

    pub fn prepare<H: Host>(self, host: &H, interaction: &Interaction<H::Entity>) -> Prepared {
        let id = |e: Option<H::Entity>| e.and_then(|e| host.stable_id(e));
        match self {
            InteractionEffect::ContainerDrop => Prepared::default(),
            InteractionEffect::BatterySwap => Prepared {
                charger: id(interaction.target.map(|t| eva::resolve_charger(host, t))),
                preferred: id(eva::preferred_consumable(
                    host,
                    interaction.target,
                    interaction.third,
                    Consumable::Battery,
                )),
            },
            InteractionEffect::O2BottleSwap => Prepared {
                charger: None,
                preferred: id(eva::preferred_consumable(
                    host,
                    interaction.target,
                    interaction.third,
                    Consumable::O2Bottle,
                )),
            },
        }
    }

    pub fn execute<H: Host>(
        self,
        host: &mut H,
        interaction: &mut Interaction<H::Entity>,
        prepared: &Prepared,
        jobs: &mut HaulJobTable,
        prefs: PrefsView<'_>,
    ) -> EffectOutcome {
        let Some(actor) = interaction.actor else {
            return EffectOutcome::Continue;
        };
        let lookup = |host: &H, id: &Option<String>| id.as_deref().and_then(|id| host.lookup(id));

        match self {
            InteractionEffect::ContainerDrop => {
                let Some(item) = interaction.target else {
                    return EffectOutcome::Continue;
                };
                let outcome = deliver_drop(host, jobs, &prefs, actor, item);
                if !outcome.handled() {
                    return EffectOutcome::Continue;
                }
                interaction.default_suppressed = true;
                interaction.actor = None;
                interaction.target = None;
                EffectOutcome::Handled
            }
            InteractionEffect::BatterySwap => {
                let charger = lookup(&*host, &prepared.charger)
                    .or_else(|| interaction.target.map(|t| eva::resolve_charger(&*host, t)));
                let Some(charger) = charger else {
                    log::warn!("Battery swap without a charger");
                    return EffectOutcome::Continue;
                };
                let preferred = lookup(&*host, &prepared.preferred);
                if let Err(err) = eva::swap_battery(host, actor, charger, preferred) {
                    log::error!("Battery swap failed: {}", err);
                }
                EffectOutcome::Continue
            }
            InteractionEffect::O2BottleSwap => {
                let preferred = lookup(&*host, &prepared.preferred);
                if let Err(err) = eva::swap_o2_bottle(host, actor, preferred) {
                    log::error!("O2 bottle swap failed: {}", err);
                }
                EffectOutcome::Continue
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::Cond;
    use crate::testing::{MockEntity, MockHost};

    #[test]
    fn effects_match_only_their_interaction() {
        let mut host = MockHost::new();
        let actor = host.spawn(MockEntity::character("A1"));
        let wrench = host.spawn(MockEntity::item("w", "ItmWrench01", 1));
        let mut jobs = HaulJobTable::new();

        let dropped = Interaction::new(1, DROP_ITEM_STACK, actor, Some(wrench));
        assert!(!InteractionEffect::ContainerDrop.matches(&host, &dropped, &jobs));
        jobs.track("A1", "ItmWrench01", 1, "C1").unwrap();
        assert!(InteractionEffect::ContainerDrop.matches(&host, &dropped, &jobs));
        assert!(!InteractionEffect::BatterySwap.matches(&host, &dropped, &jobs));

        jobs.track("A1", "ItmSteel", 1, "C1").unwrap();
        assert!(!InteractionEffect::ContainerDrop.matches(&host, &dropped, &jobs));

        let swap = Interaction::new(2, SWAP_EVA_BATTERY, actor, None);
        assert!(InteractionEffect::BatterySwap.matches(&host, &swap, &jobs));
    }

    #[test]
    fn battery_prepare_captures_charger_and_battery() {
        let mut host = MockHost::new();
        let actor = host.spawn(MockEntity::character("A1"));
        let charger = host.spawn(MockEntity::container("Charger", 2).with(Cond::EvaCharger));
        let battery = host.spawn(MockEntity::item("Batt", "ItmBattery", 1).with(Cond::EvaBattery));
        host.put_in(battery, charger);

        let ia = Interaction::new(3, SWAP_EVA_BATTERY, actor, Some(battery));
        let prepared = InteractionEffect::BatterySwap.prepare(&host, &ia);
        assert_eq!(prepared.charger.as_deref(), Some("Charger"));
        assert_eq!(prepared.preferred.as_deref(), Some("Batt"));
    }
}
