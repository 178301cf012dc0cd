//! Haul job fulfilment on drop events.
//!
//! A drop by a character with an active job for the dropped item type is
//! turned into a delivery: the dropped stack goes into the target
//! container, then more matching stacks are pulled from the character's
//! inventory until the job is satisfied or nothing matching is left.
//!
//! Precondition failures cancel the job. Running out of matching items
//! keeps it for the next drop.

use crate::error::HostError;
use crate::host::Host;
use crate::jobs::{HaulJob, HaulJobTable};
use crate::store::PrefsView;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    MissingContainer,
    NoStorage,
    NoLineOfSight,
    NotAllowed,
    /// The container handed part of a stack back.
    ContainerFull,
    HostFailure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// Job satisfied and removed.
    Completed { delivered: i64 },
    /// Delivered what the character had; the job waits for the next drop.
    Partial { delivered: i64, remaining: i64 },
    Cancelled(CancelReason),
    /// Not a tracked delivery.
    Ignored,
}

impl DeliveryOutcome {
    /// Whether items were placed, so the host's default drop must not run.
    pub fn handled(&self) -> bool {
        matches!(
            self,
            DeliveryOutcome::Completed { .. }
                | DeliveryOutcome::Partial { .. }
                | DeliveryOutcome::Cancelled(CancelReason::ContainerFull)
        )
    }
}

/// Run a delivery for `item` dropped by `character`.
pub fn deliver_drop<H: Host>(
    host: &mut H,
    jobs: &mut HaulJobTable,
    ctx: &PrefsView<'_>,
    character: H::Entity,
    item: H::Entity,
) -> DeliveryOutcome {
    let (Some(character_id), Some(item_def)) = (host.stable_id(character), host.def_id(item)) else {
        return DeliveryOutcome::Ignored;
    };
    let job = match jobs.get(&character_id) {
        Some(job) if job.item_def == item_def => job.clone(),
        _ => return DeliveryOutcome::Ignored,
    };

    match run_delivery(host, jobs, ctx, character, item, &job) {
        Ok(outcome) => outcome,
        Err(err) => {
            log::error!(
                "Delivery of {} by {} into {} failed: {}",
                job.item_def,
                job.character_id,
                job.target_container_id,
                err
            );
            jobs.cancel(&character_id);
            DeliveryOutcome::Cancelled(CancelReason::HostFailure)
        }
    }
}

fn cancel(jobs: &mut HaulJobTable, job: &HaulJob, reason: CancelReason) -> DeliveryOutcome {
    log::warn!(
        "Cancelling haul job of {} into {}: {:?}",
        job.character_id,
        job.target_container_id,
        reason
    );
    jobs.cancel(&job.character_id);
    DeliveryOutcome::Cancelled(reason)
}

/// Move one stack into the container. `false` when the container refused
/// part of it; the refused part is set down next to the character.
fn place<H: Host>(
    host: &mut H,
    character: H::Entity,
    container: H::Entity,
    item: H::Entity,
) -> Result<bool, HostError> {
    host.remove_from_home(item)?;
    match host.add_to_storage(container, item)? {
        None => Ok(true),
        Some(leftover) => {
            host.set_down_near(character, leftover)?;
            Ok(false)
        }
    }
}

/// Next stack of `item_def` the character holds: equipped slots first.
fn find_held<H: Host>(host: &H, character: H::Entity, item_def: &str) -> Option<H::Entity> {
    host.equipped_items(character)
        .into_iter()
        .chain(host.inventory_items(character))
        .find(|&e| host.def_id(e).as_deref() == Some(item_def))
}

fn run_delivery<H: Host>(
    host: &mut H,
    jobs: &mut HaulJobTable,
    ctx: &PrefsView<'_>,
    character: H::Entity,
    item: H::Entity,
    job: &HaulJob,
) -> Result<DeliveryOutcome, HostError> {
    let Some(container) = host.lookup(&job.target_container_id) else {
        return Ok(cancel(jobs, job, CancelReason::MissingContainer));
    };
    if !host.has_storage(container) {
        return Ok(cancel(jobs, job, CancelReason::NoStorage));
    }
    if !host.line_of_sight(character, container) {
        return Ok(cancel(jobs, job, CancelReason::NoLineOfSight));
    }
    if !ctx.is_item_allowed(&job.target_container_id, &job.item_def) {
        return Ok(cancel(jobs, job, CancelReason::NotAllowed));
    }

    let mut remaining = job.quantity_remaining;
    let mut delivered = 0i64;

    let count = i64::from(host.stack_count(item));
    if !place(host, character, container, item)? {
        return Ok(cancel(jobs, job, CancelReason::ContainerFull));
    }
    remaining -= count;
    delivered += count;

    while remaining > 0 {
        let Some(found) = find_held(host, character, &job.item_def) else {
            break;
        };
        let size = i64::from(host.stack_count(found));
        if size <= 0 {
            break;
        }

        if size > remaining {
            while remaining > 0 {
                let unit = host.split_unit(found)?;
                if !place(host, character, container, unit)? {
                    return Ok(cancel(jobs, job, CancelReason::ContainerFull));
                }
                remaining -= 1;
                delivered += 1;
            }
        } else {
            if !place(host, character, container, found)? {
                return Ok(cancel(jobs, job, CancelReason::ContainerFull));
            }
            remaining -= size;
            delivered += size;
        }
    }

    if remaining <= 0 {
        jobs.cancel(&job.character_id);
        log::info!(
            "Haul job of {} complete: {} x{} into {}",
            job.character_id,
            job.item_def,
            delivered,
            job.target_container_id
        );
        return Ok(DeliveryOutcome::Completed { delivered });
    }

    if let Some(active) = jobs.get_mut(&job.character_id) {
        active.quantity_remaining = remaining;
    }
    log::info!(
        "Delivered {} x{} for {}, {} still to go",
        job.item_def,
        delivered,
        job.character_id,
        remaining
    );
    Ok(DeliveryOutcome::Partial {
        delivered,
        remaining,
    })
}
