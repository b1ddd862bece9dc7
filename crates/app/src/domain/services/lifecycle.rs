//! Status transitions and the milestone dates they stamp.
//!
//! Every function here is pure: the caller supplies the clock reading and
//! the stored state, and persists whatever comes back.

use jiff::Timestamp;

use crate::domain::{
    locations::records::LocationUuid,
    services::records::{Milestones, ServiceRecord, ServiceStatus},
};

/// Why a service refuses a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Frozen(pub(crate) ServiceStatus);

/// Milestones for a service entering `target`, starting from `base`.
///
/// | target    | ready           | delivery        | cancellation    |
/// |-----------|-----------------|-----------------|-----------------|
/// | pending   | cleared         | cleared         | cleared         |
/// | ready     | kept or now     | cleared         | cleared         |
/// | completed | kept or now     | kept or now     | kept            |
/// | cancelled | kept            | kept            | kept or now     |
#[must_use]
pub fn derive_milestones(target: ServiceStatus, base: Milestones, now: Timestamp) -> Milestones {
    match target {
        ServiceStatus::Pending => Milestones::default(),
        ServiceStatus::Ready => Milestones {
            ready_date: Some(base.ready_date.unwrap_or(now)),
            delivery_date: None,
            cancellation_date: None,
        },
        ServiceStatus::Completed => Milestones {
            ready_date: Some(base.ready_date.unwrap_or(now)),
            delivery_date: Some(base.delivery_date.unwrap_or(now)),
            cancellation_date: base.cancellation_date,
        },
        ServiceStatus::Cancelled => Milestones {
            ready_date: base.ready_date,
            delivery_date: base.delivery_date,
            cancellation_date: Some(base.cancellation_date.unwrap_or(now)),
        },
    }
}

/// Milestones for a newly created service. Caller-supplied dates count as
/// already present.
#[must_use]
pub fn milestones_on_create(status: ServiceStatus, supplied: Milestones, now: Timestamp) -> Milestones {
    derive_milestones(status, supplied, now)
}

/// Milestones after updating `current` to `target`.
///
/// Re-saving in the same status may correct a stored date. A status change
/// starts from the stored dates and ignores supplied ones.
#[must_use]
pub fn milestones_on_update(
    current: &ServiceRecord,
    target: ServiceStatus,
    supplied: Milestones,
    now: Timestamp,
) -> Milestones {
    let stored = current.milestones;

    let base = if current.status == target {
        Milestones {
            ready_date: supplied.ready_date.or(stored.ready_date),
            delivery_date: supplied.delivery_date.or(stored.delivery_date),
            cancellation_date: supplied.cancellation_date.or(stored.cancellation_date),
        }
    } else {
        stored
    };

    derive_milestones(target, base, now)
}

pub(crate) fn ensure_mutable(status: ServiceStatus) -> Result<(), Frozen> {
    if status.is_terminal() {
        return Err(Frozen(status));
    }

    Ok(())
}

/// Cancelled services were never fulfilled and may still be removed.
pub(crate) fn ensure_deletable(status: ServiceStatus) -> Result<(), Frozen> {
    if status == ServiceStatus::Completed {
        return Err(Frozen(status));
    }

    Ok(())
}

/// A location change that must be written to the transfer log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Relocation {
    pub(crate) from: LocationUuid,
    pub(crate) to: LocationUuid,
}

pub(crate) fn relocation(from: LocationUuid, to: LocationUuid) -> Option<Relocation> {
    (from != to).then_some(Relocation { from, to })
}
