//! Location Records

use jiff::Timestamp;
use serde::Serialize;

use crate::{domain::owners::OwnerUuid, uuids::TypedUuid};

/// Location UUID
pub type LocationUuid = TypedUuid<LocationRecord>;

/// Location Record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationRecord {
    pub uuid: LocationUuid,
    pub owner_uuid: OwnerUuid,
    pub name: String,
    pub address: Option<String>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Location with its usage aggregates.
#[derive(Debug, Clone, Serialize)]
pub struct LocationSummary {
    #[serde(flatten)]
    pub location: LocationRecord,

    /// Services currently held here that are still open (pending or ready).
    pub active_count: u64,

    /// Completed services whose last location was this one.
    pub completed_count: u64,

    /// Whether anything ever happened here: open or completed services,
    /// or a transfer in or out.
    pub has_history: bool,

    /// No service of any status and no transfer references this location.
    pub deletable: bool,
}

/// Raw usage counters for a single location.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct LocationUsage {
    pub(crate) service_count: u64,
    pub(crate) active_count: u64,
    pub(crate) completed_count: u64,
    pub(crate) transfer_count: u64,
}

impl LocationUsage {
    pub(crate) fn has_history(&self) -> bool {
        self.active_count > 0 || self.completed_count > 0 || self.transfer_count > 0
    }

    pub(crate) fn is_referenced(&self) -> bool {
        self.service_count > 0 || self.transfer_count > 0
    }

    pub(crate) fn summarize(self, location: LocationRecord) -> LocationSummary {
        LocationSummary {
            location,
            active_count: self.active_count,
            completed_count: self.completed_count,
            has_history: self.has_history(),
            deletable: !self.is_referenced(),
        }
    }
}
