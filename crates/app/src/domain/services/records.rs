//! Service Records

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use jiff::{Timestamp, civil::Date, tz::TimeZone};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    domain::{
        locations::records::LocationUuid,
        owners::OwnerUuid,
        services::aging::{Urgency, business_days_between},
        transfers::records::TransferMove,
    },
    uuids::TypedUuid,
};

/// Service UUID
pub type ServiceUuid = TypedUuid<ServiceRecord>;

/// Where a repair ticket is in its lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    #[default]
    Pending,
    Ready,
    Completed,
    Cancelled,
}

impl ServiceStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 4] = [Self::Pending, Self::Ready, Self::Completed, Self::Cancelled];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Ready => "ready",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Terminal services accept no further changes.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl Display for ServiceStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown service status `{0}`")]
pub struct UnknownServiceStatus(pub String);

impl FromStr for ServiceStatus {
    type Err = UnknownServiceStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownServiceStatus(s.to_string()))
    }
}

/// Dates stamped by status transitions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Milestones {
    pub ready_date: Option<Timestamp>,
    pub delivery_date: Option<Timestamp>,
    pub cancellation_date: Option<Timestamp>,
}

/// Service Record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceRecord {
    pub uuid: ServiceUuid,
    pub owner_uuid: OwnerUuid,
    pub invoice_number: String,
    pub client_name: String,
    pub rut: Option<String>,
    pub contact: String,
    pub email: Option<String>,
    pub product: String,
    pub sku: Option<String>,
    pub failure_description: Option<String>,
    pub location_uuid: LocationUuid,
    pub entry_date: Timestamp,
    #[serde(flatten)]
    pub milestones: Milestones,
    pub status: ServiceStatus,
    pub repair_cost: Option<u64>,
    pub notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ServiceRecord {
    /// Business days the service has been open as of `today`.
    ///
    /// Completed services stop counting on their delivery date.
    #[must_use]
    pub fn business_days_open(&self, today: Date) -> i64 {
        let start = utc_date(self.entry_date);

        let end = match (self.status, self.milestones.delivery_date) {
            (ServiceStatus::Completed, Some(delivered)) => utc_date(delivered),
            _ => today,
        };

        business_days_between(start, end)
    }

    /// Urgency of a pending service; other statuses are never overdue.
    #[must_use]
    pub fn urgency(&self, today: Date) -> Urgency {
        if self.status != ServiceStatus::Pending {
            return Urgency::OnTime;
        }

        Urgency::from_business_days(self.business_days_open(today))
    }
}

pub(crate) fn utc_date(timestamp: Timestamp) -> Date {
    timestamp.to_zoned(TimeZone::UTC).date()
}

/// Service with its current location name and newest-first move history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceDetails {
    #[serde(flatten)]
    pub service: ServiceRecord,
    pub location_name: String,
    pub history: Vec<TransferMove>,
}

/// Dashboard counters for one owner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ServiceStats {
    pub pending: u64,
    pub ready: u64,
    pub completed: u64,
    pub cancelled: u64,

    /// Pending services open for 10 to 14 business days.
    pub due_soon: u64,

    /// Pending services open for 15 business days or more.
    pub critical: u64,
}

impl ServiceStats {
    pub(crate) fn add_status_count(&mut self, status: ServiceStatus, count: u64) {
        match status {
            ServiceStatus::Pending => self.pending += count,
            ServiceStatus::Ready => self.ready += count,
            ServiceStatus::Completed => self.completed += count,
            ServiceStatus::Cancelled => self.cancelled += count,
        }
    }

    pub(crate) fn add_pending_urgency(&mut self, urgency: Urgency) {
        match urgency {
            Urgency::OnTime => {}
            Urgency::DueSoon => self.due_soon += 1,
            Urgency::Critical => self.critical += 1,
        }
    }
}
