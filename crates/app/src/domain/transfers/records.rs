//! Transfer Log Records

use jiff::Timestamp;
use serde::Serialize;

use crate::{
    domain::{locations::records::LocationUuid, services::records::ServiceUuid},
    uuids::TypedUuid,
};

/// Transfer Log UUID
pub type TransferLogUuid = TypedUuid<TransferLogRecord>;

/// A single move of a service between two locations. Written once, never edited.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransferLogRecord {
    pub uuid: TransferLogUuid,
    pub service_uuid: ServiceUuid,
    pub from_location_uuid: LocationUuid,
    pub to_location_uuid: LocationUuid,
    pub changed_at: Timestamp,
}

/// Transfer log entry with both location names attached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransferMove {
    #[serde(flatten)]
    pub log: TransferLogRecord,
    pub from_location_name: String,
    pub to_location_name: String,
}

/// Audit listing row: the move plus the service it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransferLogEntry {
    #[serde(flatten)]
    pub movement: TransferMove,
    pub invoice_number: String,
    pub product: String,
    pub client_name: String,
}
