//! Service Data

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::domain::{
    locations::records::LocationUuid,
    pagination::PageRequest,
    services::{
        records::{Milestones, ServiceRecord, ServiceStatus},
        rut::format_rut,
    },
};

/// Descriptive fields shared by creation and update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Validate)]
pub struct ServiceFields {
    #[validate(length(min = 1))]
    pub invoice_number: String,

    #[validate(length(min = 2))]
    pub client_name: String,

    pub rut: Option<String>,

    #[validate(length(min = 6))]
    pub contact: String,

    #[validate(email)]
    pub email: Option<String>,

    #[validate(length(min = 2))]
    pub product: String,

    pub sku: Option<String>,
    pub failure_description: Option<String>,

    /// Whole currency units.
    pub repair_cost: Option<u64>,

    pub notes: Option<String>,
}

impl ServiceFields {
    /// Trim every field, canonicalise the RUT and check the result.
    ///
    /// Optional fields that end up blank are treated as absent.
    ///
    /// # Errors
    ///
    /// Returns the failed rules, keyed by field name.
    pub fn sanitize(self) -> Result<Self, ValidationErrors> {
        let fields = Self {
            invoice_number: self.invoice_number.trim().to_owned(),
            client_name: self.client_name.trim().to_owned(),
            rut: self.rut.as_deref().and_then(format_rut),
            contact: self.contact.trim().to_owned(),
            email: trimmed(self.email),
            product: self.product.trim().to_owned(),
            sku: trimmed(self.sku),
            failure_description: trimmed(self.failure_description),
            repair_cost: self.repair_cost,
            notes: trimmed(self.notes),
        };

        let mut errors = match fields.validate() {
            Ok(()) => ValidationErrors::new(),
            Err(errors) => errors,
        };

        // Stored as a signed 64-bit amount.
        if fields
            .repair_cost
            .is_some_and(|cost| i64::try_from(cost).is_err())
        {
            errors.add("repair_cost", ValidationError::new("range"));
        }

        if errors.errors().is_empty() {
            Ok(fields)
        } else {
            Err(errors)
        }
    }
}

impl From<&ServiceRecord> for ServiceFields {
    fn from(service: &ServiceRecord) -> Self {
        Self {
            invoice_number: service.invoice_number.clone(),
            client_name: service.client_name.clone(),
            rut: service.rut.clone(),
            contact: service.contact.clone(),
            email: service.email.clone(),
            product: service.product.clone(),
            sku: service.sku.clone(),
            failure_description: service.failure_description.clone(),
            repair_cost: service.repair_cost,
            notes: service.notes.clone(),
        }
    }
}

/// New Service Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewService {
    pub fields: ServiceFields,
    pub location_uuid: LocationUuid,

    /// Defaults to the time of creation.
    pub entry_date: Option<Timestamp>,

    /// Defaults to pending.
    pub status: Option<ServiceStatus>,

    /// Dates already known at intake, such as a historical cancellation.
    pub milestones: Milestones,
}

/// Service Update Data
///
/// Carries the full editable state; fields not meant to change are sent
/// back with their current values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceUpdate {
    pub fields: ServiceFields,
    pub location_uuid: LocationUuid,

    /// `None` keeps the stored entry date.
    pub entry_date: Option<Timestamp>,

    pub status: ServiceStatus,

    /// Only honoured when the status does not change.
    pub milestones: Milestones,
}

impl From<&ServiceRecord> for ServiceUpdate {
    fn from(service: &ServiceRecord) -> Self {
        Self {
            fields: ServiceFields::from(service),
            location_uuid: service.location_uuid,
            entry_date: Some(service.entry_date),
            status: service.status,
            milestones: service.milestones,
        }
    }
}

/// Entry date ordering for service listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    #[must_use]
    pub const fn is_descending(self) -> bool {
        matches!(self, Self::Desc)
    }
}

/// Filter for service listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServicesFilter {
    pub page: PageRequest,

    /// Case-insensitive substring of client name, invoice number or RUT.
    pub search: Option<String>,

    /// Any of these statuses; empty means all.
    pub statuses: SmallVec<[ServiceStatus; 4]>,

    pub location: Option<LocationUuid>,
    pub sort_order: SortOrder,
}

impl ServicesFilter {
    /// `ILIKE` pattern for the search term, with wildcards in the term escaped.
    pub(crate) fn search_pattern(&self) -> Option<String> {
        let term = self.search.as_deref().map(str::trim).filter(|term| !term.is_empty())?;

        let mut pattern = String::with_capacity(term.len() + 2);

        pattern.push('%');

        for c in term.chars() {
            if matches!(c, '\\' | '%' | '_') {
                pattern.push('\\');
            }

            pattern.push(c);
        }

        pattern.push('%');

        Some(pattern)
    }

    pub(crate) fn status_names(&self) -> Vec<String> {
        self.statuses
            .iter()
            .map(|status| status.as_str().to_string())
            .collect()
    }
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}
