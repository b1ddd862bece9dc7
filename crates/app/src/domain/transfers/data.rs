//! Transfer Log Data

use jiff::{Timestamp, civil::Date, tz::TimeZone};

use crate::domain::{locations::records::LocationUuid, pagination::PageRequest};

/// Filter for the transfer audit listing.
///
/// Dates are calendar days in UTC; `end_date` includes the whole of that day.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferLogsFilter {
    pub page: PageRequest,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,

    /// Matches moves into or out of this location.
    pub location: Option<LocationUuid>,
}

/// Half-open `[from, until)` window on `changed_at`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct ChangedRange {
    pub(crate) from: Option<Timestamp>,
    pub(crate) until: Option<Timestamp>,
}

impl TransferLogsFilter {
    pub(crate) fn changed_range(&self) -> Result<ChangedRange, jiff::Error> {
        let from = self.start_date.map(start_of_day).transpose()?;

        let until = self
            .end_date
            .map(|date| date.tomorrow().and_then(start_of_day))
            .transpose()?;

        Ok(ChangedRange { from, until })
    }

    pub(crate) fn has_inverted_dates(&self) -> bool {
        matches!((self.start_date, self.end_date), (Some(start), Some(end)) if start > end)
    }
}

fn start_of_day(date: Date) -> Result<Timestamp, jiff::Error> {
    Ok(date.to_zoned(TimeZone::UTC)?.timestamp())
}
