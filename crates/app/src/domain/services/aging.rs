//! Business-day aging of open services.

use jiff::civil::Date;
use serde::Serialize;

/// Business days after which a pending service is due soon.
pub const DUE_SOON_BUSINESS_DAYS: i64 = 10;

/// Business days after which a pending service is critical.
pub const CRITICAL_BUSINESS_DAYS: i64 = 15;

/// How overdue a pending service is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    OnTime,
    DueSoon,
    Critical,
}

impl Urgency {
    #[must_use]
    pub const fn from_business_days(days: i64) -> Self {
        if days >= CRITICAL_BUSINESS_DAYS {
            Self::Critical
        } else if days >= DUE_SOON_BUSINESS_DAYS {
            Self::DueSoon
        } else {
            Self::OnTime
        }
    }
}

/// Monday-to-Friday days in `(start, end]`. Zero when `end` is not after `start`.
#[must_use]
pub fn business_days_between(start: Date, end: Date) -> i64 {
    if end <= start {
        return 0;
    }

    let days = i64::from(end.since(start).map_or(0, |span| span.get_days()));
    let start_weekday = i64::from(start.weekday().to_monday_zero_offset());

    let full_weeks = days / 7;
    let remainder = days % 7;

    let trailing = (1..=remainder)
        .filter(|offset| (start_weekday + offset) % 7 < 5)
        .count();

    full_weeks * 5 + i64::try_from(trailing).unwrap_or(0)
}
