//! Transfer log service errors.

use sqlx::Error;
use thiserror::Error;

use crate::domain::{errors::FailureKind, pagination::PaginationError};

#[derive(Debug, Error)]
pub enum TransferLogsServiceError {
    #[error(transparent)]
    InvalidPage(#[from] PaginationError),

    #[error("start date is after end date")]
    InvalidDateRange,

    #[error("date is out of range")]
    DateOutOfRange(#[source] jiff::Error),

    #[error("storage error")]
    Sql(#[source] Error),
}

impl TransferLogsServiceError {
    /// Outcome category for callers.
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::InvalidPage(_) | Self::InvalidDateRange | Self::DateOutOfRange(_) => {
                FailureKind::Validation
            }
            Self::Sql(_) => FailureKind::Storage,
        }
    }
}

impl From<Error> for TransferLogsServiceError {
    fn from(error: Error) -> Self {
        Self::Sql(error)
    }
}
