//! Locations service errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;
use validator::ValidationErrors;

use crate::domain::errors::FailureKind;

#[derive(Debug, Error)]
pub enum LocationsServiceError {
    #[error("invalid location data")]
    Validation(#[from] ValidationErrors),

    #[error("a location with this name (or a similar one) already exists")]
    AlreadyExists,

    #[error("location not found")]
    NotFound,

    #[error("location has services or transfer history")]
    InUse,

    #[error("missing required data")]
    MissingRequiredData,

    #[error("invalid data")]
    InvalidData,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl LocationsServiceError {
    /// Outcome category for callers.
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Validation(_) | Self::MissingRequiredData | Self::InvalidData => {
                FailureKind::Validation
            }
            Self::AlreadyExists => FailureKind::Duplicate,
            Self::NotFound => FailureKind::NotFound,
            Self::InUse => FailureKind::Conflict,
            Self::Sql(_) => FailureKind::Storage,
        }
    }
}

impl From<Error> for LocationsServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::AlreadyExists,
            Some(ErrorKind::ForeignKeyViolation) => Self::InUse,
            Some(ErrorKind::NotNullViolation) => Self::MissingRequiredData,
            Some(ErrorKind::CheckViolation) => Self::InvalidData,
            Some(ErrorKind::Other | _) | None => Self::Sql(error),
        }
    }
}
