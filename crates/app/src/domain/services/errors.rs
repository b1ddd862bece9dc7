//! Service lifecycle errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;
use validator::ValidationErrors;

use crate::domain::{
    errors::FailureKind,
    pagination::PaginationError,
    services::{lifecycle::Frozen, records::ServiceStatus},
};

#[derive(Debug, Error)]
pub enum ServiceLifecycleError {
    #[error("invalid service data")]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    InvalidPage(#[from] PaginationError),

    #[error("service not found")]
    NotFound,

    #[error("service is {0} and can no longer be changed")]
    Immutable(ServiceStatus),

    #[error("location does not exist")]
    InvalidReference,

    #[error("service already exists")]
    AlreadyExists,

    #[error("missing required data")]
    MissingRequiredData,

    #[error("invalid data")]
    InvalidData,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl ServiceLifecycleError {
    /// Outcome category for callers.
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Validation(_)
            | Self::InvalidPage(_)
            | Self::InvalidReference
            | Self::MissingRequiredData
            | Self::InvalidData => FailureKind::Validation,
            Self::NotFound => FailureKind::NotFound,
            Self::Immutable(_) => FailureKind::ImmutableState,
            Self::AlreadyExists => FailureKind::Duplicate,
            Self::Sql(_) => FailureKind::Storage,
        }
    }
}

impl From<Frozen> for ServiceLifecycleError {
    fn from(Frozen(status): Frozen) -> Self {
        Self::Immutable(status)
    }
}

impl From<Error> for ServiceLifecycleError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::AlreadyExists,
            Some(ErrorKind::ForeignKeyViolation) => Self::InvalidReference,
            Some(ErrorKind::NotNullViolation) => Self::MissingRequiredData,
            Some(ErrorKind::CheckViolation) => Self::InvalidData,
            Some(ErrorKind::Other | _) | None => Self::Sql(error),
        }
    }
}
