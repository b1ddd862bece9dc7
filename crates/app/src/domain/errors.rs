//! Failure kinds shared by every domain concern.

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::Serialize;

/// Discriminated outcome a caller maps to a user-facing message or status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Malformed or missing input.
    Validation,

    /// Absent, or owned by someone else.
    NotFound,

    /// Name collision.
    Duplicate,

    /// Mutation of a record in a terminal state.
    ImmutableState,

    /// Deletion of something still referenced.
    Conflict,

    /// Persistence failure.
    Storage,
}

impl FailureKind {
    /// Stable name, identical to the serialised form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::NotFound => "not_found",
            Self::Duplicate => "duplicate",
            Self::ImmutableState => "immutable_state",
            Self::Conflict => "conflict",
            Self::Storage => "storage",
        }
    }
}

impl Display for FailureKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}
