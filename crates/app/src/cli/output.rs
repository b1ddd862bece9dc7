use std::fmt::Display;

use serde::Serialize;
use warranty_app::domain::errors::FailureKind;

/// Pretty JSON for stdout.
pub(crate) fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string_pretty(value)
        .map_err(|error| format!("failed to serialise output: {error}"))
}

/// `kind: message` line for a failed domain operation.
pub(crate) fn failure(kind: FailureKind, error: impl Display) -> String {
    format!("{kind}: {error}")
}
