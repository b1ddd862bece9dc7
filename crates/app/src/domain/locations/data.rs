//! Location Data

use validator::{Validate, ValidationErrors};

/// New Location Data
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct NewLocation {
    #[validate(length(min = 1, max = 100))]
    pub name: String,

    #[validate(length(max = 200))]
    pub address: Option<String>,
}

/// Location Update Data
///
/// Replaces both fields; an absent address clears the stored one.
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct LocationUpdate {
    #[validate(length(min = 3, max = 100))]
    pub name: String,

    #[validate(length(max = 200))]
    pub address: Option<String>,
}

impl NewLocation {
    /// Trim the input and check it.
    ///
    /// # Errors
    ///
    /// Returns the failed rules when the trimmed name or address is out of bounds.
    pub fn sanitize(self) -> Result<Self, ValidationErrors> {
        let location = Self {
            name: self.name.trim().to_owned(),
            address: trimmed(self.address),
        };

        location.validate()?;

        Ok(location)
    }
}

impl LocationUpdate {
    /// Trim the input and check it.
    ///
    /// # Errors
    ///
    /// Returns the failed rules when the trimmed name or address is out of bounds.
    pub fn sanitize(self) -> Result<Self, ValidationErrors> {
        let update = Self {
            name: self.name.trim().to_owned(),
            address: trimmed(self.address),
        };

        update.validate()?;

        Ok(update)
    }
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}
