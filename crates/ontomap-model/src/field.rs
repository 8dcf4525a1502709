#![deny(unsafe_code)]

use std::fmt;

use crate::ModelError;

/// Name of a reference table column.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FieldName(String);

impl FieldName {
    pub fn new(value: impl Into<String>) -> Result<Self, ModelError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ModelError::EmptyFieldName);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for FieldName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Typed handle to a column of one [`ReferenceTable`](crate::ReferenceTable).
///
/// Handles are obtained from [`ReferenceTable::field`](crate::ReferenceTable::field)
/// and are only meaningful for the table that issued them. Table accessors
/// panic on a handle whose position lies past their own schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Field(pub(crate) usize);

impl Field {
    /// Column position within the table schema.
    pub fn position(self) -> usize {
        self.0
    }
}
