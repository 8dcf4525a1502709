#![deny(unsafe_code)]

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single reference table cell.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum Value {
    #[default]
    Null,
    Text(String),
    /// Multi-valued cell, e.g. an already exploded synonyms column.
    List(Vec<String>),
}

impl Value {
    /// Builds a text cell; blank input becomes [`Value::Null`].
    pub fn text(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        if raw.trim().is_empty() {
            Self::Null
        } else {
            Self::Text(raw)
        }
    }

    /// Builds a list cell by splitting `raw` on `delimiter`.
    ///
    /// Items are trimmed and empty items dropped. A blank input becomes
    /// [`Value::Null`].
    pub fn split(raw: &str, delimiter: &str) -> Self {
        let items: Vec<String> = raw
            .split(delimiter)
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(String::from)
            .collect();
        if items.is_empty() {
            Self::Null
        } else {
            Self::List(items)
        }
    }

    pub fn is_null(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Text(_) => false,
            Self::List(items) => items.is_empty(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// All strings held by the cell: none, one, or every list item.
    pub fn items(&self) -> &[String] {
        match self {
            Self::Null => &[],
            Self::Text(text) => std::slice::from_ref(text),
            Self::List(items) => items,
        }
    }

    /// Renders the cell as a single string, joining list items with `delimiter`.
    pub fn joined(&self, delimiter: &str) -> Option<String> {
        match self {
            Self::Null => None,
            Self::Text(text) => Some(text.clone()),
            Self::List(items) if items.is_empty() => None,
            Self::List(items) => Some(items.join(delimiter)),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Text(text) => f.write_str(text),
            Self::List(items) => f.write_str(&items.join("|")),
        }
    }
}

impl From<&str> for Value {
    fn from(raw: &str) -> Self {
        Self::text(raw)
    }
}

impl From<String> for Value {
    fn from(raw: String) -> Self {
        Self::text(raw)
    }
}

impl From<Option<&str>> for Value {
    fn from(raw: Option<&str>) -> Self {
        raw.map_or(Self::Null, Self::text)
    }
}

impl From<Vec<String>> for Value {
    fn from(items: Vec<String>) -> Self {
        Self::List(items)
    }
}

impl From<Vec<&str>> for Value {
    fn from(items: Vec<&str>) -> Self {
        Self::List(items.into_iter().map(String::from).collect())
    }
}
