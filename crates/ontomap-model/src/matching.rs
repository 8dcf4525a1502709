use serde::{Deserialize, Serialize};

/// How a query was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchVia {
    Exact,
    Synonym,
    Unmatched,
}

/// Per-query outcome of validation or standardization.
///
/// `matched` implies `canonical_id` is set and names a row of the reference
/// table the result was computed against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub query: String,
    pub matched: bool,
    pub canonical_id: Option<String>,
    /// Value reported for the matched row (target or return field).
    pub value: Option<String>,
    pub via: MatchVia,
}

impl MatchResult {
    pub fn exact(
        query: impl Into<String>,
        canonical_id: impl Into<String>,
        value: Option<String>,
    ) -> Self {
        Self {
            query: query.into(),
            matched: true,
            canonical_id: Some(canonical_id.into()),
            value,
            via: MatchVia::Exact,
        }
    }

    pub fn synonym(
        query: impl Into<String>,
        canonical_id: impl Into<String>,
        value: Option<String>,
    ) -> Self {
        Self {
            query: query.into(),
            matched: true,
            canonical_id: Some(canonical_id.into()),
            value,
            via: MatchVia::Synonym,
        }
    }

    pub fn unmatched(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            matched: false,
            canonical_id: None,
            value: None,
            via: MatchVia::Unmatched,
        }
    }
}
