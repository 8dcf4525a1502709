//! Query batches as supplied by callers.

use std::collections::BTreeSet;

/// Ordered query strings, possibly with duplicates and missing entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryBatch {
    raw: Vec<Option<String>>,
}

impl QueryBatch {
    pub fn new<I, S>(queries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            raw: queries
                .into_iter()
                .map(|query| Some(query.as_ref().to_string()))
                .collect(),
        }
    }

    /// Builds a batch where `None` marks a missing (null) query.
    pub fn from_optional<I, S>(queries: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: AsRef<str>,
    {
        Self {
            raw: queries
                .into_iter()
                .map(|query| query.map(|q| q.as_ref().to_string()))
                .collect(),
        }
    }

    /// Number of supplied entries, including nulls, blanks and duplicates.
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Trimmed, non-empty queries de-duplicated in first-seen order.
    pub fn unique(&self) -> Vec<&str> {
        let mut seen = BTreeSet::new();
        self.raw
            .iter()
            .filter_map(|query| query.as_deref())
            .map(str::trim)
            .filter(|query| !query.is_empty())
            .filter(|query| seen.insert(*query))
            .collect()
    }

    /// Trimmed queries in input order; `None` for null or blank entries.
    pub fn normalized(&self) -> impl Iterator<Item = Option<&str>> + '_ {
        self.raw.iter().map(|query| {
            query
                .as_deref()
                .map(str::trim)
                .filter(|query| !query.is_empty())
        })
    }
}

impl<S: AsRef<str>> FromIterator<S> for QueryBatch {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}
