//! Policies for choosing among several rows claiming the same name.

use serde::{Deserialize, Serialize};

/// A reference row competing for one query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate<'a> {
    pub canonical_id: &'a str,
    /// The row's target-field value (its display name).
    pub value: &'a str,
    /// Row index in the reference table.
    pub row: usize,
}

/// Chooses a winner among ambiguous candidates.
///
/// Candidates are passed in reference row order. Returning `None` leaves the
/// query unmapped.
pub trait TieBreaker {
    fn choose(&self, query: &str, candidates: &[Candidate<'_>]) -> Option<usize>;
}

/// Built-in tie-break policies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// Shortest value, then lexicographically smallest value, then smallest
    /// canonical id. Read-through and pseudogene entries usually carry the
    /// longer names.
    #[default]
    Shortest,
    /// Earliest row in the reference table.
    First,
    /// Latest row in the reference table.
    Last,
    /// Leave ambiguous queries unmapped.
    Unresolved,
}

impl TieBreaker for TieBreak {
    fn choose(&self, _query: &str, candidates: &[Candidate<'_>]) -> Option<usize> {
        if candidates.is_empty() {
            return None;
        }
        match self {
            Self::Shortest => candidates
                .iter()
                .enumerate()
                .min_by(|(_, a), (_, b)| {
                    a.value
                        .chars()
                        .count()
                        .cmp(&b.value.chars().count())
                        .then_with(|| a.value.cmp(b.value))
                        .then_with(|| a.canonical_id.cmp(b.canonical_id))
                })
                .map(|(idx, _)| idx),
            Self::First => Some(0),
            Self::Last => Some(candidates.len() - 1),
            Self::Unresolved => None,
        }
    }
}

impl<F> TieBreaker for F
where
    F: Fn(&str, &[Candidate<'_>]) -> Option<usize>,
{
    fn choose(&self, query: &str, candidates: &[Candidate<'_>]) -> Option<usize> {
        self(query, candidates)
    }
}
