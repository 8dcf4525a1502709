//! Approximate name search over a reference field.
//!
//! Every value of the searched field (and, optionally, every expanded
//! synonym) is scored against the query. Scores are grouped per canonical id
//! keeping the best candidate, then ranked by descending score with ties
//! ordered by canonical id.

use std::collections::BTreeMap;

use ontomap_model::{Field, ReferenceTable};
use rapidfuzz::distance::{indel, jaro_winkler};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ReconcileError, Result};
use crate::options::{SearchOptions, check_delimiter};
use crate::utils::split_synonyms;

/// String similarity used to score candidates, on a 0-100 scale.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scorer {
    /// Normalized Indel similarity (edit distance without substitutions).
    #[default]
    Ratio,
    JaroWinkler,
}

impl Scorer {
    pub fn score(self, a: &str, b: &str) -> f64 {
        if a == b {
            return 100.0;
        }
        let similarity = match self {
            Self::Ratio => indel::normalized_similarity(a.chars(), b.chars()),
            Self::JaroWinkler => jaro_winkler::similarity(a.chars(), b.chars()),
        };
        similarity * 100.0
    }
}

/// How many hits a search returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode")]
pub enum SearchMode {
    /// All rows ranked by score, optionally truncated.
    Ranked { limit: Option<usize> },
    /// Every row tied at the top score.
    Best,
}

impl Default for SearchMode {
    fn default() -> Self {
        Self::Ranked { limit: None }
    }
}

/// One reference row scored against the query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub canonical_id: String,
    pub row: usize,
    pub score: f64,
    /// Candidate string (field value or synonym) that produced the score.
    pub matched: String,
}

pub struct FuzzyMatcher<'a> {
    table: &'a ReferenceTable,
}

impl<'a> FuzzyMatcher<'a> {
    pub fn new(table: &'a ReferenceTable) -> Self {
        Self { table }
    }

    /// Ranks reference rows by similarity of `field` (and synonyms) to
    /// `query`. A blank query yields no hits.
    ///
    /// # Errors
    ///
    /// [`ReconcileError::Schema`] for an unknown field and
    /// [`ReconcileError::InvalidOption`] for an empty delimiter or a minimum
    /// score outside 0-100.
    pub fn search(
        &self,
        query: &str,
        field: &str,
        options: &SearchOptions,
    ) -> Result<Vec<SearchHit>> {
        check_delimiter(&options.delimiter)?;
        if let Some(min) = options.min_score
            && !(0.0..=100.0).contains(&min)
        {
            return Err(ReconcileError::InvalidOption(format!(
                "minimum score {min} is outside 0-100"
            )));
        }
        let target = self.table.field(field)?;
        let synonyms = options
            .synonyms_field
            .as_deref()
            .map(|name| self.table.field(name))
            .transpose()?;

        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let needle = fold(query, options.case_sensitive);

        let mut best: BTreeMap<usize, (f64, &str)> = BTreeMap::new();
        for (row, candidate) in self.candidates(target, synonyms, &options.delimiter) {
            let score = options
                .scorer
                .score(&needle, &fold(candidate, options.case_sensitive));
            match best.get(&row) {
                Some((current, _)) if *current >= score => {}
                _ => {
                    best.insert(row, (score, candidate));
                }
            }
        }

        let mut hits: Vec<SearchHit> = best
            .into_iter()
            .filter(|(_, (score, _))| options.min_score.is_none_or(|min| *score >= min))
            .filter_map(|(row, (score, candidate))| {
                let row_ref = self.table.row(row)?;
                Some(SearchHit {
                    canonical_id: row_ref.id().to_string(),
                    row,
                    score,
                    matched: candidate.to_string(),
                })
            })
            .collect();
        hits.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.canonical_id.cmp(&b.canonical_id))
        });

        match options.mode {
            SearchMode::Ranked { limit: Some(limit) } => hits.truncate(limit),
            SearchMode::Ranked { limit: None } => {}
            SearchMode::Best => {
                if let Some(top) = hits.first().map(|hit| hit.score) {
                    hits.retain(|hit| hit.score == top);
                }
            }
        }
        debug!(query, field, hits = hits.len(), "fuzzy search");
        Ok(hits)
    }

    /// `(row, candidate)` pairs: field values first, then synonyms.
    fn candidates<'s>(
        &'s self,
        target: Field,
        synonyms: Option<Field>,
        delimiter: &'s str,
    ) -> Vec<(usize, &'s str)> {
        let table: &'s ReferenceTable = self.table;
        let mut pool: Vec<(usize, &'s str)> = table
            .field_values(target)
            .flat_map(|(row, value)| value.items().iter().map(move |item| (row, item.as_str())))
            .filter(|(_, item)| !item.trim().is_empty())
            .collect();
        if let Some(synonyms) = synonyms {
            for (row, value) in table.field_values(synonyms) {
                for cell in value.items() {
                    pool.extend(split_synonyms(cell, delimiter).map(|name| (row, name)));
                }
            }
        }
        pool
    }
}

fn fold(raw: &str, case_sensitive: bool) -> String {
    let trimmed = raw.trim();
    if case_sensitive {
        trimmed.to_string()
    } else {
        trimmed.to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells() -> ReferenceTable {
        ReferenceTable::builder("id")
            .row([
                ("id", "CL:0000084"),
                ("name", "T cell"),
                ("synonyms", "T-cell|T lymphocyte"),
            ])
            .row([
                ("id", "CL:0000236"),
                ("name", "B cell"),
                ("synonyms", "B lymphocyte"),
            ])
            .row([("id", "CL:0000235"), ("name", "macrophage"), ("synonyms", "")])
            .build()
            .unwrap()
    }

    #[test]
    fn identical_strings_score_100() {
        assert_eq!(Scorer::Ratio.score("T cell", "T cell"), 100.0);
        assert_eq!(Scorer::JaroWinkler.score("T cell", "T cell"), 100.0);
    }

    #[test]
    fn ratio_matches_indel_similarity() {
        // indel distance 2 over a combined length of 8
        assert!((Scorer::Ratio.score("abcd", "abce") - 75.0).abs() < 1e-9);
    }

    #[test]
    fn ranks_by_score_then_id() {
        let table = cells();
        let hits = FuzzyMatcher::new(&table)
            .search("T cell", "name", &SearchOptions::default())
            .unwrap();
        assert_eq!(hits[0].canonical_id, "CL:0000084");
        assert_eq!(hits[0].score, 100.0);
        assert_eq!(hits.len(), 3);
        assert!(hits.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn synonyms_extend_the_pool() {
        let table = cells();
        let options = SearchOptions::default().with_synonyms("synonyms").best_match();
        let hits = FuzzyMatcher::new(&table)
            .search("b lymphocyte", "name", &options)
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].canonical_id, "CL:0000236");
        assert_eq!(hits[0].matched, "B lymphocyte");
        assert_eq!(hits[0].score, 100.0);
    }

    #[test]
    fn best_mode_returns_all_ties() {
        let table = ReferenceTable::builder("id")
            .row([("id", "2"), ("name", "abcx")])
            .row([("id", "1"), ("name", "abcy")])
            .row([("id", "3"), ("name", "zzzz")])
            .build()
            .unwrap();
        let hits = FuzzyMatcher::new(&table)
            .search("abcd", "name", &SearchOptions::default().best_match())
            .unwrap();
        let ids: Vec<&str> = hits.iter().map(|h| h.canonical_id.as_str()).collect();
        assert_eq!(ids, ["1", "2"]);
    }

    #[test]
    fn limit_truncates_ranking() {
        let table = cells();
        let hits = FuzzyMatcher::new(&table)
            .search("cell", "name", &SearchOptions::default().with_limit(2))
            .unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn case_sensitive_search_penalizes_case() {
        let table = cells();
        let matcher = FuzzyMatcher::new(&table);
        let folded = matcher
            .search("MACROPHAGE", "name", &SearchOptions::default().best_match())
            .unwrap();
        assert_eq!(folded[0].score, 100.0);
        let strict = matcher
            .search(
                "MACROPHAGE",
                "name",
                &SearchOptions::default().with_case_sensitive(true).best_match(),
            )
            .unwrap();
        assert!(strict[0].score < 100.0);
    }

    #[test]
    fn min_score_filters_hits() {
        let table = cells();
        let hits = FuzzyMatcher::new(&table)
            .search("T cell", "name", &SearchOptions::default().with_min_score(100.0))
            .unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn blank_query_has_no_hits() {
        let table = cells();
        let hits = FuzzyMatcher::new(&table)
            .search("  ", "name", &SearchOptions::default())
            .unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn invalid_options_are_rejected() {
        let table = cells();
        let matcher = FuzzyMatcher::new(&table);
        assert!(matches!(
            matcher.search("x", "label", &SearchOptions::default()),
            Err(ReconcileError::Schema(_))
        ));
        assert!(matches!(
            matcher.search("x", "name", &SearchOptions::default().with_min_score(120.0)),
            Err(ReconcileError::InvalidOption(_))
        ));
    }
}
