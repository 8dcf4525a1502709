//! Strict membership checks of query terms against a reference field.

use std::collections::BTreeMap;

use ontomap_model::{CurationReport, MatchResult, QueryBatch, ReferenceTable};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::cache::{IndexCache, obtain};
use crate::error::Result;
use crate::options::{InspectOptions, check_delimiter};
use crate::synonyms::IndexSpec;
use crate::utils::normalize_key;

/// Result of [`Validator::inspect`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InspectOutcome {
    pub report: CurationReport,
    /// One entry per unique query, in first-seen order.
    pub matches: Vec<MatchResult>,
    /// Unmatched queries that the synonyms field would resolve.
    pub synonym_resolvable: usize,
}

impl InspectOutcome {
    pub fn validated(&self) -> impl Iterator<Item = &str> + '_ {
        self.matches
            .iter()
            .filter(|m| m.matched)
            .map(|m| m.query.as_str())
    }

    pub fn non_validated(&self) -> impl Iterator<Item = &str> + '_ {
        self.matches
            .iter()
            .filter(|m| !m.matched)
            .map(|m| m.query.as_str())
    }

    /// Validation flag per entry of `queries`; null and blank entries are
    /// `false`.
    pub fn flags_for(&self, queries: &QueryBatch) -> Vec<bool> {
        let matched: BTreeMap<&str, bool> = self
            .matches
            .iter()
            .map(|m| (m.query.as_str(), m.matched))
            .collect();
        queries
            .normalized()
            .map(|q| q.and_then(|q| matched.get(q).copied()).unwrap_or(false))
            .collect()
    }
}

/// Checks query terms against the values of one reference field.
pub struct Validator<'a> {
    table: &'a ReferenceTable,
    cache: Option<&'a IndexCache>,
}

impl<'a> Validator<'a> {
    pub fn new(table: &'a ReferenceTable) -> Self {
        Self { table, cache: None }
    }

    #[must_use]
    pub fn with_cache(mut self, cache: &'a IndexCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Marks each unique query as validated when it is a value of `field`.
    ///
    /// Synonyms never validate a query; with a synonyms field configured they
    /// are only counted in [`InspectOutcome::synonym_resolvable`]. A batch
    /// where nothing validates is still a result, with every query in the
    /// non-validated partition.
    ///
    /// # Errors
    ///
    /// [`ReconcileError::Schema`](crate::ReconcileError::Schema) for unknown
    /// fields and
    /// [`ReconcileError::InvalidOption`](crate::ReconcileError::InvalidOption)
    /// for an empty delimiter.
    pub fn inspect(
        &self,
        queries: &QueryBatch,
        field: &str,
        options: &InspectOptions,
    ) -> Result<InspectOutcome> {
        check_delimiter(&options.delimiter)?;
        let target = self.table.field(field)?;
        let index = options
            .synonyms_field
            .as_ref()
            .map(|synonyms| {
                let spec = IndexSpec::new(field)
                    .with_synonyms(Some(synonyms.as_str()))
                    .with_delimiter(options.delimiter.as_str())
                    .with_case_sensitive(options.case_sensitive);
                obtain(self.cache, self.table, &spec)
            })
            .transpose()?;

        // normalized value -> (canonical id, reference spelling), first row wins
        let mut known: BTreeMap<String, (&str, &str)> = BTreeMap::new();
        for (row_idx, value) in self.table.field_values(target) {
            let Some(row) = self.table.row(row_idx) else {
                continue;
            };
            for item in value.items() {
                known
                    .entry(normalize_key(item, options.case_sensitive))
                    .or_insert((row.id(), item.as_str()));
            }
        }

        let unique = queries.unique();
        let mut synonym_resolvable = 0usize;
        let matches: Vec<MatchResult> = unique
            .iter()
            .map(|&query| match known.get(&normalize_key(query, options.case_sensitive)) {
                Some(&(id, value)) => MatchResult::exact(query, id, Some(value.to_string())),
                None => {
                    if index.as_ref().is_some_and(|idx| !idx.resolve(query).is_empty()) {
                        synonym_resolvable += 1;
                    }
                    MatchResult::unmatched(query)
                }
            })
            .collect();
        let report = CurationReport::from_matches(&matches, queries.len());

        debug!(
            field,
            validated = report.n_mapped,
            non_validated = report.n_unmapped,
            "inspected queries"
        );
        if synonym_resolvable > 0 {
            info!(
                field,
                synonym_resolvable,
                "{synonym_resolvable} non-validated terms can be standardized through synonyms"
            );
        }
        Ok(InspectOutcome {
            report,
            matches,
            synonym_resolvable,
        })
    }
}
