//! Maps free-text terms to canonical reference values.
//!
//! Each unique query goes through an exact pass against the target field and
//! then, when a synonyms field is configured, a synonym pass through the
//! [`SynonymIndex`](crate::SynonymIndex). Several rows claiming the same name
//! are settled by a [`TieBreaker`] and recorded as an [`Ambiguity`].

use std::collections::BTreeMap;

use ontomap_model::{
    CurationReport, Field, MatchResult, MatchVia, QueryBatch, ReferenceTable, RowRef,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::cache::{IndexCache, obtain};
use crate::error::{ReconcileError, Result};
use crate::options::{StandardizeOptions, check_delimiter};
use crate::synonyms::IndexSpec;
use crate::tiebreak::{Candidate, TieBreaker};
use crate::utils::normalize_key;

/// A query claimed by more than one reference row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ambiguity {
    pub query: String,
    /// Canonical ids of the competing rows, in table order.
    pub candidates: Vec<String>,
    /// Canonical id picked by the tie-break, if any.
    pub chosen: Option<String>,
}

/// Result of [`Standardizer::standardize`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardizeOutcome {
    /// One entry per unique query, in first-seen order.
    pub matches: Vec<MatchResult>,
    pub report: CurationReport,
    pub ambiguities: Vec<Ambiguity>,
}

impl StandardizeOutcome {
    /// Query to standardized value; unmapped queries map to `None`.
    pub fn mapping(&self) -> BTreeMap<String, Option<String>> {
        self.matches
            .iter()
            .map(|m| (m.query.clone(), m.value.clone()))
            .collect()
    }

    /// Standardized value per entry of `queries`, duplicates included.
    pub fn values_for(&self, queries: &QueryBatch) -> Vec<Option<String>> {
        let by_query: BTreeMap<&str, Option<&str>> = self
            .matches
            .iter()
            .map(|m| (m.query.as_str(), m.value.as_deref()))
            .collect();
        queries
            .normalized()
            .map(|q| {
                q.and_then(|q| by_query.get(q).copied().flatten())
                    .map(str::to_string)
            })
            .collect()
    }

    pub fn unmapped(&self) -> impl Iterator<Item = &str> + '_ {
        self.matches
            .iter()
            .filter(|m| !m.matched)
            .map(|m| m.query.as_str())
    }
}

pub struct Standardizer<'a> {
    table: &'a ReferenceTable,
    cache: Option<&'a IndexCache>,
}

struct Fields {
    target: Field,
    report: Field,
}

impl<'a> Standardizer<'a> {
    pub fn new(table: &'a ReferenceTable) -> Self {
        Self { table, cache: None }
    }

    #[must_use]
    pub fn with_cache(mut self, cache: &'a IndexCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Standardizes `queries` against `target_field` using the tie-break
    /// policy of `options`.
    ///
    /// # Errors
    ///
    /// See [`standardize_with`](Self::standardize_with).
    pub fn standardize(
        &self,
        queries: &QueryBatch,
        target_field: &str,
        options: &StandardizeOptions,
    ) -> Result<StandardizeOutcome> {
        self.standardize_with(queries, target_field, options, &options.tie_break)
    }

    /// Standardizes `queries` settling ambiguous names with `tie_breaker`.
    ///
    /// # Errors
    ///
    /// [`ReconcileError::Schema`] when the target, synonyms or return field is
    /// unknown, [`ReconcileError::DegenerateInput`] when a non-empty batch
    /// maps to nothing although the target field has values.
    pub fn standardize_with(
        &self,
        queries: &QueryBatch,
        target_field: &str,
        options: &StandardizeOptions,
        tie_breaker: &dyn TieBreaker,
    ) -> Result<StandardizeOutcome> {
        check_delimiter(&options.delimiter)?;
        let target = self.table.field(target_field)?;
        let fields = Fields {
            target,
            report: match options.return_field.as_deref() {
                Some(name) => self.table.field(name)?,
                None => target,
            },
        };
        let index = options
            .synonyms_field
            .as_ref()
            .map(|synonyms| {
                let spec = IndexSpec::new(target_field)
                    .with_synonyms(Some(synonyms.as_str()))
                    .with_delimiter(options.delimiter.as_str())
                    .with_case_sensitive(options.case_sensitive);
                obtain(self.cache, self.table, &spec)
            })
            .transpose()?;

        let mut direct: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for (row_idx, value) in self.table.field_values(target) {
            for item in value.items() {
                let rows = direct
                    .entry(normalize_key(item, options.case_sensitive))
                    .or_default();
                if !rows.contains(&row_idx) {
                    rows.push(row_idx);
                }
            }
        }

        let unique = queries.unique();
        let mut matches = Vec::with_capacity(unique.len());
        let mut ambiguities = Vec::new();
        let (mut n_exact, mut n_synonym) = (0usize, 0usize);
        for query in unique {
            let key = normalize_key(query, options.case_sensitive);
            let (rows, via) = if let Some(rows) = direct.get(&key) {
                (rows.clone(), MatchVia::Exact)
            } else if let Some(index) = index.as_ref() {
                let rows = index
                    .resolve(query)
                    .iter()
                    .filter_map(|id| self.table.lookup_row(id).map(|row| row.index()))
                    .collect::<Vec<_>>();
                (rows, MatchVia::Synonym)
            } else {
                (Vec::new(), MatchVia::Unmatched)
            };

            let rows = self.sorted_rows(&rows);
            let chosen = match rows.as_slice() {
                [] => None,
                [only] => Some(*only),
                _ => {
                    let picked = self.break_tie(query, &rows, &fields, tie_breaker);
                    let ambiguity = Ambiguity {
                        query: query.to_string(),
                        candidates: rows.iter().map(|row| row.id().to_string()).collect(),
                        chosen: picked.map(|row| row.id().to_string()),
                    };
                    warn!(
                        query,
                        candidates = ?ambiguity.candidates,
                        chosen = ambiguity.chosen.as_deref().unwrap_or("-"),
                        "ambiguous term"
                    );
                    ambiguities.push(ambiguity);
                    picked
                }
            };

            let result = match (chosen, via) {
                (Some(row), MatchVia::Exact) => {
                    n_exact += 1;
                    let value = report_value(row, &fields, options);
                    MatchResult::exact(query, row.id(), value)
                }
                (Some(row), _) => {
                    n_synonym += 1;
                    let value = report_value(row, &fields, options);
                    MatchResult::synonym(query, row.id(), value)
                }
                (None, _) => MatchResult::unmatched(query),
            };
            matches.push(result);
        }

        let report = CurationReport::from_matches(&matches, queries.len());
        if report.n_total > 0 && report.n_mapped == 0 && !direct.is_empty() {
            return Err(ReconcileError::DegenerateInput {
                field: target_field.to_string(),
                n_total: report.n_total,
            });
        }
        debug!(
            field = target_field,
            exact = n_exact,
            synonym = n_synonym,
            unmapped = report.n_unmapped,
            ambiguous = ambiguities.len(),
            "standardized queries"
        );
        Ok(StandardizeOutcome {
            matches,
            report,
            ambiguities,
        })
    }

    fn sorted_rows(&self, rows: &[usize]) -> Vec<RowRef<'a>> {
        let mut rows: Vec<RowRef<'a>> = rows
            .iter()
            .filter_map(|&idx| self.table.row(idx))
            .collect();
        rows.sort_by_key(RowRef::index);
        rows
    }

    fn break_tie(
        &self,
        query: &str,
        rows: &[RowRef<'a>],
        fields: &Fields,
        tie_breaker: &dyn TieBreaker,
    ) -> Option<RowRef<'a>> {
        let candidates: Vec<Candidate<'a>> = rows
            .iter()
            .map(|row| Candidate {
                canonical_id: row.id(),
                value: row
                    .get(fields.target)
                    .items()
                    .first()
                    .map_or("", String::as_str),
                row: row.index(),
            })
            .collect();
        tie_breaker
            .choose(query, &candidates)
            .and_then(|idx| rows.get(idx).copied())
    }
}

fn report_value(row: RowRef<'_>, fields: &Fields, options: &StandardizeOptions) -> Option<String> {
    row.get(fields.report).joined(&options.delimiter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiebreak::TieBreak;

    fn genes() -> ReferenceTable {
        ReferenceTable::builder("ensembl_gene_id")
            .row([
                ("ensembl_gene_id", "ENSG00000148584"),
                ("symbol", "A1CF"),
                ("synonyms", "ACF|ASP|APOBEC1CF"),
            ])
            .row([
                ("ensembl_gene_id", "ENSG00000121410"),
                ("symbol", "A1BG"),
                ("synonyms", ""),
            ])
            .row([
                ("ensembl_gene_id", "ENSG00000151640"),
                ("symbol", "DPYSL4"),
                ("synonyms", "CRMP3|ULIP4|ACF"),
            ])
            .build()
            .unwrap()
    }

    fn options() -> StandardizeOptions {
        StandardizeOptions::default().with_synonyms("synonyms")
    }

    #[test]
    fn maps_exact_and_synonym_terms() {
        let table = genes();
        let outcome = Standardizer::new(&table)
            .standardize(
                &QueryBatch::new(["ASP", "A1BG", "unknown"]),
                "symbol",
                &options(),
            )
            .unwrap();
        let mapping = outcome.mapping();
        assert_eq!(mapping["ASP"].as_deref(), Some("A1CF"));
        assert_eq!(mapping["A1BG"].as_deref(), Some("A1BG"));
        assert_eq!(mapping["unknown"], None);
        assert_eq!(outcome.matches[0].via, MatchVia::Synonym);
        assert_eq!(outcome.matches[1].via, MatchVia::Exact);
        assert_eq!(outcome.report.n_mapped, 2);
        assert_eq!(outcome.unmapped().collect::<Vec<_>>(), ["unknown"]);
    }

    #[test]
    fn return_field_reports_another_column() {
        let table = genes();
        let outcome = Standardizer::new(&table)
            .standardize(
                &QueryBatch::new(["APOBEC1CF"]),
                "symbol",
                &options().with_return_field("ensembl_gene_id"),
            )
            .unwrap();
        assert_eq!(outcome.matches[0].value.as_deref(), Some("ENSG00000148584"));
    }

    #[test]
    fn ambiguous_synonyms_are_recorded() {
        let table = genes();
        let outcome = Standardizer::new(&table)
            .standardize(&QueryBatch::new(["ACF"]), "symbol", &options())
            .unwrap();
        assert_eq!(outcome.ambiguities.len(), 1);
        let ambiguity = &outcome.ambiguities[0];
        assert_eq!(
            ambiguity.candidates,
            ["ENSG00000148584", "ENSG00000151640"]
        );
        // A1CF is shorter than DPYSL4
        assert_eq!(ambiguity.chosen.as_deref(), Some("ENSG00000148584"));
        assert_eq!(outcome.matches[0].value.as_deref(), Some("A1CF"));
    }

    #[test]
    fn unresolved_tie_break_leaves_query_unmapped() {
        let table = genes();
        let outcome = Standardizer::new(&table)
            .standardize(
                &QueryBatch::new(["ACF", "A1BG"]),
                "symbol",
                &options().with_tie_break(TieBreak::Unresolved),
            )
            .unwrap();
        assert!(!outcome.matches[0].matched);
        assert_eq!(outcome.ambiguities[0].chosen, None);
    }

    #[test]
    fn custom_tie_breaker() {
        fn last(_: &str, candidates: &[Candidate<'_>]) -> Option<usize> {
            candidates.len().checked_sub(1)
        }
        let table = genes();
        let outcome = Standardizer::new(&table)
            .standardize_with(&QueryBatch::new(["ACF"]), "symbol", &options(), &last)
            .unwrap();
        assert_eq!(outcome.matches[0].value.as_deref(), Some("DPYSL4"));
    }

    #[test]
    fn values_for_aligns_with_input() {
        let table = genes();
        let queries = QueryBatch::from_optional([Some("ASP"), None, Some("x"), Some("ASP")]);
        let outcome = Standardizer::new(&table)
            .standardize(&queries, "symbol", &options())
            .unwrap();
        assert_eq!(
            outcome.values_for(&queries),
            [Some("A1CF".to_string()), None, None, Some("A1CF".to_string())]
        );
    }

    #[test]
    fn nothing_mapped_is_degenerate() {
        let table = genes();
        let err = Standardizer::new(&table)
            .standardize(
                &QueryBatch::new(["ASP"]),
                "symbol",
                &StandardizeOptions::default(),
            )
            .unwrap_err();
        assert_eq!(
            err,
            ReconcileError::DegenerateInput {
                field: "symbol".to_string(),
                n_total: 1,
            }
        );
    }

    #[test]
    fn case_insensitive_mode_returns_reference_spelling() {
        let table = ReferenceTable::builder("id")
            .row([("id", "ABC"), ("synonyms", "Xyz-1|abc-2")])
            .row([("id", "DEF"), ("synonyms", "")])
            .build()
            .unwrap();
        let queries = QueryBatch::new(["abc", "DEF", "xyz-1"]);
        let standardizer = Standardizer::new(&table);

        let folded = standardizer
            .standardize(&queries, "id", &options().with_case_sensitive(false))
            .unwrap();
        let mapping = folded.mapping();
        assert_eq!(mapping["abc"].as_deref(), Some("ABC"));
        assert_eq!(mapping["xyz-1"].as_deref(), Some("ABC"));
        assert_eq!(folded.matches[0].via, MatchVia::Exact);
        assert_eq!(folded.matches[2].via, MatchVia::Synonym);

        let strict = standardizer.standardize(&queries, "id", &options()).unwrap();
        let mapping = strict.mapping();
        assert_eq!(mapping["abc"], None);
        assert_eq!(mapping["xyz-1"], None);
        assert_eq!(mapping["DEF"].as_deref(), Some("DEF"));
        assert_eq!(strict.report.n_mapped, 1);
    }

    #[test]
    fn unknown_return_field_is_a_schema_error() {
        let table = genes();
        let err = Standardizer::new(&table)
            .standardize(
                &QueryBatch::new(["A1CF"]),
                "symbol",
                &options().with_return_field("hgnc_id"),
            )
            .unwrap_err();
        assert!(matches!(err, ReconcileError::Schema(_)));
    }
}
