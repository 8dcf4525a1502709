//! Alternate-name index over a reference table.
//!
//! The index maps every normalized name (a target-field value or an item of
//! the aggregated synonyms column) to the canonical ids of the rows claiming
//! it. Direct target-field values take priority: a name that is the target
//! value of some row resolves only to the rows owning it, never to rows that
//! merely list it as a synonym.

use std::collections::{BTreeMap, BTreeSet};

use ontomap_model::{Field, ReferenceTable};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::options::{DEFAULT_DELIMITER, check_delimiter};
use crate::utils::{normalize_key, split_synonyms};

static NO_IDS: BTreeSet<String> = BTreeSet::new();

/// Inputs that determine an index; two equal specs over the same table
/// produce identical indexes.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IndexSpec {
    pub target_field: String,
    pub synonyms_field: Option<String>,
    pub delimiter: String,
    pub case_sensitive: bool,
}

impl IndexSpec {
    pub fn new(target_field: impl Into<String>) -> Self {
        Self {
            target_field: target_field.into(),
            synonyms_field: None,
            delimiter: DEFAULT_DELIMITER.to_string(),
            case_sensitive: true,
        }
    }

    #[must_use]
    pub fn with_synonyms(mut self, field: Option<impl Into<String>>) -> Self {
        self.synonyms_field = field.map(Into::into);
        self
    }

    #[must_use]
    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    #[must_use]
    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }
}

#[derive(Debug, Clone)]
pub struct SynonymIndex {
    spec: IndexSpec,
    fingerprint: String,
    entries: BTreeMap<String, BTreeSet<String>>,
    direct: BTreeSet<String>,
    shadowed: usize,
}

impl SynonymIndex {
    /// Builds the index for `spec` over `table`.
    ///
    /// # Errors
    ///
    /// [`ReconcileError::Schema`](crate::ReconcileError::Schema) when the
    /// target or synonyms field is absent,
    /// [`ReconcileError::InvalidOption`](crate::ReconcileError::InvalidOption)
    /// for an empty delimiter.
    pub fn build(table: &ReferenceTable, spec: &IndexSpec) -> Result<Self> {
        check_delimiter(&spec.delimiter)?;
        let target = table.field(&spec.target_field)?;
        let synonyms = spec
            .synonyms_field
            .as_deref()
            .map(|name| table.field(name))
            .transpose()?;

        let direct = direct_claims(table, target, spec.case_sensitive);
        let mut entries = direct.clone();
        let mut shadowed = 0usize;
        if let Some(synonyms) = synonyms {
            for (name, ids) in synonym_claims(table, synonyms, spec) {
                if direct.contains_key(&name) {
                    shadowed += 1;
                    continue;
                }
                entries.insert(name, ids);
            }
        }

        let index = Self {
            spec: spec.clone(),
            fingerprint: table.fingerprint().to_string(),
            direct: direct.into_keys().collect(),
            entries,
            shadowed,
        };
        debug!(
            target_field = %spec.target_field,
            synonyms_field = spec.synonyms_field.as_deref().unwrap_or("-"),
            names = index.len(),
            ambiguous = index.ambiguous_names().count(),
            shadowed,
            "built synonym index"
        );
        Ok(index)
    }

    pub fn spec(&self) -> &IndexSpec {
        &self.spec
    }

    /// Fingerprint of the table the index was built from.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Canonical ids claiming `name`; empty when unknown.
    pub fn resolve(&self, name: &str) -> &BTreeSet<String> {
        let key = normalize_key(name, self.spec.case_sensitive);
        self.entries.get(&key).unwrap_or(&NO_IDS)
    }

    /// Whether `name` is a target-field value (as opposed to a synonym only).
    pub fn is_direct(&self, name: &str) -> bool {
        self.direct
            .contains(&normalize_key(name, self.spec.case_sensitive))
    }

    pub fn is_ambiguous(&self, name: &str) -> bool {
        self.resolve(name).len() > 1
    }

    /// Names claimed by more than one row.
    pub fn ambiguous_names(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> + '_ {
        self.entries
            .iter()
            .filter(|(_, ids)| ids.len() > 1)
            .map(|(name, ids)| (name.as_str(), ids))
    }

    /// Synonym claims ignored because the name is another row's direct value.
    pub fn shadowed_count(&self) -> usize {
        self.shadowed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn direct_claims(
    table: &ReferenceTable,
    target: Field,
    case_sensitive: bool,
) -> BTreeMap<String, BTreeSet<String>> {
    let mut claims: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for (row_idx, value) in table.field_values(target) {
        let Some(row) = table.row(row_idx) else {
            continue;
        };
        for item in value.items() {
            let key = normalize_key(item, case_sensitive);
            if key.is_empty() {
                continue;
            }
            claims.entry(key).or_default().insert(row.id().to_string());
        }
    }
    claims
}

fn synonym_claims(
    table: &ReferenceTable,
    synonyms: Field,
    spec: &IndexSpec,
) -> BTreeMap<String, BTreeSet<String>> {
    let mut claims: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for (row_idx, value) in table.field_values(synonyms) {
        let Some(row) = table.row(row_idx) else {
            continue;
        };
        for cell in value.items() {
            for name in split_synonyms(cell, &spec.delimiter) {
                claims
                    .entry(normalize_key(name, spec.case_sensitive))
                    .or_default()
                    .insert(row.id().to_string());
            }
        }
    }
    claims
}

#[cfg(test)]
mod tests {
    use ontomap_model::{ModelError, ReferenceTable};

    use super::*;
    use crate::ReconcileError;

    fn genes() -> ReferenceTable {
        ReferenceTable::builder("symbol")
            .row([("symbol", "A1CF"), ("synonyms", "ASP|APOBEC1CF|ACF")])
            .row([("symbol", "A1BG"), ("synonyms", "")])
            .row([("symbol", "ASP"), ("synonyms", "AGSP")])
            .row([("symbol", "ACF7"), ("synonyms", "ACF|MACF1")])
            .build()
            .unwrap()
    }

    fn spec() -> IndexSpec {
        IndexSpec::new("symbol").with_synonyms(Some("synonyms"))
    }

    fn ids(index: &SynonymIndex, name: &str) -> Vec<String> {
        index.resolve(name).iter().cloned().collect()
    }

    #[test]
    fn own_value_is_an_implicit_synonym() {
        let index = SynonymIndex::build(&genes(), &spec()).unwrap();
        assert_eq!(ids(&index, "A1BG"), ["A1BG"]);
        assert!(index.is_direct("A1BG"));
    }

    #[test]
    fn synonyms_resolve_to_their_owner() {
        let index = SynonymIndex::build(&genes(), &spec()).unwrap();
        assert_eq!(ids(&index, "APOBEC1CF"), ["A1CF"]);
        assert!(!index.is_direct("APOBEC1CF"));
    }

    #[test]
    fn direct_value_wins_over_synonym_claims() {
        let index = SynonymIndex::build(&genes(), &spec()).unwrap();
        assert_eq!(ids(&index, "ASP"), ["ASP"]);
        assert_eq!(index.shadowed_count(), 1);
    }

    #[test]
    fn shared_synonyms_are_ambiguous() {
        let index = SynonymIndex::build(&genes(), &spec()).unwrap();
        assert_eq!(ids(&index, "ACF"), ["A1CF", "ACF7"]);
        assert!(index.is_ambiguous("ACF"));
        let ambiguous: Vec<&str> = index.ambiguous_names().map(|(name, _)| name).collect();
        assert_eq!(ambiguous, ["ACF"]);
    }

    #[test]
    fn unknown_names_resolve_to_nothing() {
        let index = SynonymIndex::build(&genes(), &spec()).unwrap();
        assert!(index.resolve("unknown").is_empty());
    }

    #[test]
    fn case_insensitive_index_upper_cases_keys() {
        let index =
            SynonymIndex::build(&genes(), &spec().with_case_sensitive(false)).unwrap();
        assert_eq!(ids(&index, "apobec1cf"), ["A1CF"]);
        let strict = SynonymIndex::build(&genes(), &spec()).unwrap();
        assert!(strict.resolve("apobec1cf").is_empty());
    }

    #[test]
    fn without_synonyms_only_direct_values_are_indexed() {
        let index = SynonymIndex::build(&genes(), &IndexSpec::new("symbol")).unwrap();
        assert_eq!(index.len(), 4);
        assert!(index.resolve("APOBEC1CF").is_empty());
    }

    #[test]
    fn custom_delimiter() {
        let table = ReferenceTable::builder("id")
            .row([("id", "CL:0000084"), ("synonyms", "T-cell;T lymphocyte")])
            .build()
            .unwrap();
        let spec = IndexSpec::new("id")
            .with_synonyms(Some("synonyms"))
            .with_delimiter(";");
        let index = SynonymIndex::build(&table, &spec).unwrap();
        assert_eq!(ids(&index, "T lymphocyte"), ["CL:0000084"]);
    }

    #[test]
    fn missing_fields_are_schema_errors() {
        let spec = IndexSpec::new("symbol").with_synonyms(Some("aliases"));
        let err = SynonymIndex::build(&genes(), &spec).unwrap_err();
        assert!(matches!(
            err,
            ReconcileError::Schema(ModelError::UnknownField { ref field, .. }) if field == "aliases"
        ));
    }

    #[test]
    fn empty_delimiter_is_rejected() {
        let spec = spec().with_delimiter("");
        assert!(matches!(
            SynonymIndex::build(&genes(), &spec),
            Err(ReconcileError::InvalidOption(_))
        ));
    }
}
