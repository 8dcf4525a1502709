//! Immutable in-memory reference vocabulary.
//!
//! A [`ReferenceTable`] is produced once per (entity, source, version) by a
//! loader and then only read. Rows are keyed by a canonical id column whose
//! values are unique and non-null; the constructor enforces this so every
//! table handed to the reconciliation engine satisfies it.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{ModelError, Result};
use crate::field::{Field, FieldName};
use crate::value::Value;

const FIELD_SEP: &[u8] = b"\x1f";
const RECORD_SEP: &[u8] = b"\x1e";
const ITEM_SEP: &[u8] = b"\x1d";

/// Provenance of a reference table.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ReferenceKey {
    /// Entity kind, e.g. "gene" or "cell_type".
    pub entity: String,
    /// Upstream source, e.g. "hgnc" or "cl".
    pub source: String,
    /// Source release.
    pub version: String,
}

impl ReferenceKey {
    pub fn new(
        entity: impl Into<String>,
        source: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            entity: entity.into(),
            source: source.into(),
            version: version.into(),
        }
    }
}

impl fmt::Display for ReferenceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}@{}", self.entity, self.source, self.version)
    }
}

#[derive(Debug, Clone)]
pub struct ReferenceTable {
    key: Option<ReferenceKey>,
    fields: Vec<FieldName>,
    positions: BTreeMap<String, usize>,
    id_field: Field,
    rows: Vec<Vec<Value>>,
    ids: BTreeMap<String, usize>,
    fingerprint: String,
}

impl ReferenceTable {
    /// Creates a table from a schema and positional rows.
    ///
    /// # Errors
    ///
    /// Fails when the schema repeats a field, `id_field` is not part of it,
    /// a row width differs from the schema, or a canonical id is missing,
    /// multi-valued or duplicated.
    pub fn new(id_field: &str, fields: Vec<FieldName>, rows: Vec<Vec<Value>>) -> Result<Self> {
        let mut positions = BTreeMap::new();
        for (idx, field) in fields.iter().enumerate() {
            if positions.insert(field.as_str().to_string(), idx).is_some() {
                return Err(ModelError::DuplicateField(field.to_string()));
            }
        }
        let id_pos = *positions
            .get(id_field.trim())
            .ok_or_else(|| unknown_field(id_field, &fields))?;

        let mut ids = BTreeMap::new();
        for (row_idx, row) in rows.iter().enumerate() {
            if row.len() != fields.len() {
                return Err(ModelError::RowWidth {
                    row: row_idx,
                    expected: fields.len(),
                    actual: row.len(),
                });
            }
            let id = match &row[id_pos] {
                Value::Text(text) if !text.trim().is_empty() => text.clone(),
                Value::List(items) if !items.is_empty() => {
                    return Err(ModelError::MultiValuedId {
                        row: row_idx,
                        field: id_field.to_string(),
                    });
                }
                _ => {
                    return Err(ModelError::MissingId {
                        row: row_idx,
                        field: id_field.to_string(),
                    });
                }
            };
            if let Some(first) = ids.insert(id.clone(), row_idx) {
                return Err(ModelError::DuplicateId {
                    id,
                    first,
                    second: row_idx,
                });
            }
        }

        let fingerprint = fingerprint(&fields, &rows);
        Ok(Self {
            key: None,
            fields,
            positions,
            id_field: Field(id_pos),
            rows,
            ids,
            fingerprint,
        })
    }

    pub fn builder(id_field: impl Into<String>) -> ReferenceTableBuilder {
        ReferenceTableBuilder::new(id_field)
    }

    /// Attaches provenance. The content fingerprint is unaffected.
    #[must_use]
    pub fn with_key(mut self, key: ReferenceKey) -> Self {
        self.key = Some(key);
        self
    }

    pub fn key(&self) -> Option<&ReferenceKey> {
        self.key.as_ref()
    }

    /// Hex SHA-256 over the schema and every cell.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn fields(&self) -> &[FieldName] {
        &self.fields
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.positions.contains_key(name.trim())
    }

    /// Resolves a column name to a typed handle.
    pub fn field(&self, name: &str) -> Result<Field> {
        self.positions
            .get(name.trim())
            .map(|pos| Field(*pos))
            .ok_or_else(|| unknown_field(name, &self.fields))
    }

    /// # Panics
    ///
    /// If `field` was issued by a table with more columns.
    pub fn field_name(&self, field: Field) -> &FieldName {
        &self.fields[field.0]
    }

    pub fn id_field(&self) -> Field {
        self.id_field
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Non-null values of `field` in row order, paired with their row index.
    ///
    /// # Panics
    ///
    /// If `field` was issued by a table with more columns.
    pub fn field_values(&self, field: Field) -> impl Iterator<Item = (usize, &Value)> + '_ {
        self.rows
            .iter()
            .enumerate()
            .map(move |(idx, row)| (idx, &row[field.0]))
            .filter(|(_, value)| !value.is_null())
    }

    pub fn lookup_row(&self, canonical_id: &str) -> Option<RowRef<'_>> {
        self.ids.get(canonical_id).map(|index| RowRef {
            table: self,
            index: *index,
        })
    }

    pub fn row(&self, index: usize) -> Option<RowRef<'_>> {
        (index < self.rows.len()).then_some(RowRef { table: self, index })
    }

    pub fn rows(&self) -> impl Iterator<Item = RowRef<'_>> + '_ {
        (0..self.rows.len()).map(move |index| RowRef { table: self, index })
    }
}

/// Borrowed view of one reference row.
#[derive(Debug, Clone, Copy)]
pub struct RowRef<'a> {
    table: &'a ReferenceTable,
    index: usize,
}

impl<'a> RowRef<'a> {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn id(&self) -> &'a str {
        self.get(self.table.id_field).as_text().unwrap_or_default()
    }

    /// # Panics
    ///
    /// If `field` was issued by a table with more columns.
    pub fn get(&self, field: Field) -> &'a Value {
        &self.table.rows[self.index][field.0]
    }

    pub fn get_by_name(&self, name: &str) -> Option<&'a Value> {
        let field = self.table.field(name).ok()?;
        Some(self.get(field))
    }

    /// Field name → value, for display and serialization.
    pub fn to_record(&self) -> BTreeMap<String, Value> {
        self.table
            .fields
            .iter()
            .zip(&self.table.rows[self.index])
            .map(|(field, value)| (field.to_string(), value.clone()))
            .collect()
    }
}

/// Incremental, name-addressed construction of a [`ReferenceTable`].
///
/// Fields are registered in first-seen order, starting with the id field;
/// cells a row does not mention are null.
#[derive(Debug, Clone)]
pub struct ReferenceTableBuilder {
    id_field: String,
    fields: Vec<String>,
    rows: Vec<BTreeMap<String, Value>>,
    key: Option<ReferenceKey>,
}

impl ReferenceTableBuilder {
    pub fn new(id_field: impl Into<String>) -> Self {
        let id_field = id_field.into().trim().to_string();
        Self {
            fields: vec![id_field.clone()],
            id_field,
            rows: Vec::new(),
            key: None,
        }
    }

    #[must_use]
    pub fn field(mut self, name: impl AsRef<str>) -> Self {
        self.register(name.as_ref());
        self
    }

    #[must_use]
    pub fn key(mut self, key: ReferenceKey) -> Self {
        self.key = Some(key);
        self
    }

    #[must_use]
    pub fn row<I, K, V>(mut self, cells: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        self.push_row(cells);
        self
    }

    pub fn push_row<I, K, V>(&mut self, cells: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let mut row = BTreeMap::new();
        for (name, value) in cells {
            let name = name.as_ref().trim().to_string();
            self.register(&name);
            row.insert(name, value.into());
        }
        self.rows.push(row);
    }

    pub fn build(self) -> Result<ReferenceTable> {
        let fields = self
            .fields
            .iter()
            .map(FieldName::new)
            .collect::<Result<Vec<_>>>()?;
        let rows = self
            .rows
            .into_iter()
            .map(|mut cells| {
                self.fields
                    .iter()
                    .map(|name| cells.remove(name).unwrap_or_default())
                    .collect()
            })
            .collect();
        let table = ReferenceTable::new(&self.id_field, fields, rows)?;
        Ok(match self.key {
            Some(key) => table.with_key(key),
            None => table,
        })
    }

    fn register(&mut self, name: &str) {
        if !self.fields.iter().any(|field| field == name) {
            self.fields.push(name.to_string());
        }
    }
}

fn unknown_field(name: &str, fields: &[FieldName]) -> ModelError {
    ModelError::UnknownField {
        field: name.to_string(),
        available: fields
            .iter()
            .map(FieldName::as_str)
            .collect::<Vec<_>>()
            .join(", "),
    }
}

fn fingerprint(fields: &[FieldName], rows: &[Vec<Value>]) -> String {
    let mut hasher = Sha256::new();
    for field in fields {
        hasher.update(field.as_str().as_bytes());
        hasher.update(FIELD_SEP);
    }
    hasher.update(RECORD_SEP);
    for row in rows {
        for cell in row {
            match cell {
                Value::Null => hasher.update(b"n"),
                Value::Text(text) => {
                    hasher.update(b"t");
                    hasher.update(text.as_bytes());
                }
                Value::List(items) => {
                    hasher.update(b"l");
                    for item in items {
                        hasher.update(item.as_bytes());
                        hasher.update(ITEM_SEP);
                    }
                }
            }
            hasher.update(FIELD_SEP);
        }
        hasher.update(RECORD_SEP);
    }
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn genes() -> ReferenceTable {
        ReferenceTable::builder("symbol")
            .row([("symbol", "A1CF"), ("synonyms", "ASP|APOBEC1CF")])
            .row([("symbol", "A1BG")])
            .build()
            .unwrap()
    }

    #[test]
    fn builder_registers_fields_in_first_seen_order() {
        let table = genes();
        let names: Vec<&str> = table.fields().iter().map(FieldName::as_str).collect();
        assert_eq!(names, ["symbol", "synonyms"]);
        let synonyms = table.field("synonyms").unwrap();
        assert!(table.row(1).unwrap().get(synonyms).is_null());
    }

    #[test]
    #[should_panic(expected = "index out of bounds")]
    fn foreign_field_handle_panics() {
        let narrow = ReferenceTable::builder("symbol")
            .row([("symbol", "A1CF")])
            .build()
            .unwrap();
        let synonyms = genes().field("synonyms").unwrap();
        let _ = narrow.field_values(synonyms).count();
    }

    #[test]
    fn field_values_skip_nulls() {
        let table = genes();
        let synonyms = table.field("synonyms").unwrap();
        let rows: Vec<usize> = table.field_values(synonyms).map(|(idx, _)| idx).collect();
        assert_eq!(rows, [0]);
    }

    #[test]
    fn lookup_row_returns_none_for_unknown_ids() {
        let table = genes();
        assert_eq!(table.lookup_row("A1BG").map(|row| row.index()), Some(1));
        assert!(table.lookup_row("a1bg").is_none());
    }

    #[test]
    fn unknown_field_lists_available_columns() {
        let err = genes().field("ensembl_gene_id").unwrap_err();
        assert_eq!(
            err,
            ModelError::UnknownField {
                field: "ensembl_gene_id".to_string(),
                available: "symbol, synonyms".to_string(),
            }
        );
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let err = ReferenceTable::builder("id")
            .row([("id", "CL:0000000")])
            .row([("id", "CL:0000000")])
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            ModelError::DuplicateId {
                id: "CL:0000000".to_string(),
                first: 0,
                second: 1,
            }
        );
    }

    #[test]
    fn missing_ids_are_rejected() {
        let err = ReferenceTable::builder("id")
            .row([("name", "T cell")])
            .build()
            .unwrap_err();
        assert!(matches!(err, ModelError::MissingId { row: 0, .. }));
    }

    #[test]
    fn row_width_must_match_schema() {
        let fields = vec![FieldName::new("id").unwrap(), FieldName::new("name").unwrap()];
        let err = ReferenceTable::new("id", fields, vec![vec![Value::text("X")]]).unwrap_err();
        assert_eq!(
            err,
            ModelError::RowWidth {
                row: 0,
                expected: 2,
                actual: 1,
            }
        );
    }

    #[test]
    fn fingerprint_tracks_content_not_provenance() {
        let a = genes();
        let b = genes().with_key(ReferenceKey::new("gene", "hgnc", "2024-01"));
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint().len(), 64);

        let c = ReferenceTable::builder("symbol")
            .row([("symbol", "A1CF"), ("synonyms", "ASP")])
            .row([("symbol", "A1BG")])
            .build()
            .unwrap();
        assert_ne!(a.fingerprint(), c.fingerprint());
    }

    #[test]
    fn record_view_contains_every_field() {
        let table = genes();
        let record = table.lookup_row("A1CF").unwrap().to_record();
        assert_eq!(record.get("synonyms"), Some(&Value::text("ASP|APOBEC1CF")));
        assert_eq!(record.len(), 2);
    }
}
