//! Reference tables and query lists from delimited text files.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use csv::{ReaderBuilder, Trim};
use ontomap_model::{FieldName, QueryBatch, ReferenceTable, Value};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{IngestError, Result};

/// What to do with rows repeating an already seen canonical id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Reject the file.
    #[default]
    Error,
    /// Keep the first row for each id and skip the rest.
    KeepFirst,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceCsvOptions {
    /// Column holding canonical ids.
    pub id_field: String,
    /// Columns whose cells are split into [`Value::List`] on `list_delimiter`.
    #[serde(default)]
    pub list_fields: BTreeSet<String>,
    #[serde(default = "default_list_delimiter")]
    pub list_delimiter: String,
    /// Field separator; inferred from the file extension when unset.
    #[serde(default)]
    pub separator: Option<u8>,
    #[serde(default)]
    pub duplicates: DuplicatePolicy,
}

fn default_list_delimiter() -> String {
    "|".to_string()
}

impl ReferenceCsvOptions {
    pub fn new(id_field: impl Into<String>) -> Self {
        Self {
            id_field: id_field.into(),
            list_fields: BTreeSet::new(),
            list_delimiter: default_list_delimiter(),
            separator: None,
            duplicates: DuplicatePolicy::default(),
        }
    }

    #[must_use]
    pub fn with_list_field(mut self, field: impl Into<String>) -> Self {
        self.list_fields.insert(field.into());
        self
    }

    #[must_use]
    pub fn with_list_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.list_delimiter = delimiter.into();
        self
    }

    #[must_use]
    pub fn with_separator(mut self, separator: u8) -> Self {
        self.separator = Some(separator);
        self
    }

    #[must_use]
    pub fn with_duplicates(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicates = policy;
        self
    }
}

/// Field separator for `path`: tab for `.tsv`/`.tab`, comma otherwise.
pub fn separator_for(path: &Path) -> u8 {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("tsv" | "tab") => b'\t',
        _ => b',',
    }
}

/// Reads a reference table from a CSV/TSV file with a header row.
///
/// Cells are trimmed and blank cells become [`Value::Null`]. The table is
/// keyed by `options.id_field`.
///
/// # Errors
///
/// IO and CSV failures carry the file path; schema violations (missing id
/// column, blank or repeated ids) are reported as [`IngestError::Reference`].
pub fn read_reference_csv(path: &Path, options: &ReferenceCsvOptions) -> Result<ReferenceTable> {
    let separator = options.separator.unwrap_or_else(|| separator_for(path));
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .delimiter(separator)
        .trim(Trim::All)
        .from_path(path)
        .map_err(|source| IngestError::csv(path, source))?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(|source| IngestError::csv(path, source))?
        .iter()
        .map(|header| header.trim_matches('\u{feff}').trim().to_string())
        .collect();
    if headers.iter().all(String::is_empty) {
        return Err(IngestError::MissingHeader {
            path: path.to_path_buf(),
        });
    }
    let fields = headers
        .iter()
        .map(FieldName::new)
        .collect::<ontomap_model::Result<Vec<_>>>()
        .map_err(|source| reference_error(path, source))?;
    let id_pos = headers.iter().position(|h| *h == options.id_field.trim());

    let mut rows = Vec::new();
    let mut seen: BTreeMap<String, usize> = BTreeMap::new();
    let mut skipped = 0usize;
    for (line, record) in reader.records().enumerate() {
        let record = record.map_err(|source| IngestError::csv(path, source))?;
        let row: Vec<Value> = headers
            .iter()
            .enumerate()
            .map(|(idx, header)| {
                let raw = record.get(idx).unwrap_or("");
                if options.list_fields.contains(header) {
                    Value::split(raw, &options.list_delimiter)
                } else {
                    Value::text(raw)
                }
            })
            .collect();

        if options.duplicates == DuplicatePolicy::KeepFirst
            && let Some(id) = id_pos.and_then(|pos| row[pos].as_text())
        {
            if let Some(first) = seen.get(id) {
                warn!(
                    path = %path.display(),
                    id,
                    first_line = first + 2,
                    line = line + 2,
                    "skipping duplicate reference id"
                );
                skipped += 1;
                continue;
            }
            seen.insert(id.to_string(), line);
        }
        rows.push(row);
    }

    let table = ReferenceTable::new(&options.id_field, fields, rows)
        .map_err(|source| reference_error(path, source))?;
    debug!(
        path = %path.display(),
        rows = table.len(),
        fields = table.fields().len(),
        skipped,
        "loaded reference table"
    );
    Ok(table)
}

/// Reads one query per line; blank lines are kept as empty entries.
///
/// # Errors
///
/// Fails when the file cannot be read.
pub fn read_queries(path: &Path) -> Result<QueryBatch> {
    let text = fs::read_to_string(path).map_err(|source| IngestError::io(path, source))?;
    Ok(text
        .trim_start_matches('\u{feff}')
        .lines()
        .collect::<QueryBatch>())
}

/// Reads the queries held in `column` of a CSV/TSV file; empty cells are
/// null entries.
///
/// # Errors
///
/// IO and CSV failures, or [`IngestError::MissingColumn`].
pub fn read_query_column(path: &Path, column: &str) -> Result<QueryBatch> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .delimiter(separator_for(path))
        .trim(Trim::All)
        .from_path(path)
        .map_err(|source| IngestError::csv(path, source))?;
    let pos = reader
        .headers()
        .map_err(|source| IngestError::csv(path, source))?
        .iter()
        .position(|header| header.trim_matches('\u{feff}') == column)
        .ok_or_else(|| IngestError::MissingColumn {
            path: path.to_path_buf(),
            column: column.to_string(),
        })?;

    let mut queries = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|source| IngestError::csv(path, source))?;
        queries.push(
            record
                .get(pos)
                .filter(|cell| !cell.is_empty())
                .map(str::to_string),
        );
    }
    Ok(QueryBatch::from_optional(queries))
}

fn reference_error(path: &Path, source: ontomap_model::ModelError) -> IngestError {
    IngestError::Reference {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn separator_follows_extension() {
        assert_eq!(separator_for(Path::new("genes.tsv")), b'\t');
        assert_eq!(separator_for(Path::new("genes.TAB")), b'\t');
        assert_eq!(separator_for(Path::new("genes.csv")), b',');
        assert_eq!(separator_for(Path::new("genes")), b',');
    }

    #[test]
    fn options_deserialize_with_defaults() {
        let options: ReferenceCsvOptions =
            serde_json::from_str(r#"{"id_field":"ensembl_gene_id"}"#).unwrap();
        assert_eq!(options, ReferenceCsvOptions::new("ensembl_gene_id"));
    }
}
