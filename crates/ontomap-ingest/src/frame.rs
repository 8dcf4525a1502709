//! Conversion of polars data frames into reference tables.

use ontomap_model::{FieldName, ReferenceTable, Value};
use polars::prelude::{AnyValue, DataFrame};
use tracing::debug;

use crate::error::Result;

/// Converts one data frame cell into a reference cell.
///
/// Strings are kept verbatim (blank becomes null), numbers are rendered
/// without trailing zeros, booleans as `true`/`false`, and list cells become
/// [`Value::List`] of their non-null items.
pub fn any_to_value(value: AnyValue<'_>) -> Value {
    match value {
        AnyValue::List(series) => {
            let items: Vec<String> = (0..series.len())
                .filter_map(|idx| series.get(idx).ok())
                .filter_map(any_to_text)
                .collect();
            if items.is_empty() {
                Value::Null
            } else {
                Value::List(items)
            }
        }
        other => any_to_text(other).map_or(Value::Null, Value::Text),
    }
}

fn any_to_text(value: AnyValue<'_>) -> Option<String> {
    let text = match value {
        AnyValue::Null => return None,
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        AnyValue::Boolean(b) => b.to_string(),
        AnyValue::Int8(v) => v.to_string(),
        AnyValue::Int16(v) => v.to_string(),
        AnyValue::Int32(v) => v.to_string(),
        AnyValue::Int64(v) => v.to_string(),
        AnyValue::UInt8(v) => v.to_string(),
        AnyValue::UInt16(v) => v.to_string(),
        AnyValue::UInt32(v) => v.to_string(),
        AnyValue::UInt64(v) => v.to_string(),
        AnyValue::Float32(v) => format_numeric(f64::from(v)),
        AnyValue::Float64(v) => format_numeric(v),
        other => other.to_string(),
    };
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

fn format_numeric(v: f64) -> String {
    let s = format!("{v}");
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s
    }
}

/// Builds a reference table from every column of `df`, keyed by `id_field`.
///
/// # Errors
///
/// Polars access failures and the reference table invariants (unknown id
/// column, blank or repeated ids).
pub fn reference_from_dataframe(df: &DataFrame, id_field: &str) -> Result<ReferenceTable> {
    let columns = df.get_columns();
    let fields = columns
        .iter()
        .map(|column| FieldName::new(column.name().as_str()))
        .collect::<ontomap_model::Result<Vec<_>>>()?;

    let mut rows = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        let row = columns
            .iter()
            .map(|column| column.get(idx).map(any_to_value))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        rows.push(row);
    }

    let table = ReferenceTable::new(id_field, fields, rows)?;
    debug!(rows = table.len(), fields = table.fields().len(), "converted data frame");
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_render_without_trailing_zeros() {
        assert_eq!(any_to_value(AnyValue::Float64(2.50)), Value::text("2.5"));
        assert_eq!(any_to_value(AnyValue::Float64(3.0)), Value::text("3"));
        assert_eq!(any_to_value(AnyValue::Int64(9606)), Value::text("9606"));
        assert_eq!(any_to_value(AnyValue::Boolean(true)), Value::text("true"));
    }

    #[test]
    fn blanks_and_nulls_are_null() {
        assert_eq!(any_to_value(AnyValue::Null), Value::Null);
        assert_eq!(any_to_value(AnyValue::String("  ")), Value::Null);
    }
}
