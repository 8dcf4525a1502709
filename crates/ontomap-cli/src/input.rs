//! Query batches from the command line or input files.

use std::path::Path;

use anyhow::{Context, Result};
use ontomap_ingest::{read_queries, read_query_column};
use ontomap_model::QueryBatch;
use tracing::debug;

/// Collects the queries of one invocation.
///
/// `input` takes precedence over `args`; with `column` set the input is read
/// as a CSV/TSV file and only that column is used, otherwise it holds one
/// query per line.
///
/// # Errors
///
/// Unreadable input files or a missing column.
pub fn load_queries(
    args: &[String],
    input: Option<&Path>,
    column: Option<&str>,
) -> Result<QueryBatch> {
    let batch = match (input, column) {
        (Some(path), Some(column)) => read_query_column(path, column)
            .with_context(|| format!("read column '{column}' of {}", path.display()))?,
        (Some(path), None) => {
            read_queries(path).with_context(|| format!("read queries from {}", path.display()))?
        }
        (None, _) => QueryBatch::new(args),
    };
    debug!(queries = batch.len(), "loaded queries");
    Ok(batch)
}
