//! Error types for reconciliation operations.

use ontomap_model::ModelError;
use thiserror::Error;

/// Structural failures of a reconciliation call.
///
/// Individual queries that fail to resolve are not errors; they are reported
/// as unmatched results.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconcileError {
    /// A requested field is absent from the reference schema.
    #[error("schema error: {0}")]
    Schema(#[from] ModelError),
    /// A non-empty batch resolved to nothing against a populated field.
    #[error(
        "none of the {n_total} queries resolved against field '{field}'; check the field name"
    )]
    DegenerateInput { field: String, n_total: usize },
    #[error("invalid option: {0}")]
    InvalidOption(String),
}

pub type Result<T> = std::result::Result<T, ReconcileError>;
