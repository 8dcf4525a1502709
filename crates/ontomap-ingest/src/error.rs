use std::path::PathBuf;

use ontomap_model::ModelError;
use polars::prelude::PolarsError;

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse CSV {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{path} has no header row")]
    MissingHeader { path: PathBuf },

    #[error("column '{column}' not found in {path}")]
    MissingColumn { path: PathBuf, column: String },

    #[error("invalid reference table {path}: {source}")]
    Reference {
        path: PathBuf,
        #[source]
        source: ModelError,
    },

    #[error("invalid reference frame: {0}")]
    Frame(#[from] ModelError),

    #[error("failed to read data frame: {0}")]
    Polars(#[from] PolarsError),
}

impl IngestError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::Csv {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, IngestError>;
