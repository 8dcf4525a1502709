#![deny(unsafe_code)]

use std::path::PathBuf;

use ontomap_ingest::IngestError;

#[derive(Debug, thiserror::Error)]
pub enum SourcesError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse TOML manifest {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid manifest: {message}")]
    InvalidManifest { message: String },

    #[error("duplicate source in manifest: {key}")]
    DuplicateSource { key: String },

    #[error("entity '{entity}' has more than one default source")]
    MultipleDefaults { entity: String },

    #[error("invalid sha256 for {path}: {message}")]
    InvalidSha256 { path: PathBuf, message: String },

    #[error("invalid manifest path {path}: {message}")]
    InvalidPath { path: PathBuf, message: String },

    #[error("missing file listed in manifest: {path}")]
    MissingFile { path: PathBuf },

    #[error("unexpected file present under sources/: {path}")]
    UnexpectedFile { path: PathBuf },

    #[error("sha256 mismatch for {path} (expected {expected}, got {actual})")]
    Sha256Mismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    #[error("no source registered for entity '{entity}' (available: {available})")]
    UnknownEntity { entity: String, available: String },

    #[error("entity '{entity}' has no source '{source_name}'")]
    UnknownSource { entity: String, source_name: String },

    #[error("entity '{entity}' has no version '{version}' of source '{source_name}'")]
    UnknownVersion {
        entity: String,
        source_name: String,
        version: String,
    },

    #[error(transparent)]
    Ingest(#[from] IngestError),
}

impl SourcesError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, SourcesError>;
