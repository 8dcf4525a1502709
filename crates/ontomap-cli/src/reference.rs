//! Resolution of the reference table an invocation runs against.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use ontomap_ingest::{ReferenceCsvOptions, read_reference_csv};
use ontomap_map::{DEFAULT_DELIMITER, Entity, EntityConfig};
use ontomap_sources::{SourceRegistry, VerifySummary, sources_root};
use tracing::info;

/// Source named for ad-hoc reference files.
pub const FILE_SOURCE: &str = "file";

/// A reference file given directly on the command line.
#[derive(Debug, Clone)]
pub struct FileReference {
    pub path: PathBuf,
    pub id_field: String,
    pub synonyms_field: Option<String>,
    pub delimiter: Option<String>,
    /// Columns split into multi-valued cells on load.
    pub list_fields: Vec<String>,
}

/// An entity pinned in a sources manifest.
#[derive(Debug, Clone)]
pub struct RegistryReference {
    /// Sources root; falls back to `ONTOMAP_SOURCES_DIR`, then `sources/`.
    pub sources: Option<PathBuf>,
    pub entity: String,
    pub source: Option<String>,
    pub version: Option<String>,
}

#[derive(Debug, Clone)]
pub enum ReferenceSpec {
    File(FileReference),
    Registry(RegistryReference),
}

impl ReferenceSpec {
    /// Loads the reference and wraps it in an [`Entity`].
    ///
    /// # Errors
    ///
    /// Unreadable or malformed reference files, manifest verification
    /// failures and unknown entity selections.
    pub fn open(&self) -> Result<Entity> {
        match self {
            Self::File(file) => file.open(),
            Self::Registry(registry) => registry.open(),
        }
    }
}

impl FileReference {
    fn open(&self) -> Result<Entity> {
        let delimiter = self.delimiter.as_deref().unwrap_or(DEFAULT_DELIMITER);
        let mut options =
            ReferenceCsvOptions::new(self.id_field.as_str()).with_list_delimiter(delimiter);
        for field in &self.list_fields {
            options = options.with_list_field(field.as_str());
        }
        let table = read_reference_csv(&self.path, &options)
            .with_context(|| format!("load reference {}", self.path.display()))?;

        let name = self
            .path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("reference");
        let fingerprint = table.fingerprint();
        let version = fingerprint.get(..12).unwrap_or(fingerprint).to_string();
        let mut config = EntityConfig::new(name, FILE_SOURCE, version, self.id_field.as_str())
            .with_delimiter(delimiter);
        if let Some(field) = &self.synonyms_field {
            config = config.with_synonyms(field.as_str());
        }
        let table = table.with_key(config.key());
        info!(
            key = %config.key(),
            rows = table.len(),
            "loaded reference file"
        );
        Ok(Entity::new(config, Arc::new(table)))
    }
}

impl RegistryReference {
    fn open(&self) -> Result<Entity> {
        let (registry, _) = open_registry(self.sources.as_deref())?;
        registry
            .entity_at(&self.entity, self.source.as_deref(), self.version.as_deref())
            .with_context(|| format!("select entity '{}'", self.entity))
    }
}

/// Verifies and loads the sources manifest under the resolved root.
///
/// # Errors
///
/// Missing or tampered sources, see [`SourceRegistry::verify_and_load`].
pub fn open_registry(explicit: Option<&Path>) -> Result<(SourceRegistry, VerifySummary)> {
    let root = sources_root(explicit);
    let (registry, summary) = SourceRegistry::verify_and_load(&root)
        .with_context(|| format!("verify sources in {}", root.display()))?;
    info!(
        sources_dir = %summary.sources_dir.display(),
        sources = summary.source_count,
        entities = summary.entities.len(),
        "verified sources"
    );
    Ok((registry, summary))
}
