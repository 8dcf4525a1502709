#![deny(unsafe_code)]

use std::collections::BTreeSet;

use ontomap_map::{DEFAULT_DELIMITER, EntityConfig};
use ontomap_model::ReferenceKey;
use serde::{Deserialize, Serialize};

pub const MANIFEST_FILE: &str = "manifest.toml";
pub const MANIFEST_SCHEMA: &str = "ontomap.sources-manifest";
pub const MANIFEST_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub manifest: ManifestHeader,
    #[serde(default)]
    pub notes: Option<ManifestNotes>,
    #[serde(default)]
    pub sources: Vec<ManifestSource>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestHeader {
    pub schema: String,
    pub schema_version: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestNotes {
    pub summary: Option<String>,
}

/// One pinned reference file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestSource {
    pub entity: String,
    pub source: String,
    pub version: String,
    /// Path relative to the sources root, `/`-separated.
    pub path: String,
    pub sha256: String,
    /// Column holding canonical ids.
    pub reference_id: String,
    #[serde(default)]
    pub synonyms_field: Option<String>,
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
    /// Columns loaded as multi-valued cells.
    #[serde(default)]
    pub list_fields: BTreeSet<String>,
    /// Selected when the caller names only the entity.
    #[serde(default)]
    pub default: bool,
    #[serde(default)]
    pub notes: Option<String>,
}

fn default_delimiter() -> String {
    DEFAULT_DELIMITER.to_string()
}

impl ManifestSource {
    pub fn key(&self) -> ReferenceKey {
        ReferenceKey::new(&self.entity, &self.source, &self.version)
    }

    pub fn entity_config(&self) -> EntityConfig {
        let config = EntityConfig::new(
            &self.entity,
            &self.source,
            &self.version,
            &self.reference_id,
        )
        .with_delimiter(self.delimiter.as_str());
        match &self.synonyms_field {
            Some(field) => config.with_synonyms(field.as_str()),
            None => config,
        }
    }
}
