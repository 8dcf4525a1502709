#![deny(unsafe_code)]

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use ontomap_ingest::{ReferenceCsvOptions, read_reference_csv};
use ontomap_map::{Entity, IndexCache};
use ontomap_model::ReferenceTable;
use tracing::{debug, info};

use crate::cache::ReferenceCache;
use crate::error::{Result, SourcesError};
use crate::hash::sha256_hex;
use crate::manifest::{
    MANIFEST_FILE, MANIFEST_SCHEMA, MANIFEST_SCHEMA_VERSION, Manifest, ManifestSource,
};

#[derive(Debug, Clone, serde::Serialize)]
pub struct VerifySummary {
    pub sources_dir: PathBuf,
    pub source_count: usize,
    /// Number of pinned sources per entity.
    pub entities: BTreeMap<String, usize>,
}

/// Verified set of pinned reference sources.
///
/// Tables are loaded lazily into a shared [`ReferenceCache`]; entities built
/// from the registry share one [`IndexCache`].
#[derive(Debug, Clone)]
pub struct SourceRegistry {
    root: PathBuf,
    manifest: Manifest,
    tables: Arc<ReferenceCache>,
    indexes: Arc<IndexCache>,
}

impl SourceRegistry {
    /// Reads `manifest.toml` under `sources_dir`, validates it and checks the
    /// sha256 of every listed file.
    ///
    /// # Errors
    ///
    /// Manifest parse and validation failures, missing or unexpected files
    /// and checksum mismatches.
    pub fn verify_and_load(sources_dir: &Path) -> Result<(Self, VerifySummary)> {
        let manifest = load_manifest(&sources_dir.join(MANIFEST_FILE))?;
        validate_manifest(&manifest, sources_dir)?;

        for source in &manifest.sources {
            verify_file(sources_dir, source)?;
        }

        let mut entities: BTreeMap<String, usize> = BTreeMap::new();
        for source in &manifest.sources {
            *entities.entry(source.entity.clone()).or_default() += 1;
        }
        let summary = VerifySummary {
            sources_dir: sources_dir.to_path_buf(),
            source_count: manifest.sources.len(),
            entities,
        };
        info!(
            sources_dir = %sources_dir.display(),
            sources = summary.source_count,
            entities = summary.entities.len(),
            "verified reference sources"
        );

        Ok((
            Self {
                root: sources_dir.to_path_buf(),
                manifest,
                tables: Arc::new(ReferenceCache::new()),
                indexes: Arc::new(IndexCache::new()),
            },
            summary,
        ))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn sources(&self) -> &[ManifestSource] {
        &self.manifest.sources
    }

    pub fn tables(&self) -> &Arc<ReferenceCache> {
        &self.tables
    }

    pub fn indexes(&self) -> &Arc<IndexCache> {
        &self.indexes
    }

    /// Picks the source of `entity`.
    ///
    /// Without `source`, the entity's default is used, falling back to the
    /// last listed source. Without `version`, the default among the matching
    /// entries wins, then the last listed one.
    ///
    /// # Errors
    ///
    /// [`SourcesError::UnknownEntity`], [`SourcesError::UnknownSource`] or
    /// [`SourcesError::UnknownVersion`] when nothing matches.
    pub fn select(
        &self,
        entity: &str,
        source: Option<&str>,
        version: Option<&str>,
    ) -> Result<&ManifestSource> {
        let candidates: Vec<&ManifestSource> = self
            .manifest
            .sources
            .iter()
            .filter(|s| s.entity == entity)
            .collect();
        if candidates.is_empty() {
            let available: BTreeSet<&str> = self
                .manifest
                .sources
                .iter()
                .map(|s| s.entity.as_str())
                .collect();
            return Err(SourcesError::UnknownEntity {
                entity: entity.to_string(),
                available: available.into_iter().collect::<Vec<_>>().join(", "),
            });
        }

        let candidates: Vec<&ManifestSource> = match source {
            Some(name) => {
                let named: Vec<_> = candidates
                    .into_iter()
                    .filter(|s| s.source == name)
                    .collect();
                if named.is_empty() {
                    return Err(SourcesError::UnknownSource {
                        entity: entity.to_string(),
                        source_name: name.to_string(),
                    });
                }
                named
            }
            None => candidates,
        };

        if let Some(version) = version {
            return candidates
                .into_iter()
                .find(|s| s.version == version)
                .ok_or_else(|| SourcesError::UnknownVersion {
                    entity: entity.to_string(),
                    source_name: source.unwrap_or("*").to_string(),
                    version: version.to_string(),
                });
        }

        let chosen = candidates
            .iter()
            .copied()
            .find(|s| s.default)
            .or_else(|| candidates.last().copied());
        chosen.ok_or_else(|| SourcesError::UnknownEntity {
            entity: entity.to_string(),
            available: String::new(),
        })
    }

    /// Loads (or returns the cached) table of `source`.
    ///
    /// # Errors
    ///
    /// [`SourcesError::Ingest`] when the file cannot be parsed into a table.
    pub fn load_table(&self, source: &ManifestSource) -> Result<Arc<ReferenceTable>> {
        let path = self.root.join(&source.path);
        self.tables.get_or_load(&source.key(), || {
            debug!(key = %source.key(), path = %path.display(), "loading reference table");
            let mut options = ReferenceCsvOptions::new(source.reference_id.as_str())
                .with_list_delimiter(source.delimiter.as_str());
            for field in &source.list_fields {
                options = options.with_list_field(field.as_str());
            }
            read_reference_csv(&path, &options).map_err(SourcesError::from)
        })
    }

    /// Builds the [`Entity`] façade for `entity`, using the default source
    /// when `source` is `None`.
    ///
    /// # Errors
    ///
    /// Selection and loading failures, see [`select`](Self::select) and
    /// [`load_table`](Self::load_table).
    pub fn entity(&self, entity: &str, source: Option<&str>) -> Result<Entity> {
        self.entity_at(entity, source, None)
    }

    /// # Errors
    ///
    /// See [`entity`](Self::entity).
    pub fn entity_at(
        &self,
        entity: &str,
        source: Option<&str>,
        version: Option<&str>,
    ) -> Result<Entity> {
        let selected = self.select(entity, source, version)?;
        let table = self.load_table(selected)?;
        Ok(Entity::with_cache(
            selected.entity_config(),
            table,
            Arc::clone(&self.indexes),
        ))
    }
}

fn load_manifest(path: &Path) -> Result<Manifest> {
    let contents = std::fs::read_to_string(path).map_err(|e| SourcesError::io(path, e))?;
    toml::from_str(&contents).map_err(|e| SourcesError::Toml {
        path: path.to_path_buf(),
        source: e,
    })
}

fn validate_manifest(manifest: &Manifest, sources_dir: &Path) -> Result<()> {
    if manifest.manifest.schema != MANIFEST_SCHEMA {
        return Err(SourcesError::InvalidManifest {
            message: format!("unsupported schema: {}", manifest.manifest.schema),
        });
    }
    if manifest.manifest.schema_version != MANIFEST_SCHEMA_VERSION {
        return Err(SourcesError::InvalidManifest {
            message: format!(
                "unsupported schema_version: {}",
                manifest.manifest.schema_version
            ),
        });
    }

    let mut keys = BTreeSet::new();
    let mut defaults: BTreeSet<&str> = BTreeSet::new();
    let mut manifest_paths: BTreeSet<PathBuf> = BTreeSet::new();

    for source in &manifest.sources {
        for (name, value) in [
            ("entity", &source.entity),
            ("source", &source.source),
            ("version", &source.version),
            ("reference_id", &source.reference_id),
        ] {
            if value.trim().is_empty() {
                return Err(SourcesError::InvalidManifest {
                    message: format!("empty {name} for {}", source.path),
                });
            }
        }
        if source.delimiter.is_empty() {
            return Err(SourcesError::InvalidManifest {
                message: format!("empty delimiter for {}", source.path),
            });
        }

        let key = source.key();
        if !keys.insert(key.clone()) {
            return Err(SourcesError::DuplicateSource {
                key: key.to_string(),
            });
        }
        if source.default && !defaults.insert(source.entity.as_str()) {
            return Err(SourcesError::MultipleDefaults {
                entity: source.entity.clone(),
            });
        }

        validate_sha(&source.sha256, &source.path)?;
        let path = validate_path(&source.path)?;
        manifest_paths.insert(normalize_path(&path));
    }

    for path in list_files_under(sources_dir)? {
        if path == Path::new(MANIFEST_FILE) {
            continue;
        }
        if !manifest_paths.contains(&normalize_path(&path)) {
            return Err(SourcesError::UnexpectedFile {
                path: sources_dir.join(path),
            });
        }
    }

    Ok(())
}

fn verify_file(sources_dir: &Path, source: &ManifestSource) -> Result<()> {
    let full_path = sources_dir.join(&source.path);
    let bytes = std::fs::read(&full_path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            SourcesError::MissingFile {
                path: full_path.clone(),
            }
        } else {
            SourcesError::io(full_path.clone(), e)
        }
    })?;

    let actual = sha256_hex(&bytes);
    let expected = source.sha256.to_ascii_lowercase();
    if actual != expected {
        return Err(SourcesError::Sha256Mismatch {
            path: full_path,
            expected,
            actual,
        });
    }
    Ok(())
}

fn validate_sha(sha: &str, path: &str) -> Result<()> {
    if sha.len() != 64 || !sha.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(SourcesError::InvalidSha256 {
            path: PathBuf::from(path),
            message: "sha256 must be 64 hex characters".to_string(),
        });
    }
    Ok(())
}

fn validate_path(path: &str) -> Result<PathBuf> {
    if path.contains('\\') {
        return Err(SourcesError::InvalidPath {
            path: PathBuf::from(path),
            message: "manifest path must use '/' separators".to_string(),
        });
    }

    let p = PathBuf::from(path);
    if p.is_absolute() {
        return Err(SourcesError::InvalidPath {
            path: p,
            message: "manifest path must be relative".to_string(),
        });
    }

    if p.components().any(|c| matches!(c, Component::ParentDir)) {
        return Err(SourcesError::InvalidPath {
            path: p,
            message: "manifest path must not traverse out of sources/".to_string(),
        });
    }

    Ok(p)
}

fn list_files_under(root: &Path) -> Result<BTreeSet<PathBuf>> {
    let mut stack = vec![root.to_path_buf()];
    let mut files = BTreeSet::new();

    while let Some(dir) = stack.pop() {
        for entry in std::fs::read_dir(&dir).map_err(|e| SourcesError::io(&dir, e))? {
            let entry = entry.map_err(|e| SourcesError::io(&dir, e))?;
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
            } else if path.is_file() {
                let rel = path
                    .strip_prefix(root)
                    .map_err(|e| SourcesError::InvalidPath {
                        path: path.clone(),
                        message: format!("failed to relativize path: {e}"),
                    })?
                    .to_path_buf();
                files.insert(rel);
            }
        }
    }

    Ok(files)
}

fn normalize_path(p: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for c in p.components() {
        match c {
            Component::CurDir => {}
            _ => out.push(c.as_os_str()),
        }
    }
    out
}
