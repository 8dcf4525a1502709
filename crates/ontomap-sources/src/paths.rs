//! Sources directory resolution.

use std::path::{Path, PathBuf};

/// Environment variable overriding the sources directory.
pub const SOURCES_ENV_VAR: &str = "ONTOMAP_SOURCES_DIR";

/// Resolves the sources root.
///
/// Resolution order:
/// 1. `explicit` (e.g. a `--sources` flag)
/// 2. `ONTOMAP_SOURCES_DIR` environment variable
/// 3. `sources/` under the current directory
pub fn sources_root(explicit: Option<&Path>) -> PathBuf {
    if let Some(root) = explicit {
        return root.to_path_buf();
    }
    if let Ok(root) = std::env::var(SOURCES_ENV_VAR) {
        return PathBuf::from(root);
    }
    PathBuf::from("sources")
}
