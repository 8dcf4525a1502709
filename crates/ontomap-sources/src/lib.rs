//! Pinned reference sources.
//!
//! A sources directory holds reference files plus a `manifest.toml` pinning
//! each file by entity, source, version and sha256.

pub mod cache;
pub mod error;
pub mod hash;
pub mod manifest;
pub mod paths;
pub mod registry;

pub use cache::ReferenceCache;
pub use error::{Result, SourcesError};
pub use manifest::{Manifest, ManifestSource};
pub use paths::{SOURCES_ENV_VAR, sources_root};
pub use registry::{SourceRegistry, VerifySummary};
