//! Caller-owned cache of synonym indexes.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use ontomap_model::ReferenceTable;
use tracing::trace;

use crate::error::Result;
use crate::synonyms::{IndexSpec, SynonymIndex};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct IndexKey {
    fingerprint: String,
    spec: IndexSpec,
}

/// Synonym indexes keyed by table fingerprint and [`IndexSpec`].
///
/// Entries are only dropped through [`invalidate`](Self::invalidate) or
/// [`clear`](Self::clear). The cache can be shared between threads.
#[derive(Debug, Default)]
pub struct IndexCache {
    entries: Mutex<BTreeMap<IndexKey, Arc<SynonymIndex>>>,
}

impl IndexCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached index for `spec` over `table`, building it on a
    /// miss.
    ///
    /// # Errors
    ///
    /// Propagates [`SynonymIndex::build`] failures; failed builds are not
    /// cached.
    pub fn get_or_build(
        &self,
        table: &ReferenceTable,
        spec: &IndexSpec,
    ) -> Result<Arc<SynonymIndex>> {
        let key = IndexKey {
            fingerprint: table.fingerprint().to_string(),
            spec: spec.clone(),
        };
        if let Some(index) = self.lock().get(&key) {
            trace!(target_field = %spec.target_field, "synonym index cache hit");
            return Ok(Arc::clone(index));
        }
        let index = Arc::new(SynonymIndex::build(table, spec)?);
        Ok(Arc::clone(self.lock().entry(key).or_insert(index)))
    }

    /// Drops every index built from `table`.
    pub fn invalidate(&self, table: &ReferenceTable) -> usize {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|key, _| key.fingerprint != table.fingerprint());
        before - entries.len()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<IndexKey, Arc<SynonymIndex>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Uses `cache` when given, otherwise builds a one-off index.
pub(crate) fn obtain(
    cache: Option<&IndexCache>,
    table: &ReferenceTable,
    spec: &IndexSpec,
) -> Result<Arc<SynonymIndex>> {
    match cache {
        Some(cache) => cache.get_or_build(table, spec),
        None => Ok(Arc::new(SynonymIndex::build(table, spec)?)),
    }
}
