//! Loaded reference tables keyed by (entity, source, version).

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use ontomap_model::{ReferenceKey, ReferenceTable};
use tracing::debug;

/// Caller-owned cache of reference tables.
///
/// Tables stay loaded until [`invalidate`](Self::invalidate) or
/// [`clear`](Self::clear) is called.
#[derive(Debug, Default)]
pub struct ReferenceCache {
    tables: Mutex<BTreeMap<ReferenceKey, Arc<ReferenceTable>>>,
}

impl ReferenceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &ReferenceKey) -> Option<Arc<ReferenceTable>> {
        self.lock().get(key).cloned()
    }

    /// Returns the cached table for `key` or loads it with `load`.
    ///
    /// The loaded table is tagged with `key`. Failed loads are not cached.
    ///
    /// # Errors
    ///
    /// Whatever `load` returns.
    pub fn get_or_load<E, F>(&self, key: &ReferenceKey, load: F) -> Result<Arc<ReferenceTable>, E>
    where
        F: FnOnce() -> Result<ReferenceTable, E>,
    {
        if let Some(table) = self.get(key) {
            return Ok(table);
        }
        let table = Arc::new(load()?.with_key(key.clone()));
        debug!(%key, rows = table.len(), "cached reference table");
        Ok(Arc::clone(self.lock().entry(key.clone()).or_insert(table)))
    }

    /// Drops the table for `key`; returns whether one was cached.
    pub fn invalidate(&self, key: &ReferenceKey) -> bool {
        self.lock().remove(key).is_some()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn keys(&self) -> Vec<ReferenceKey> {
        self.lock().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<ReferenceKey, Arc<ReferenceTable>>> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
