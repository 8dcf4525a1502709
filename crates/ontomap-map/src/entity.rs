//! Entity façade bundling a reference table, its configuration and a shared
//! index cache.

use std::sync::Arc;

use ontomap_model::{QueryBatch, ReferenceKey, ReferenceTable, RowRef};
use serde::{Deserialize, Serialize};

use crate::cache::IndexCache;
use crate::error::Result;
use crate::fuzzy::{FuzzyMatcher, SearchHit};
use crate::options::{DEFAULT_DELIMITER, InspectOptions, SearchOptions, StandardizeOptions};
use crate::standardize::{StandardizeOutcome, Standardizer};
use crate::tiebreak::TieBreaker;
use crate::validate::{InspectOutcome, Validator};

/// Static description of an entity reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityConfig {
    /// Entity name, e.g. `gene` or `cell_type`.
    pub entity: String,
    pub source: String,
    pub version: String,
    /// Field holding canonical identifiers.
    pub reference_id: String,
    #[serde(default)]
    pub synonyms_field: Option<String>,
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
    #[serde(default = "default_case_sensitive")]
    pub case_sensitive: bool,
}

fn default_delimiter() -> String {
    DEFAULT_DELIMITER.to_string()
}

fn default_case_sensitive() -> bool {
    true
}

impl EntityConfig {
    pub fn new(
        entity: impl Into<String>,
        source: impl Into<String>,
        version: impl Into<String>,
        reference_id: impl Into<String>,
    ) -> Self {
        Self {
            entity: entity.into(),
            source: source.into(),
            version: version.into(),
            reference_id: reference_id.into(),
            synonyms_field: None,
            delimiter: default_delimiter(),
            case_sensitive: true,
        }
    }

    #[must_use]
    pub fn with_synonyms(mut self, field: impl Into<String>) -> Self {
        self.synonyms_field = Some(field.into());
        self
    }

    #[must_use]
    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    #[must_use]
    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    pub fn key(&self) -> ReferenceKey {
        ReferenceKey::new(&self.entity, &self.source, &self.version)
    }
}

/// Reconciliation entry point for one entity.
///
/// Cloning is cheap: the table and the index cache are shared.
#[derive(Debug, Clone)]
pub struct Entity {
    config: EntityConfig,
    table: Arc<ReferenceTable>,
    cache: Arc<IndexCache>,
}

impl Entity {
    pub fn new(config: EntityConfig, table: Arc<ReferenceTable>) -> Self {
        Self::with_cache(config, table, Arc::new(IndexCache::new()))
    }

    pub fn with_cache(
        config: EntityConfig,
        table: Arc<ReferenceTable>,
        cache: Arc<IndexCache>,
    ) -> Self {
        Self {
            config,
            table,
            cache,
        }
    }

    pub fn config(&self) -> &EntityConfig {
        &self.config
    }

    pub fn table(&self) -> &Arc<ReferenceTable> {
        &self.table
    }

    pub fn cache(&self) -> &Arc<IndexCache> {
        &self.cache
    }

    /// Options pre-filled from the entity configuration.
    pub fn inspect_options(&self) -> InspectOptions {
        let options = InspectOptions::default()
            .with_case_sensitive(self.config.case_sensitive)
            .with_delimiter(self.config.delimiter.as_str());
        match &self.config.synonyms_field {
            Some(field) => options.with_synonyms(field.as_str()),
            None => options,
        }
    }

    pub fn standardize_options(&self) -> StandardizeOptions {
        let options = StandardizeOptions::default()
            .with_case_sensitive(self.config.case_sensitive)
            .with_delimiter(self.config.delimiter.as_str());
        match &self.config.synonyms_field {
            Some(field) => options.with_synonyms(field.as_str()),
            None => options,
        }
    }

    pub fn search_options(&self) -> SearchOptions {
        let options = SearchOptions::default().with_delimiter(self.config.delimiter.as_str());
        match &self.config.synonyms_field {
            Some(field) => options.with_synonyms(field.as_str()),
            None => options,
        }
    }

    /// [`Validator::inspect`] with the entity's default options.
    ///
    /// # Errors
    ///
    /// See [`Validator::inspect`].
    pub fn inspect<I, S>(&self, queries: I, field: &str) -> Result<InspectOutcome>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.inspect_with(&QueryBatch::new(queries), field, &self.inspect_options())
    }

    /// # Errors
    ///
    /// See [`Validator::inspect`].
    pub fn inspect_with(
        &self,
        queries: &QueryBatch,
        field: &str,
        options: &InspectOptions,
    ) -> Result<InspectOutcome> {
        Validator::new(&self.table)
            .with_cache(&self.cache)
            .inspect(queries, field, options)
    }

    /// [`Standardizer::standardize`] with the entity's default options.
    ///
    /// # Errors
    ///
    /// See [`Standardizer::standardize_with`].
    pub fn standardize<I, S>(&self, queries: I, field: &str) -> Result<StandardizeOutcome>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.standardize_with(
            &QueryBatch::new(queries),
            field,
            &self.standardize_options(),
        )
    }

    /// # Errors
    ///
    /// See [`Standardizer::standardize_with`].
    pub fn standardize_with(
        &self,
        queries: &QueryBatch,
        field: &str,
        options: &StandardizeOptions,
    ) -> Result<StandardizeOutcome> {
        Standardizer::new(&self.table)
            .with_cache(&self.cache)
            .standardize(queries, field, options)
    }

    /// # Errors
    ///
    /// See [`Standardizer::standardize_with`].
    pub fn standardize_by(
        &self,
        queries: &QueryBatch,
        field: &str,
        options: &StandardizeOptions,
        tie_breaker: &dyn TieBreaker,
    ) -> Result<StandardizeOutcome> {
        Standardizer::new(&self.table)
            .with_cache(&self.cache)
            .standardize_with(queries, field, options, tie_breaker)
    }

    /// [`FuzzyMatcher::search`] with the entity's default options.
    ///
    /// # Errors
    ///
    /// See [`FuzzyMatcher::search`].
    pub fn search(&self, query: &str, field: &str) -> Result<Vec<SearchHit>> {
        self.search_with(query, field, &self.search_options())
    }

    /// # Errors
    ///
    /// See [`FuzzyMatcher::search`].
    pub fn search_with(
        &self,
        query: &str,
        field: &str,
        options: &SearchOptions,
    ) -> Result<Vec<SearchHit>> {
        FuzzyMatcher::new(&self.table).search(query, field, options)
    }

    /// Row of the reference table with the given canonical id.
    pub fn lookup(&self, canonical_id: &str) -> Option<RowRef<'_>> {
        self.table.lookup_row(canonical_id)
    }
}
