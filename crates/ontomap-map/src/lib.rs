//! Reconciliation of free-text biological terms against reference tables.
//!
//! - [`Validator`] checks terms for strict membership in a reference field.
//! - [`Standardizer`] maps terms, including synonyms, to canonical values.
//! - [`FuzzyMatcher`] ranks reference rows by string similarity.
//! - [`Entity`] bundles a shared table and index cache behind one façade.

pub mod cache;
pub mod entity;
pub mod error;
pub mod fuzzy;
pub mod options;
pub mod standardize;
pub mod synonyms;
pub mod tiebreak;
pub mod utils;
pub mod validate;

pub use cache::IndexCache;
pub use entity::{Entity, EntityConfig};
pub use error::{ReconcileError, Result};
pub use fuzzy::{FuzzyMatcher, Scorer, SearchHit, SearchMode};
pub use options::{DEFAULT_DELIMITER, InspectOptions, SearchOptions, StandardizeOptions};
pub use standardize::{Ambiguity, StandardizeOutcome, Standardizer};
pub use synonyms::{IndexSpec, SynonymIndex};
pub use tiebreak::{Candidate, TieBreak, TieBreaker};
pub use validate::{InspectOutcome, Validator};
