//! Data model for identifier reconciliation against reference vocabularies.

pub mod error;
pub mod field;
pub mod matching;
pub mod query;
pub mod report;
pub mod table;
pub mod value;

pub use error::{ModelError, Result};
pub use field::{Field, FieldName};
pub use matching::{MatchResult, MatchVia};
pub use query::QueryBatch;
pub use report::CurationReport;
pub use table::{ReferenceKey, ReferenceTable, ReferenceTableBuilder, RowRef};
pub use value::Value;
