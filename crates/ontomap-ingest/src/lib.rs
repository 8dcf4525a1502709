//! Reference table and query ingestion.

pub mod csv_table;
pub mod error;
pub mod frame;

pub use csv_table::{
    DuplicatePolicy, ReferenceCsvOptions, read_query_column, read_queries, read_reference_csv,
    separator_for,
};
pub use error::{IngestError, Result};
pub use frame::{any_to_value, reference_from_dataframe};
