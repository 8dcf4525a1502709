use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("field name must not be empty")]
    EmptyFieldName,
    #[error("unknown field '{field}' (available: {available})")]
    UnknownField { field: String, available: String },
    #[error("duplicate field '{0}' in reference schema")]
    DuplicateField(String),
    #[error("row {row} has {actual} cells but the schema declares {expected} fields")]
    RowWidth {
        row: usize,
        expected: usize,
        actual: usize,
    },
    #[error("row {row} has no value for canonical id field '{field}'")]
    MissingId { row: usize, field: String },
    #[error("row {row} holds a multi-valued canonical id in field '{field}'")]
    MultiValuedId { row: usize, field: String },
    #[error("duplicate canonical id '{id}' (rows {first} and {second})")]
    DuplicateId {
        id: String,
        first: usize,
        second: usize,
    },
}

pub type Result<T> = std::result::Result<T, ModelError>;
