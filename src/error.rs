//! Error types for the engine.

use thiserror::Error;

use crate::data_type::DataType;

pub type Result<T> = std::result::Result<T, Error>;

/// Every failure the engine can report. None of them is fatal to a session:
/// the console renders them as a diagnostic and keeps reading.
#[derive(Error, Debug)]
pub enum Error {
    /// A literal could not be converted to the target column kind.
    #[error("cannot read {token:?} as {kind}")]
    Parse { token: String, kind: DataType },

    /// A column was declared with an unknown type.
    #[error("wrong type name: {0}")]
    Schema(String),

    /// A value's kind does not match the declared kind of its column.
    #[error("type mismatch on column {column:?}: expected {expected}, found {found}")]
    Type {
        column: String,
        expected: DataType,
        found: DataType,
    },

    /// Primary-key uniqueness would be violated.
    #[error("primary key violation: {0}")]
    Constraint(String),

    /// Unknown table, unknown column or out-of-range index.
    #[error("{0} not found")]
    Lookup(String),

    #[error("table {0:?} already exists")]
    DuplicateTable(String),

    /// The number of supplied values does not match the number of target columns.
    #[error("column count doesn't match value count: expected {expected}, found {found}")]
    ColumnCount { expected: usize, found: usize },

    /// The statement does not match any recognised shape.
    #[error("wrong syntax: {0}")]
    Shape(String),

    /// A save file is malformed, or a table cannot be written as one.
    #[error("save file line {line}: {message}")]
    Persist { line: usize, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn table_not_found(name: &str) -> Self {
        Self::Lookup(format!("table {name:?}"))
    }

    pub(crate) fn column_not_found(name: &str) -> Self {
        Self::Lookup(format!("column {name:?}"))
    }
}
