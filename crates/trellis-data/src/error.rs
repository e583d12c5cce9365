//! Data model error types.

use thiserror::Error;

use crate::value::ValueKind;

/// Result type for data model operations.
pub type DataResult<T> = Result<T, DataError>;

/// Errors that can occur while constructing or reading tabular data.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataError {
    /// A requested column is not present in the data set.
    #[error("column '{name}' not found")]
    MissingColumn {
        /// Name of the missing column.
        name: String,
    },

    /// Two columns with the same name were supplied.
    #[error("duplicate column '{name}'")]
    DuplicateColumn {
        /// Name of the duplicated column.
        name: String,
    },

    /// A cell or column does not match the declared value kind.
    #[error("column '{column}' expected {expected} values but got {actual}")]
    TypeMismatch {
        /// Name of the offending column.
        column: String,
        /// The declared value kind.
        expected: ValueKind,
        /// The kind actually encountered.
        actual: ValueKind,
    },

    /// Columns of differing lengths were combined into one data set.
    #[error("expected a column of length {expected} but got {actual}")]
    ColumnLengthMismatch {
        /// Expected number of cells.
        expected: usize,
        /// Actual number of cells.
        actual: usize,
    },

    /// Two data sets with differing row counts were zipped.
    #[error("cannot zip data sets with {left} and {right} rows")]
    RowCountMismatch {
        /// Row count of the left-hand data set.
        left: usize,
        /// Row count of the right-hand data set.
        right: usize,
    },

    /// A row index past the end of the data set was requested.
    #[error("row {row} is out of range for a data set with {num_rows} rows")]
    RowOutOfRange {
        /// The requested row index.
        row: usize,
        /// Number of rows in the data set.
        num_rows: usize,
    },
}
