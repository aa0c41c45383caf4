use thiserror::Error;

/// Problems with the contents of an integral file.
#[derive(Debug, Error, PartialEq)]
pub enum DataError {
    #[error("line {line}, column {column}: '{token}' is not a number")]
    NotANumber {
        line: u64,
        column: usize,
        token: String,
    },

    #[error("line {line}: expected {expected} columns, found {found}")]
    RaggedRow {
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("file contains no data rows")]
    Empty,

    #[error("expected at least {expected} columns, found {found}")]
    TooFewColumns { expected: usize, found: usize },

    #[error("initial value of {what} is zero, cannot normalize")]
    ZeroReference { what: String },
}
