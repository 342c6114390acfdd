//! Error types for the MySQL adapter.

use mysql_async::Value;
use thiserror::Error;

/// Errors raised while talking to MySQL or converting its values.
#[derive(Error, Debug)]
pub enum MySqlError {
    /// MySQL connection or query error.
    #[error("MySQL error: {0}")]
    MySQL(#[from] mysql_async::Error),

    /// An INFORMATION_SCHEMA row lacked an expected field.
    #[error("Missing {0} in schema query result")]
    MissingField(&'static str),

    /// A stored value did not match the column's category.
    #[error("Expected {expected}, got {actual:?}")]
    TypeMismatch { expected: &'static str, actual: Value },

    /// Text column held invalid UTF-8.
    #[error("Invalid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// Date or time value out of range.
    #[error("Invalid date/time value: {0}")]
    InvalidDateTime(String),

    /// The session was used after being closed.
    #[error("Connection already closed")]
    Closed,
}
