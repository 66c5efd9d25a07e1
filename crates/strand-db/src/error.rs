//! Database error types.

use thiserror::Error;

/// Errors from the SQLite layer.
#[derive(Error, Debug)]
pub enum DbError {
    /// Failed to open the database.
    #[error("Failed to open database: {0}")]
    Open(String),

    /// A statement failed to execute.
    #[error("Query failed: {0}")]
    Query(String),

    /// A row was expected but none matched.
    #[error("Row not found")]
    NotFound,

    /// A column was missing or held an unexpected type.
    #[error("Column error: {0}")]
    Column(String),

    /// SQLite is not available on this target.
    #[error("SQLite is only available inside the Spin runtime")]
    Unsupported,
}
