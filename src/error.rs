//! Structured error types for weft-orm.
//!
//! Uses `thiserror` for better API surface and error composition.
//! Application binaries can still wrap these in `anyhow` for convenience,
//! but library consumers get structured, composable errors.

use std::time::Duration;
use thiserror::Error;

/// Main error type for weft-orm operations
#[derive(Error, Debug)]
pub enum WeftError {
    /// Invalid schema declaration (zero or duplicate primary keys, empty
    /// column set). Raised when the schema is compiled, before any entity
    /// instance can exist, and never recoverable at runtime.
    #[error("schema error for table `{table}`: {reason}")]
    Schema { table: String, reason: String },

    /// No pooled connection became available within the acquire window.
    /// Recoverable by retry/backoff at the caller.
    #[error("connection pool exhausted after waiting {waited:?}")]
    PoolExhausted { waited: Duration },

    /// Driver-reported failure: constraint violation, SQL syntax,
    /// connectivity. Always propagated, never swallowed.
    #[error("query execution failed: {source}")]
    Query {
        #[from]
        source: sqlx::Error,
    },

    /// Malformed query option, e.g. an `order_by` naming an undeclared
    /// field. Surfaced before any statement is sent.
    #[error("invalid query argument: {reason}")]
    InvalidArgument { reason: String },

    /// A result row could not be decoded into entity values.
    #[error("row decode failed: {reason}")]
    Row { reason: String },

    /// Configuration could not be loaded or parsed.
    #[error("configuration error: {reason}")]
    Config { reason: String },
}

/// Result type alias for weft-orm operations
pub type Result<T> = std::result::Result<T, WeftError>;

impl WeftError {
    /// Create a schema error
    pub fn schema(table: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Schema {
            table: table.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid argument error
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            reason: reason.into(),
        }
    }

    /// Create a row decode error
    pub fn row(reason: impl Into<String>) -> Self {
        Self::Row {
            reason: reason.into(),
        }
    }

    /// Create a config error
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }
}
