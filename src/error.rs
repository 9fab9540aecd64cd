//! Error types for the mapping layer.

use thiserror::Error;

/// Result type for mapping operations.
pub type MapperResult<T> = Result<T, MapperError>;

/// Errors that can occur while mapping entities or executing CRUD operations.
#[derive(Debug, Error)]
pub enum MapperError {
    /// The entity type cannot be mapped to a table.
    #[error("metadata error: {0}")]
    Metadata(String),

    /// Mapping state that cannot be turned into a valid statement, or a
    /// field that could not be read or assigned.
    #[error("sql build error: {0}")]
    SqlBuild(String),

    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Failure raised by a non-SQLite store.
    #[error("store error: {0}")]
    Store(String),

    /// Invalid configuration.
    #[error("config error: {0}")]
    Config(String),

    /// Configuration (de)serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl MapperError {
    pub(crate) fn metadata(msg: impl Into<String>) -> Self {
        Self::Metadata(msg.into())
    }

    pub(crate) fn sql_build(msg: impl Into<String>) -> Self {
        Self::SqlBuild(msg.into())
    }
}
