use thiserror::Error;

/// Errors that can occur when interacting with the document store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A document failed validation before being written.
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// The backing store refused the operation (connection lost, timeout, injected fault).
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Result type for document store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
