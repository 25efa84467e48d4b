/// Errors from world-state operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Keys must be non-empty.
    #[error("state key must not be empty")]
    EmptyKey,

    /// The rich query document could not be interpreted.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A lock guarding in-memory state was poisoned by a panicking writer.
    #[error("state lock poisoned")]
    LockPoisoned,

    /// A query iterator failed while producing its next record.
    #[error("query iteration failed: {0}")]
    Iteration(String),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
