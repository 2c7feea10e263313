//! Store error taxonomy.

/// Errors produced by the transcript store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Caller supplied an out-of-contract argument (e.g. result cap > 10).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// No entry exists with the given id.
    #[error("entry not found: {0}")]
    NotFound(i64),

    /// Underlying SQLite failure.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Connection pool failure.
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),
}

/// Convenience result alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
