/// Storage-layer errors for SQLite operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("SQLite error: {message}")]
    SqliteError { message: String },

    #[error("migration failed at version {version}: {reason}")]
    MigrationFailed { version: u32, reason: String },

    #[error("store busy: request exceeded {timeout_ms}ms timeout")]
    Busy { timeout_ms: u32 },

    #[error("invalid query: {reason}")]
    InvalidQuery { reason: String },

    #[error("corrupt document {collection}/{id}: {reason}")]
    CorruptDocument {
        collection: String,
        id: String,
        reason: String,
    },
}
