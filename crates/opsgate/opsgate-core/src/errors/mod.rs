//! Error hierarchy. One enum per subsystem, unified under [`OpsgateError`].

mod embedding_error;
mod retrieval_error;
mod storage_error;
mod workflow_error;

pub use embedding_error::EmbeddingError;
pub use retrieval_error::RetrievalError;
pub use storage_error::StorageError;
pub use workflow_error::WorkflowError;

/// Result alias used across the workspace.
pub type OpsgateResult<T> = Result<T, OpsgateError>;

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum OpsgateError {
    /// Referenced entity is absent. Terminal and non-retryable.
    #[error("{collection}/{id} not found")]
    NotFound { collection: String, id: String },

    /// A direct write was attempted without enough evidence.
    #[error("at least {required} citations required, {provided} provided")]
    EvidenceRequired { provided: usize, required: usize },

    #[error("storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("retrieval error: {0}")]
    RetrievalError(#[from] RetrievalError),

    #[error("embedding error: {0}")]
    EmbeddingError(#[from] EmbeddingError),

    #[error("workflow error: {0}")]
    WorkflowError(#[from] WorkflowError),

    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("config error: {0}")]
    ConfigError(String),
}

impl OpsgateError {
    pub fn not_found(collection: &str, id: &str) -> Self {
        Self::NotFound {
            collection: collection.to_string(),
            id: id.to_string(),
        }
    }

    /// Whether this is the terminal not-found outcome rather than a failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// The run id carried by a mid-pipeline failure, if any.
    pub fn run_id(&self) -> Option<&str> {
        match self {
            Self::WorkflowError(WorkflowError::RunFailed { run_id, .. }) => Some(run_id),
            _ => None,
        }
    }
}
