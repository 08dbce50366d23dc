/// Embedding subsystem errors.
#[derive(Debug, thiserror::Error)]
pub enum EmbeddingError {
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("invalid dimensions: {dimensions}")]
    InvalidDimensions { dimensions: usize },

    #[error("provider unavailable: {provider}")]
    ProviderUnavailable { provider: String },
}
