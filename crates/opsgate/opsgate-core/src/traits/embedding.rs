use crate::errors::OpsgateResult;

/// Text embedding provider.
pub trait IEmbeddingProvider: Send + Sync {
    /// Embed a single text. The result is unit-norm and has `dimensions()` entries.
    fn embed(&self, text: &str) -> OpsgateResult<Vec<f32>>;

    /// Embed a batch of texts.
    fn embed_batch(&self, texts: &[String]) -> OpsgateResult<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }

    /// The dimensionality of embeddings produced by this provider.
    fn dimensions(&self) -> usize;

    /// Human-readable provider name.
    fn name(&self) -> &str;

    /// Whether this provider is currently available.
    fn is_available(&self) -> bool;
}
