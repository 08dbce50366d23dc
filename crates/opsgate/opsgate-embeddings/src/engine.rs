//! EmbeddingEngine: configured provider plus L1 cache.
//! Implements `IEmbeddingProvider` so workflows take it as a plain provider.

use opsgate_core::config::EmbeddingConfig;
use opsgate_core::errors::{EmbeddingError, OpsgateResult};
use opsgate_core::traits::IEmbeddingProvider;
use tracing::{debug, info};

use crate::cache::{content_key, L1MemoryCache};
use crate::providers;

pub struct EmbeddingEngine {
    provider: Box<dyn IEmbeddingProvider>,
    cache: L1MemoryCache,
    dimensions: usize,
}

impl EmbeddingEngine {
    /// Fails when the configured provider is unknown or dimensions are zero.
    pub fn new(config: &EmbeddingConfig) -> OpsgateResult<Self> {
        let provider = providers::create_provider(config)?;
        info!(
            provider = provider.name(),
            dims = config.dimensions,
            "EmbeddingEngine initialized"
        );
        Ok(Self {
            provider,
            cache: L1MemoryCache::new(config.l1_cache_size),
            dimensions: config.dimensions,
        })
    }

    pub fn cache(&self) -> &L1MemoryCache {
        &self.cache
    }

    fn validate(&self, embedding: &[f32]) -> OpsgateResult<()> {
        if embedding.len() != self.dimensions {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.dimensions,
                actual: embedding.len(),
            }
            .into());
        }
        Ok(())
    }
}

impl IEmbeddingProvider for EmbeddingEngine {
    fn embed(&self, text: &str) -> OpsgateResult<Vec<f32>> {
        let key = content_key(&providers::normalize(text));
        if let Some(vec) = self.cache.get(&key) {
            debug!(key = %key, "embedding cache hit");
            return Ok(vec);
        }

        let embedding = self.provider.embed(text)?;
        self.validate(&embedding)?;
        self.cache.insert(key, embedding.clone());
        Ok(embedding)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        self.provider.name()
    }

    fn is_available(&self) -> bool {
        self.provider.is_available()
    }
}
