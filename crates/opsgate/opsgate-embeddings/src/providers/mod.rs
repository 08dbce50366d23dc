mod hash_provider;
mod tfidf_fallback;

pub use hash_provider::HashEmbedder;
pub use tfidf_fallback::TfIdfFallback;

use opsgate_core::config::EmbeddingConfig;
use opsgate_core::errors::{EmbeddingError, OpsgateResult};
use opsgate_core::traits::IEmbeddingProvider;

/// Build the provider named in config: `hash` or `tfidf`.
pub fn create_provider(config: &EmbeddingConfig) -> OpsgateResult<Box<dyn IEmbeddingProvider>> {
    if config.dimensions == 0 {
        return Err(EmbeddingError::InvalidDimensions {
            dimensions: config.dimensions,
        }
        .into());
    }
    match config.provider.as_str() {
        "hash" => Ok(Box::new(HashEmbedder::new(config.dimensions))),
        "tfidf" => Ok(Box::new(TfIdfFallback::new(config.dimensions))),
        other => Err(EmbeddingError::ProviderUnavailable {
            provider: other.to_string(),
        }
        .into()),
    }
}

/// Normalize text before embedding or cache lookup.
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Scale `vec` to unit length in place. Zero vectors are left untouched.
pub(crate) fn l2_normalize(vec: &mut [f32]) {
    let norm: f32 = vec.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        for v in vec.iter_mut() {
            *v /= norm;
        }
    }
}
