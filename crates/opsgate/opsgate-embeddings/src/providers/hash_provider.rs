//! Content-hash embedding provider.
//!
//! Expands the blake3 XOF stream of the normalized text into one byte per
//! dimension, maps each byte to [-1, 1] and L2-normalizes. Identical text
//! (after trim and lowercase) always yields the identical vector; unrelated
//! texts are close to orthogonal.

use opsgate_core::errors::OpsgateResult;
use opsgate_core::traits::IEmbeddingProvider;

use super::{l2_normalize, normalize};

pub struct HashEmbedder {
    dimensions: usize,
}

impl HashEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    fn hash_vector(&self, text: &str) -> Vec<f32> {
        let normalized = normalize(text);
        let mut bytes = vec![0u8; self.dimensions];
        blake3::Hasher::new()
            .update(normalized.as_bytes())
            .finalize_xof()
            .fill(&mut bytes);

        let mut vec: Vec<f32> = bytes
            .iter()
            .map(|&b| (b as f32 / 255.0) * 2.0 - 1.0)
            .collect();
        l2_normalize(&mut vec);
        vec
    }
}

impl IEmbeddingProvider for HashEmbedder {
    fn embed(&self, text: &str) -> OpsgateResult<Vec<f32>> {
        Ok(self.hash_vector(text))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        "hash"
    }

    fn is_available(&self) -> bool {
        true
    }
}
