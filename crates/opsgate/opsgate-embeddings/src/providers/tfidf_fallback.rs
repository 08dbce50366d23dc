//! Term-bucket embedding provider (`provider = "tfidf"`).
//!
//! Each term of two or more characters is hashed into one signed bucket and
//! weighted by its frequency in the text, scaled up for longer terms. Texts
//! that share vocabulary get a positive cosine; the sign bit keeps bucket
//! collisions from adding up.

use std::collections::BTreeMap;

use opsgate_core::errors::OpsgateResult;
use opsgate_core::traits::IEmbeddingProvider;

use super::{l2_normalize, normalize};

const MIN_TERM_LEN: usize = 2;

pub struct TfIdfFallback {
    dimensions: usize,
}

impl TfIdfFallback {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    /// (bucket, sign) for a term, from the first 8 bytes of its blake3 hash.
    fn slot(&self, term: &str) -> (usize, f32) {
        let hash = blake3::hash(term.as_bytes());
        let mut word = [0u8; 8];
        word.copy_from_slice(&hash.as_bytes()[..8]);
        let h = u64::from_le_bytes(word);
        let sign = if h >> 63 == 0 { 1.0 } else { -1.0 };
        ((h % self.dimensions as u64) as usize, sign)
    }

    fn term_counts(text: &str) -> BTreeMap<String, u32> {
        let mut counts = BTreeMap::new();
        for term in normalize(text)
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| t.chars().count() >= MIN_TERM_LEN)
        {
            *counts.entry(term.to_string()).or_insert(0) += 1;
        }
        counts
    }
}

impl IEmbeddingProvider for TfIdfFallback {
    /// Text without any term maps to the zero vector.
    fn embed(&self, text: &str) -> OpsgateResult<Vec<f32>> {
        let counts = Self::term_counts(text);
        let mut vec = vec![0.0f32; self.dimensions];
        let total: u32 = counts.values().sum();
        if total == 0 {
            return Ok(vec);
        }
        for (term, count) in &counts {
            let weight = (*count as f32 / total as f32) * (term.chars().count() as f32).ln_1p();
            let (bucket, sign) = self.slot(term);
            vec[bucket] += sign * weight;
        }
        l2_normalize(&mut vec);
        Ok(vec)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        "tfidf"
    }

    fn is_available(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dot(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }

    #[test]
    fn punctuation_only_is_the_zero_vector() {
        let v = TfIdfFallback::new(64).embed(" - ! ").unwrap();
        assert_eq!(v, vec![0.0; 64]);
    }

    #[test]
    fn non_empty_text_is_unit_norm() {
        let v = TfIdfFallback::new(256).embed("Checkout times out on mobile").unwrap();
        assert!((dot(&v, &v).sqrt() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn case_does_not_matter() {
        let p = TfIdfFallback::new(128);
        assert_eq!(p.embed("Webhook FAILED").unwrap(), p.embed("webhook failed").unwrap());
    }

    #[test]
    fn overlapping_tickets_are_closer() {
        let p = TfIdfFallback::new(256);
        let reset = p.embed("password reset email not arriving").unwrap();
        let expired = p.embed("password reset link expired").unwrap();
        let invoice = p.embed("invoice totals doubled").unwrap();
        assert!(dot(&reset, &expired) > dot(&reset, &invoice));
    }
}
