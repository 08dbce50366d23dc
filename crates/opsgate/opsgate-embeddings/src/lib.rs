//! # opsgate-embeddings
//!
//! Deterministic text embeddings for tickets, incidents, and queries.
//! Provider selection by config, L1 cache keyed by blake3 content hash.

pub mod cache;
pub mod engine;
pub mod providers;

pub use engine::EmbeddingEngine;
pub use providers::{HashEmbedder, TfIdfFallback};
