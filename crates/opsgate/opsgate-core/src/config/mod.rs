//! Layered configuration. Every section falls back to `defaults.rs`.

pub mod defaults;
mod detection_config;
mod embedding_config;
mod observability_config;
mod retrieval_config;
mod storage_config;
mod triage_config;

use std::path::Path;

use serde::{Deserialize, Serialize};

pub use detection_config::DetectionConfig;
pub use embedding_config::EmbeddingConfig;
pub use observability_config::ObservabilityConfig;
pub use retrieval_config::RetrievalConfig;
pub use storage_config::StorageConfig;
pub use triage_config::TriageConfig;

use crate::errors::{OpsgateError, OpsgateResult};

/// Top-level configuration for the whole engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OpsgateConfig {
    pub storage: StorageConfig,
    pub embedding: EmbeddingConfig,
    pub retrieval: RetrievalConfig,
    pub detection: DetectionConfig,
    pub triage: TriageConfig,
    pub observability: ObservabilityConfig,
}

impl OpsgateConfig {
    /// Parse a TOML document. Missing sections and fields keep their defaults.
    pub fn from_toml(source: &str) -> OpsgateResult<Self> {
        toml::from_str(source).map_err(|e| OpsgateError::ConfigError(e.to_string()))
    }

    /// Load configuration from a TOML file on disk.
    pub fn load(path: &Path) -> OpsgateResult<Self> {
        let source = std::fs::read_to_string(path).map_err(|e| {
            OpsgateError::ConfigError(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml(&source)
    }
}
