//! Read-only reference corpora. Retrieved as evidence, never written by workflows.

use serde::{Deserialize, Serialize};

/// A knowledge-base article in the `kb-articles` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KbArticle {
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

/// A past resolution in the `resolutions` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resolution {
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}
