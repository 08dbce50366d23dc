use serde::{Deserialize, Serialize};

use super::defaults;

/// Retrieval subsystem configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// RRF k-value for rank fusion.
    pub rrf_k: u32,
    /// Default number of fused results returned by a search.
    pub default_k: usize,
    /// Candidate pool for filtered kNN queries (dedupe, resolutions).
    pub knn_num_candidates: usize,
    /// Candidate pool for the vector leg of a hybrid search.
    pub hybrid_num_candidates: usize,
    /// Highlight fragment size in characters.
    pub highlight_fragment_size: usize,
    /// Default page size for ticket listings.
    pub listing_page_size: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            rrf_k: defaults::DEFAULT_RRF_K,
            default_k: defaults::DEFAULT_SEARCH_K,
            knn_num_candidates: defaults::DEFAULT_KNN_NUM_CANDIDATES,
            hybrid_num_candidates: defaults::DEFAULT_HYBRID_NUM_CANDIDATES,
            highlight_fragment_size: defaults::DEFAULT_HIGHLIGHT_FRAGMENT_SIZE,
            listing_page_size: defaults::DEFAULT_LISTING_PAGE_SIZE,
        }
    }
}
