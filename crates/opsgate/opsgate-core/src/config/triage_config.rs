use serde::{Deserialize, Serialize};

use super::defaults;

/// Ticket triage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TriageConfig {
    /// A top similarity strictly above this flags a duplicate.
    pub duplicate_similarity_threshold: f64,
    /// Minimum distinct citations before any automated write.
    pub min_citations: usize,
    /// Similar tickets fetched for dedupe.
    pub dedupe_k: usize,
    /// KB articles fetched per triage.
    pub kb_k: usize,
    /// Resolutions fetched per triage.
    pub resolution_k: usize,
    /// Citations taken from each evidence source.
    pub citations_per_source: usize,
    /// Minutes credited per prevented duplicate.
    pub time_saved_per_duplicate_minutes: f64,
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            duplicate_similarity_threshold: defaults::DEFAULT_DUPLICATE_SIMILARITY_THRESHOLD,
            min_citations: defaults::DEFAULT_MIN_CITATIONS,
            dedupe_k: defaults::DEFAULT_DEDUPE_K,
            kb_k: defaults::DEFAULT_KB_K,
            resolution_k: defaults::DEFAULT_RESOLUTION_K,
            citations_per_source: defaults::DEFAULT_CITATIONS_PER_SOURCE,
            time_saved_per_duplicate_minutes: defaults::DEFAULT_TIME_SAVED_PER_DUPLICATE_MINUTES,
        }
    }
}
