//! Ticket-level dedup: the single highest similarity among open tickets of
//! the same category decides.

use opsgate_core::models::{Category, SearchHit};
use opsgate_core::traits::IDocumentStore;
use opsgate_core::OpsgateResult;
use opsgate_retrieval::search_templates;

#[derive(Debug, Clone)]
pub struct TicketDedup {
    pub is_duplicate: bool,
    pub top_score: Option<f64>,
    /// Similar tickets, most similar first.
    pub similar: Vec<SearchHit>,
}

impl TicketDedup {
    /// The ticket this one duplicates.
    pub fn duplicate_of(&self) -> Option<&SearchHit> {
        if self.is_duplicate {
            self.similar.first()
        } else {
            None
        }
    }
}

/// Strictly greater than the threshold.
pub fn exceeds_threshold(top_score: Option<f64>, threshold: f64) -> bool {
    top_score.is_some_and(|s| s > threshold)
}

/// Search parameters for a dedup lookup.
#[derive(Debug, Clone, Copy)]
pub struct DedupSettings {
    pub k: usize,
    pub num_candidates: usize,
    pub threshold: f64,
    pub fragment_size: usize,
}

pub fn find_similar_tickets(
    store: &dyn IDocumentStore,
    vector: &[f32],
    category: Option<Category>,
    exclude_id: Option<&str>,
    settings: DedupSettings,
) -> OpsgateResult<TicketDedup> {
    let request = search_templates::ticket_dedupe(
        vector,
        category,
        exclude_id,
        settings.k,
        settings.num_candidates,
        settings.fragment_size,
    );
    let similar = store.search(&request)?.hits;
    let top_score = similar.iter().map(|h| h.score).reduce(f64::max);
    Ok(TicketDedup {
        is_duplicate: exceeds_threshold(top_score, settings.threshold),
        top_score,
        similar,
    })
}
