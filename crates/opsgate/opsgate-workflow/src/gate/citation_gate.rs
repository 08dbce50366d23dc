use opsgate_core::models::{CitationSet, ConfidenceTier, GateDecision};

/// Permits an action only when at least `min_citations` distinct
/// (collection, id) citations back it.
#[derive(Debug, Clone, Copy)]
pub struct CitationGate {
    min_citations: usize,
}

impl CitationGate {
    pub fn new(min_citations: usize) -> Self {
        Self { min_citations }
    }

    pub fn min_citations(&self) -> usize {
        self.min_citations
    }

    pub fn evaluate(&self, citations: &CitationSet) -> GateDecision {
        let count = citations.len();
        let permitted = count >= self.min_citations;
        GateDecision {
            permitted,
            confidence: if permitted {
                ConfidenceTier::High
            } else {
                ConfidenceTier::Low
            },
            citation_count: count,
            required: self.min_citations,
            reason: (!permitted).then(|| {
                format!(
                    "low confidence, action withheld: {count} of {} required citations",
                    self.min_citations
                )
            }),
            breakdown: citations.by_source(),
        }
    }
}
