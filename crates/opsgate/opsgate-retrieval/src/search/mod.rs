//! Hybrid search: lexical and vector retrieval fused with RRF.

pub mod rrf_fusion;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use opsgate_core::config::RetrievalConfig;
use opsgate_core::constants::collections;
use opsgate_core::errors::{OpsgateResult, RetrievalError};
use opsgate_core::models::{FieldBoost, Filter, Fuzziness, SearchHit};
use opsgate_core::traits::{IDocumentStore, IEmbeddingProvider};

use crate::search_templates;
use rrf_fusion::ListContribution;

/// Upper bound on candidates fetched per list.
const MAX_CANDIDATES: usize = 10_000;

/// Predefined hybrid search targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    Kb,
    Tickets,
}

impl SearchMode {
    pub fn parse(mode: &str) -> OpsgateResult<Self> {
        match mode {
            "kb" => Ok(Self::Kb),
            "tickets" => Ok(Self::Tickets),
            other => Err(RetrievalError::InvalidRequest {
                reason: format!("unknown search mode {other:?}, expected \"kb\" or \"tickets\""),
            }
            .into()),
        }
    }

    pub fn collection(&self) -> &'static str {
        match self {
            Self::Kb => collections::KB_ARTICLES,
            Self::Tickets => collections::TICKETS,
        }
    }

    pub fn text_fields(&self) -> Vec<FieldBoost> {
        let specs: &[&str] = match self {
            Self::Kb => &["title^2", "content"],
            Self::Tickets => &["subject^2", "description", "customer_message"],
        };
        specs.iter().map(|s| FieldBoost::parse(s)).collect()
    }
}

/// Per-list positions of a fused hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explain {
    pub lexical: Option<ListContribution>,
    pub vector: Option<ListContribution>,
    pub rrf_k: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HybridHit {
    pub id: String,
    /// Fused RRF score.
    pub score: f64,
    pub source: Value,
    pub highlights: Vec<(String, Vec<String>)>,
    pub explain: Explain,
}

impl HybridHit {
    pub fn title(&self) -> Option<String> {
        self.source
            .get("title")
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    pub fn first_highlight(&self) -> Option<String> {
        self.highlights
            .iter()
            .find_map(|(_, fragments)| fragments.first().cloned())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HybridResults {
    pub hits: Vec<HybridHit>,
    /// Unique documents across both candidate lists.
    pub total_candidates: usize,
}

/// Runs both retrievals against the store and fuses them.
pub struct HybridSearcher<'a> {
    store: &'a dyn IDocumentStore,
    embedder: &'a dyn IEmbeddingProvider,
    config: RetrievalConfig,
}

impl<'a> HybridSearcher<'a> {
    pub fn new(
        store: &'a dyn IDocumentStore,
        embedder: &'a dyn IEmbeddingProvider,
        config: RetrievalConfig,
    ) -> Self {
        Self {
            store,
            embedder,
            config,
        }
    }

    /// Hybrid search over `collection`. Each retrieval fetches `2k`
    /// candidates; the fused list is cut to `k`.
    #[allow(clippy::too_many_arguments)]
    pub fn search(
        &self,
        collection: &str,
        text: &str,
        vector: &[f32],
        fields: &[FieldBoost],
        k: usize,
        filter: &[Filter],
        num_candidates: usize,
    ) -> OpsgateResult<HybridResults> {
        let candidates = k.saturating_mul(2).min(MAX_CANDIDATES);
        let lexical_req = search_templates::hybrid_lexical(
            collection,
            text,
            fields,
            Fuzziness::Auto,
            candidates,
            filter.to_vec(),
            self.config.highlight_fragment_size,
        );
        let vector_req = search_templates::hybrid_vector(
            collection,
            vector,
            candidates,
            num_candidates,
            filter.to_vec(),
        );

        let lexical = self.store.search(&lexical_req)?.hits;
        let vector = self.store.search(&vector_req)?.hits;
        debug!(
            collection,
            lexical = lexical.len(),
            vector = vector.len(),
            "hybrid candidates"
        );

        Ok(self.fuse_top_k(lexical, vector, k))
    }

    /// The kb / tickets search: embeds the query, searches with the mode's
    /// fields and fuzzy matching, returns the top `k` with explanations.
    pub fn search_mode(
        &self,
        mode: SearchMode,
        query: &str,
        k: Option<usize>,
    ) -> OpsgateResult<HybridResults> {
        if query.trim().is_empty() {
            return Err(RetrievalError::InvalidRequest {
                reason: "query text is required".to_string(),
            }
            .into());
        }
        let k = k.unwrap_or(self.config.default_k);
        let vector = self.embedder.embed(query)?;
        self.search(
            mode.collection(),
            query,
            &vector,
            &mode.text_fields(),
            k,
            &[],
            self.config.hybrid_num_candidates,
        )
    }

    fn fuse_top_k(
        &self,
        lexical: Vec<SearchHit>,
        vector: Vec<SearchHit>,
        k: usize,
    ) -> HybridResults {
        let fused = rrf_fusion::fuse(&lexical, &vector, self.config.rrf_k);
        let total_candidates = fused.len();

        // Prefer the lexical copy of a document: it carries highlights.
        let mut docs: HashMap<String, SearchHit> = HashMap::new();
        for hit in vector.into_iter().chain(lexical) {
            docs.insert(hit.id.clone(), hit);
        }

        let hits = fused
            .into_iter()
            .take(k)
            .filter_map(|f| {
                let doc = docs.remove(&f.id)?;
                Some(HybridHit {
                    id: f.id,
                    score: f.rrf_score,
                    source: doc.source,
                    highlights: doc.highlights,
                    explain: Explain {
                        lexical: f.lexical,
                        vector: f.vector,
                        rrf_k: self.config.rrf_k,
                    },
                })
            })
            .collect();

        HybridResults {
            hits,
            total_candidates,
        }
    }
}
