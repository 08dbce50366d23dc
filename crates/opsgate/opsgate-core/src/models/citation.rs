use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use super::classification::ConfidenceTier;
use crate::constants::collections;

/// Pointer to a retrieved document used as evidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    /// Source collection.
    pub index: String,
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight: Option<String>,
}

impl Citation {
    pub fn new(index: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            id: id.into(),
            highlight: None,
        }
    }

    pub fn with_highlight(mut self, highlight: Option<String>) -> Self {
        self.highlight = highlight;
        self
    }

    /// Human-readable label, e.g. `KB Article: kb-001`.
    pub fn label(&self) -> String {
        let kind = match self.index.as_str() {
            collections::KB_ARTICLES => "KB Article",
            collections::RESOLUTIONS => "Resolution",
            collections::TICKETS => "Ticket",
            collections::INCIDENTS => "Incident",
            collections::LOGS => "Log Event",
            other => other,
        };
        format!("{kind}: {}", self.id)
    }

    /// In-app route for the cited document.
    pub fn app_path(&self) -> String {
        match self.index.as_str() {
            collections::KB_ARTICLES => format!("/kb/{}", self.id),
            collections::RESOLUTIONS => format!("/resolution/{}", self.id),
            collections::TICKETS => format!("/ticket/{}", self.id),
            collections::INCIDENTS => format!("/incident/{}", self.id),
            other => format!("/{other}/{}", self.id),
        }
    }

    fn key(&self) -> (String, String) {
        (self.index.clone(), self.id.clone())
    }
}

/// Insertion-ordered citation list, unique by (collection, id).
#[derive(Debug, Clone, Default)]
pub struct CitationSet {
    items: Vec<Citation>,
    seen: HashSet<(String, String)>,
}

impl CitationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false when the citation was already present.
    pub fn push(&mut self, citation: Citation) -> bool {
        if self.seen.insert(citation.key()) {
            self.items.push(citation);
            true
        } else {
            false
        }
    }

    pub fn extend<I: IntoIterator<Item = Citation>>(&mut self, citations: I) {
        for c in citations {
            self.push(c);
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn as_slice(&self) -> &[Citation] {
        &self.items
    }

    pub fn into_vec(self) -> Vec<Citation> {
        self.items
    }

    /// Count of citations per source collection.
    pub fn by_source(&self) -> BTreeMap<String, usize> {
        let mut out = BTreeMap::new();
        for c in &self.items {
            *out.entry(c.index.clone()).or_insert(0) += 1;
        }
        out
    }
}

impl FromIterator<Citation> for CitationSet {
    fn from_iter<I: IntoIterator<Item = Citation>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

/// Outcome of evaluating a citation set against the evidence minimum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateDecision {
    pub permitted: bool,
    pub confidence: ConfidenceTier,
    pub citation_count: usize,
    pub required: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default)]
    pub breakdown: BTreeMap<String, usize>,
}
