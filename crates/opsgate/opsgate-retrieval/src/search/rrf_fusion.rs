//! Reciprocal Rank Fusion: score = Σ 1/(k + rank_i)
//!
//! Combines a lexical and a vector ranked list without normalizing their
//! scores against each other. Ranks are 1-based; a document absent from a
//! list contributes nothing for that list.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use opsgate_core::models::SearchHit;

/// Where a document sat in one input list.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ListContribution {
    pub rank: usize,
    pub score: f64,
}

/// A document after fusion.
#[derive(Debug, Clone, PartialEq)]
pub struct FusedHit {
    pub id: String,
    pub rrf_score: f64,
    pub lexical: Option<ListContribution>,
    pub vector: Option<ListContribution>,
}

fn contributions(list: &[SearchHit]) -> HashMap<&str, ListContribution> {
    let mut out = HashMap::with_capacity(list.len());
    for (idx, hit) in list.iter().enumerate() {
        // A repeated id keeps its best (first) rank.
        out.entry(hit.id.as_str()).or_insert(ListContribution {
            rank: idx + 1,
            score: hit.score,
        });
    }
    out
}

fn rrf(k: u32, c: Option<ListContribution>) -> f64 {
    c.map(|c| 1.0 / (k as f64 + c.rank as f64)).unwrap_or(0.0)
}

/// Absent ranks sort after present ones.
fn rank_order(a: Option<ListContribution>, b: Option<ListContribution>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.rank.cmp(&b.rank),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Fuse two ranked lists. Output is sorted by fused score descending; ties
/// break by lexical rank, then vector rank, then id.
pub fn fuse(lexical: &[SearchHit], vector: &[SearchHit], k: u32) -> Vec<FusedHit> {
    let lex = contributions(lexical);
    let vec = contributions(vector);

    let mut ids: Vec<&str> = lex.keys().chain(vec.keys()).copied().collect();
    ids.sort_unstable();
    ids.dedup();

    let mut fused: Vec<FusedHit> = ids
        .into_iter()
        .map(|id| {
            let lexical = lex.get(id).copied();
            let vector = vec.get(id).copied();
            FusedHit {
                id: id.to_string(),
                rrf_score: rrf(k, lexical) + rrf(k, vector),
                lexical,
                vector,
            }
        })
        .collect();

    fused.sort_by(|a, b| {
        b.rrf_score
            .partial_cmp(&a.rrf_score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| rank_order(a.lexical, b.lexical))
            .then_with(|| rank_order(a.vector, b.vector))
            .then_with(|| a.id.cmp(&b.id))
    });
    fused
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn hits(ids: &[&str]) -> Vec<SearchHit> {
        ids.iter()
            .enumerate()
            .map(|(i, id)| SearchHit {
                id: id.to_string(),
                score: 10.0 - i as f64,
                source: Value::Null,
                highlights: vec![],
            })
            .collect()
    }

    #[test]
    fn document_in_both_lists_wins() {
        let fused = fuse(&hits(&["a", "b"]), &hits(&["c", "b"]), 60);
        assert_eq!(fused[0].id, "b");
        let expected = 2.0 / 62.0;
        assert!((fused[0].rrf_score - expected).abs() < 1e-12);
    }

    #[test]
    fn single_list_ties_break_by_lexical_rank() {
        // a: lexical rank 1; c: vector rank 1. Equal fused scores.
        let fused = fuse(&hits(&["a"]), &hits(&["c"]), 60);
        assert_eq!(fused[0].id, "a");
        assert_eq!(fused[1].id, "c");
        assert_eq!(fused[0].rrf_score, fused[1].rrf_score);
    }

    #[test]
    fn contributions_are_reported() {
        let fused = fuse(&hits(&["x", "y"]), &hits(&["y"]), 60);
        let y = fused.iter().find(|f| f.id == "y").unwrap();
        assert_eq!(y.lexical.unwrap().rank, 2);
        assert_eq!(y.vector.unwrap().rank, 1);
        let x = fused.iter().find(|f| f.id == "x").unwrap();
        assert!(x.vector.is_none());
    }

    #[test]
    fn empty_inputs_fuse_to_nothing() {
        assert!(fuse(&[], &[], 60).is_empty());
    }

    #[test]
    fn repeated_id_keeps_first_rank() {
        let fused = fuse(&hits(&["a", "a"]), &[], 60);
        assert_eq!(fused.len(), 1);
        assert_eq!(fused[0].lexical.unwrap().rank, 1);
    }
}
