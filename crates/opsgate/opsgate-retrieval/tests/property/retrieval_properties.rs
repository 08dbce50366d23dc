use std::collections::HashSet;

use opsgate_core::models::SearchHit;
use opsgate_retrieval::fuse;
use proptest::prelude::*;
use serde_json::Value;

fn ranked(ids: &[u8]) -> Vec<SearchHit> {
    let mut seen = HashSet::new();
    ids.iter()
        .filter(|id| seen.insert(**id))
        .enumerate()
        .map(|(i, id)| SearchHit {
            id: format!("doc-{id}"),
            score: 100.0 - i as f64,
            source: Value::Null,
            highlights: vec![],
        })
        .collect()
}

fn arb_list() -> impl Strategy<Value = Vec<SearchHit>> {
    prop::collection::vec(0u8..40, 0..20).prop_map(|ids| ranked(&ids))
}

// ── Fused output is sorted by score, descending ──────────────────────────

proptest! {
    #[test]
    fn fused_scores_non_increasing(lex in arb_list(), vec in arb_list(), k in 1u32..120) {
        let fused = fuse(&lex, &vec, k);
        for pair in fused.windows(2) {
            prop_assert!(pair[0].rrf_score >= pair[1].rrf_score);
        }
    }
}

// ── Same inputs, same order ──────────────────────────────────────────────

proptest! {
    #[test]
    fn fusion_is_deterministic(lex in arb_list(), vec in arb_list()) {
        let a: Vec<String> = fuse(&lex, &vec, 60).into_iter().map(|f| f.id).collect();
        let b: Vec<String> = fuse(&lex, &vec, 60).into_iter().map(|f| f.id).collect();
        prop_assert_eq!(a, b);
    }
}

// ── Every candidate appears exactly once ─────────────────────────────────

proptest! {
    #[test]
    fn output_is_union_of_inputs(lex in arb_list(), vec in arb_list()) {
        let fused = fuse(&lex, &vec, 60);
        let expected: HashSet<&str> =
            lex.iter().chain(vec.iter()).map(|h| h.id.as_str()).collect();
        let got: HashSet<&str> = fused.iter().map(|f| f.id.as_str()).collect();
        prop_assert_eq!(fused.len(), got.len());
        prop_assert_eq!(expected, got);
    }
}

// ── Score equals the sum of 1/(k + rank) ─────────────────────────────────

proptest! {
    #[test]
    fn score_matches_formula(lex in arb_list(), vec in arb_list(), k in 1u32..120) {
        for hit in fuse(&lex, &vec, k) {
            let mut expected = 0.0;
            if let Some(c) = hit.lexical {
                expected += 1.0 / (k as f64 + c.rank as f64);
            }
            if let Some(c) = hit.vector {
                expected += 1.0 / (k as f64 + c.rank as f64);
            }
            prop_assert!((hit.rrf_score - expected).abs() < 1e-12);
        }
    }
}

// ── Presence in both lists never scores below the same rank in one ───────

proptest! {
    #[test]
    fn both_lists_beat_single_list_at_same_rank(rank in 1usize..30, k in 1u32..120) {
        let ids: Vec<u8> = (0..rank as u8).collect();
        let lex = ranked(&ids);
        let fused = fuse(&lex, &lex, k);
        let single = 1.0 / (k as f64 + rank as f64);
        let last = fused.iter().find(|f| f.id == format!("doc-{}", rank - 1)).unwrap();
        prop_assert!(last.rrf_score >= single);
    }
}
