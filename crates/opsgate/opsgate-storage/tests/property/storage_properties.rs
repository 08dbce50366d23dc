use chrono::{Duration, TimeZone, Utc};
use opsgate_core::models::{SearchQuery, SearchRequest, SortField, Visibility};
use opsgate_core::traits::IDocumentStore;
use opsgate_storage::queries::tokens::{token_spans, tokenize};
use opsgate_storage::queries::vector_search::{bytes_to_f32_vec, cosine_similarity, f32_vec_to_bytes};
use opsgate_storage::StorageEngine;
use proptest::prelude::*;
use serde_json::json;

fn arb_vector(dims: usize) -> impl Strategy<Value = Vec<f32>> {
    prop::collection::vec(-100.0f32..100.0, dims)
}

// ── Vector blobs survive storage encoding ────────────────────────────────

proptest! {
    #[test]
    fn vector_bytes_preserve_values(v in prop::collection::vec(-1.0e6f32..1.0e6, 0..64)) {
        let bytes = f32_vec_to_bytes(&v);
        prop_assert_eq!(bytes.len(), v.len() * 4);
        prop_assert_eq!(bytes_to_f32_vec(&bytes, v.len()), v);
    }
}

// ── Cosine is symmetric, bounded, and 1.0 against itself ─────────────────

proptest! {
    #[test]
    fn cosine_symmetric_and_bounded(a in arb_vector(16), b in arb_vector(16)) {
        let ab = cosine_similarity(&a, &b);
        let ba = cosine_similarity(&b, &a);
        prop_assert!((ab - ba).abs() < 1e-9);
        prop_assert!((-1.0 - 1e-9..=1.0 + 1e-9).contains(&ab));
    }

    #[test]
    fn cosine_self_is_one(a in arb_vector(16)) {
        prop_assume!(a.iter().any(|x| x.abs() > 1e-3));
        prop_assert!((cosine_similarity(&a, &a) - 1.0).abs() < 1e-9);
    }
}

// ── Tokens are lower-case, unique, and come from alphanumeric spans ──────

proptest! {
    #[test]
    fn tokens_unique_and_lowercase(text in "[a-zA-Z0-9 ,.!'-]{0,60}") {
        let tokens = tokenize(&text);
        for (i, t) in tokens.iter().enumerate() {
            prop_assert!(!t.is_empty());
            prop_assert_eq!(t.to_lowercase(), t.clone());
            prop_assert!(!tokens[..i].contains(t));
        }
    }

    #[test]
    fn spans_ordered_and_alphanumeric(text in "[a-zA-Z0-9 ,.!'-]{0,60}") {
        let spans = token_spans(&text);
        for pair in spans.windows(2) {
            prop_assert!(pair[0].1 < pair[1].0);
        }
        for (s, e) in spans {
            prop_assert!(s < e && e <= text.len());
            prop_assert!(text[s..e].chars().all(char::is_alphanumeric));
        }
    }
}

// ── Newest-first: timestamps non-increasing, ties latest write first ─────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn newest_first_orders_by_time_then_write_order(offsets in prop::collection::vec(0i64..4, 1..12)) {
        let store = StorageEngine::open_in_memory().unwrap();
        let base = Utc.with_ymd_and_hms(2026, 1, 5, 12, 0, 0).unwrap();
        for (i, secs) in offsets.iter().enumerate() {
            store
                .write(
                    "ops-runs",
                    Some(format!("run-{i:02}").as_str()),
                    &json!({"seq": i, "started_at": base + Duration::seconds(*secs)}),
                    Visibility::Immediate,
                )
                .unwrap();
        }
        let req = SearchRequest::new("ops-runs", SearchQuery::MatchAll, offsets.len())
            .sorted(SortField::newest_first("started_at"));
        let hits = store.search(&req).unwrap().hits;
        prop_assert_eq!(hits.len(), offsets.len());

        let order: Vec<usize> = hits
            .iter()
            .map(|h| h.source["seq"].as_u64().unwrap() as usize)
            .collect();
        for pair in order.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            prop_assert!(offsets[a] > offsets[b] || (offsets[a] == offsets[b] && a > b));
        }
    }
}
