use chrono::{Duration, Utc};
use opsgate_core::models::{AggregateRequest, Filter, Visibility};
use opsgate_core::traits::IDocumentStore;
use opsgate_storage::StorageEngine;
use serde_json::json;

fn log(store: &StorageEngine, level: &str, service: &str, env: &str, seconds_ago: i64) {
    store
        .write(
            "logs-app",
            None,
            &json!({
                "@timestamp": Utc::now() - Duration::seconds(seconds_ago),
                "level": level,
                "service": service,
                "env": env,
                "message": "boom",
                "duration_ms": 10,
            }),
            Visibility::Immediate,
        )
        .unwrap();
}

fn error_groups(min_count: u64) -> AggregateRequest {
    AggregateRequest {
        collection: "logs-app".into(),
        time_field: "@timestamp".into(),
        since: Utc::now() - Duration::seconds(300),
        filters: vec![Filter::term("level", "ERROR")],
        group_by: vec!["service".into(), "env".into()],
        min_count,
        sum_field: None,
    }
}

#[test]
fn groups_by_service_and_env_with_threshold() {
    let store = StorageEngine::open_in_memory().unwrap();
    for _ in 0..45 {
        log(&store, "ERROR", "auth-service", "production", 10);
    }
    for _ in 0..12 {
        log(&store, "ERROR", "payment-service", "production", 10);
    }
    for _ in 0..50 {
        log(&store, "INFO", "payment-service", "production", 10);
    }
    for _ in 0..60 {
        log(&store, "ERROR", "search-service", "staging", 900);
    }

    let buckets = store.aggregate(&error_groups(40)).unwrap();
    assert_eq!(buckets.len(), 1);
    assert_eq!(buckets[0].key_str(0), Some("auth-service"));
    assert_eq!(buckets[0].key_str(1), Some("production"));
    assert_eq!(buckets[0].count, 45);

    let all = store.aggregate(&error_groups(1)).unwrap();
    let counts: Vec<u64> = all.iter().map(|b| b.count).collect();
    assert_eq!(counts, vec![45, 12]);
}

#[test]
fn sum_field_totals_values() {
    let store = StorageEngine::open_in_memory().unwrap();
    for _ in 0..3 {
        log(&store, "ERROR", "api", "production", 5);
    }
    let mut req = error_groups(1);
    req.sum_field = Some("duration_ms".into());
    let buckets = store.aggregate(&req).unwrap();
    assert_eq!(buckets[0].sum, Some(30.0));
}

#[test]
fn empty_group_by_is_rejected() {
    let store = StorageEngine::open_in_memory().unwrap();
    let mut req = error_groups(1);
    req.group_by.clear();
    assert!(store.aggregate(&req).is_err());
}
