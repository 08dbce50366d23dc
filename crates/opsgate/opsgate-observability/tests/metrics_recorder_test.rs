//! Metric writes and the trailing-window summary.

use chrono::{Duration, Utc};
use serde_json::Value;

use opsgate_core::errors::StorageError;
use opsgate_core::models::{
    AggregateBucket, AggregateRequest, Metric, SearchRequest, SearchResponse, StoredDocument,
    Visibility,
};
use opsgate_core::traits::IDocumentStore;
use opsgate_core::OpsgateResult;
use opsgate_observability::{EffectOutcome, MetricsRecorder};
use opsgate_storage::StorageEngine;

/// Store whose every call fails as if the backend were unreachable.
struct OfflineStore;

impl IDocumentStore for OfflineStore {
    fn write(&self, _: &str, _: Option<&str>, _: &Value, _: Visibility) -> OpsgateResult<String> {
        Err(StorageError::Busy { timeout_ms: 5000 }.into())
    }
    fn update(&self, _: &str, _: &str, _: &Value, _: Visibility) -> OpsgateResult<()> {
        Err(StorageError::Busy { timeout_ms: 5000 }.into())
    }
    fn get(&self, _: &str, _: &str) -> OpsgateResult<Option<StoredDocument>> {
        Err(StorageError::Busy { timeout_ms: 5000 }.into())
    }
    fn search(&self, _: &SearchRequest) -> OpsgateResult<SearchResponse> {
        Err(StorageError::Busy { timeout_ms: 5000 }.into())
    }
    fn aggregate(&self, _: &AggregateRequest) -> OpsgateResult<Vec<AggregateBucket>> {
        Err(StorageError::Busy { timeout_ms: 5000 }.into())
    }
    fn refresh(&self, _: &str) -> OpsgateResult<()> {
        Err(StorageError::Busy { timeout_ms: 5000 }.into())
    }
}

#[test]
fn failed_write_is_dropped_not_raised() {
    let recorder = MetricsRecorder::new(&OfflineStore);
    let metric = Metric::new("efficiency", "tickets_auto_triaged", 1.0, "billing");
    assert!(matches!(recorder.record(&metric), EffectOutcome::Dropped { .. }));

    let report = recorder.record_all(&[metric.clone(), metric]);
    assert!(report.written.is_empty());
    assert_eq!(report.dropped, 2);
}

#[test]
fn summary_rolls_up_by_name_and_category() {
    let store = StorageEngine::open_in_memory().unwrap();
    let recorder = MetricsRecorder::new(&store);

    let report = recorder.record_all(&[
        Metric::new("efficiency", "duplicates_prevented", 1.0, "billing"),
        Metric::new("efficiency", "time_saved_minutes", 15.0, "billing"),
        Metric::new("efficiency", "time_saved_minutes", 15.0, "authentication"),
        Metric::new("performance", "mtta_seconds", 30.0, "incident"),
    ]);
    assert_eq!(report.written.len(), 4);

    let summary = recorder.summary(7).unwrap();
    assert_eq!(summary.total("time_saved_minutes"), 30.0);
    assert_eq!(summary.metrics["time_saved_minutes"].count, 2);
    assert_eq!(summary.metrics["time_saved_minutes"].avg, 15.0);
    assert_eq!(summary.total("mtta_seconds"), 30.0);
    assert_eq!(summary.categories["billing"], 16.0);
    assert_eq!(summary.categories["incident"], 30.0);
}

#[test]
fn summary_ignores_metrics_outside_window() {
    let store = StorageEngine::open_in_memory().unwrap();
    let recorder = MetricsRecorder::new(&store);

    let mut old = Metric::new("efficiency", "tickets_auto_triaged", 1.0, "data");
    old.timestamp = Utc::now() - Duration::days(10);
    recorder.record(&old);
    recorder.record(&Metric::new("efficiency", "tickets_auto_triaged", 1.0, "data"));

    let summary = recorder.summary(7).unwrap();
    assert_eq!(summary.metrics["tickets_auto_triaged"].count, 1);
}

#[test]
fn unit_follows_metric_name() {
    assert_eq!(Metric::new("performance", "mtta_seconds", 30.0, "incident").unit, "seconds");
    assert_eq!(Metric::new("efficiency", "time_saved_minutes", 15.0, "x").unit, "minutes");
    assert_eq!(Metric::new("efficiency", "duplicates_prevented", 1.0, "x").unit, "count");
}
