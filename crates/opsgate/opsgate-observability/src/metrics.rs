//! Fire-and-forget metric writes and the trailing-window summary.

use std::collections::BTreeMap;

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use opsgate_core::constants::collections;
use opsgate_core::errors::{OpsgateError, OpsgateResult};
use opsgate_core::models::{AggregateRequest, Metric, MetricStat, MetricsSummary, Visibility};
use opsgate_core::traits::IDocumentStore;

use crate::side_effect::EffectOutcome;

/// Which metrics of a batch were stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsReport {
    pub written: Vec<String>,
    pub dropped: usize,
}

pub struct MetricsRecorder<'a> {
    store: &'a dyn IDocumentStore,
}

impl<'a> MetricsRecorder<'a> {
    pub fn new(store: &'a dyn IDocumentStore) -> Self {
        Self { store }
    }

    pub fn record(&self, metric: &Metric) -> EffectOutcome {
        let result = serde_json::to_value(metric)
            .map_err(OpsgateError::from)
            .and_then(|body| {
                self.store
                    .write(collections::OPS_METRICS, None, &body, Visibility::Default)
            });
        EffectOutcome::capture(&format!("metric:{}", metric.metric_name), result)
    }

    pub fn record_all(&self, metrics: &[Metric]) -> MetricsReport {
        let mut report = MetricsReport::default();
        for metric in metrics {
            match self.record(metric) {
                EffectOutcome::Applied => report.written.push(metric.metric_name.clone()),
                EffectOutcome::Dropped { .. } => report.dropped += 1,
            }
        }
        report
    }

    /// Totals, averages and counts per metric name, plus value totals per
    /// category, over the trailing `days`.
    pub fn summary(&self, days: i64) -> OpsgateResult<MetricsSummary> {
        let since = Utc::now() - Duration::days(days);
        // Metrics are written with default visibility; a summary reads all of them.
        self.store.refresh(collections::OPS_METRICS)?;

        let grouped = |field: &str| AggregateRequest {
            collection: collections::OPS_METRICS.to_string(),
            time_field: "timestamp".to_string(),
            since,
            filters: Vec::new(),
            group_by: vec![field.to_string()],
            min_count: 1,
            sum_field: Some("value".to_string()),
        };

        let mut metrics = BTreeMap::new();
        for bucket in self.store.aggregate(&grouped("metric_name"))? {
            let Some(name) = bucket.key_str(0) else {
                continue;
            };
            let total = bucket.sum.unwrap_or(0.0);
            let avg = if bucket.count > 0 {
                total / bucket.count as f64
            } else {
                0.0
            };
            metrics.insert(
                name.to_string(),
                MetricStat {
                    total,
                    avg,
                    count: bucket.count,
                },
            );
        }

        let mut categories = BTreeMap::new();
        for bucket in self.store.aggregate(&grouped("category"))? {
            if let Some(Value::String(category)) = bucket.keys.first() {
                categories.insert(category.clone(), bucket.sum.unwrap_or(0.0));
            }
        }

        Ok(MetricsSummary {
            days,
            since,
            metrics,
            categories,
        })
    }
}
