use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single operational metric point in `ops-metrics`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub metric_type: String,
    pub metric_name: String,
    pub value: f64,
    pub unit: String,
    pub category: String,
    #[serde(default)]
    pub ref_id: Option<String>,
    #[serde(default)]
    pub ref_type: Option<String>,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Metric {
    pub fn new(
        metric_type: impl Into<String>,
        metric_name: impl Into<String>,
        value: f64,
        category: impl Into<String>,
    ) -> Self {
        let metric_name = metric_name.into();
        Self {
            metric_type: metric_type.into(),
            unit: unit_for(&metric_name).to_string(),
            metric_name,
            value,
            category: category.into(),
            ref_id: None,
            ref_type: None,
            timestamp: Utc::now(),
            tags: Vec::new(),
        }
    }

    pub fn with_ref(mut self, ref_id: impl Into<String>, ref_type: impl Into<String>) -> Self {
        self.ref_id = Some(ref_id.into());
        self.ref_type = Some(ref_type.into());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

/// Unit derived from the metric name.
pub fn unit_for(metric_name: &str) -> &'static str {
    if metric_name.contains("seconds") {
        "seconds"
    } else if metric_name.contains("minutes") {
        "minutes"
    } else {
        "count"
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricStat {
    pub total: f64,
    pub avg: f64,
    pub count: u64,
}

/// Rollup of metrics over a trailing window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub days: i64,
    pub since: DateTime<Utc>,
    pub metrics: BTreeMap<String, MetricStat>,
    pub categories: BTreeMap<String, f64>,
}

impl MetricsSummary {
    pub fn total(&self, metric_name: &str) -> f64 {
        self.metrics.get(metric_name).map(|s| s.total).unwrap_or(0.0)
    }
}
