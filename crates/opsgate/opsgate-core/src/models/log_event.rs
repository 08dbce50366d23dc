use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Application log line in `logs-app`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEvent {
    #[serde(rename = "@timestamp")]
    pub timestamp: DateTime<Utc>,
    pub level: String,
    pub service: String,
    #[serde(rename = "env")]
    pub environment: String,
    #[serde(default)]
    pub message: String,
}

/// A (service, env) group whose error count crossed the spike threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spike {
    pub service: String,
    #[serde(rename = "env")]
    pub environment: String,
    pub error_count: u64,
}
