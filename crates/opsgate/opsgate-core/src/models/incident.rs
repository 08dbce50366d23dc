use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::classification::{Priority, Severity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentSeverity {
    High,
    Critical,
}

impl IncidentSeverity {
    /// Critical at or above `critical_threshold` errors, high otherwise.
    pub fn from_error_count(error_count: u64, critical_threshold: u64) -> Self {
        if error_count >= critical_threshold {
            Self::Critical
        } else {
            Self::High
        }
    }

    pub fn as_severity(&self) -> Severity {
        match self {
            Self::High => Severity::High,
            Self::Critical => Severity::Critical,
        }
    }

    /// Priority given to the ticket opened for an incident.
    pub fn ticket_priority(&self) -> Priority {
        match self {
            Self::High => Priority::P2,
            Self::Critical => Priority::P1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentStatus {
    #[default]
    Open,
    Investigating,
    Resolved,
}

impl IncidentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Investigating => "investigating",
            Self::Resolved => "resolved",
        }
    }
}

/// An incident as stored in the `incidents` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Incident {
    pub incident_id: String,
    pub title: String,
    pub summary: String,
    pub service: String,
    #[serde(rename = "env")]
    pub environment: String,
    pub severity: IncidentSeverity,
    #[serde(default)]
    pub status: IncidentStatus,
    pub detected_at: DateTime<Utc>,
    pub error_count: u64,
    #[serde(default)]
    pub error_rate: Option<f64>,
    #[serde(default)]
    pub affected_users: Option<u64>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub embedding: Vec<f32>,
}

impl Incident {
    /// Text used for the incident embedding.
    pub fn text_for_embedding(&self) -> String {
        format!("{} {}", self.title, self.summary)
    }
}
