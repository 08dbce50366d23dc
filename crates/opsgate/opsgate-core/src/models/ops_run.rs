//! Audit record of a single workflow execution.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::citation::{Citation, GateDecision};
use super::classification::{Classification, ConfidenceTier};
use super::log_event::Spike;
use super::outcome::ActionTaken;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Completed,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepName {
    DetectSpike,
    CheckExisting,
    CreateIncident,
    RetrieveResolutions,
    CreateTicket,
    WriteMetrics,
    FetchTicket,
    Embed,
    Classify,
    Dedupe,
    RetrieveKb,
    GatherEvidence,
    Draft,
    Act,
}

impl StepName {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DetectSpike => "detect_spike",
            Self::CheckExisting => "check_existing",
            Self::CreateIncident => "create_incident",
            Self::RetrieveResolutions => "retrieve_resolutions",
            Self::CreateTicket => "create_ticket",
            Self::WriteMetrics => "write_metrics",
            Self::FetchTicket => "fetch_ticket",
            Self::Embed => "embed",
            Self::Classify => "classify",
            Self::Dedupe => "dedupe",
            Self::RetrieveKb => "retrieve_kb",
            Self::GatherEvidence => "gather_evidence",
            Self::Draft => "draft",
            Self::Act => "act",
        }
    }
}

/// A document reference with its retrieval score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedRef {
    pub id: String,
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Step-specific fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StepDetail {
    DetectSpike {
        spikes_found: usize,
        spikes: Vec<Spike>,
    },
    CheckExisting {
        duplicate_of: Option<String>,
    },
    CreateIncident {
        incident_id: Option<String>,
        gate: GateDecision,
    },
    RetrieveResolutions {
        resolutions_found: usize,
        top_resolutions: Vec<RankedRef>,
    },
    CreateTicket {
        ticket_id: Option<String>,
        gate: GateDecision,
    },
    WriteMetrics {
        metrics_written: Vec<String>,
        metrics_dropped: usize,
    },
    FetchTicket {
        ticket_id: String,
    },
    Embed {
        dimensions: usize,
    },
    Classify {
        classification: Classification,
    },
    Dedupe {
        is_duplicate: bool,
        top_score: Option<f64>,
        similar_tickets: Vec<RankedRef>,
    },
    RetrieveKb {
        articles_found: usize,
        top_articles: Vec<RankedRef>,
    },
    GatherEvidence {
        kb_found: usize,
        tickets_found: usize,
    },
    Draft {
        citations: Vec<Citation>,
        confidence: ConfidenceTier,
        customer_message: String,
        internal_notes: String,
    },
    Act {
        action: ActionTaken,
        ticket_id: Option<String>,
        gate: Option<GateDecision>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    pub name: StepName,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<StepDetail>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StepRecord {
    pub fn is_complete(&self) -> bool {
        self.completed_at.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpsRun {
    pub run_id: String,
    pub workflow: String,
    #[serde(default)]
    pub ref_id: Option<String>,
    #[serde(default)]
    pub ref_type: Option<String>,
    pub status: RunStatus,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub duration_ms: i64,
    #[serde(with = "steps_map")]
    pub steps: Vec<StepRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl OpsRun {
    /// `run_{epoch_ms}_{8 hex}`. Sortable by start time, unique across processes.
    pub fn new_run_id(started_at: DateTime<Utc>) -> String {
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        format!("run_{}_{}", started_at.timestamp_millis(), &suffix[..8])
    }

    pub fn step(&self, name: StepName) -> Option<&StepRecord> {
        self.steps.iter().find(|s| s.name == name)
    }

    pub fn step_names(&self) -> Vec<StepName> {
        self.steps.iter().map(|s| s.name).collect()
    }
}

/// Steps are stored as a JSON object keyed by step name, in execution order.
mod steps_map {
    use std::fmt;

    use serde::de::{MapAccess, Visitor};
    use serde::ser::SerializeMap;
    use serde::{Deserializer, Serializer};

    use super::StepRecord;

    pub fn serialize<S: Serializer>(steps: &[StepRecord], serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(steps.len()))?;
        for step in steps {
            map.serialize_entry(step.name.as_str(), step)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<StepRecord>, D::Error> {
        struct StepsVisitor;

        impl<'de> Visitor<'de> for StepsVisitor {
            type Value = Vec<StepRecord>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of step name to step record")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut steps = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((_, step)) = access.next_entry::<String, StepRecord>()? {
                    steps.push(step);
                }
                Ok(steps)
            }
        }

        deserializer.deserialize_map(StepsVisitor)
    }
}
