use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::citation::Citation;
use super::classification::{Classification, ConfidenceTier};

/// Write-path action a workflow ended with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionTaken {
    IncidentCreated,
    DuplicatePrevented,
    TaggedDuplicate,
    TicketTriaged,
    FlaggedForReview,
    TicketCreated,
    TicketUpdated,
    Withheld,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeEntities {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incident_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticket_id: Option<String>,
}

/// Result returned to the caller of a workflow trigger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowOutcome {
    pub ok: bool,
    pub run_id: String,
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommended_action: Option<String>,
    #[serde(default)]
    pub entities: OutcomeEntities,
    #[serde(default)]
    pub citations: Vec<Citation>,
    pub confidence: ConfidenceTier,
    #[serde(default)]
    pub duplicate_prevented: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<ActionTaken>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<Classification>,
    #[serde(default)]
    pub metrics: BTreeMap<String, f64>,
}

impl WorkflowOutcome {
    /// Successful outcome with no entities and low confidence.
    pub fn new(run_id: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            ok: true,
            run_id: run_id.into(),
            summary: summary.into(),
            recommended_action: None,
            entities: OutcomeEntities::default(),
            citations: Vec::new(),
            confidence: ConfidenceTier::Low,
            duplicate_prevented: false,
            action: None,
            classification: None,
            metrics: BTreeMap::new(),
        }
    }
}
