/// opsgate system version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Collection names in the document store.
pub mod collections {
    pub const TICKETS: &str = "tickets";
    pub const INCIDENTS: &str = "incidents";
    pub const KB_ARTICLES: &str = "kb-articles";
    pub const RESOLUTIONS: &str = "resolutions";
    pub const LOGS: &str = "logs-app";
    pub const OPS_RUNS: &str = "ops-runs";
    pub const OPS_METRICS: &str = "ops-metrics";
}

/// Workflow names recorded on every OpsRun.
pub mod workflows {
    pub const INCIDENT_DETECTION: &str = "incident_detection";
    pub const TICKET_TRIAGE: &str = "ticket_triage";
    pub const TICKET_INTAKE: &str = "ticket_intake";
}

/// Tags applied by automated actions.
pub mod tags {
    pub const POTENTIAL_DUPLICATE: &str = "potential_duplicate";
    pub const NEEDS_HUMAN_REVIEW: &str = "needs_human_review";
    pub const AUTO_DETECTED: &str = "auto-detected";
    pub const AUTO_CREATED: &str = "auto-created";
    pub const AUTOMATED: &str = "automated";
    pub const COPILOT_CREATED: &str = "copilot-created";
    pub const EVIDENCE_GATED: &str = "evidence-gated";
}

/// Field holding the embedding vector on every embedded document.
pub const EMBEDDING_FIELD: &str = "embedding";

/// Log level counted by spike detection.
pub const ERROR_LEVEL: &str = "ERROR";

/// Maximum number of error-log samples cited as spike evidence.
pub const SPIKE_EVIDENCE_SAMPLES: usize = 3;
