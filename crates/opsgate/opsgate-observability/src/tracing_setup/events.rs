//! Structured log events for workflow decisions.
//!
//! Each function emits a `tracing` event with an `event` field naming it.

pub fn spike_detected(service: &str, environment: &str, error_count: u64) {
    tracing::warn!(
        event = "spike_detected",
        service = %service,
        env = %environment,
        error_count = error_count,
        "error spike detected"
    );
}

pub fn incident_created(incident_id: &str, service: &str, severity: &str) {
    tracing::info!(
        event = "incident_created",
        incident_id = %incident_id,
        service = %service,
        severity = %severity,
        "incident created"
    );
}

/// An incident or ticket was suppressed because an equivalent one exists.
pub fn duplicate_prevented(kind: &str, existing_id: &str) {
    tracing::info!(
        event = "duplicate_prevented",
        kind = %kind,
        existing_id = %existing_id,
        "duplicate prevented"
    );
}

/// The citation gate blocked a write.
pub fn evidence_withheld(action: &str, citation_count: usize, required: usize) {
    tracing::warn!(
        event = "evidence_withheld",
        action = %action,
        citation_count = citation_count,
        required = required,
        "low confidence, action withheld"
    );
}

pub fn ticket_triaged(ticket_id: &str, action: &str, confidence: &str) {
    tracing::info!(
        event = "ticket_triaged",
        ticket_id = %ticket_id,
        action = %action,
        confidence = %confidence,
        "ticket triaged"
    );
}

pub fn run_failed(workflow: &str, run_id: &str, reason: &str) {
    tracing::error!(
        event = "run_failed",
        workflow = %workflow,
        run_id = %run_id,
        reason = %reason,
        "workflow run failed"
    );
}

/// A best-effort write failed and was swallowed.
pub fn side_effect_dropped(effect: &str, reason: &str) {
    tracing::warn!(
        event = "side_effect_dropped",
        effect = %effect,
        reason = %reason,
        "side effect dropped"
    );
}
