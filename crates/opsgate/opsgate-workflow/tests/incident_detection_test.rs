use chrono::{Duration, Utc};

use opsgate_core::config::OpsgateConfig;
use opsgate_core::constants::{collections, tags, workflows};
use opsgate_core::models::{
    ActionTaken, Category, Incident, IncidentSeverity, Priority, RunStatus, SearchQuery,
    SearchRequest, StepName, Ticket,
};
use opsgate_workflow::WorkflowEngine;
use test_fixtures::{resolutions, seed_error_logs, seed_resolutions};

fn engine_with(config: OpsgateConfig) -> WorkflowEngine {
    WorkflowEngine::open_in_memory(config).unwrap()
}

fn engine() -> WorkflowEngine {
    engine_with(OpsgateConfig::default())
}

fn count(engine: &WorkflowEngine, collection: &str) -> usize {
    let request = SearchRequest::new(collection, SearchQuery::MatchAll, 100);
    engine.store().search(&request).unwrap().hits.len()
}

#[test]
fn spike_creates_incident_and_ticket() {
    let engine = engine();
    let now = Utc::now();
    seed_resolutions(engine.store(), engine.embedder(), &resolutions()).unwrap();
    seed_error_logs(engine.store(), "auth-service", "production", 45, now).unwrap();

    let outcome = engine.detect_incidents_at(now).unwrap();
    assert!(outcome.ok);
    assert_eq!(outcome.action, Some(ActionTaken::IncidentCreated));
    assert!(!outcome.duplicate_prevented);
    assert_eq!(outcome.metrics.get("error_count"), Some(&45.0));
    assert_eq!(outcome.metrics.get("mtta_seconds"), Some(&30.0));

    let incident_id = outcome.entities.incident_id.clone().unwrap();
    assert_eq!(incident_id, format!("INC-{}", now.timestamp_millis()));
    let doc = engine.store().get(collections::INCIDENTS, &incident_id).unwrap().unwrap();
    let incident: Incident = serde_json::from_value(doc.source).unwrap();
    assert_eq!(incident.severity, IncidentSeverity::High);
    assert_eq!(incident.error_count, 45);
    assert!(incident.tags.contains(&tags::AUTO_DETECTED.to_string()));
    assert_eq!(
        incident.summary,
        "High error rate detected: 45 errors in auth-service (production)"
    );

    let ticket_id = outcome.entities.ticket_id.clone().unwrap();
    let doc = engine.store().get(collections::TICKETS, &ticket_id).unwrap().unwrap();
    let ticket: Ticket = serde_json::from_value(doc.source).unwrap();
    assert_eq!(ticket.subject, "Incident: Error spike in auth-service");
    assert_eq!(ticket.category, Some(Category::Incident));
    assert_eq!(ticket.priority, Some(Priority::P2));
    assert_eq!(ticket.incident_ref.as_deref(), Some(incident_id.as_str()));

    // Incident, three sampled logs and the matching resolution.
    let sources: Vec<&str> = outcome.citations.iter().map(|c| c.index.as_str()).collect();
    assert_eq!(sources[0], collections::INCIDENTS);
    assert_eq!(sources.iter().filter(|s| **s == collections::LOGS).count(), 3);
    assert!(outcome
        .citations
        .iter()
        .any(|c| c.id == "res-auth-rollback"));
}

#[test]
fn second_run_reuses_the_open_incident() {
    let engine = engine();
    let now = Utc::now();
    seed_error_logs(engine.store(), "auth-service", "production", 45, now).unwrap();

    let first = engine.detect_incidents_at(now).unwrap();
    let second = engine.detect_incidents_at(now + Duration::seconds(1)).unwrap();

    assert_eq!(second.action, Some(ActionTaken::DuplicatePrevented));
    assert!(second.duplicate_prevented);
    assert_eq!(second.entities.incident_id, first.entities.incident_id);
    assert!(second.entities.ticket_id.is_none());
    assert_eq!(count(&engine, collections::INCIDENTS), 1);

    let run = engine.run(&second.run_id).unwrap();
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(
        run.step_names(),
        vec![StepName::DetectSpike, StepName::CheckExisting]
    );
    assert_eq!(run.ref_id, first.entities.incident_id);
}

#[test]
fn covered_top_spike_moves_on_to_next_service() {
    let engine = engine();
    let now = Utc::now();
    seed_error_logs(engine.store(), "auth-service", "production", 60, now).unwrap();
    seed_error_logs(engine.store(), "payment-service", "production", 45, now).unwrap();

    let first = engine.detect_incidents_at(now).unwrap();
    assert_eq!(first.action, Some(ActionTaken::IncidentCreated));
    assert_eq!(first.metrics.get("error_count"), Some(&60.0));

    let second = engine.detect_incidents_at(now + Duration::seconds(30)).unwrap();
    assert_eq!(second.action, Some(ActionTaken::IncidentCreated));
    assert_ne!(second.entities.incident_id, first.entities.incident_id);
    let doc = engine
        .store()
        .get(collections::INCIDENTS, second.entities.incident_id.as_deref().unwrap())
        .unwrap()
        .unwrap();
    let incident: Incident = serde_json::from_value(doc.source).unwrap();
    assert_eq!(incident.service, "payment-service");
    assert_eq!(count(&engine, collections::INCIDENTS), 2);

    // Both services covered: the top one is reported.
    let third = engine.detect_incidents_at(now + Duration::seconds(60)).unwrap();
    assert_eq!(third.action, Some(ActionTaken::DuplicatePrevented));
    assert_eq!(third.entities.incident_id, first.entities.incident_id);
    assert_eq!(count(&engine, collections::INCIDENTS), 2);
}

#[test]
fn quiet_logs_produce_no_incident() {
    let engine = engine();
    let now = Utc::now();
    seed_error_logs(engine.store(), "auth-service", "production", 39, now).unwrap();

    let outcome = engine.detect_incidents_at(now).unwrap();
    assert!(outcome.ok);
    assert_eq!(outcome.summary, "No error spikes detected in the last 5 minutes");
    assert!(outcome.action.is_none());
    assert_eq!(count(&engine, collections::INCIDENTS), 0);

    let run = engine.run(&outcome.run_id).unwrap();
    assert_eq!(run.workflow, workflows::INCIDENT_DETECTION);
    assert_eq!(run.step_names(), vec![StepName::DetectSpike]);
}

#[test]
fn errors_outside_the_window_are_not_counted() {
    let engine = engine();
    let now = Utc::now();
    seed_error_logs(
        engine.store(),
        "auth-service",
        "production",
        45,
        now - Duration::minutes(10),
    )
    .unwrap();

    let outcome = engine.detect_incidents_at(now).unwrap();
    assert!(outcome.entities.incident_id.is_none());
}

#[test]
fn five_hundred_errors_is_critical() {
    let engine = engine();
    let now = Utc::now();
    seed_error_logs(engine.store(), "payments", "production", 500, now).unwrap();

    let outcome = engine.detect_incidents_at(now).unwrap();
    let incident_id = outcome.entities.incident_id.unwrap();
    let doc = engine.store().get(collections::INCIDENTS, &incident_id).unwrap().unwrap();
    let incident: Incident = serde_json::from_value(doc.source).unwrap();
    assert_eq!(incident.severity, IncidentSeverity::Critical);

    let ticket_id = outcome.entities.ticket_id.unwrap();
    let doc = engine.store().get(collections::TICKETS, &ticket_id).unwrap().unwrap();
    let ticket: Ticket = serde_json::from_value(doc.source).unwrap();
    assert_eq!(ticket.priority, Some(Priority::P1));
}

#[test]
fn spike_without_enough_log_evidence_is_withheld() {
    let mut config = OpsgateConfig::default();
    config.detection.spike_threshold = 1;
    let engine = engine_with(config);
    let now = Utc::now();
    seed_error_logs(engine.store(), "search", "staging", 1, now).unwrap();

    let outcome = engine.detect_incidents_at(now).unwrap();
    assert!(!outcome.ok);
    assert_eq!(outcome.action, Some(ActionTaken::Withheld));
    assert_eq!(outcome.citations.len(), 1);
    assert_eq!(count(&engine, collections::INCIDENTS), 0);

    let run = engine.run(&outcome.run_id).unwrap();
    assert_eq!(run.status, RunStatus::Completed);
    assert!(run.step(StepName::CreateIncident).unwrap().is_complete());
}
