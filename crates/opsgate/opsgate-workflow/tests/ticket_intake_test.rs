use opsgate_core::config::OpsgateConfig;
use opsgate_core::constants::{collections, tags, workflows};
use opsgate_core::errors::{OpsgateError, WorkflowError};
use opsgate_core::models::{
    ActionTaken, Category, ConfidenceTier, SearchQuery, SearchRequest, StepName, Ticket,
};
use opsgate_workflow::WorkflowEngine;
use test_fixtures::{kb_articles, seed_kb};

fn engine() -> WorkflowEngine {
    WorkflowEngine::open_in_memory(OpsgateConfig::default()).unwrap()
}

fn ticket_count(engine: &WorkflowEngine) -> usize {
    let request = SearchRequest::new(collections::TICKETS, SearchQuery::MatchAll, 100);
    engine.store().search(&request).unwrap().hits.len()
}

#[test]
fn cited_request_creates_a_ticket() {
    let engine = engine();
    seed_kb(engine.store(), engine.embedder(), &kb_articles()).unwrap();

    let outcome = engine
        .create_ticket("Login broken", "SSO login fails for the whole team")
        .unwrap();
    assert!(outcome.ok);
    assert_eq!(outcome.action, Some(ActionTaken::TicketCreated));
    assert_eq!(outcome.confidence, ConfidenceTier::High);
    assert_eq!(outcome.metrics.get("citations_count"), Some(&2.0));
    assert_eq!(outcome.metrics.get("ticket_created_via_copilot"), Some(&1.0));

    let ticket_id = outcome.entities.ticket_id.unwrap();
    assert!(ticket_id.starts_with("TKT-"));
    let doc = engine.store().get(collections::TICKETS, &ticket_id).unwrap().unwrap();
    let ticket: Ticket = serde_json::from_value(doc.source).unwrap();
    assert_eq!(ticket.channel, "copilot-ui");
    assert_eq!(ticket.customer_id, "SYSTEM");
    assert_eq!(ticket.category, Some(Category::Authentication));
    assert_eq!(
        ticket.tags,
        vec![tags::COPILOT_CREATED.to_string(), tags::EVIDENCE_GATED.to_string()]
    );

    let run = engine.timeline(&ticket_id).unwrap();
    assert_eq!(run.workflow, workflows::TICKET_INTAKE);
    assert_eq!(
        run.step_names(),
        vec![
            StepName::Embed,
            StepName::Classify,
            StepName::GatherEvidence,
            StepName::CreateTicket,
            StepName::WriteMetrics,
        ]
    );
}

#[test]
fn uncited_request_is_withheld() {
    let engine = engine();

    let outcome = engine
        .create_ticket("Login broken", "SSO login fails for the whole team")
        .unwrap();
    assert!(!outcome.ok);
    assert_eq!(outcome.summary, "Insufficient evidence to create ticket");
    assert_eq!(outcome.action, Some(ActionTaken::Withheld));
    assert_eq!(outcome.confidence, ConfidenceTier::Low);
    assert_eq!(
        outcome.recommended_action.as_deref(),
        Some("Manual review required - less than 2 citations found")
    );
    assert!(outcome.entities.ticket_id.is_none());
    assert_eq!(ticket_count(&engine), 0);

    // The withheld attempt is still audited.
    let run = engine.run(&outcome.run_id).unwrap();
    assert!(run.step(StepName::WriteMetrics).is_none());
    assert!(run.step(StepName::CreateTicket).unwrap().is_complete());
}

#[test]
fn blank_input_is_rejected_before_any_run() {
    let engine = engine();
    let err = engine.create_ticket("   ", "details").unwrap_err();
    assert!(matches!(
        err,
        OpsgateError::WorkflowError(WorkflowError::InvalidInput { .. })
    ));
    assert!(err.run_id().is_none());
}
