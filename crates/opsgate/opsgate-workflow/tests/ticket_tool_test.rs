use opsgate_core::config::OpsgateConfig;
use opsgate_core::constants::collections;
use opsgate_core::errors::OpsgateError;
use opsgate_core::models::{
    ActionTaken, Category, Citation, Priority, Severity, Ticket, TicketStatus,
};
use opsgate_workflow::{TicketToolRequest, WorkflowEngine};
use test_fixtures::seed_ticket;

fn engine() -> WorkflowEngine {
    WorkflowEngine::open_in_memory(OpsgateConfig::default()).unwrap()
}

fn two_citations() -> Vec<Citation> {
    vec![
        Citation::new(collections::KB_ARTICLES, "kb-password-reset"),
        Citation::new(collections::RESOLUTIONS, "res-auth-rollback"),
    ]
}

fn stored(engine: &WorkflowEngine, id: &str) -> Ticket {
    let doc = engine.store().get(collections::TICKETS, id).unwrap().unwrap();
    serde_json::from_value(doc.source).unwrap()
}

#[test]
fn write_without_enough_citations_is_refused() {
    let engine = engine();
    let request = TicketToolRequest {
        subject: Some("Refund please".to_string()),
        citations: vec![
            Citation::new(collections::KB_ARTICLES, "kb-invoice"),
            Citation::new(collections::KB_ARTICLES, "kb-invoice"),
        ],
        ..Default::default()
    };
    let err = engine.apply_ticket_tool(request).unwrap_err();
    assert!(matches!(
        err,
        OpsgateError::EvidenceRequired {
            provided: 1,
            required: 2
        }
    ));
}

#[test]
fn create_fills_defaults() {
    let engine = engine();
    let request = TicketToolRequest {
        ticket_id: Some("TKT-77".to_string()),
        citations: two_citations(),
        ..Default::default()
    };
    let response = engine.apply_ticket_tool(request).unwrap();
    assert_eq!(response.action, ActionTaken::TicketCreated);
    assert_eq!(response.id, "TKT-77");

    let ticket = stored(&engine, "TKT-77");
    assert_eq!(ticket.subject, "Untitled Ticket");
    assert_eq!(ticket.category, Some(Category::General));
    assert_eq!(ticket.severity, Some(Severity::Medium));
    assert_eq!(ticket.priority, Some(Priority::P3));
    assert_eq!(ticket.status, TicketStatus::Open);
    assert!(ticket.resolved_at.is_none());
    assert!(ticket.embedding.is_none());
}

#[test]
fn resolving_update_stamps_resolved_at() {
    let engine = engine();
    let ticket = Ticket::new("TKT-5", "Invoice wrong", "Charged twice");
    seed_ticket(engine.store(), engine.embedder(), &ticket, false).unwrap();

    let request = TicketToolRequest {
        id: Some("TKT-5".to_string()),
        status: Some(TicketStatus::Resolved),
        internal_notes: Some("Refund issued".to_string()),
        citations: two_citations(),
        ..Default::default()
    };
    let response = engine.apply_ticket_tool(request).unwrap();
    assert_eq!(response.action, ActionTaken::TicketUpdated);

    let updated = stored(&engine, "TKT-5");
    assert_eq!(updated.status, TicketStatus::Resolved);
    assert!(updated.resolved_at.is_some());
    assert_eq!(updated.internal_notes.as_deref(), Some("Refund issued"));
    assert_eq!(updated.subject, "Invoice wrong");
}

#[test]
fn update_of_unknown_ticket_is_not_found() {
    let engine = engine();
    let request = TicketToolRequest {
        id: Some("TKT-missing".to_string()),
        status: Some(TicketStatus::InProgress),
        citations: two_citations(),
        ..Default::default()
    };
    assert!(engine.apply_ticket_tool(request).unwrap_err().is_not_found());
}

#[test]
fn request_parses_from_tool_json() {
    let request: TicketToolRequest = serde_json::from_value(serde_json::json!({
        "subject": "API errors",
        "category": "integration",
        "citations": [{"index": "kb-articles", "id": "kb-1"}]
    }))
    .unwrap();
    assert_eq!(request.category, Some(Category::Integration));
    assert_eq!(request.citations.len(), 1);
    assert!(request.id.is_none());
}
