//! Create or partially update a ticket. Always requires enough citations.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use opsgate_core::constants::{collections, tags};
use opsgate_core::errors::{OpsgateError, OpsgateResult};
use opsgate_core::models::{
    ActionTaken, Category, Citation, CitationSet, Classification, Metric, Priority, Severity,
    Ticket, TicketPatch, TicketStatus, Visibility,
};
use opsgate_observability::MetricsRecorder;

use crate::workflows::WorkflowContext;

/// With `id` the request updates that ticket; otherwise it creates one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TicketToolRequest {
    pub id: Option<String>,
    pub ticket_id: Option<String>,
    pub subject: Option<String>,
    pub description: Option<String>,
    pub category: Option<Category>,
    pub severity: Option<Severity>,
    pub priority: Option<Priority>,
    pub status: Option<TicketStatus>,
    pub channel: Option<String>,
    pub customer_id: Option<String>,
    pub assigned_to: Option<String>,
    pub customer_message: Option<String>,
    pub internal_notes: Option<String>,
    pub incident_ref: Option<String>,
    pub tags: Option<Vec<String>>,
    pub citations: Vec<Citation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketToolResponse {
    pub action: ActionTaken,
    /// Document id written.
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticket_id: Option<String>,
}

pub fn apply(ctx: &WorkflowContext<'_>, request: TicketToolRequest) -> OpsgateResult<TicketToolResponse> {
    let citations: CitationSet = request.citations.iter().cloned().collect();
    let required = ctx.config.triage.min_citations;
    if citations.len() < required {
        return Err(OpsgateError::EvidenceRequired {
            provided: citations.len(),
            required,
        });
    }

    let text = format!(
        "{} {}",
        request.subject.as_deref().unwrap_or_default(),
        request.description.as_deref().unwrap_or_default()
    );
    let text = text.trim();
    let embedding = if text.is_empty() {
        None
    } else {
        Some(ctx.embedder.embed(text)?)
    };

    let metric_category = request
        .category
        .map(|c| c.as_str().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let response = match request.id.clone() {
        Some(id) => update(ctx, id, request, embedding)?,
        None => create(ctx, request, embedding)?,
    };

    let metric_name = match response.action {
        ActionTaken::TicketUpdated => "ticket_updated",
        _ => "ticket_created",
    };
    let metric = Metric::new("operations", metric_name, 1.0, metric_category)
        .with_ref(response.id.clone(), "ticket")
        .with_tags([tags::AUTOMATED]);
    MetricsRecorder::new(ctx.store).record(&metric);

    info!(id = %response.id, action = ?response.action, citations = citations.len(), "ticket tool applied");
    Ok(response)
}

fn update(
    ctx: &WorkflowContext<'_>,
    id: String,
    request: TicketToolRequest,
    embedding: Option<Vec<f32>>,
) -> OpsgateResult<TicketToolResponse> {
    let now = Utc::now();
    let resolved_at = request.status.filter(TicketStatus::is_terminal).map(|_| now);
    let patch = TicketPatch {
        subject: request.subject,
        description: request.description,
        category: request.category,
        severity: request.severity,
        priority: request.priority,
        status: request.status,
        channel: request.channel,
        customer_id: request.customer_id,
        assigned_to: request.assigned_to,
        customer_message: request.customer_message,
        internal_notes: request.internal_notes,
        incident_ref: request.incident_ref,
        tags: request.tags,
        embedding,
        updated_at: Some(now),
        resolved_at,
    };
    ctx.store.update(
        collections::TICKETS,
        &id,
        &serde_json::to_value(&patch)?,
        Visibility::Immediate,
    )?;
    Ok(TicketToolResponse {
        action: ActionTaken::TicketUpdated,
        id,
        ticket_id: None,
    })
}

fn create(
    ctx: &WorkflowContext<'_>,
    request: TicketToolRequest,
    embedding: Option<Vec<f32>>,
) -> OpsgateResult<TicketToolResponse> {
    let defaults = Classification::default();
    let ticket_id = request
        .ticket_id
        .unwrap_or_else(|| format!("TKT-{}", Utc::now().timestamp_millis()));
    let mut ticket = Ticket::new(
        ticket_id.clone(),
        request.subject.unwrap_or_else(|| "Untitled Ticket".to_string()),
        request.description.unwrap_or_default(),
    );
    ticket.category = Some(request.category.unwrap_or(defaults.category));
    ticket.severity = Some(request.severity.unwrap_or(defaults.severity));
    ticket.priority = Some(request.priority.unwrap_or(defaults.priority));
    ticket.status = request.status.unwrap_or_default();
    if ticket.status.is_terminal() {
        ticket.resolved_at = Some(ticket.updated_at);
    }
    if let Some(channel) = request.channel {
        ticket.channel = channel;
    }
    if let Some(customer) = request.customer_id {
        ticket.customer_id = customer;
    }
    ticket.assigned_to = request.assigned_to;
    ticket.customer_message = request.customer_message;
    ticket.internal_notes = request.internal_notes;
    ticket.incident_ref = request.incident_ref;
    ticket.tags = request.tags.unwrap_or_default();
    ticket.embedding = embedding;

    let id = ctx.store.write(
        collections::TICKETS,
        Some(&ticket_id),
        &serde_json::to_value(&ticket)?,
        Visibility::Immediate,
    )?;
    Ok(TicketToolResponse {
        action: ActionTaken::TicketCreated,
        id,
        ticket_id: Some(ticket_id),
    })
}
