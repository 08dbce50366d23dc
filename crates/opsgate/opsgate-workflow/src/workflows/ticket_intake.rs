//! Evidence-gated ticket creation: Embed → Classify → GatherEvidence →
//! CreateTicket → WriteMetrics. Nothing is written unless the gate passes.

use chrono::Utc;

use opsgate_core::constants::{collections, tags, workflows};
use opsgate_core::errors::{OpsgateResult, WorkflowError};
use opsgate_core::models::{
    ActionTaken, Citation, CitationSet, Metric, StepDetail, StepName, Ticket, Visibility,
    WorkflowOutcome,
};
use opsgate_observability::tracing_setup::events;
use opsgate_observability::workflow_span;
use opsgate_retrieval::{search_templates, HybridSearcher};

use super::{conclude, kb_citation, kb_fields, write_metrics, WorkflowContext};
use crate::classification::classify;
use crate::timeline::RunTimeline;

const REF_TYPE: &str = "ticket";
const CHANNEL: &str = "copilot-ui";

/// Evidence fetched per source.
const EVIDENCE_PER_SOURCE: usize = 2;

pub fn run(
    ctx: &WorkflowContext<'_>,
    subject: &str,
    description: &str,
) -> OpsgateResult<WorkflowOutcome> {
    if subject.trim().is_empty() || description.trim().is_empty() {
        return Err(WorkflowError::InvalidInput {
            reason: "subject and description are required".to_string(),
        }
        .into());
    }
    let mut timeline = RunTimeline::new(workflows::TICKET_INTAKE, REF_TYPE);
    let span = workflow_span!(workflows::TICKET_INTAKE, timeline.run_id());
    let _guard = span.enter();

    let result = pipeline(ctx, &mut timeline, subject, description);
    conclude(ctx, timeline, result)
}

fn pipeline(
    ctx: &WorkflowContext<'_>,
    timeline: &mut RunTimeline,
    subject: &str,
    description: &str,
) -> OpsgateResult<WorkflowOutcome> {
    let cfg = ctx.config;
    let text = format!("{subject} {description}");

    let embedding = timeline.step(StepName::Embed, || {
        let v = ctx.embedder.embed(&text)?;
        let dimensions = v.len();
        Ok((v, StepDetail::Embed { dimensions }))
    })?;

    let classification = timeline.step(StepName::Classify, || {
        let c = classify(subject, description, None);
        Ok((c, StepDetail::Classify { classification: c }))
    })?;

    let citations = timeline.step(StepName::GatherEvidence, || {
        let searcher = HybridSearcher::new(ctx.store, ctx.embedder, cfg.retrieval.clone());
        let kb = searcher
            .search(
                collections::KB_ARTICLES,
                &text,
                &embedding,
                &kb_fields(),
                EVIDENCE_PER_SOURCE,
                &[],
                cfg.retrieval.knn_num_candidates,
            )?
            .hits;
        let similar_request = search_templates::ticket_dedupe(
            &embedding,
            None,
            None,
            EVIDENCE_PER_SOURCE,
            cfg.retrieval.knn_num_candidates,
            cfg.retrieval.highlight_fragment_size,
        );
        let similar = ctx.store.search(&similar_request)?.hits;

        let mut citations = CitationSet::new();
        citations.extend(kb.iter().map(|h| kb_citation(collections::KB_ARTICLES, h)));
        citations.extend(similar.iter().map(|h| {
            Citation::new(collections::TICKETS, h.id.clone())
                .with_highlight(h.source_str("subject").map(str::to_string))
        }));
        let detail = StepDetail::GatherEvidence {
            kb_found: kb.len(),
            tickets_found: similar.len(),
        };
        Ok((citations, detail))
    })?;

    let decision = ctx.gate().evaluate(&citations);
    let created = timeline.step(StepName::CreateTicket, || {
        if !decision.permitted {
            events::evidence_withheld("ticket_create", decision.citation_count, decision.required);
            return Ok((
                None,
                StepDetail::CreateTicket {
                    ticket_id: None,
                    gate: decision.clone(),
                },
            ));
        }
        let mut ticket = Ticket::new(
            format!("TKT-{}", Utc::now().timestamp_millis()),
            subject,
            description,
        );
        ticket.category = Some(classification.category);
        ticket.severity = Some(classification.severity);
        ticket.priority = Some(classification.priority);
        ticket.channel = CHANNEL.to_string();
        ticket.tags = vec![
            tags::COPILOT_CREATED.to_string(),
            tags::EVIDENCE_GATED.to_string(),
        ];
        ticket.embedding = Some(embedding.clone());
        let id = ctx.store.write(
            collections::TICKETS,
            Some(&ticket.ticket_id),
            &serde_json::to_value(&ticket)?,
            Visibility::Immediate,
        )?;
        Ok((
            Some(id.clone()),
            StepDetail::CreateTicket {
                ticket_id: Some(id),
                gate: decision.clone(),
            },
        ))
    })?;

    let citation_count = citations.len();
    let Some(ticket_id) = created else {
        let mut outcome = WorkflowOutcome::new(
            timeline.run_id(),
            "Insufficient evidence to create ticket",
        );
        outcome.ok = false;
        outcome.recommended_action = Some(format!(
            "Manual review required - less than {} citations found",
            decision.required
        ));
        outcome.citations = citations.into_vec();
        outcome.confidence = decision.confidence;
        outcome.action = Some(ActionTaken::Withheld);
        outcome.classification = Some(classification);
        outcome
            .metrics
            .insert("citations_count".to_string(), citation_count as f64);
        return Ok(outcome);
    };
    timeline.set_ref(ticket_id.clone());

    let metric = Metric::new(
        "operations",
        "ticket_created_via_copilot",
        1.0,
        classification.category.as_str(),
    )
    .with_ref(ticket_id.clone(), REF_TYPE)
    .with_tags(["copilot", tags::EVIDENCE_GATED]);
    write_metrics(ctx, timeline, std::slice::from_ref(&metric))?;

    let mut outcome = WorkflowOutcome::new(
        timeline.run_id(),
        format!("Created ticket {ticket_id} with {citation_count} citations"),
    );
    outcome.recommended_action =
        Some("Ticket created successfully with sufficient evidence".to_string());
    outcome.entities.ticket_id = Some(ticket_id);
    outcome.citations = citations.into_vec();
    outcome.confidence = decision.confidence;
    outcome.action = Some(ActionTaken::TicketCreated);
    outcome.classification = Some(classification);
    outcome
        .metrics
        .insert("citations_count".to_string(), citation_count as f64);
    outcome.metrics.insert(metric.metric_name.clone(), metric.value);
    Ok(outcome)
}
