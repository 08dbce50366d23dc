//! FetchTicket → Embed → Classify → Dedupe → (RetrieveKB ∥ RetrieveResolutions)
//! → Draft → Act → WriteMetrics.

use std::collections::BTreeMap;

use chrono::Utc;
use serde_json::Value;
use tracing::info;

use opsgate_core::constants::{collections, tags, workflows};
use opsgate_core::errors::{OpsgateError, OpsgateResult};
use opsgate_core::models::{
    ActionTaken, Citation, CitationSet, Classification, GateDecision, Metric, SearchHit,
    StepDetail, StepName, Ticket, TicketPatch, Visibility, WorkflowOutcome,
};
use opsgate_observability::tracing_setup::events;
use opsgate_observability::workflow_span;
use opsgate_retrieval::{search_templates, HybridHit, HybridSearcher};

use super::{
    conclude, kb_citation, kb_fields, ranked_hits, ranked_hybrid, write_metrics, WorkflowContext,
};
use crate::classification::classify_ticket;
use crate::dedup::{find_similar_tickets, DedupSettings, TicketDedup};
use crate::drafting::{draft, Draft, DraftInput};
use crate::timeline::{timed, RunTimeline};

const REF_TYPE: &str = "ticket";

/// Triage one ticket. A missing ticket is `NotFound` and writes no OpsRun.
pub fn run(ctx: &WorkflowContext<'_>, ticket_id: &str) -> OpsgateResult<WorkflowOutcome> {
    let mut timeline = RunTimeline::new(workflows::TICKET_TRIAGE, REF_TYPE);
    timeline.set_ref(ticket_id);
    let span = workflow_span!(workflows::TICKET_TRIAGE, timeline.run_id());
    let _guard = span.enter();

    let fetched = timeline.step(StepName::FetchTicket, || {
        let ticket = fetch(ctx, ticket_id)?;
        Ok((
            ticket,
            StepDetail::FetchTicket {
                ticket_id: ticket_id.to_string(),
            },
        ))
    });
    let ticket = match fetched {
        Ok(Some(ticket)) => ticket,
        Ok(None) => return Err(OpsgateError::not_found(collections::TICKETS, ticket_id)),
        Err(e) => return Err(super::abort(ctx, timeline, e)),
    };

    let result = pipeline(ctx, &mut timeline, ticket_id, &ticket);
    conclude(ctx, timeline, result)
}

fn fetch(ctx: &WorkflowContext<'_>, ticket_id: &str) -> OpsgateResult<Option<Ticket>> {
    match ctx.store.get(collections::TICKETS, ticket_id)? {
        Some(doc) => Ok(Some(serde_json::from_value(doc.source)?)),
        None => Ok(None),
    }
}

struct Evidence {
    kb: Vec<HybridHit>,
    resolutions: Vec<SearchHit>,
}

fn pipeline(
    ctx: &WorkflowContext<'_>,
    timeline: &mut RunTimeline,
    ticket_id: &str,
    ticket: &Ticket,
) -> OpsgateResult<WorkflowOutcome> {
    let cfg = ctx.config;
    let text = ticket.text_for_embedding();

    let embedding = timeline.step(StepName::Embed, || {
        let v = ctx.embedder.embed(&text)?;
        let dimensions = v.len();
        Ok((v, StepDetail::Embed { dimensions }))
    })?;

    let classification = timeline.step(StepName::Classify, || {
        let c = classify_ticket(ticket);
        Ok((c, StepDetail::Classify { classification: c }))
    })?;

    let dedup = timeline.step(StepName::Dedupe, || {
        let settings = DedupSettings {
            k: cfg.triage.dedupe_k,
            num_candidates: cfg.retrieval.knn_num_candidates,
            threshold: cfg.triage.duplicate_similarity_threshold,
            fragment_size: cfg.retrieval.highlight_fragment_size,
        };
        let d = find_similar_tickets(
            ctx.store,
            &embedding,
            Some(classification.category),
            Some(ticket_id),
            settings,
        )?;
        let detail = StepDetail::Dedupe {
            is_duplicate: d.is_duplicate,
            top_score: d.top_score,
            similar_tickets: ranked_hits(&d.similar, "subject"),
        };
        Ok((d, detail))
    })?;

    let evidence = retrieve_evidence(ctx, timeline, &text, &embedding, classification)?;

    let (citations, decision, drafted) = timeline.step(StepName::Draft, || {
        let citations = collect_citations(cfg.triage.citations_per_source, &evidence, &dedup);
        let decision = ctx.gate().evaluate(&citations);
        let drafted = draft(&DraftInput {
            subject: &ticket.subject,
            classification,
            duplicate_of: dedup.duplicate_of().map(|h| h.id.as_str()),
            kb_titles: evidence
                .kb
                .iter()
                .take(cfg.triage.citations_per_source)
                .filter_map(|h| h.source.get("title").and_then(Value::as_str))
                .collect(),
            top_resolution: evidence.resolutions.first().and_then(|h| h.source_str("title")),
            citation_count: citations.len(),
            confidence: decision.confidence,
        });
        let detail = StepDetail::Draft {
            citations: citations.as_slice().to_vec(),
            confidence: decision.confidence,
            customer_message: drafted.customer_message.clone(),
            internal_notes: drafted.internal_notes.clone(),
        };
        Ok(((citations, decision, drafted), detail))
    })?;

    let action = timeline.step(StepName::Act, || {
        let action = act(
            ctx,
            ticket_id,
            ticket,
            &dedup,
            &decision,
            classification,
            &embedding,
            &drafted,
        )?;
        let gate = (!dedup.is_duplicate).then(|| decision.clone());
        Ok((
            action,
            StepDetail::Act {
                action,
                ticket_id: Some(ticket_id.to_string()),
                gate,
            },
        ))
    })?;

    let metrics = triage_metrics(ctx, ticket_id, classification, action);
    write_metrics(ctx, timeline, &metrics)?;

    events::ticket_triaged(ticket_id, action_label(action), decision.confidence.as_str());
    info!(ticket_id, citations = citations.len(), "triage complete");

    let mut outcome = WorkflowOutcome::new(timeline.run_id(), summary(ticket_id, action, &dedup));
    outcome.recommended_action = Some(recommended(action, &dedup, decision.required));
    outcome.entities.ticket_id = Some(ticket_id.to_string());
    outcome.citations = citations.into_vec();
    outcome.confidence = decision.confidence;
    outcome.duplicate_prevented = dedup.is_duplicate;
    outcome.action = Some(action);
    outcome.classification = Some(classification);
    outcome.metrics = metrics
        .iter()
        .map(|m| (m.metric_name.clone(), m.value))
        .collect::<BTreeMap<_, _>>();
    Ok(outcome)
}

/// KB and resolution retrieval are independent reads; both finish before drafting.
fn retrieve_evidence(
    ctx: &WorkflowContext<'_>,
    timeline: &mut RunTimeline,
    text: &str,
    embedding: &[f32],
    classification: Classification,
) -> OpsgateResult<Evidence> {
    let cfg = ctx.config;
    let (kb_step, resolution_step) = rayon::join(
        || {
            timed(StepName::RetrieveKb, || {
                let searcher = HybridSearcher::new(ctx.store, ctx.embedder, cfg.retrieval.clone());
                let hits = searcher
                    .search(
                        collections::KB_ARTICLES,
                        text,
                        embedding,
                        &kb_fields(),
                        cfg.triage.kb_k,
                        &[],
                        cfg.retrieval.knn_num_candidates,
                    )?
                    .hits;
                let detail = StepDetail::RetrieveKb {
                    articles_found: hits.len(),
                    top_articles: ranked_hybrid(&hits),
                };
                Ok((hits, detail))
            })
        },
        || {
            timed(StepName::RetrieveResolutions, || {
                let request = search_templates::resolution_search(
                    embedding,
                    Some(classification.category.as_str()),
                    Some(classification.severity),
                    cfg.triage.resolution_k,
                    cfg.retrieval.knn_num_candidates,
                );
                let hits = ctx.store.search(&request)?.hits;
                let detail = StepDetail::RetrieveResolutions {
                    resolutions_found: hits.len(),
                    top_resolutions: ranked_hits(&hits, "title"),
                };
                Ok((hits, detail))
            })
        },
    );
    // Record both before surfacing either failure.
    let kb = timeline.absorb(kb_step);
    let resolutions = timeline.absorb(resolution_step);
    Ok(Evidence {
        kb: kb?,
        resolutions: resolutions?,
    })
}

/// Top KB articles and resolutions, plus the matched ticket when duplicate.
fn collect_citations(per_source: usize, evidence: &Evidence, dedup: &TicketDedup) -> CitationSet {
    let mut citations = CitationSet::new();
    citations.extend(
        evidence
            .kb
            .iter()
            .take(per_source)
            .map(|h| kb_citation(collections::KB_ARTICLES, h)),
    );
    citations.extend(evidence.resolutions.iter().take(per_source).map(|h| {
        Citation::new(collections::RESOLUTIONS, h.id.clone())
            .with_highlight(h.source_str("title").map(str::to_string))
    }));
    if let Some(hit) = dedup.duplicate_of() {
        citations.push(
            Citation::new(collections::TICKETS, hit.id.clone()).with_highlight(
                hit.first_highlight()
                    .or_else(|| hit.source_str("subject").map(str::to_string)),
            ),
        );
    }
    citations
}

#[allow(clippy::too_many_arguments)]
fn act(
    ctx: &WorkflowContext<'_>,
    ticket_id: &str,
    ticket: &Ticket,
    dedup: &TicketDedup,
    decision: &GateDecision,
    classification: Classification,
    embedding: &[f32],
    drafted: &Draft,
) -> OpsgateResult<ActionTaken> {
    let now = Utc::now();
    let (patch, action) = if let Some(original) = dedup.duplicate_of() {
        events::duplicate_prevented("ticket", &original.id);
        (
            TicketPatch {
                internal_notes: Some(drafted.internal_notes.clone()),
                tags: Some(ticket.tags_with(tags::POTENTIAL_DUPLICATE)),
                updated_at: Some(now),
                ..Default::default()
            },
            ActionTaken::TaggedDuplicate,
        )
    } else if decision.permitted {
        (
            TicketPatch {
                category: Some(classification.category),
                severity: Some(classification.severity),
                priority: Some(classification.priority),
                customer_message: Some(drafted.customer_message.clone()),
                internal_notes: Some(drafted.internal_notes.clone()),
                embedding: Some(embedding.to_vec()),
                updated_at: Some(now),
                ..Default::default()
            },
            ActionTaken::TicketTriaged,
        )
    } else {
        events::evidence_withheld("ticket_update", decision.citation_count, decision.required);
        (
            TicketPatch {
                internal_notes: Some(drafted.internal_notes.clone()),
                tags: Some(ticket.tags_with(tags::NEEDS_HUMAN_REVIEW)),
                updated_at: Some(now),
                ..Default::default()
            },
            ActionTaken::FlaggedForReview,
        )
    };
    let body = serde_json::to_value(&patch)?;
    ctx.store
        .update(collections::TICKETS, ticket_id, &body, Visibility::Immediate)?;
    Ok(action)
}

fn triage_metrics(
    ctx: &WorkflowContext<'_>,
    ticket_id: &str,
    classification: Classification,
    action: ActionTaken,
) -> Vec<Metric> {
    let category = classification.category.as_str();
    let metric = |name: &str, value: f64| {
        Metric::new("efficiency", name, value, category)
            .with_ref(ticket_id, REF_TYPE)
            .with_tags([tags::AUTOMATED, "triage"])
    };
    match action {
        ActionTaken::TaggedDuplicate => vec![
            metric("duplicates_prevented", 1.0),
            metric(
                "time_saved_minutes",
                ctx.config.triage.time_saved_per_duplicate_minutes,
            ),
        ],
        ActionTaken::TicketTriaged => vec![metric("tickets_auto_triaged", 1.0)],
        _ => Vec::new(),
    }
}

fn action_label(action: ActionTaken) -> &'static str {
    match action {
        ActionTaken::TaggedDuplicate => "tagged_duplicate",
        ActionTaken::TicketTriaged => "updated",
        _ => "flagged_for_review",
    }
}

fn summary(ticket_id: &str, action: ActionTaken, dedup: &TicketDedup) -> String {
    match (action, dedup.duplicate_of()) {
        (ActionTaken::TaggedDuplicate, Some(original)) => {
            format!("Ticket {ticket_id} is a potential duplicate of {}", original.id)
        }
        (ActionTaken::TicketTriaged, _) => format!("Ticket {ticket_id} triaged and updated"),
        _ => format!("Ticket {ticket_id} flagged for human review"),
    }
}

fn recommended(action: ActionTaken, dedup: &TicketDedup, required: usize) -> String {
    match (action, dedup.duplicate_of()) {
        (ActionTaken::TaggedDuplicate, Some(original)) => {
            format!("Link or merge with ticket {}", original.id)
        }
        (ActionTaken::TicketTriaged, _) => "Send the drafted response to the customer".to_string(),
        _ => format!("Manual review required - fewer than {required} citations found"),
    }
}
