//! DetectSpike → CheckExisting → CreateIncident → RetrieveResolutions →
//! CreateTicket → WriteMetrics. One spike is handled per run: the highest
//! count spike that no open incident covers yet.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use opsgate_core::constants::{collections, tags, workflows, SPIKE_EVIDENCE_SAMPLES};
use opsgate_core::models::{
    ActionTaken, Category, Citation, CitationSet, GateDecision, Incident, IncidentSeverity,
    IncidentStatus, Metric, SearchHit, Spike, StepDetail, StepName, Ticket, Visibility,
    WorkflowOutcome,
};
use opsgate_core::OpsgateResult;
use opsgate_observability::tracing_setup::events;
use opsgate_observability::workflow_span;
use opsgate_retrieval::search_templates;

use super::{conclude, ranked_hits, write_metrics, WorkflowContext};
use crate::dedup::find_open_incident;
use crate::detection::SpikeDetector;
use crate::timeline::RunTimeline;

const REF_TYPE: &str = "incident";

pub fn run(ctx: &WorkflowContext<'_>, now: DateTime<Utc>) -> OpsgateResult<WorkflowOutcome> {
    let mut timeline = RunTimeline::new(workflows::INCIDENT_DETECTION, REF_TYPE);
    let span = workflow_span!(workflows::INCIDENT_DETECTION, timeline.run_id());
    let _guard = span.enter();

    let result = pipeline(ctx, &mut timeline, now);
    conclude(ctx, timeline, result)
}

fn pipeline(
    ctx: &WorkflowContext<'_>,
    timeline: &mut RunTimeline,
    now: DateTime<Utc>,
) -> OpsgateResult<WorkflowOutcome> {
    let cfg = ctx.config;
    let detector = SpikeDetector::new(ctx.store, &cfg.detection);

    let spikes = timeline.step(StepName::DetectSpike, || {
        let spikes = detector.detect(now)?;
        let detail = StepDetail::DetectSpike {
            spikes_found: spikes.len(),
            spikes: spikes.clone(),
        };
        Ok((spikes, detail))
    })?;

    let Some((top, rest)) = spikes.split_first() else {
        let minutes = cfg.detection.spike_window_secs / 60;
        return Ok(WorkflowOutcome::new(
            timeline.run_id(),
            format!("No error spikes detected in the last {minutes} minutes"),
        ));
    };
    for spike in &spikes {
        events::spike_detected(&spike.service, &spike.environment, spike.error_count);
    }

    let selection = timeline.step(StepName::CheckExisting, || {
        let selection = select_uncovered(ctx, top, rest, now)?;
        let detail = StepDetail::CheckExisting {
            duplicate_of: match &selection {
                SpikeSelection::AllCovered { incident_id, .. } => Some(incident_id.clone()),
                SpikeSelection::Uncovered(_) => None,
            },
        };
        Ok((selection, detail))
    })?;

    let spike = match selection {
        SpikeSelection::Uncovered(spike) => spike,
        SpikeSelection::AllCovered { spike, incident_id } => {
            events::duplicate_prevented("incident", &incident_id);
            timeline.set_ref(incident_id.clone());
            let mut outcome = WorkflowOutcome::new(
                timeline.run_id(),
                format!(
                    "Open incident {incident_id} already covers {} ({})",
                    spike.service, spike.environment
                ),
            );
            outcome.recommended_action = Some(format!("Continue work on incident {incident_id}"));
            outcome.entities.incident_id = Some(incident_id);
            outcome.duplicate_prevented = true;
            outcome.action = Some(ActionTaken::DuplicatePrevented);
            return Ok(outcome);
        }
    };

    let (incident, decision, log_evidence) = timeline.step(StepName::CreateIncident, || {
        let log_evidence = detector.sample_evidence(&spike, now, SPIKE_EVIDENCE_SAMPLES)?;
        let citations: CitationSet = log_evidence.iter().cloned().collect();
        let decision = ctx.gate().evaluate(&citations);
        if !decision.permitted {
            events::evidence_withheld("incident_create", decision.citation_count, decision.required);
            let detail = StepDetail::CreateIncident {
                incident_id: None,
                gate: decision.clone(),
            };
            return Ok(((None, decision, log_evidence), detail));
        }
        let incident = create_incident(ctx, &spike, now)?;
        let detail = StepDetail::CreateIncident {
            incident_id: Some(incident.incident_id.clone()),
            gate: decision.clone(),
        };
        Ok(((Some(incident), decision, log_evidence), detail))
    })?;

    let Some(incident) = incident else {
        return Ok(withheld(timeline, &spike, log_evidence, decision));
    };
    timeline.set_ref(incident.incident_id.clone());

    let resolutions = timeline.step(StepName::RetrieveResolutions, || {
        let request = search_templates::resolution_search(
            &incident.embedding,
            Some(Category::Incident.as_str()),
            Some(incident.severity.as_severity()),
            cfg.triage.resolution_k,
            cfg.retrieval.knn_num_candidates,
        );
        let hits = ctx.store.search(&request)?.hits;
        let detail = StepDetail::RetrieveResolutions {
            resolutions_found: hits.len(),
            top_resolutions: ranked_hits(&hits, "title"),
        };
        Ok((hits, detail))
    })?;

    let mut citations = CitationSet::new();
    citations.push(
        Citation::new(collections::INCIDENTS, incident.incident_id.clone())
            .with_highlight(Some(incident.summary.clone())),
    );
    citations.extend(log_evidence);
    citations.extend(resolution_citations(&resolutions, cfg.triage.citations_per_source));

    let ticket_id = timeline.step(StepName::CreateTicket, || {
        let decision = ctx.gate().evaluate(&citations);
        if !decision.permitted {
            events::evidence_withheld("ticket_create", decision.citation_count, decision.required);
            return Ok((
                None,
                StepDetail::CreateTicket {
                    ticket_id: None,
                    gate: decision,
                },
            ));
        }
        let ticket_id = create_ticket(ctx, &incident, now)?;
        Ok((
            Some(ticket_id.clone()),
            StepDetail::CreateTicket {
                ticket_id: Some(ticket_id),
                gate: decision,
            },
        ))
    })?;

    let mtta = Metric::new("performance", "mtta_seconds", cfg.detection.mtta_seconds, "incident")
        .with_ref(incident.incident_id.clone(), REF_TYPE)
        .with_tags([tags::AUTOMATED]);
    write_metrics(ctx, timeline, std::slice::from_ref(&mtta))?;

    info!(
        incident_id = %incident.incident_id,
        ticket_id = ?ticket_id,
        "incident detection complete"
    );

    let mut outcome = WorkflowOutcome::new(timeline.run_id(), incident.summary.clone());
    outcome.recommended_action = Some(format!(
        "Investigate {} in {}",
        incident.service, incident.environment
    ));
    outcome.entities.incident_id = Some(incident.incident_id.clone());
    outcome.entities.ticket_id = ticket_id;
    outcome.confidence = decision.confidence;
    outcome.citations = citations.into_vec();
    outcome.action = Some(ActionTaken::IncidentCreated);
    outcome.metrics.insert(mtta.metric_name.clone(), mtta.value);
    outcome
        .metrics
        .insert("error_count".to_string(), incident.error_count as f64);
    Ok(outcome)
}

enum SpikeSelection {
    Uncovered(Spike),
    /// Every spike already has an open incident; carries the top one.
    AllCovered { spike: Spike, incident_id: String },
}

/// First spike, highest count first, with no open incident in the dedup window.
fn select_uncovered(
    ctx: &WorkflowContext<'_>,
    top: &Spike,
    rest: &[Spike],
    now: DateTime<Utc>,
) -> OpsgateResult<SpikeSelection> {
    let open_incident = |spike: &Spike| {
        find_open_incident(
            ctx.store,
            &spike.service,
            &spike.environment,
            ctx.config.detection.incident_dedup_window_secs,
            now,
        )
    };
    let Some(incident_id) = open_incident(top)? else {
        return Ok(SpikeSelection::Uncovered(top.clone()));
    };
    for spike in rest {
        if open_incident(spike)?.is_none() {
            debug!(covered = %incident_id, service = %spike.service, "top spike covered, handling next");
            return Ok(SpikeSelection::Uncovered(spike.clone()));
        }
    }
    Ok(SpikeSelection::AllCovered {
        spike: top.clone(),
        incident_id,
    })
}

fn create_incident(
    ctx: &WorkflowContext<'_>,
    spike: &Spike,
    now: DateTime<Utc>,
) -> OpsgateResult<Incident> {
    let severity = IncidentSeverity::from_error_count(
        spike.error_count,
        ctx.config.detection.critical_error_count,
    );
    let title = format!("Error spike in {}", spike.service);
    let summary = format!(
        "High error rate detected: {} errors in {} ({})",
        spike.error_count, spike.service, spike.environment
    );
    let mut incident = Incident {
        incident_id: format!("INC-{}", now.timestamp_millis()),
        title,
        summary,
        service: spike.service.clone(),
        environment: spike.environment.clone(),
        severity,
        status: IncidentStatus::Open,
        detected_at: now,
        error_count: spike.error_count,
        error_rate: None,
        affected_users: None,
        tags: vec![
            tags::AUTO_DETECTED.to_string(),
            spike.service.clone(),
            spike.environment.clone(),
        ],
        embedding: Vec::new(),
    };
    incident.embedding = ctx.embedder.embed(&incident.text_for_embedding())?;

    // Immediate visibility closes the window for a concurrent detection run.
    ctx.store.write(
        collections::INCIDENTS,
        Some(&incident.incident_id),
        &serde_json::to_value(&incident)?,
        Visibility::Immediate,
    )?;
    events::incident_created(
        &incident.incident_id,
        &incident.service,
        incident.severity.as_severity().as_str(),
    );
    Ok(incident)
}

fn create_ticket(
    ctx: &WorkflowContext<'_>,
    incident: &Incident,
    now: DateTime<Utc>,
) -> OpsgateResult<String> {
    let subject = format!("Incident: {}", incident.title);
    let description = format!(
        "{}\n\nDetected at: {}\nService: {}\nEnvironment: {}\nError count: {}",
        incident.summary,
        incident.detected_at.to_rfc3339(),
        incident.service,
        incident.environment,
        incident.error_count
    );
    let ticket_id = format!("TKT-INC-{}", now.timestamp_millis());
    let mut ticket = Ticket::new(ticket_id, subject, description);
    ticket.category = Some(Category::Incident);
    ticket.severity = Some(incident.severity.as_severity());
    ticket.priority = Some(incident.severity.ticket_priority());
    ticket.tags = vec![
        "incident".to_string(),
        tags::AUTO_CREATED.to_string(),
        incident.service.clone(),
    ];
    ticket.incident_ref = Some(incident.incident_id.clone());
    ticket.embedding = Some(ctx.embedder.embed(&ticket.text_for_embedding())?);

    ctx.store.write(
        collections::TICKETS,
        Some(&ticket.ticket_id),
        &serde_json::to_value(&ticket)?,
        Visibility::Immediate,
    )
}

fn resolution_citations(hits: &[SearchHit], per_source: usize) -> Vec<Citation> {
    hits.iter()
        .take(per_source)
        .map(|h| {
            Citation::new(collections::RESOLUTIONS, h.id.clone())
                .with_highlight(h.source_str("title").map(str::to_string))
        })
        .collect()
}

/// Spike without enough log evidence: no incident, flag for a human.
fn withheld(
    timeline: &RunTimeline,
    spike: &Spike,
    log_evidence: Vec<Citation>,
    decision: GateDecision,
) -> WorkflowOutcome {
    let mut outcome = WorkflowOutcome::new(
        timeline.run_id(),
        format!(
            "Error spike in {} ({}) lacks evidence; incident not created",
            spike.service, spike.environment
        ),
    );
    outcome.ok = false;
    outcome.recommended_action = Some(
        decision
            .reason
            .unwrap_or_else(|| "Manual review required".to_string()),
    );
    outcome.citations = log_evidence;
    outcome.confidence = decision.confidence;
    outcome.action = Some(ActionTaken::Withheld);
    outcome
}
