//! Workflow state machines and the shared run bookkeeping.

pub mod incident_detection;
pub mod ticket_intake;
pub mod ticket_triage;

use opsgate_core::config::OpsgateConfig;
use opsgate_core::errors::{OpsgateError, OpsgateResult, WorkflowError};
use opsgate_core::models::{Citation, FieldBoost, Metric, RankedRef, SearchHit, StepDetail, StepName, WorkflowOutcome};
use opsgate_core::traits::{IDocumentStore, IEmbeddingProvider};
use opsgate_observability::tracing_setup::events;
use opsgate_observability::{AuditTrailRecorder, MetricsRecorder};
use opsgate_retrieval::HybridHit;

use crate::gate::CitationGate;
use crate::timeline::RunTimeline;

/// Collaborators a run needs. Borrowed for the duration of one run.
#[derive(Clone, Copy)]
pub struct WorkflowContext<'a> {
    pub store: &'a dyn IDocumentStore,
    pub embedder: &'a dyn IEmbeddingProvider,
    pub config: &'a OpsgateConfig,
}

impl<'a> WorkflowContext<'a> {
    pub fn new(
        store: &'a dyn IDocumentStore,
        embedder: &'a dyn IEmbeddingProvider,
        config: &'a OpsgateConfig,
    ) -> Self {
        Self {
            store,
            embedder,
            config,
        }
    }

    pub fn gate(&self) -> CitationGate {
        CitationGate::new(self.config.triage.min_citations)
    }
}

/// Record the run and hand back the outcome, or a run-identified failure.
pub(crate) fn conclude(
    ctx: &WorkflowContext<'_>,
    timeline: RunTimeline,
    result: OpsgateResult<WorkflowOutcome>,
) -> OpsgateResult<WorkflowOutcome> {
    match result {
        Ok(outcome) => {
            AuditTrailRecorder::new(ctx.store).record(&timeline.finish());
            Ok(outcome)
        }
        Err(e) => Err(abort(ctx, timeline, e)),
    }
}

/// Record a failed run and convert the cause into `RunFailed`.
pub(crate) fn abort(ctx: &WorkflowContext<'_>, timeline: RunTimeline, cause: OpsgateError) -> OpsgateError {
    let reason = cause.to_string();
    let run_id = timeline.run_id().to_string();
    let workflow = timeline.workflow();
    events::run_failed(workflow, &run_id, &reason);
    AuditTrailRecorder::new(ctx.store).record(&timeline.fail(reason.clone()));
    WorkflowError::RunFailed {
        run_id,
        workflow: workflow.to_string(),
        reason,
    }
    .into()
}

/// Write metrics as the `WriteMetrics` step. Never fails the run.
pub(crate) fn write_metrics(
    ctx: &WorkflowContext<'_>,
    timeline: &mut RunTimeline,
    metrics: &[Metric],
) -> OpsgateResult<()> {
    timeline.step(StepName::WriteMetrics, || {
        let report = MetricsRecorder::new(ctx.store).record_all(metrics);
        Ok((
            (),
            StepDetail::WriteMetrics {
                metrics_written: report.written,
                metrics_dropped: report.dropped,
            },
        ))
    })
}

/// Fields searched for KB evidence.
pub(crate) fn kb_fields() -> Vec<FieldBoost> {
    vec![FieldBoost::new("title", 1.0), FieldBoost::new("content", 1.0)]
}

pub(crate) fn ranked_hits(hits: &[SearchHit], title_field: &str) -> Vec<RankedRef> {
    hits.iter()
        .map(|h| RankedRef {
            id: h.id.clone(),
            score: h.score,
            title: h.source_str(title_field).map(str::to_string),
        })
        .collect()
}

pub(crate) fn ranked_hybrid(hits: &[HybridHit]) -> Vec<RankedRef> {
    hits.iter()
        .map(|h| RankedRef {
            id: h.id.clone(),
            score: h.score,
            title: h.title(),
        })
        .collect()
}

/// Citation for a KB hit: its best highlight, else its title.
pub(crate) fn kb_citation(collection: &str, hit: &HybridHit) -> Citation {
    Citation::new(collection, hit.id.clone()).with_highlight(hit.first_highlight().or_else(|| hit.title()))
}
