//! Append-only audit trail: one OpsRun document per workflow run.

use serde_json::Value;
use tracing::debug;

use opsgate_core::constants::collections;
use opsgate_core::errors::{OpsgateError, OpsgateResult};
use opsgate_core::models::{Filter, OpsRun, SearchQuery, SearchRequest, SortField, Visibility};
use opsgate_core::traits::IDocumentStore;

use crate::side_effect::EffectOutcome;

/// Writes and reads OpsRun records in `ops-runs`, keyed by `run_id`.
pub struct AuditTrailRecorder<'a> {
    store: &'a dyn IDocumentStore,
}

impl<'a> AuditTrailRecorder<'a> {
    pub fn new(store: &'a dyn IDocumentStore) -> Self {
        Self { store }
    }

    /// Persist a finished run with immediate visibility.
    pub fn record(&self, run: &OpsRun) -> EffectOutcome {
        let result = serde_json::to_value(run)
            .map_err(OpsgateError::from)
            .and_then(|body| {
                self.store.write(
                    collections::OPS_RUNS,
                    Some(&run.run_id),
                    &body,
                    Visibility::Immediate,
                )
            });
        let outcome = EffectOutcome::capture("ops_run", result);
        if outcome.is_applied() {
            debug!(run_id = %run.run_id, workflow = %run.workflow, status = ?run.status, "ops run recorded");
        }
        outcome
    }

    pub fn get(&self, run_id: &str) -> OpsgateResult<Option<OpsRun>> {
        match self.store.get(collections::OPS_RUNS, run_id)? {
            Some(doc) => Ok(Some(decode(doc.source)?)),
            None => Ok(None),
        }
    }

    /// Most recent run (by `started_at`) that acted on `ref_id`.
    pub fn latest_for_ref(&self, ref_id: &str) -> OpsgateResult<Option<OpsRun>> {
        let request = SearchRequest::new(
            collections::OPS_RUNS,
            SearchQuery::Filter(vec![Filter::term("ref_id", ref_id)]),
            1,
        )
        .sorted(SortField::newest_first("started_at"));
        let response = self.store.search(&request)?;
        match response.hits.into_iter().next() {
            Some(hit) => Ok(Some(decode(hit.source)?)),
            None => Ok(None),
        }
    }
}

fn decode(source: Value) -> OpsgateResult<OpsRun> {
    Ok(serde_json::from_value(source)?)
}
