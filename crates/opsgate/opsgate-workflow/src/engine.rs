//! WorkflowEngine: owns the store, the embedder and the config, and exposes
//! every workflow trigger.

use chrono::{DateTime, Utc};
use tracing::info;

use opsgate_core::config::OpsgateConfig;
use opsgate_core::constants::collections;
use opsgate_core::errors::{OpsgateError, OpsgateResult};
use opsgate_core::models::{MetricsSummary, OpsRun, Ticket, WorkflowOutcome};
use opsgate_core::traits::{IDocumentStore, IEmbeddingProvider};
use opsgate_embeddings::EmbeddingEngine;
use opsgate_observability::{AuditTrailRecorder, MetricsRecorder};
use opsgate_retrieval::{search_templates, HybridResults, HybridSearcher, SearchMode, TicketListing};
use opsgate_storage::StorageEngine;

use crate::tools::{self, TicketToolRequest, TicketToolResponse};
use crate::workflows::{incident_detection, ticket_intake, ticket_triage, WorkflowContext};

pub struct WorkflowEngine {
    store: Box<dyn IDocumentStore>,
    embedder: Box<dyn IEmbeddingProvider>,
    config: OpsgateConfig,
}

impl WorkflowEngine {
    /// Build from injected collaborators.
    pub fn new(
        store: Box<dyn IDocumentStore>,
        embedder: Box<dyn IEmbeddingProvider>,
        config: OpsgateConfig,
    ) -> Self {
        Self {
            store,
            embedder,
            config,
        }
    }

    /// SQLite store and configured embedder from `config`.
    pub fn open(config: OpsgateConfig) -> OpsgateResult<Self> {
        let store = StorageEngine::open(&config.storage)?;
        let embedder = EmbeddingEngine::new(&config.embedding)?;
        info!(
            db = %config.storage.db_path,
            provider = embedder.name(),
            dimensions = embedder.dimensions(),
            "workflow engine ready"
        );
        Ok(Self::new(Box::new(store), Box::new(embedder), config))
    }

    /// In-memory store, for tests and demos.
    pub fn open_in_memory(config: OpsgateConfig) -> OpsgateResult<Self> {
        let store = StorageEngine::open_in_memory_with(&config.storage)?;
        let embedder = EmbeddingEngine::new(&config.embedding)?;
        Ok(Self::new(Box::new(store), Box::new(embedder), config))
    }

    pub fn store(&self) -> &dyn IDocumentStore {
        self.store.as_ref()
    }

    pub fn embedder(&self) -> &dyn IEmbeddingProvider {
        self.embedder.as_ref()
    }

    pub fn config(&self) -> &OpsgateConfig {
        &self.config
    }

    fn ctx(&self) -> WorkflowContext<'_> {
        WorkflowContext::new(self.store.as_ref(), self.embedder.as_ref(), &self.config)
    }

    // --- Workflow triggers ---

    pub fn detect_incidents(&self) -> OpsgateResult<WorkflowOutcome> {
        self.detect_incidents_at(Utc::now())
    }

    /// Detection evaluated as of `now`.
    pub fn detect_incidents_at(&self, now: DateTime<Utc>) -> OpsgateResult<WorkflowOutcome> {
        incident_detection::run(&self.ctx(), now)
    }

    pub fn triage_ticket(&self, ticket_id: &str) -> OpsgateResult<WorkflowOutcome> {
        ticket_triage::run(&self.ctx(), ticket_id)
    }

    pub fn create_ticket(&self, subject: &str, description: &str) -> OpsgateResult<WorkflowOutcome> {
        ticket_intake::run(&self.ctx(), subject, description)
    }

    pub fn apply_ticket_tool(&self, request: TicketToolRequest) -> OpsgateResult<TicketToolResponse> {
        tools::apply_ticket_tool(&self.ctx(), request)
    }

    // --- Reads ---

    /// Most recent run for `ref_id`.
    pub fn timeline(&self, ref_id: &str) -> OpsgateResult<OpsRun> {
        AuditTrailRecorder::new(self.store())
            .latest_for_ref(ref_id)?
            .ok_or_else(|| OpsgateError::not_found(collections::OPS_RUNS, ref_id))
    }

    pub fn run(&self, run_id: &str) -> OpsgateResult<OpsRun> {
        AuditTrailRecorder::new(self.store())
            .get(run_id)?
            .ok_or_else(|| OpsgateError::not_found(collections::OPS_RUNS, run_id))
    }

    pub fn search(&self, mode: SearchMode, query: &str, k: Option<usize>) -> OpsgateResult<HybridResults> {
        HybridSearcher::new(self.store(), self.embedder(), self.config.retrieval.clone())
            .search_mode(mode, query, k)
    }

    pub fn list_tickets(&self, listing: &TicketListing) -> OpsgateResult<Vec<Ticket>> {
        let request = search_templates::ticket_listing(listing, self.config.retrieval.listing_page_size);
        let hits = self.store.search(&request)?.hits;
        let mut tickets = Vec::with_capacity(hits.len());
        for hit in hits {
            tickets.push(serde_json::from_value(hit.source)?);
        }
        Ok(tickets)
    }

    /// Metric rollup; `None` uses the configured window.
    pub fn metrics_summary(&self, days: Option<i64>) -> OpsgateResult<MetricsSummary> {
        let days = days.unwrap_or(self.config.observability.metrics_summary_days);
        MetricsRecorder::new(self.store()).summary(days)
    }
}
