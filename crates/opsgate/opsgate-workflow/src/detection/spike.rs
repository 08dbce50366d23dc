use chrono::{DateTime, Duration, Utc};

use opsgate_core::config::DetectionConfig;
use opsgate_core::constants::{collections, ERROR_LEVEL};
use opsgate_core::models::{
    AggregateRequest, Citation, Filter, SearchQuery, SearchRequest, SortField, Spike,
};
use opsgate_core::traits::IDocumentStore;
use opsgate_core::OpsgateResult;

const TIME_FIELD: &str = "@timestamp";

/// Counts ERROR events per (service, env) in the trailing window. Read-only.
pub struct SpikeDetector<'a> {
    store: &'a dyn IDocumentStore,
    config: &'a DetectionConfig,
}

impl<'a> SpikeDetector<'a> {
    pub fn new(store: &'a dyn IDocumentStore, config: &'a DetectionConfig) -> Self {
        Self { store, config }
    }

    fn window_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - Duration::seconds(self.config.spike_window_secs)
    }

    /// Groups at or above the threshold, highest count first.
    pub fn detect(&self, now: DateTime<Utc>) -> OpsgateResult<Vec<Spike>> {
        let request = AggregateRequest {
            collection: collections::LOGS.to_string(),
            time_field: TIME_FIELD.to_string(),
            since: self.window_start(now),
            filters: vec![Filter::term("level", ERROR_LEVEL)],
            group_by: vec!["service".to_string(), "env".to_string()],
            min_count: self.config.spike_threshold,
            sum_field: None,
        };
        let buckets = self.store.aggregate(&request)?;
        Ok(buckets
            .into_iter()
            .filter_map(|b| {
                Some(Spike {
                    service: b.key_str(0)?.to_string(),
                    environment: b.key_str(1)?.to_string(),
                    error_count: b.count,
                })
            })
            .collect())
    }

    /// The most recent error logs of a spike group, as citations.
    pub fn sample_evidence(
        &self,
        spike: &Spike,
        now: DateTime<Utc>,
        limit: usize,
    ) -> OpsgateResult<Vec<Citation>> {
        let filters = vec![
            Filter::term("level", ERROR_LEVEL),
            Filter::term("service", spike.service.as_str()),
            Filter::term("env", spike.environment.as_str()),
            Filter::since(TIME_FIELD, self.window_start(now)),
        ];
        let request = SearchRequest::new(collections::LOGS, SearchQuery::Filter(filters), limit)
            .sorted(SortField::newest_first(TIME_FIELD));
        Ok(self
            .store
            .search(&request)?
            .hits
            .into_iter()
            .map(|hit| {
                let message = hit.source_str("message").map(str::to_string);
                Citation::new(collections::LOGS, hit.id).with_highlight(message)
            })
            .collect())
    }
}
