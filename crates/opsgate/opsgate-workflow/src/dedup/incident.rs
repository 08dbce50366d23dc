//! An open or investigating incident for the same (service, env) inside the
//! dedup window suppresses creation.

use chrono::{DateTime, Duration, Utc};

use opsgate_core::constants::collections;
use opsgate_core::models::{Filter, IncidentStatus, SearchQuery, SearchRequest, SortField};
use opsgate_core::traits::IDocumentStore;
use opsgate_core::OpsgateResult;

/// Id of the most recent matching incident, if any.
pub fn find_open_incident(
    store: &dyn IDocumentStore,
    service: &str,
    environment: &str,
    window_secs: i64,
    now: DateTime<Utc>,
) -> OpsgateResult<Option<String>> {
    let filters = vec![
        Filter::terms(
            "status",
            [IncidentStatus::Open.as_str(), IncidentStatus::Investigating.as_str()],
        ),
        Filter::term("service", service),
        Filter::term("env", environment),
        Filter::since("detected_at", now - Duration::seconds(window_secs)),
    ];
    let request = SearchRequest::new(collections::INCIDENTS, SearchQuery::Filter(filters), 1)
        .sorted(SortField::newest_first("detected_at"));
    Ok(store.search(&request)?.hits.into_iter().next().map(|h| h.id))
}
