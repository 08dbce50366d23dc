//! Builders for every search request the workflows issue.

use opsgate_core::constants::{collections, EMBEDDING_FIELD};
use opsgate_core::models::{
    Category, FieldBoost, Filter, Fuzziness, KnnQuery, LexicalQuery, SearchQuery, SearchRequest,
    Severity, SortField,
};

/// The lexical half of a hybrid query. Highlights every queried field.
pub fn hybrid_lexical(
    collection: &str,
    text: &str,
    fields: &[FieldBoost],
    fuzziness: Fuzziness,
    size: usize,
    filter: Vec<Filter>,
    fragment_size: usize,
) -> SearchRequest {
    let names: Vec<&str> = fields.iter().map(|f| f.field.as_str()).collect();
    SearchRequest::new(
        collection,
        SearchQuery::Lexical(LexicalQuery {
            text: text.to_string(),
            fields: fields.to_vec(),
            fuzziness,
            filter,
        }),
        size,
    )
    .highlighted(&names, fragment_size)
}

/// The vector half of a hybrid query: kNN with `k = size`.
pub fn hybrid_vector(
    collection: &str,
    vector: &[f32],
    size: usize,
    num_candidates: usize,
    filter: Vec<Filter>,
) -> SearchRequest {
    SearchRequest::new(
        collection,
        SearchQuery::Knn(KnnQuery {
            field: EMBEDDING_FIELD.to_string(),
            vector: vector.to_vec(),
            k: size,
            num_candidates: num_candidates.max(size),
            filter,
        }),
        size,
    )
}

/// Similar open tickets of the same category, excluding the ticket itself.
pub fn ticket_dedupe(
    vector: &[f32],
    category: Option<Category>,
    exclude_id: Option<&str>,
    k: usize,
    num_candidates: usize,
    fragment_size: usize,
) -> SearchRequest {
    let mut filter = vec![Filter::term("status", "open")];
    if let Some(category) = category {
        filter.push(Filter::term("category", category.as_str()));
    }
    if let Some(id) = exclude_id {
        filter.push(Filter::must_not(Filter::IdEquals(id.to_string())));
    }
    hybrid_vector(collections::TICKETS, vector, k, num_candidates, filter)
        .highlighted(&["subject", "description"], fragment_size)
}

/// Past resolutions near `vector`, optionally restricted by category and severity.
pub fn resolution_search(
    vector: &[f32],
    category: Option<&str>,
    severity: Option<Severity>,
    k: usize,
    num_candidates: usize,
) -> SearchRequest {
    let mut filter = Vec::new();
    if let Some(category) = category {
        filter.push(Filter::term("category", category));
    }
    if let Some(severity) = severity {
        filter.push(Filter::term("severity", severity.as_str()));
    }
    hybrid_vector(collections::RESOLUTIONS, vector, k, num_candidates, filter)
}

/// Filters for the ticket listing. Empty lists do not restrict.
#[derive(Debug, Clone, Default)]
pub struct TicketListing {
    pub status: Vec<String>,
    pub category: Vec<String>,
    pub severity: Vec<String>,
    pub priority: Vec<String>,
    pub from: usize,
    pub size: Option<usize>,
}

/// Tickets matching the listing filters, newest first.
pub fn ticket_listing(listing: &TicketListing, default_size: usize) -> SearchRequest {
    let filters: Vec<Filter> = [
        ("status", &listing.status),
        ("category", &listing.category),
        ("severity", &listing.severity),
        ("priority", &listing.priority),
    ]
    .into_iter()
    .filter(|(_, values)| !values.is_empty())
    .map(|(field, values)| Filter::terms(field, values.iter().cloned()))
    .collect();

    let query = if filters.is_empty() {
        SearchQuery::MatchAll
    } else {
        SearchQuery::Filter(filters)
    };
    let mut request = SearchRequest::new(
        collections::TICKETS,
        query,
        listing.size.unwrap_or(default_size),
    )
    .sorted(SortField::newest_first("created_at"));
    request.from = listing.from;
    request
}
