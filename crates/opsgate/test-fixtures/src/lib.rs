//! Golden datasets and store seeding for opsgate integration tests.
//!
//! Fixture files live under `golden/` in this crate. Seeders write through
//! the `IDocumentStore` port with immediate visibility so a test can search
//! what it just wrote.

use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value;

use opsgate_core::constants::{collections, EMBEDDING_FIELD, ERROR_LEVEL};
use opsgate_core::models::{LogEvent, Ticket, Visibility};
use opsgate_core::traits::{IDocumentStore, IEmbeddingProvider};
use opsgate_core::OpsgateResult;

/// Root directory of the golden fixtures.
fn fixtures_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("golden")
}

/// Load and deserialize a JSON fixture file.
///
/// # Panics
/// Panics if the file doesn't exist or can't be deserialized.
pub fn load_fixture<T: DeserializeOwned>(relative_path: &str) -> T {
    let path = fixtures_root().join(relative_path);
    let content = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", path.display(), e));
    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse fixture {}: {}", path.display(), e))
}

/// Load a fixture file as raw JSON Value.
pub fn load_fixture_value(relative_path: &str) -> Value {
    load_fixture(relative_path)
}

pub fn fixture_exists(relative_path: &str) -> bool {
    fixtures_root().join(relative_path).exists()
}

/// Knowledge-base articles, each carrying its document `id`.
pub fn kb_articles() -> Vec<Value> {
    load_fixture("kb/kb_articles.json")
}

/// Past resolutions, each carrying its document `id`.
pub fn resolutions() -> Vec<Value> {
    load_fixture("resolutions/resolutions.json")
}

/// Classified tickets in open or in-progress state.
pub fn open_tickets() -> Vec<Ticket> {
    load_fixture("tickets/open_tickets.json")
}

// --- Seeding ---

/// Write `docs` into `collection`, embedding the concatenation of
/// `text_fields`. The `id` member becomes the document id and is not stored.
pub fn seed_documents(
    store: &dyn IDocumentStore,
    embedder: &dyn IEmbeddingProvider,
    collection: &str,
    docs: &[Value],
    text_fields: &[&str],
) -> OpsgateResult<Vec<String>> {
    let mut ids = Vec::with_capacity(docs.len());
    for doc in docs {
        let mut body = doc.clone();
        let id = body
            .as_object_mut()
            .and_then(|map| map.remove("id"))
            .and_then(|v| v.as_str().map(str::to_string));
        let text = text_fields
            .iter()
            .filter_map(|f| body.get(*f).and_then(Value::as_str))
            .collect::<Vec<_>>()
            .join(" ");
        let embedding = embedder.embed(&text)?;
        body[EMBEDDING_FIELD] = serde_json::to_value(embedding)?;
        ids.push(store.write(collection, id.as_deref(), &body, Visibility::Immediate)?);
    }
    Ok(ids)
}

pub fn seed_kb(
    store: &dyn IDocumentStore,
    embedder: &dyn IEmbeddingProvider,
    docs: &[Value],
) -> OpsgateResult<Vec<String>> {
    seed_documents(store, embedder, collections::KB_ARTICLES, docs, &["title", "content"])
}

pub fn seed_resolutions(
    store: &dyn IDocumentStore,
    embedder: &dyn IEmbeddingProvider,
    docs: &[Value],
) -> OpsgateResult<Vec<String>> {
    seed_documents(store, embedder, collections::RESOLUTIONS, docs, &["title", "summary"])
}

/// Store a ticket under its `ticket_id`. With `embed`, the ticket text is
/// embedded so dedup can find it.
pub fn seed_ticket(
    store: &dyn IDocumentStore,
    embedder: &dyn IEmbeddingProvider,
    ticket: &Ticket,
    embed: bool,
) -> OpsgateResult<String> {
    let mut ticket = ticket.clone();
    if embed {
        ticket.embedding = Some(embedder.embed(&ticket.text_for_embedding())?);
    }
    store.write(
        collections::TICKETS,
        Some(&ticket.ticket_id),
        &serde_json::to_value(&ticket)?,
        Visibility::Immediate,
    )
}

/// `count` ERROR lines for one service, spread over the 4 minutes before `now`.
pub fn seed_error_logs(
    store: &dyn IDocumentStore,
    service: &str,
    env: &str,
    count: usize,
    now: DateTime<Utc>,
) -> OpsgateResult<()> {
    let events: Vec<LogEvent> = (0..count)
        .map(|i| LogEvent {
            timestamp: now - Duration::seconds((i % 240) as i64),
            level: ERROR_LEVEL.to_string(),
            service: service.to_string(),
            environment: env.to_string(),
            message: format!("{service}: upstream request failed (attempt {i})"),
        })
        .collect();
    seed_logs(store, &events)
}

/// Write log events with default visibility, then publish them in one refresh.
pub fn seed_logs(store: &dyn IDocumentStore, events: &[LogEvent]) -> OpsgateResult<()> {
    for event in events {
        store.write(
            collections::LOGS,
            None,
            &serde_json::to_value(event)?,
            Visibility::Default,
        )?;
    }
    store.refresh(collections::LOGS)
}

#[cfg(test)]
mod tests {
    use super::*;

    use opsgate_core::config::EmbeddingConfig;
    use opsgate_core::models::SearchRequest;
    use opsgate_embeddings::EmbeddingEngine;
    use opsgate_storage::StorageEngine;

    #[test]
    fn all_golden_files_exist() {
        let files = [
            "kb/kb_articles.json",
            "resolutions/resolutions.json",
            "tickets/open_tickets.json",
        ];
        for f in &files {
            assert!(fixture_exists(f), "Missing fixture: {}", f);
        }
    }

    #[test]
    fn golden_documents_carry_ids() {
        for doc in kb_articles().iter().chain(resolutions().iter()) {
            assert!(doc["id"].is_string(), "fixture document without id: {doc}");
        }
        assert_eq!(open_tickets().len(), 3);
    }

    #[test]
    fn seeded_kb_is_searchable_with_vectors() {
        let store = StorageEngine::open_in_memory().unwrap();
        let embedder = EmbeddingEngine::new(&EmbeddingConfig::default()).unwrap();
        let ids = seed_kb(&store, &embedder, &kb_articles()).unwrap();
        assert_eq!(ids[0], "kb-password-reset");

        let doc = store.get(collections::KB_ARTICLES, "kb-invoice").unwrap().unwrap();
        assert!(doc.source.get("id").is_none());
        assert_eq!(
            doc.source[EMBEDDING_FIELD].as_array().map(Vec::len),
            Some(embedder.dimensions())
        );
    }

    #[test]
    fn seeded_logs_are_visible_after_seeding() {
        let store = StorageEngine::open_in_memory().unwrap();
        seed_error_logs(&store, "auth-service", "production", 5, Utc::now()).unwrap();
        let request = SearchRequest::new(
            collections::LOGS,
            opsgate_core::models::SearchQuery::MatchAll,
            10,
        );
        assert_eq!(store.search(&request).unwrap().hits.len(), 5);
    }
}
