use serde_json::Value;

use crate::errors::OpsgateResult;
use crate::models::{
    AggregateBucket, AggregateRequest, SearchRequest, SearchResponse, StoredDocument, Visibility,
};

/// Document store port: named collections of JSON documents with
/// structured, lexical, and vector search.
pub trait IDocumentStore: Send + Sync {
    // --- Writes ---

    /// Insert or replace a document. A missing id is generated. Returns the id.
    fn write(
        &self,
        collection: &str,
        id: Option<&str>,
        body: &Value,
        visibility: Visibility,
    ) -> OpsgateResult<String>;

    /// Merge `patch` into the top-level fields of an existing document.
    /// Fails with `NotFound` when the document does not exist.
    fn update(
        &self,
        collection: &str,
        id: &str,
        patch: &Value,
        visibility: Visibility,
    ) -> OpsgateResult<()>;

    // --- Reads ---

    /// Real-time lookup by id, independent of refresh state.
    fn get(&self, collection: &str, id: &str) -> OpsgateResult<Option<StoredDocument>>;

    fn search(&self, request: &SearchRequest) -> OpsgateResult<SearchResponse>;

    fn aggregate(&self, request: &AggregateRequest) -> OpsgateResult<Vec<AggregateBucket>>;

    // --- Maintenance ---

    /// Make every pending write in `collection` visible to searches.
    fn refresh(&self, collection: &str) -> OpsgateResult<()>;
}
