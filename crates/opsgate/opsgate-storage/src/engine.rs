//! StorageEngine: owns the connection pool and implements `IDocumentStore`.

use std::path::Path;

use chrono::Utc;
use rusqlite::Connection;
use serde_json::Value;
use tracing::{debug, warn};

use opsgate_core::config::StorageConfig;
use opsgate_core::errors::{OpsgateError, OpsgateResult, StorageError};
use opsgate_core::models::{
    AggregateBucket, AggregateRequest, SearchQuery, SearchRequest, SearchResponse, StoredDocument,
    Visibility,
};
use opsgate_core::traits::IDocumentStore;

use crate::migrations;
use crate::pool::ConnectionPool;
use crate::queries::{aggregation, document_crud, document_search, highlight, refresh, vector_search};

/// Database path that selects in-memory mode.
pub const IN_MEMORY_PATH: &str = ":memory:";

pub struct StorageEngine {
    pool: ConnectionPool,
    refresh_interval_ms: u64,
}

impl StorageEngine {
    /// Open the store described by `config`. `db_path = ":memory:"` opens in-memory.
    pub fn open(config: &StorageConfig) -> OpsgateResult<Self> {
        if config.db_path == IN_MEMORY_PATH {
            return Self::open_in_memory_with(config);
        }
        let pool = ConnectionPool::open(
            Path::new(&config.db_path),
            config.read_pool_size,
            config.busy_timeout_ms,
        )?;
        Self::initialize(pool, config)
    }

    /// In-memory store with default settings. Reads go through the writer.
    pub fn open_in_memory() -> OpsgateResult<Self> {
        Self::open_in_memory_with(&StorageConfig::default())
    }

    pub fn open_in_memory_with(config: &StorageConfig) -> OpsgateResult<Self> {
        let pool = ConnectionPool::open_in_memory(config.busy_timeout_ms)?;
        Self::initialize(pool, config)
    }

    fn initialize(pool: ConnectionPool, config: &StorageConfig) -> OpsgateResult<Self> {
        let version = pool.writer.with_conn(migrations::run_migrations)?;
        debug!(version, path = ?pool.db_path, "document store ready");
        Ok(Self {
            pool,
            refresh_interval_ms: config.refresh_interval_ms,
        })
    }

    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }

    /// Documents in `collection` not yet visible to search.
    pub fn pending_count(&self, collection: &str) -> OpsgateResult<usize> {
        self.with_writer(|conn| refresh::pending_count(conn, collection))
    }

    pub fn count(&self, collection: &str) -> OpsgateResult<usize> {
        self.with_reader(|conn| document_crud::count_documents(conn, collection))
    }

    fn with_writer<F, T>(&self, f: F) -> OpsgateResult<T>
    where
        F: FnOnce(&Connection) -> OpsgateResult<T>,
    {
        self.pool
            .writer
            .with_conn(f)
            .map_err(|e| self.pool.annotate(e))
    }

    /// File-backed: read pool. In-memory: the writer.
    fn with_reader<F, T>(&self, f: F) -> OpsgateResult<T>
    where
        F: FnOnce(&Connection) -> OpsgateResult<T>,
    {
        let result = match &self.pool.readers {
            Some(readers) => readers.with_conn(f),
            None => self.pool.writer.with_conn(f),
        };
        result.map_err(|e| self.pool.annotate(e))
    }

    /// Publish pending writes older than the refresh interval.
    fn auto_refresh(&self, collection: &str) -> OpsgateResult<()> {
        let cutoff = Utc::now().timestamp_millis() - self.refresh_interval_ms as i64;
        let published = self.with_writer(|conn| refresh::refresh_elapsed(conn, collection, cutoff))?;
        if published > 0 {
            debug!(collection, published, "interval refresh");
        }
        Ok(())
    }
}

impl IDocumentStore for StorageEngine {
    fn write(
        &self,
        collection: &str,
        id: Option<&str>,
        body: &Value,
        visibility: Visibility,
    ) -> OpsgateResult<String> {
        let id = match id {
            Some(id) => id.to_string(),
            None => uuid::Uuid::new_v4().simple().to_string(),
        };
        let immediate = visibility == Visibility::Immediate;
        let now_ms = Utc::now().timestamp_millis();
        self.with_writer(|conn| {
            document_crud::upsert_document(conn, collection, &id, body, immediate, now_ms)?;
            if immediate {
                refresh::refresh_collection(conn, collection)?;
            }
            Ok(())
        })?;
        debug!(collection, id = %id, ?visibility, "document written");
        Ok(id)
    }

    fn update(
        &self,
        collection: &str,
        id: &str,
        patch: &Value,
        visibility: Visibility,
    ) -> OpsgateResult<()> {
        let Some(patch_fields) = patch.as_object() else {
            return Err(StorageError::InvalidQuery {
                reason: "update patch must be a JSON object".to_string(),
            }
            .into());
        };
        self.with_writer(|conn| {
            let Some(existing) = document_crud::get_document(conn, collection, id)? else {
                return Err(OpsgateError::not_found(collection, id));
            };
            let mut body = existing.source;
            let Some(fields) = body.as_object_mut() else {
                return Err(StorageError::CorruptDocument {
                    collection: collection.to_string(),
                    id: id.to_string(),
                    reason: "stored body is not an object".to_string(),
                }
                .into());
            };
            for (key, value) in patch_fields {
                fields.insert(key.clone(), value.clone());
            }
            if !document_crud::replace_body(conn, collection, id, &body)? {
                return Err(OpsgateError::not_found(collection, id));
            }
            if visibility == Visibility::Immediate {
                refresh::refresh_collection(conn, collection)?;
            }
            Ok(())
        })?;
        debug!(collection, id, fields = patch_fields.len(), "document updated");
        Ok(())
    }

    fn get(&self, collection: &str, id: &str) -> OpsgateResult<Option<StoredDocument>> {
        self.with_reader(|conn| document_crud::get_document(conn, collection, id))
    }

    fn search(&self, request: &SearchRequest) -> OpsgateResult<SearchResponse> {
        self.auto_refresh(&request.collection)?;
        let collection = request.collection.as_str();
        let (mut response, terms) = self.with_reader(|conn| match &request.query {
            SearchQuery::MatchAll => Ok((
                document_search::filter_search(
                    conn,
                    collection,
                    &[],
                    request.sort.as_ref(),
                    request.from,
                    request.size,
                )?,
                Vec::new(),
            )),
            SearchQuery::Filter(filters) => Ok((
                document_search::filter_search(
                    conn,
                    collection,
                    filters,
                    request.sort.as_ref(),
                    request.from,
                    request.size,
                )?,
                Vec::new(),
            )),
            SearchQuery::Lexical(query) => {
                let result = document_search::lexical_search(
                    conn,
                    collection,
                    query,
                    request.from,
                    request.size,
                )?;
                Ok((result.response, result.terms))
            }
            SearchQuery::Knn(query) => {
                let hits = vector_search::knn(conn, collection, query)?;
                let total = hits.len();
                let hits = hits.into_iter().skip(request.from).take(request.size).collect();
                Ok((SearchResponse { hits, total }, Vec::new()))
            }
        })?;

        if let Some(hl) = &request.highlight {
            highlight::apply(&mut response.hits, hl, &terms);
        }
        debug!(collection, hits = response.hits.len(), total = response.total, "search");
        Ok(response)
    }

    fn aggregate(&self, request: &AggregateRequest) -> OpsgateResult<Vec<AggregateBucket>> {
        self.auto_refresh(&request.collection)?;
        let buckets = self.with_reader(|conn| aggregation::aggregate(conn, request))?;
        debug!(collection = %request.collection, buckets = buckets.len(), "aggregate");
        Ok(buckets)
    }

    fn refresh(&self, collection: &str) -> OpsgateResult<()> {
        let published = self.with_writer(|conn| refresh::refresh_collection(conn, collection))?;
        if published == 0 {
            debug!(collection, "refresh with nothing pending");
        }
        Ok(())
    }
}

impl Drop for StorageEngine {
    fn drop(&mut self) {
        if self.pool.db_path.is_none() {
            return;
        }
        let checkpoint = self.pool.writer.with_conn(|conn| {
            conn.execute_batch("PRAGMA wal_checkpoint(PASSIVE);")
                .map_err(crate::sqlite_err)
        });
        if let Err(e) = checkpoint {
            warn!(error = %e, "wal checkpoint on close failed");
        }
    }
}
