// Single source of truth for all default values.

// --- Storage ---
pub const DEFAULT_DB_FILENAME: &str = "opsgate.db";
pub const DEFAULT_BUSY_TIMEOUT_MS: u32 = 5_000;
pub const DEFAULT_READ_POOL_SIZE: usize = 4;
pub const DEFAULT_REFRESH_INTERVAL_MS: u64 = 1_000;

// --- Embeddings ---
pub const DEFAULT_EMBEDDING_PROVIDER: &str = "hash";
pub const DEFAULT_EMBEDDING_DIMENSIONS: usize = 384;
pub const DEFAULT_L1_CACHE_SIZE: u64 = 10_000;

// --- Retrieval ---
pub const DEFAULT_RRF_K: u32 = 60;
pub const DEFAULT_SEARCH_K: usize = 10;
pub const DEFAULT_KNN_NUM_CANDIDATES: usize = 50;
pub const DEFAULT_HYBRID_NUM_CANDIDATES: usize = 100;
pub const DEFAULT_HIGHLIGHT_FRAGMENT_SIZE: usize = 150;
pub const DEFAULT_LISTING_PAGE_SIZE: usize = 50;

// --- Detection ---
pub const DEFAULT_SPIKE_WINDOW_SECS: i64 = 300; // 5 minutes
pub const DEFAULT_SPIKE_THRESHOLD: u64 = 40;
pub const DEFAULT_INCIDENT_DEDUP_WINDOW_SECS: i64 = 600; // 10 minutes
pub const DEFAULT_CRITICAL_ERROR_COUNT: u64 = 500;
pub const DEFAULT_MTTA_SECONDS: f64 = 30.0;

// --- Triage ---
pub const DEFAULT_DUPLICATE_SIMILARITY_THRESHOLD: f64 = 0.95;
pub const DEFAULT_MIN_CITATIONS: usize = 2;
pub const DEFAULT_DEDUPE_K: usize = 5;
pub const DEFAULT_KB_K: usize = 5;
pub const DEFAULT_RESOLUTION_K: usize = 5;
pub const DEFAULT_CITATIONS_PER_SOURCE: usize = 2;
pub const DEFAULT_TIME_SAVED_PER_DUPLICATE_MINUTES: f64 = 15.0;

// --- Observability ---
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_JSON_LOGS: bool = true;
pub const DEFAULT_METRICS_SUMMARY_DAYS: i64 = 7;
