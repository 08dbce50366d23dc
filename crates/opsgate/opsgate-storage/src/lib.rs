//! # opsgate-storage
//!
//! SQLite implementation of the `IDocumentStore` port.
//! JSON documents per collection, FTS5 for lexical scoring, brute-force
//! cosine for vectors, `GROUP BY` for aggregation, and a refresh flag that
//! emulates near-real-time search visibility.

pub mod engine;
pub mod migrations;
pub mod pool;
pub mod queries;

pub use engine::StorageEngine;

use opsgate_core::errors::{OpsgateError, StorageError};
use rusqlite::ErrorCode;

/// Wrap an error message as a storage error.
pub(crate) fn to_storage_err(message: impl Into<String>) -> OpsgateError {
    StorageError::SqliteError {
        message: message.into(),
    }
    .into()
}

/// Map a rusqlite error, keeping busy and locked failures distinguishable.
/// The pool fills in the configured timeout.
pub(crate) fn sqlite_err(e: rusqlite::Error) -> OpsgateError {
    match e.sqlite_error_code() {
        Some(ErrorCode::DatabaseBusy) | Some(ErrorCode::DatabaseLocked) => {
            StorageError::Busy { timeout_ms: 0 }.into()
        }
        _ => to_storage_err(e.to_string()),
    }
}
