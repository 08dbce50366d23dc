//! Schema migrations, tracked with `PRAGMA user_version`.

mod v001_document_tables;
mod v002_fts_index;

use rusqlite::Connection;
use tracing::info;

use opsgate_core::errors::{OpsgateResult, StorageError};

use crate::sqlite_err;

type Migration = fn(&Connection) -> OpsgateResult<()>;

const MIGRATIONS: &[(u32, Migration)] = &[
    (1, v001_document_tables::migrate),
    (2, v002_fts_index::migrate),
];

/// Latest schema version.
pub const LATEST_VERSION: u32 = 2;

pub fn current_version(conn: &Connection) -> OpsgateResult<u32> {
    conn.pragma_query_value(None, "user_version", |row| row.get(0))
        .map_err(sqlite_err)
}

/// Apply every migration above the stored version, each in its own transaction.
pub fn run_migrations(conn: &Connection) -> OpsgateResult<u32> {
    let current = current_version(conn)?;
    for (version, migrate) in MIGRATIONS.iter().filter(|(v, _)| *v > current) {
        let tx = conn.unchecked_transaction().map_err(sqlite_err)?;
        migrate(&tx).map_err(|e| StorageError::MigrationFailed {
            version: *version,
            reason: e.to_string(),
        })?;
        tx.pragma_update(None, "user_version", version)
            .map_err(sqlite_err)?;
        tx.commit().map_err(sqlite_err)?;
        info!(version, "applied migration");
    }
    current_version(conn)
}
