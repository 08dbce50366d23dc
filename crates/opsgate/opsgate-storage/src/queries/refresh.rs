//! Visibility flips for pending writes.

use rusqlite::{params, Connection};

use opsgate_core::errors::OpsgateResult;

use crate::sqlite_err;

/// Make every pending document in `collection` searchable.
pub fn refresh_collection(conn: &Connection, collection: &str) -> OpsgateResult<usize> {
    conn.execute(
        "UPDATE documents SET visible = 1 WHERE collection = ?1 AND visible = 0",
        params![collection],
    )
    .map_err(sqlite_err)
}

/// Make pending documents written at or before `cutoff_ms` searchable.
pub fn refresh_elapsed(conn: &Connection, collection: &str, cutoff_ms: i64) -> OpsgateResult<usize> {
    conn.execute(
        "UPDATE documents SET visible = 1
         WHERE collection = ?1 AND visible = 0 AND written_at_ms <= ?2",
        params![collection, cutoff_ms],
    )
    .map_err(sqlite_err)
}

pub fn pending_count(conn: &Connection, collection: &str) -> OpsgateResult<usize> {
    let n: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM documents WHERE collection = ?1 AND visible = 0",
            params![collection],
            |row| row.get(0),
        )
        .map_err(sqlite_err)?;
    Ok(n as usize)
}
