//! PRAGMA configuration applied to every SQLite connection.

use rusqlite::Connection;

use opsgate_core::errors::OpsgateResult;

use crate::sqlite_err;

/// WAL, NORMAL sync, 64MB cache, configured busy timeout.
pub fn apply_pragmas(conn: &Connection, busy_timeout_ms: u32) -> OpsgateResult<()> {
    conn.execute_batch(&format!(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA cache_size = -64000;
        PRAGMA busy_timeout = {busy_timeout_ms};
        PRAGMA foreign_keys = ON;
        "
    ))
    .map_err(sqlite_err)?;
    Ok(())
}

/// Read connections only need the timeout and a cache.
pub fn apply_read_pragmas(conn: &Connection, busy_timeout_ms: u32) -> OpsgateResult<()> {
    conn.execute_batch(&format!(
        "
        PRAGMA cache_size = -16000;
        PRAGMA busy_timeout = {busy_timeout_ms};
        PRAGMA query_only = ON;
        "
    ))
    .map_err(sqlite_err)?;
    Ok(())
}

pub fn verify_wal_mode(conn: &Connection) -> OpsgateResult<bool> {
    let mode: String = conn
        .pragma_query_value(None, "journal_mode", |row| row.get(0))
        .map_err(sqlite_err)?;
    Ok(mode.eq_ignore_ascii_case("wal"))
}
