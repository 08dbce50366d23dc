//! The single serialized write connection.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::Connection;

use opsgate_core::errors::OpsgateResult;

use super::pragmas::apply_pragmas;
use crate::{sqlite_err, to_storage_err};

pub struct WriteConnection {
    conn: Mutex<Connection>,
}

impl WriteConnection {
    pub fn open(path: &Path, busy_timeout_ms: u32) -> OpsgateResult<Self> {
        let conn = Connection::open(path).map_err(sqlite_err)?;
        apply_pragmas(&conn, busy_timeout_ms)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory(busy_timeout_ms: u32) -> OpsgateResult<Self> {
        let conn = Connection::open_in_memory().map_err(sqlite_err)?;
        apply_pragmas(&conn, busy_timeout_ms)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run `f` with exclusive access to the writer.
    pub fn with_conn<F, T>(&self, f: F) -> OpsgateResult<T>
    where
        F: FnOnce(&Connection) -> OpsgateResult<T>,
    {
        let guard = self
            .conn
            .lock()
            .map_err(|e| to_storage_err(format!("writer lock poisoned: {e}")))?;
        f(&guard)
    }
}
