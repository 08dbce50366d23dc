//! Connection pool: one write connection plus a round-robin read pool.

pub mod pragmas;
pub mod read_pool;
pub mod write_connection;

use std::path::{Path, PathBuf};

use opsgate_core::errors::{OpsgateError, OpsgateResult, StorageError};

pub use read_pool::ReadPool;
pub use write_connection::WriteConnection;

pub struct ConnectionPool {
    pub writer: WriteConnection,
    /// `None` in in-memory mode, where every read goes through the writer.
    pub readers: Option<ReadPool>,
    pub db_path: Option<PathBuf>,
    busy_timeout_ms: u32,
}

impl ConnectionPool {
    pub fn open(path: &Path, read_pool_size: usize, busy_timeout_ms: u32) -> OpsgateResult<Self> {
        let writer = WriteConnection::open(path, busy_timeout_ms)?;
        let readers = ReadPool::open(path, read_pool_size, busy_timeout_ms)?;
        Ok(Self {
            writer,
            readers: Some(readers),
            db_path: Some(path.to_path_buf()),
            busy_timeout_ms,
        })
    }

    /// Single-connection in-memory pool.
    pub fn open_in_memory(busy_timeout_ms: u32) -> OpsgateResult<Self> {
        let writer = WriteConnection::open_in_memory(busy_timeout_ms)?;
        Ok(Self {
            writer,
            readers: None,
            db_path: None,
            busy_timeout_ms,
        })
    }

    pub fn busy_timeout_ms(&self) -> u32 {
        self.busy_timeout_ms
    }

    /// Stamp the configured timeout onto busy errors.
    pub(crate) fn annotate(&self, err: OpsgateError) -> OpsgateError {
        match err {
            OpsgateError::StorageError(StorageError::Busy { .. }) => StorageError::Busy {
                timeout_ms: self.busy_timeout_ms,
            }
            .into(),
            other => other,
        }
    }
}
