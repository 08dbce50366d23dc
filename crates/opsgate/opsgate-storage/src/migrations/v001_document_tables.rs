//! v001: documents and their extracted vectors.

use rusqlite::Connection;

use opsgate_core::errors::OpsgateResult;

use crate::sqlite_err;

pub fn migrate(conn: &Connection) -> OpsgateResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS documents (
            seq            INTEGER PRIMARY KEY AUTOINCREMENT,
            collection     TEXT NOT NULL,
            id             TEXT NOT NULL,
            body           TEXT NOT NULL,
            visible        INTEGER NOT NULL DEFAULT 0,
            written_at_ms  INTEGER NOT NULL,
            UNIQUE (collection, id)
        );

        CREATE INDEX IF NOT EXISTS idx_documents_pending
            ON documents(collection, visible, written_at_ms);

        CREATE TABLE IF NOT EXISTS document_vectors (
            collection  TEXT NOT NULL,
            doc_id      TEXT NOT NULL,
            field       TEXT NOT NULL,
            dimensions  INTEGER NOT NULL,
            vector      BLOB NOT NULL,
            PRIMARY KEY (collection, doc_id, field)
        );
        ",
    )
    .map_err(sqlite_err)?;
    Ok(())
}
