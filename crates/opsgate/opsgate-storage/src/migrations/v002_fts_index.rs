//! v002: FTS5 index over string fields, plus its vocabulary for fuzzy expansion.

use rusqlite::Connection;

use opsgate_core::errors::OpsgateResult;

use crate::sqlite_err;

pub fn migrate(conn: &Connection) -> OpsgateResult<()> {
    conn.execute_batch(
        "
        CREATE VIRTUAL TABLE IF NOT EXISTS document_fts USING fts5(
            collection UNINDEXED,
            doc_id UNINDEXED,
            field UNINDEXED,
            text,
            tokenize = 'unicode61'
        );

        CREATE VIRTUAL TABLE IF NOT EXISTS document_fts_vocab
            USING fts5vocab(document_fts, row);
        ",
    )
    .map_err(sqlite_err)?;
    Ok(())
}
