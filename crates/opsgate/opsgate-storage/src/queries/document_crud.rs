//! Insert, replace, get, and index maintenance for documents.

use rusqlite::{params, Connection, OptionalExtension};
use serde_json::{Map, Value};

use opsgate_core::errors::{OpsgateResult, StorageError};
use opsgate_core::models::StoredDocument;

use super::vector_search::f32_vec_to_bytes;
use crate::sqlite_err;

/// Insert or replace a document and rebuild its text and vector index rows.
/// All-or-nothing.
pub fn upsert_document(
    conn: &Connection,
    collection: &str,
    id: &str,
    body: &Value,
    visible: bool,
    now_ms: i64,
) -> OpsgateResult<()> {
    let fields = as_object(body)?;
    let body_text = serde_json::to_string(body)?;

    let tx = conn.unchecked_transaction().map_err(sqlite_err)?;
    tx.execute(
        "INSERT INTO documents (collection, id, body, visible, written_at_ms)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(collection, id) DO UPDATE SET
            body = excluded.body,
            visible = excluded.visible,
            written_at_ms = excluded.written_at_ms",
        params![collection, id, body_text, visible as i32, now_ms],
    )
    .map_err(sqlite_err)?;
    reindex(&tx, collection, id, fields)?;
    tx.commit().map_err(sqlite_err)?;
    Ok(())
}

/// Replace the body of an existing document, keeping its visibility state.
/// Returns false when the document does not exist.
pub fn replace_body(
    conn: &Connection,
    collection: &str,
    id: &str,
    body: &Value,
) -> OpsgateResult<bool> {
    let fields = as_object(body)?;
    let body_text = serde_json::to_string(body)?;

    let tx = conn.unchecked_transaction().map_err(sqlite_err)?;
    let changed = tx
        .execute(
            "UPDATE documents SET body = ?3 WHERE collection = ?1 AND id = ?2",
            params![collection, id, body_text],
        )
        .map_err(sqlite_err)?;
    if changed == 0 {
        return Ok(false);
    }
    reindex(&tx, collection, id, fields)?;
    tx.commit().map_err(sqlite_err)?;
    Ok(true)
}

pub fn get_document(
    conn: &Connection,
    collection: &str,
    id: &str,
) -> OpsgateResult<Option<StoredDocument>> {
    let body: Option<String> = conn
        .query_row(
            "SELECT body FROM documents WHERE collection = ?1 AND id = ?2",
            params![collection, id],
            |row| row.get(0),
        )
        .optional()
        .map_err(sqlite_err)?;

    match body {
        Some(text) => Ok(Some(StoredDocument {
            collection: collection.to_string(),
            id: id.to_string(),
            source: parse_body(collection, id, &text)?,
        })),
        None => Ok(None),
    }
}

pub fn count_documents(conn: &Connection, collection: &str) -> OpsgateResult<usize> {
    let n: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM documents WHERE collection = ?1",
            params![collection],
            |row| row.get(0),
        )
        .map_err(sqlite_err)?;
    Ok(n as usize)
}

pub fn parse_body(collection: &str, id: &str, text: &str) -> OpsgateResult<Value> {
    serde_json::from_str(text).map_err(|e| {
        StorageError::CorruptDocument {
            collection: collection.to_string(),
            id: id.to_string(),
            reason: e.to_string(),
        }
        .into()
    })
}

fn as_object(body: &Value) -> OpsgateResult<&Map<String, Value>> {
    body.as_object().ok_or_else(|| {
        StorageError::InvalidQuery {
            reason: "document body must be a JSON object".to_string(),
        }
        .into()
    })
}

/// String fields (and arrays of strings) go to FTS; numeric arrays become vectors.
fn reindex(
    conn: &Connection,
    collection: &str,
    id: &str,
    fields: &Map<String, Value>,
) -> OpsgateResult<()> {
    conn.execute(
        "DELETE FROM document_fts WHERE collection = ?1 AND doc_id = ?2",
        params![collection, id],
    )
    .map_err(sqlite_err)?;
    conn.execute(
        "DELETE FROM document_vectors WHERE collection = ?1 AND doc_id = ?2",
        params![collection, id],
    )
    .map_err(sqlite_err)?;

    let mut insert_text = conn
        .prepare_cached(
            "INSERT INTO document_fts (collection, doc_id, field, text) VALUES (?1, ?2, ?3, ?4)",
        )
        .map_err(sqlite_err)?;
    let mut insert_vector = conn
        .prepare_cached(
            "INSERT INTO document_vectors (collection, doc_id, field, dimensions, vector)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .map_err(sqlite_err)?;

    for (field, value) in fields {
        if let Some(text) = searchable_text(value) {
            insert_text
                .execute(params![collection, id, field, text])
                .map_err(sqlite_err)?;
        } else if let Some(vector) = numeric_vector(value) {
            insert_vector
                .execute(params![
                    collection,
                    id,
                    field,
                    vector.len() as i64,
                    f32_vec_to_bytes(&vector)
                ])
                .map_err(sqlite_err)?;
        }
    }
    Ok(())
}

fn searchable_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Array(items) if !items.is_empty() && items.iter().all(Value::is_string) => Some(
            items
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join(" "),
        ),
        _ => None,
    }
}

fn numeric_vector(value: &Value) -> Option<Vec<f32>> {
    let items = value.as_array()?;
    if items.is_empty() {
        return None;
    }
    items.iter().map(|v| v.as_f64().map(|f| f as f32)).collect()
}
