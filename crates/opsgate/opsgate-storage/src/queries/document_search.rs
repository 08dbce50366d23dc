//! Structured and FTS5 lexical search over documents.

use std::cmp::Ordering;
use std::collections::HashMap;

use rusqlite::types::Value as SqlValue;
use rusqlite::{params_from_iter, Connection};

use opsgate_core::errors::OpsgateResult;
use opsgate_core::models::{Filter, LexicalQuery, SearchHit, SearchResponse, SortField};

use super::document_crud::parse_body;
use super::filters::{self, json_path, SqlFilter};
use super::{fuzzy, tokens};
use crate::sqlite_err;

/// Filter-only search. Every hit scores 1.0. Ordered by `sort`, else insertion order.
/// Sort ties fall back to insertion order in the sort's direction, so a
/// descending sort puts the latest write first when julianday (millisecond
/// resolution) cannot separate two timestamps.
pub fn filter_search(
    conn: &Connection,
    collection: &str,
    filter: &[Filter],
    sort: Option<&SortField>,
    from: usize,
    size: usize,
) -> OpsgateResult<SearchResponse> {
    let SqlFilter { clause, params } = filters::compile(filter)?;
    let mut bound = vec![SqlValue::Text(collection.to_string())];
    bound.extend(params);

    let where_sql = format!("d.collection = ? AND d.visible = 1 AND {clause}");
    let total: i64 = conn
        .query_row(
            &format!("SELECT COUNT(*) FROM documents d WHERE {where_sql}"),
            params_from_iter(bound.iter()),
            |row| row.get(0),
        )
        .map_err(sqlite_err)?;

    let order_sql = match sort {
        Some(s) => {
            let dir = if s.descending { "DESC" } else { "ASC" };
            if s.field == "_id" {
                format!("d.id {dir}, d.seq {dir}")
            } else {
                bound.push(SqlValue::Text(json_path(&s.field)));
                if s.temporal {
                    format!("julianday(json_extract(d.body, ?)) {dir}, d.seq {dir}")
                } else {
                    format!("json_extract(d.body, ?) {dir}, d.seq {dir}")
                }
            }
        }
        None => "d.seq ASC".to_string(),
    };
    bound.push(SqlValue::Integer(sql_count(size)));
    bound.push(SqlValue::Integer(sql_count(from)));

    let sql = format!(
        "SELECT d.id, d.body FROM documents d WHERE {where_sql} ORDER BY {order_sql} LIMIT ? OFFSET ?"
    );
    let mut stmt = conn.prepare(&sql).map_err(sqlite_err)?;
    let rows = stmt
        .query_map(params_from_iter(bound.iter()), |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })
        .map_err(sqlite_err)?;

    let mut hits = Vec::new();
    for row in rows {
        let (id, body) = row.map_err(sqlite_err)?;
        let source = parse_body(collection, &id, &body)?;
        hits.push(SearchHit {
            id,
            score: 1.0,
            source,
            highlights: Vec::new(),
        });
    }
    Ok(SearchResponse {
        hits,
        total: total as usize,
    })
}

/// SQLite reads a negative LIMIT as unbounded; saturate instead of wrapping.
fn sql_count(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

/// Result of a lexical search: the page of hits plus the terms that matched,
/// used for highlighting.
pub struct LexicalResult {
    pub response: SearchResponse,
    pub terms: Vec<String>,
}

/// Best-field BM25: a document's score is the maximum over the queried fields
/// of `boost * -bm25`. Ties break by id.
pub fn lexical_search(
    conn: &Connection,
    collection: &str,
    query: &LexicalQuery,
    from: usize,
    size: usize,
) -> OpsgateResult<LexicalResult> {
    let base_terms = tokens::tokenize(&query.text);
    if base_terms.is_empty() || query.fields.is_empty() {
        return Ok(LexicalResult {
            response: SearchResponse::default(),
            terms: base_terms,
        });
    }
    let terms = fuzzy::expand_terms(conn, &base_terms, query.fuzziness)?;
    let match_expr = terms
        .iter()
        .map(|t| format!("\"{}\"", t.replace('"', "\"\"")))
        .collect::<Vec<_>>()
        .join(" OR ");

    let boosts: HashMap<&str, f64> = query
        .fields
        .iter()
        .map(|f| (f.field.as_str(), f.boost))
        .collect();
    let field_placeholders = vec!["?"; query.fields.len()].join(", ");

    let SqlFilter { clause, params } = filters::compile(&query.filter)?;
    let mut bound = vec![
        SqlValue::Text(match_expr),
        SqlValue::Text(collection.to_string()),
    ];
    bound.extend(query.fields.iter().map(|f| SqlValue::Text(f.field.clone())));
    bound.extend(params);

    let sql = format!(
        "SELECT document_fts.doc_id, document_fts.field, document_fts.rank, d.body
         FROM document_fts
         JOIN documents d ON d.collection = document_fts.collection AND d.id = document_fts.doc_id
         WHERE document_fts MATCH ?
           AND document_fts.collection = ?
           AND d.visible = 1
           AND document_fts.field IN ({field_placeholders})
           AND {clause}"
    );
    let mut stmt = conn.prepare(&sql).map_err(sqlite_err)?;
    let rows = stmt
        .query_map(params_from_iter(bound.iter()), |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, f64>(2)?,
                row.get::<_, String>(3)?,
            ))
        })
        .map_err(sqlite_err)?;

    let mut best: HashMap<String, (f64, String)> = HashMap::new();
    for row in rows {
        let (id, field, rank, body) = row.map_err(sqlite_err)?;
        let score = -rank * boosts.get(field.as_str()).copied().unwrap_or(1.0);
        match best.get_mut(&id) {
            Some(entry) if entry.0 >= score => {}
            Some(entry) => entry.0 = score,
            None => {
                best.insert(id, (score, body));
            }
        }
    }

    let total = best.len();
    let mut ranked: Vec<(String, f64, String)> = best
        .into_iter()
        .map(|(id, (score, body))| (id, score, body))
        .collect();
    ranked.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });

    let mut hits = Vec::new();
    for (id, score, body) in ranked.into_iter().skip(from).take(size) {
        let source = parse_body(collection, &id, &body)?;
        hits.push(SearchHit {
            id,
            score,
            source,
            highlights: Vec::new(),
        });
    }
    Ok(LexicalResult {
        response: SearchResponse { hits, total },
        terms,
    })
}
