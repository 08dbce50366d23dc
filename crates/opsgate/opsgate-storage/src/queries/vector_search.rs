//! Brute-force cosine kNN over stored vectors.

use std::cmp::Ordering;

use rusqlite::types::Value as SqlValue;
use rusqlite::{params_from_iter, Connection};

use opsgate_core::errors::OpsgateResult;
use opsgate_core::models::{KnnQuery, SearchHit};

use super::document_crud::parse_body;
use super::filters::{self, SqlFilter};
use crate::sqlite_err;

/// Top `k` documents of `collection` by cosine similarity to the query
/// vector, after pre-filtering. The score is the raw cosine similarity.
/// Vectors of a different dimension are skipped.
pub fn knn(conn: &Connection, collection: &str, query: &KnnQuery) -> OpsgateResult<Vec<SearchHit>> {
    if query.k == 0 || vector_norm(&query.vector) == 0.0 {
        return Ok(Vec::new());
    }

    let SqlFilter { clause, params } = filters::compile(&query.filter)?;
    let sql = format!(
        "SELECT d.id, d.body, v.dimensions, v.vector
         FROM document_vectors v
         JOIN documents d ON d.collection = v.collection AND d.id = v.doc_id
         WHERE v.collection = ? AND v.field = ? AND d.visible = 1 AND {clause}"
    );
    let mut bound = vec![
        SqlValue::Text(collection.to_string()),
        SqlValue::Text(query.field.clone()),
    ];
    bound.extend(params);

    let mut stmt = conn.prepare(&sql).map_err(sqlite_err)?;
    let rows = stmt
        .query_map(params_from_iter(bound.iter()), |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, Vec<u8>>(3)?,
            ))
        })
        .map_err(sqlite_err)?;

    let query_len = query.vector.len();
    let mut scored: Vec<(String, String, f64)> = Vec::new();
    for row in rows {
        let (id, body, dims, blob) = row.map_err(sqlite_err)?;
        if dims as usize != query_len {
            continue;
        }
        let stored = bytes_to_f32_vec(&blob, query_len);
        scored.push((id, body, cosine_similarity(&query.vector, &stored)));
    }

    scored.sort_by(|a, b| {
        b.2.partial_cmp(&a.2)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    scored.truncate(query.k);

    let mut hits = Vec::with_capacity(scored.len());
    for (id, body, score) in scored {
        let source = parse_body(collection, &id, &body)?;
        hits.push(SearchHit {
            id,
            score,
            source,
            highlights: Vec::new(),
        });
    }
    Ok(hits)
}

/// f32 slice to little-endian bytes.
pub fn f32_vec_to_bytes(v: &[f32]) -> Vec<u8> {
    v.iter().flat_map(|f| f.to_le_bytes()).collect()
}

pub fn bytes_to_f32_vec(bytes: &[u8], expected_dims: usize) -> Vec<f32> {
    let mut result = Vec::with_capacity(expected_dims);
    for chunk in bytes.chunks_exact(4) {
        result.push(f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]));
    }
    result
}

fn vector_norm(v: &[f32]) -> f64 {
    v.iter().map(|x| (*x as f64) * (*x as f64)).sum::<f64>().sqrt()
}

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b.iter()) {
        let (x, y) = (*x as f64, *y as f64);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom == 0.0 {
        0.0
    } else {
        dot / denom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_roundtrip() {
        let v = vec![0.25f32, -1.5, 3.0];
        assert_eq!(bytes_to_f32_vec(&f32_vec_to_bytes(&v), 3), v);
    }

    #[test]
    fn cosine_of_identical_vectors_is_one() {
        let v = [0.3f32, 0.4, 0.5];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn cosine_with_zero_vector_is_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }
}
