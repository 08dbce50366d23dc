//! Grouped counts over a trailing time window.

use rusqlite::types::Value as SqlValue;
use rusqlite::{params_from_iter, Connection};

use opsgate_core::errors::{OpsgateResult, StorageError};
use opsgate_core::models::{AggregateBucket, AggregateRequest};

use super::filters::{self, from_sql_value, json_path, sql_timestamp, SqlFilter};
use crate::sqlite_err;

/// Buckets ordered by count descending, then by key values.
/// Documents missing a group field are not counted.
pub fn aggregate(conn: &Connection, request: &AggregateRequest) -> OpsgateResult<Vec<AggregateBucket>> {
    if request.group_by.is_empty() {
        return Err(StorageError::InvalidQuery {
            reason: "aggregation needs at least one group_by field".to_string(),
        }
        .into());
    }
    let groups = request.group_by.len();
    let mut bound: Vec<SqlValue> = Vec::new();

    // SELECT placeholders come first in the statement.
    let mut select = Vec::with_capacity(groups + 2);
    for field in &request.group_by {
        select.push("json_extract(d.body, ?)".to_string());
        bound.push(SqlValue::Text(json_path(field)));
    }
    select.push("COUNT(*)".to_string());
    match &request.sum_field {
        Some(field) => {
            select.push("SUM(json_extract(d.body, ?))".to_string());
            bound.push(SqlValue::Text(json_path(field)));
        }
        None => select.push("NULL".to_string()),
    }

    bound.push(SqlValue::Text(request.collection.clone()));
    bound.push(SqlValue::Text(json_path(&request.time_field)));
    bound.push(SqlValue::Text(sql_timestamp(&request.since)));
    let mut where_parts = vec![
        "d.collection = ?".to_string(),
        "d.visible = 1".to_string(),
        "julianday(json_extract(d.body, ?)) >= julianday(?)".to_string(),
    ];
    for field in &request.group_by {
        where_parts.push("json_extract(d.body, ?) IS NOT NULL".to_string());
        bound.push(SqlValue::Text(json_path(field)));
    }
    let SqlFilter { clause, params } = filters::compile(&request.filters)?;
    where_parts.push(clause);
    bound.extend(params);

    bound.push(SqlValue::Integer(request.min_count as i64));

    let group_cols = (1..=groups).map(|i| i.to_string()).collect::<Vec<_>>().join(", ");
    let sql = format!(
        "SELECT {} FROM documents d WHERE {} GROUP BY {group_cols} HAVING COUNT(*) >= ?
         ORDER BY COUNT(*) DESC, {group_cols}",
        select.join(", "),
        where_parts.join(" AND "),
    );

    let mut stmt = conn.prepare(&sql).map_err(sqlite_err)?;
    let rows = stmt
        .query_map(params_from_iter(bound.iter()), |row| {
            let mut keys = Vec::with_capacity(groups);
            for i in 0..groups {
                keys.push(from_sql_value(row.get_ref(i)?));
            }
            let count: i64 = row.get(groups)?;
            let sum: Option<f64> = row.get(groups + 1)?;
            Ok(AggregateBucket {
                keys,
                count: count as u64,
                sum,
            })
        })
        .map_err(sqlite_err)?;

    rows.map(|r| r.map_err(sqlite_err)).collect()
}
