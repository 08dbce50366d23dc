//! Compiles structured filters into SQL over `documents d`.

use rusqlite::types::{Value as SqlValue, ValueRef};
use serde_json::Value;

use opsgate_core::errors::{OpsgateResult, StorageError};
use opsgate_core::models::{Filter, RangeBound};

/// A boolean SQL expression and its positional parameters.
#[derive(Debug, Default)]
pub struct SqlFilter {
    pub clause: String,
    pub params: Vec<SqlValue>,
}

/// JSON path addressing a top-level field.
pub fn json_path(field: &str) -> String {
    format!("$.\"{}\"", field.replace('"', "\\\""))
}

/// AND of all filters. An empty slice compiles to `1`.
pub fn compile(filters: &[Filter]) -> OpsgateResult<SqlFilter> {
    let mut params = Vec::new();
    let mut parts = Vec::with_capacity(filters.len());
    for filter in filters {
        parts.push(compile_one(filter, &mut params)?);
    }
    let clause = if parts.is_empty() {
        "1".to_string()
    } else {
        parts.join(" AND ")
    };
    Ok(SqlFilter { clause, params })
}

fn compile_one(filter: &Filter, params: &mut Vec<SqlValue>) -> OpsgateResult<String> {
    match filter {
        Filter::IdEquals(id) => {
            params.push(SqlValue::Text(id.clone()));
            Ok("d.id = ?".to_string())
        }
        Filter::Term { field, value } if field == "_id" => {
            params.push(to_sql_value(value)?);
            Ok("d.id = ?".to_string())
        }
        Filter::Term { field, value } => {
            // json_each yields the scalar itself for non-array fields.
            params.push(SqlValue::Text(json_path(field)));
            params.push(to_sql_value(value)?);
            Ok("EXISTS (SELECT 1 FROM json_each(d.body, ?) je WHERE je.value = ?)".to_string())
        }
        Filter::Terms { values, .. } if values.is_empty() => Ok("0".to_string()),
        Filter::Terms { field, values } => {
            let placeholders = vec!["?"; values.len()].join(", ");
            if field == "_id" {
                for v in values {
                    params.push(to_sql_value(v)?);
                }
                return Ok(format!("d.id IN ({placeholders})"));
            }
            params.push(SqlValue::Text(json_path(field)));
            for v in values {
                params.push(to_sql_value(v)?);
            }
            Ok(format!(
                "EXISTS (SELECT 1 FROM json_each(d.body, ?) je WHERE je.value IN ({placeholders}))"
            ))
        }
        Filter::Range { field, gte, lte } => {
            let mut bounds = Vec::new();
            for (op, bound) in [(">=", gte), ("<=", lte)] {
                let Some(bound) = bound else { continue };
                params.push(SqlValue::Text(json_path(field)));
                match bound {
                    RangeBound::Time(t) => {
                        params.push(SqlValue::Text(sql_timestamp(t)));
                        bounds.push(format!("julianday(json_extract(d.body, ?)) {op} julianday(?)"));
                    }
                    RangeBound::Number(n) => {
                        params.push(SqlValue::Real(*n));
                        bounds.push(format!("json_extract(d.body, ?) {op} ?"));
                    }
                }
            }
            if bounds.is_empty() {
                return Err(StorageError::InvalidQuery {
                    reason: format!("range on {field} has no bounds"),
                }
                .into());
            }
            Ok(format!("({})", bounds.join(" AND ")))
        }
        Filter::MustNot(inner) => {
            let inner = compile_one(inner, params)?;
            // Missing fields compare as NULL; treat them as not matching.
            Ok(format!("NOT COALESCE(({inner}), 0)"))
        }
    }
}

/// Timestamp text that SQLite's `julianday` parses.
pub fn sql_timestamp(t: &chrono::DateTime<chrono::Utc>) -> String {
    t.to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}

/// Scalar JSON to a SQL parameter. Booleans become 0/1 as `json_extract` returns them.
pub fn to_sql_value(v: &Value) -> OpsgateResult<SqlValue> {
    match v {
        Value::Null => Ok(SqlValue::Null),
        Value::Bool(b) => Ok(SqlValue::Integer(i64::from(*b))),
        Value::Number(n) => Ok(match n.as_i64() {
            Some(i) => SqlValue::Integer(i),
            None => SqlValue::Real(n.as_f64().unwrap_or(0.0)),
        }),
        Value::String(s) => Ok(SqlValue::Text(s.clone())),
        Value::Array(_) | Value::Object(_) => Err(StorageError::InvalidQuery {
            reason: "filter values must be scalars".to_string(),
        }
        .into()),
    }
}

/// SQL result column back to JSON.
pub fn from_sql_value(v: ValueRef<'_>) -> Value {
    match v {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        ValueRef::Text(t) => Value::String(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(_) => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_filter_list_is_true() {
        let f = compile(&[]).unwrap();
        assert_eq!(f.clause, "1");
        assert!(f.params.is_empty());
    }

    #[test]
    fn term_binds_path_then_value() {
        let f = compile(&[Filter::term("status", "open")]).unwrap();
        assert_eq!(f.params.len(), 2);
        assert_eq!(f.params[0], SqlValue::Text("$.\"status\"".into()));
        assert_eq!(f.params[1], SqlValue::Text("open".into()));
    }

    #[test]
    fn must_not_wraps_inner_clause() {
        let f = compile(&[Filter::must_not(Filter::IdEquals("T-1".into()))]).unwrap();
        assert_eq!(f.clause, "NOT COALESCE((d.id = ?), 0)");
    }

    #[test]
    fn empty_terms_matches_nothing() {
        let f = compile(&[Filter::Terms { field: "status".into(), values: vec![] }]).unwrap();
        assert_eq!(f.clause, "0");
    }

    #[test]
    fn object_values_are_rejected() {
        assert!(compile(&[Filter::term("x", json!({"a": 1}))]).is_err());
    }

    #[test]
    fn unbounded_range_is_rejected() {
        let filter = Filter::Range { field: "n".into(), gte: None, lte: None };
        assert!(compile(&[filter]).is_err());
    }
}
