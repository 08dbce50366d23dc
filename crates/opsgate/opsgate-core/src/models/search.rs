//! Request and response types of the document store port.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// When a write becomes visible to `search` and `aggregate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Visible to searches as soon as the write returns.
    Immediate,
    /// Visible after the next refresh.
    #[default]
    Default,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeBound {
    Time(DateTime<Utc>),
    Number(f64),
}

/// Structured pre-filter. Field names are top-level document fields;
/// `_id` addresses the document id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Filter {
    Term {
        field: String,
        value: Value,
    },
    Terms {
        field: String,
        values: Vec<Value>,
    },
    Range {
        field: String,
        gte: Option<RangeBound>,
        lte: Option<RangeBound>,
    },
    MustNot(Box<Filter>),
    IdEquals(String),
}

impl Filter {
    pub fn term(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Term {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn terms<I, V>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::Terms {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn since(field: impl Into<String>, since: DateTime<Utc>) -> Self {
        Self::Range {
            field: field.into(),
            gte: Some(RangeBound::Time(since)),
            lte: None,
        }
    }

    pub fn must_not(inner: Filter) -> Self {
        Self::MustNot(Box::new(inner))
    }
}

/// A field with a relative score weight, written `field^boost`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldBoost {
    pub field: String,
    pub boost: f64,
}

impl FieldBoost {
    pub fn new(field: impl Into<String>, boost: f64) -> Self {
        Self {
            field: field.into(),
            boost,
        }
    }

    /// Parses `title^2` or `content`. A malformed boost falls back to 1.0.
    pub fn parse(spec: &str) -> Self {
        match spec.split_once('^') {
            Some((field, boost)) => Self::new(field, boost.parse().unwrap_or(1.0)),
            None => Self::new(spec, 1.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Fuzziness {
    #[default]
    None,
    /// Edit distance scaled by term length: 0 up to 2 chars, 1 up to 5, 2 beyond.
    Auto,
}

impl Fuzziness {
    pub fn max_edits(&self, term: &str) -> usize {
        match self {
            Self::None => 0,
            Self::Auto => match term.chars().count() {
                0..=2 => 0,
                3..=5 => 1,
                _ => 2,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LexicalQuery {
    pub text: String,
    pub fields: Vec<FieldBoost>,
    #[serde(default)]
    pub fuzziness: Fuzziness,
    #[serde(default)]
    pub filter: Vec<Filter>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnnQuery {
    pub field: String,
    pub vector: Vec<f32>,
    pub k: usize,
    pub num_candidates: usize,
    #[serde(default)]
    pub filter: Vec<Filter>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchQuery {
    MatchAll,
    Filter(Vec<Filter>),
    Lexical(LexicalQuery),
    Knn(KnnQuery),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortField {
    pub field: String,
    pub descending: bool,
    /// Compare as timestamps rather than raw JSON values.
    #[serde(default)]
    pub temporal: bool,
}

impl SortField {
    pub fn newest_first(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: true,
            temporal: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighlightRequest {
    pub fields: Vec<String>,
    pub fragment_size: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub collection: String,
    pub query: SearchQuery,
    pub size: usize,
    #[serde(default)]
    pub from: usize,
    #[serde(default)]
    pub sort: Option<SortField>,
    #[serde(default)]
    pub highlight: Option<HighlightRequest>,
}

impl SearchRequest {
    pub fn new(collection: impl Into<String>, query: SearchQuery, size: usize) -> Self {
        Self {
            collection: collection.into(),
            query,
            size,
            from: 0,
            sort: None,
            highlight: None,
        }
    }

    pub fn sorted(mut self, sort: SortField) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn highlighted(mut self, fields: &[&str], fragment_size: usize) -> Self {
        self.highlight = Some(HighlightRequest {
            fields: fields.iter().map(|f| f.to_string()).collect(),
            fragment_size,
        });
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: String,
    pub score: f64,
    pub source: Value,
    /// Field name to highlighted fragments.
    #[serde(default)]
    pub highlights: Vec<(String, Vec<String>)>,
}

impl SearchHit {
    pub fn source_str(&self, field: &str) -> Option<&str> {
        self.source.get(field).and_then(Value::as_str)
    }

    /// First fragment of the first highlighted field.
    pub fn first_highlight(&self) -> Option<String> {
        self.highlights
            .iter()
            .find_map(|(_, fragments)| fragments.first().cloned())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub hits: Vec<SearchHit>,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredDocument {
    pub collection: String,
    pub id: String,
    pub source: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateRequest {
    pub collection: String,
    pub time_field: String,
    pub since: DateTime<Utc>,
    #[serde(default)]
    pub filters: Vec<Filter>,
    pub group_by: Vec<String>,
    #[serde(default)]
    pub min_count: u64,
    #[serde(default)]
    pub sum_field: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateBucket {
    /// Group key values, in `group_by` order.
    pub keys: Vec<Value>,
    pub count: u64,
    #[serde(default)]
    pub sum: Option<f64>,
}

impl AggregateBucket {
    pub fn key_str(&self, position: usize) -> Option<&str> {
        self.keys.get(position).and_then(Value::as_str)
    }
}
