use std::time::Duration;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// Search Request
// ============================================================================

/// Filters keyed by property path, all of which must match
pub type WhereClause = IndexMap<String, Predicate>;

/// A search request
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    /// Free text matched against string properties
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub term: Option<String>,

    /// Restrict the text search to these properties
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Vec<String>>,

    /// Maximum edit distance tolerated when matching the term
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tolerance: Option<u8>,

    #[serde(rename = "where", default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<WhereClause>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<SortBy>,

    /// Facet counts to compute over the matching records
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facets: Option<IndexMap<String, FacetRequest>>,
}

/// Sort directive
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortBy {
    pub property: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<SortOrder>,
}

impl SortBy {
    pub fn new(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            order: None,
        }
    }

    pub fn with_order(mut self, order: SortOrder) -> Self {
        self.order = Some(order);
        self
    }

    /// Effective order (ascending when unspecified)
    pub fn order(&self) -> SortOrder {
        self.order.unwrap_or_default()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortOrder {
    #[default]
    #[serde(rename = "ASC")]
    Asc,
    #[serde(rename = "DESC")]
    Desc,
}

/// A filter on a single property
///
/// Serialized the way clients write them:
/// `true`, `"GET"`, `["a", "b"]` or `{"gt": 10, "in": [...]}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Predicate {
    Flag(bool),
    Text(String),
    AnyOf(Vec<String>),
    Compare(Comparison),
}

/// Comparison operators; every operator present must hold
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Comparison {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eq: Option<Value>,
    #[serde(rename = "in", default, skip_serializing_if = "Option::is_none")]
    pub any_of: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nin: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gt: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gte: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lt: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lte: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub between: Option<(f64, f64)>,
}

impl Comparison {
    pub fn gt(value: f64) -> Self {
        Self {
            gt: Some(value),
            ..Default::default()
        }
    }

    pub fn any_of(values: Vec<Value>) -> Self {
        Self {
            any_of: Some(values),
            ..Default::default()
        }
    }

    /// Whether any numeric range operator is set
    pub fn has_range(&self) -> bool {
        self.gt.is_some()
            || self.gte.is_some()
            || self.lt.is_some()
            || self.lte.is_some()
            || self.between.is_some()
    }
}

/// Facet options for one property
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<usize>,
    /// Order of values by count (descending when unspecified)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<SortOrder>,
}

// ============================================================================
// Responses
// ============================================================================

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Total number of matching records (before limit/offset)
    pub count: usize,
    pub hits: Vec<SearchHit>,
    pub elapsed: Elapsed,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facets: Option<IndexMap<String, FacetResult>>,
}

impl SearchResponse {
    /// The matching documents, in hit order
    pub fn documents(&self) -> Vec<Value> {
        self.hits.iter().map(|h| h.document.clone()).collect()
    }

    pub fn into_documents(self) -> Vec<Value> {
        self.hits.into_iter().map(|h| h.document).collect()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: String,
    pub score: f32,
    pub document: Value,
}

/// Time spent searching
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Elapsed {
    /// Nanoseconds
    pub raw: u64,
    pub formatted: String,
}

impl Elapsed {
    pub fn from_duration(duration: Duration) -> Self {
        let raw = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);
        let formatted = if raw < 1_000 {
            format!("{}ns", raw)
        } else if raw < 1_000_000 {
            format!("{}μs", raw / 1_000)
        } else if raw < 1_000_000_000 {
            format!("{}ms", raw / 1_000_000)
        } else {
            format!("{}s", raw / 1_000_000_000)
        };
        Self { raw, formatted }
    }
}

/// Value counts for one facet
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetResult {
    /// Number of distinct values
    pub count: usize,
    pub values: IndexMap<String, usize>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkResponse {
    pub success: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistResponse {
    pub success: bool,
    /// Number of records written to the snapshot
    pub documents: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub documents: u64,
}

/// Error payload returned by the server
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub status_code: u16,
    pub error: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_predicates_deserialize_by_shape() {
        let clause: WhereClause = serde_json::from_value(json!({
            "ok": true,
            "hostname": "web-1",
            "msg": ["a", "b"],
            "level": { "in": [40, 50] },
            "res.statusCode": { "gte": 500, "lt": 600 }
        }))
        .unwrap();

        assert_eq!(clause["ok"], Predicate::Flag(true));
        assert_eq!(clause["hostname"], Predicate::Text("web-1".into()));
        assert_eq!(
            clause["msg"],
            Predicate::AnyOf(vec!["a".into(), "b".into()])
        );
        assert_eq!(
            clause["level"],
            Predicate::Compare(Comparison::any_of(vec![json!(40), json!(50)]))
        );
        match &clause["res.statusCode"] {
            Predicate::Compare(c) => {
                assert_eq!(c.gte, Some(500.0));
                assert_eq!(c.lt, Some(600.0));
                assert!(c.has_range());
            }
            other => panic!("unexpected predicate: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_operator_is_rejected() {
        let result: Result<Predicate, _> = serde_json::from_value(json!({ "like": "x" }));
        assert!(result.is_err());
    }

    #[test]
    fn test_search_params_wire_format() {
        let params = SearchParams {
            term: Some("boom".into()),
            sort_by: Some(SortBy::new("time").with_order(SortOrder::Desc)),
            limit: Some(5),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&params).unwrap(),
            json!({ "term": "boom", "limit": 5, "sortBy": { "property": "time", "order": "DESC" } })
        );
    }

    #[test]
    fn test_elapsed_formatting() {
        assert_eq!(Elapsed::from_duration(Duration::from_nanos(512)).formatted, "512ns");
        assert_eq!(Elapsed::from_duration(Duration::from_micros(42)).formatted, "42μs");
        assert_eq!(Elapsed::from_duration(Duration::from_millis(7)).formatted, "7ms");
        assert_eq!(Elapsed::from_duration(Duration::from_secs(3)).formatted, "3s");
    }
}
