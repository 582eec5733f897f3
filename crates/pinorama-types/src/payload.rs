//! Search payload used by the studio to fetch log rows
//!
//! The payload is composed in a fixed order: base payload, then search text,
//! then filters, then the live-mode cursor. Each step only adds to what the
//! previous steps produced; the cursor's creation-time filter is merged next to
//! the other filters and only replaces a filter on the same property.

use crate::search::{Comparison, Predicate, SearchParams, SortBy, WhereClause};
use crate::{CREATED_AT_PROPERTY, PAYLOAD_LIMIT};

/// Limit plus ascending sort by creation time
pub fn create_base_payload() -> SearchParams {
    SearchParams {
        limit: Some(PAYLOAD_LIMIT),
        sort_by: Some(SortBy::new(CREATED_AT_PROPERTY)),
        ..Default::default()
    }
}

pub fn with_search_text(payload: SearchParams, search_text: &str) -> SearchParams {
    SearchParams {
        term: Some(search_text.to_string()),
        ..payload
    }
}

pub fn with_search_filters(payload: SearchParams, search_filters: &WhereClause) -> SearchParams {
    let mut filters = payload.filters.clone().unwrap_or_default();
    for (property, predicate) in search_filters {
        filters.insert(property.clone(), predicate.clone());
    }
    SearchParams {
        filters: Some(filters),
        ..payload
    }
}

/// Only records created strictly after `cursor` (epoch ms)
pub fn with_cursor(payload: SearchParams, cursor: i64) -> SearchParams {
    let mut filters = payload.filters.clone().unwrap_or_default();
    filters.insert(
        CREATED_AT_PROPERTY.to_string(),
        Predicate::Compare(Comparison::gt(cursor as f64)),
    );
    SearchParams {
        filters: Some(filters),
        ..payload
    }
}

/// Build the payload for a log query
///
/// Empty search text and a zero cursor count as absent. A filter map that is
/// present but empty still yields an empty `where`.
pub fn build_payload(
    search_text: Option<&str>,
    search_filters: Option<&WhereClause>,
    cursor: Option<i64>,
) -> SearchParams {
    let mut payload = create_base_payload();

    if let Some(text) = search_text.filter(|t| !t.is_empty()) {
        payload = with_search_text(payload, text);
    }

    if let Some(filters) = search_filters {
        payload = with_search_filters(payload, filters);
    }

    if let Some(cursor) = cursor.filter(|c| *c != 0) {
        payload = with_cursor(payload, cursor);
    }

    payload
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn level_filter() -> WhereClause {
        let mut filters = WhereClause::new();
        filters.insert(
            "level".to_string(),
            Predicate::Compare(Comparison::any_of(vec![json!(50), json!(60)])),
        );
        filters
    }

    #[test]
    fn test_no_arguments_yield_stable_base_payload() {
        let payload = build_payload(None, None, None);
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({ "limit": 10000, "sortBy": { "property": "_pinorama.createdAt" } })
        );
        assert_eq!(payload, create_base_payload());
    }

    #[test]
    fn test_empty_text_and_zero_cursor_are_absent() {
        assert_eq!(build_payload(Some(""), None, Some(0)), create_base_payload());
    }

    #[test]
    fn test_empty_filters_still_add_where() {
        let payload = build_payload(None, Some(&WhereClause::new()), None);
        assert_eq!(payload.filters, Some(WhereClause::new()));
    }

    #[test]
    fn test_full_composition() {
        let payload = build_payload(Some("timeout"), Some(&level_filter()), Some(1_700_000_000_123));

        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({
                "term": "timeout",
                "where": {
                    "level": { "in": [50, 60] },
                    "_pinorama.createdAt": { "gt": 1_700_000_000_123.0 }
                },
                "limit": 10000,
                "sortBy": { "property": "_pinorama.createdAt" }
            })
        );
    }

    #[test]
    fn test_cursor_replaces_colliding_created_at_filter_only() {
        let mut filters = level_filter();
        filters.insert(
            CREATED_AT_PROPERTY.to_string(),
            Predicate::Compare(Comparison::gt(1.0)),
        );
        let payload = build_payload(None, Some(&filters), Some(42));
        let clause = payload.filters.unwrap();

        assert_eq!(clause.len(), 2);
        assert!(clause.contains_key("level"));
        assert_eq!(
            clause[CREATED_AT_PROPERTY],
            Predicate::Compare(Comparison::gt(42.0))
        );
    }

    #[test]
    fn test_cursor_without_filters() {
        let payload = build_payload(None, None, Some(7));
        assert_eq!(payload.term, None);
        assert_eq!(payload.filters.unwrap().len(), 1);
    }

    proptest! {
        #[test]
        fn prop_builder_is_pure(
            text in proptest::option::of("[a-z ]{0,12}"),
            host in proptest::option::of("[a-z0-9-]{1,8}"),
            cursor in proptest::option::of(0i64..2_000_000_000_000),
        ) {
            let filters = host.map(|h| {
                let mut f = WhereClause::new();
                f.insert("hostname".to_string(), Predicate::Text(h));
                f
            });
            let first = build_payload(text.as_deref(), filters.as_ref(), cursor);
            let second = build_payload(text.as_deref(), filters.as_ref(), cursor);
            prop_assert_eq!(&first, &second);

            // limit and sort always survive the optional merges
            prop_assert_eq!(first.limit, Some(PAYLOAD_LIMIT));
            prop_assert_eq!(first.sort_by, Some(SortBy::new(CREATED_AT_PROPERTY)));
        }

        #[test]
        fn prop_cursor_filter_is_additive(
            host in "[a-z]{1,8}",
            cursor in 1i64..2_000_000_000_000,
        ) {
            let mut filters = WhereClause::new();
            filters.insert("hostname".to_string(), Predicate::Text(host.clone()));
            let payload = build_payload(None, Some(&filters), Some(cursor));
            let clause = payload.filters.unwrap();

            prop_assert_eq!(&clause["hostname"], &Predicate::Text(host));
            prop_assert_eq!(
                &clause[CREATED_AT_PROPERTY],
                &Predicate::Compare(Comparison::gt(cursor as f64))
            );
        }
    }
}
