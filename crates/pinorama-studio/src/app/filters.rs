use indexmap::{IndexMap, IndexSet};
use pinorama_types::{Comparison, FacetKind, Introspection, Predicate, WhereClause};
use serde_json::Value;

/// Facet values picked in the filters panel, keyed by property
///
/// Values are held as facet keys (the canonical string form the server
/// reports facet counts under).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterSelection {
    selected: IndexMap<String, IndexSet<String>>,
}

impl FilterSelection {
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Number of selected values across all properties
    pub fn len(&self) -> usize {
        self.selected.values().map(IndexSet::len).sum()
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn contains(&self, property: &str, key: &str) -> bool {
        self.selected
            .get(property)
            .is_some_and(|keys| keys.contains(key))
    }

    pub fn values(&self, property: &str) -> impl Iterator<Item = &str> {
        self.selected
            .get(property)
            .into_iter()
            .flat_map(|keys| keys.iter().map(String::as_str))
    }

    /// Select or unselect a value
    pub fn toggle(&mut self, property: &str, key: &str) {
        let keys = self.selected.entry(property.to_string()).or_default();
        if !keys.shift_remove(key) {
            keys.insert(key.to_string());
        }
        if keys.is_empty() {
            self.selected.shift_remove(property);
        }
    }

    /// Predicates for the selected values, typed by each facet's kind
    pub fn to_where(&self, intro: &Introspection) -> WhereClause {
        self.selected
            .iter()
            .filter_map(|(property, keys)| {
                let kind = intro.facets.get(property)?;
                Some((property.clone(), predicate(*kind, keys)?))
            })
            .collect()
    }
}

/// Predicate matching any of the selected facet keys
///
/// Enum and number facets become `in`, strings an any-of list and booleans a
/// flag. Selecting both `true` and `false` matches everything, so no
/// predicate is produced.
pub fn predicate(kind: FacetKind, keys: &IndexSet<String>) -> Option<Predicate> {
    if keys.is_empty() {
        return None;
    }

    match kind {
        FacetKind::Enum | FacetKind::Number => Some(Predicate::Compare(Comparison::any_of(
            keys.iter().map(|k| key_to_value(k)).collect(),
        ))),
        FacetKind::String => Some(Predicate::AnyOf(keys.iter().cloned().collect())),
        FacetKind::Boolean => match keys.len() {
            1 => keys.first().map(|k| Predicate::Flag(k == "true")),
            _ => None,
        },
    }
}

/// Recover the JSON value behind a facet key (`"30"` is the number 30)
pub fn key_to_value(key: &str) -> Value {
    match serde_json::from_str::<Value>(key) {
        Ok(value @ (Value::Number(_) | Value::Bool(_))) => value,
        _ => Value::String(key.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn intro() -> Introspection {
        serde_json::from_value(json!({
            "dbSchema": {
                "level": "enum",
                "msg": "string",
                "status": "number",
                "cached": "boolean",
                "hostname": "string"
            },
            "facets": {
                "level": "enum",
                "msg": "string",
                "status": "number",
                "cached": "boolean"
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_toggle_adds_and_removes() {
        let mut filters = FilterSelection::default();
        filters.toggle("level", "30");
        filters.toggle("level", "50");
        assert!(filters.contains("level", "30"));
        assert_eq!(filters.len(), 2);

        filters.toggle("level", "30");
        filters.toggle("level", "50");
        assert!(filters.is_empty());
    }

    #[test]
    fn test_where_clause_by_facet_kind() {
        let mut filters = FilterSelection::default();
        filters.toggle("level", "30");
        filters.toggle("level", "50");
        filters.toggle("msg", "hello");
        filters.toggle("status", "404");
        filters.toggle("cached", "false");

        let clause = filters.to_where(&intro());
        assert_eq!(
            serde_json::to_value(&clause).unwrap(),
            json!({
                "level": { "in": [30, 50] },
                "msg": ["hello"],
                "status": { "in": [404] },
                "cached": false
            })
        );
    }

    #[test]
    fn test_both_booleans_and_unknown_facets_are_dropped() {
        let mut filters = FilterSelection::default();
        filters.toggle("cached", "true");
        filters.toggle("cached", "false");
        filters.toggle("hostname", "web-1");
        assert!(filters.to_where(&intro()).is_empty());
    }

    #[test]
    fn test_key_to_value() {
        assert_eq!(key_to_value("30"), json!(30));
        assert_eq!(key_to_value("1.5"), json!(1.5));
        assert_eq!(key_to_value("true"), json!(true));
        assert_eq!(key_to_value("GET"), json!("GET"));
        assert_eq!(key_to_value("null"), json!("null"));
        assert_eq!(key_to_value("\"quoted\""), json!("\"quoted\""));
    }
}
