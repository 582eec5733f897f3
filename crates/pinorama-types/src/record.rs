use serde_json::{Map, Value};

use crate::{CREATED_AT_PROPERTY, INTERNAL_KEY};

/// Look up a property by dot path (`req.method`)
///
/// A literal key containing dots takes precedence over nested objects.
pub fn lookup<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    if let Some(value) = doc.get(path) {
        return Some(value);
    }
    let (head, rest) = path.split_once('.')?;
    lookup(doc.get(head)?, rest)
}

/// Creation time stamped on a stored record
pub fn created_at(doc: &Value) -> Option<i64> {
    let value = lookup(doc, CREATED_AT_PROPERTY)?;
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|f| f as i64))
}

/// Stamp a record with its creation time
pub fn stamp_created_at(doc: &mut Map<String, Value>, timestamp: i64) {
    let meta = doc
        .entry(INTERNAL_KEY)
        .or_insert_with(|| Value::Object(Map::new()));
    if !meta.is_object() {
        *meta = Value::Object(Map::new());
    }
    if let Value::Object(meta) = meta {
        meta.insert("createdAt".to_string(), Value::from(timestamp));
    }
}

/// Canonical string key of a value, used for enum labels, styles and facets
pub fn value_key(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lookup_nested_and_literal_paths() {
        let doc = json!({
            "req": { "method": "GET" },
            "res.statusCode": 200
        });
        assert_eq!(lookup(&doc, "req.method"), Some(&json!("GET")));
        assert_eq!(lookup(&doc, "res.statusCode"), Some(&json!(200)));
        assert_eq!(lookup(&doc, "req.url"), None);
        assert_eq!(lookup(&doc, "missing"), None);
    }

    #[test]
    fn test_stamp_and_read_created_at() {
        let mut doc = json!({ "msg": "hello", "_pinorama": "garbage" });
        let map = doc.as_object_mut().unwrap();
        stamp_created_at(map, 1_700_000_000_000);

        assert_eq!(created_at(&doc), Some(1_700_000_000_000));
        assert_eq!(doc["msg"], "hello");
    }

    #[test]
    fn test_value_keys() {
        assert_eq!(value_key(&json!(30)), "30");
        assert_eq!(value_key(&json!("warn")), "warn");
        assert_eq!(value_key(&json!(true)), "true");
        assert_eq!(value_key(&Value::Null), "null");
    }
}
