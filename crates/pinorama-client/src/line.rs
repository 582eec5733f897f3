use chrono::DateTime;
use serde_json::{json, Value};

/// Turn one line of log output into a record
///
/// JSON objects are kept as they are. Anything else becomes
/// `{"msg": <line>, "time": <epoch ms>}`. A leading RFC 3339 timestamp, as
/// printed by `kubectl logs --timestamps` or `docker logs -t`, is stripped and
/// used as the time when the record has none. Blank lines yield `None`.
pub fn parse_line(raw: &str, now_ms: i64) -> Option<Value> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let (timestamp, content) = split_timestamp(trimmed);
    if content.starts_with('{') {
        if let Ok(Value::Object(mut object)) = serde_json::from_str::<Value>(content) {
            if let Some(ts) = timestamp {
                object.entry("time").or_insert_with(|| Value::from(ts));
            }
            return Some(Value::Object(object));
        }
    }

    Some(json!({
        "msg": content,
        "time": timestamp.unwrap_or(now_ms),
    }))
}

/// Split a leading timestamp (`2024-01-15T10:30:00.123456789Z ...`) off a line
fn split_timestamp(raw: &str) -> (Option<i64>, &str) {
    let Some((head, rest)) = raw.split_once(char::is_whitespace) else {
        return (None, raw);
    };
    if head.len() < 20 || !head.as_bytes()[0].is_ascii_digit() {
        return (None, raw);
    }
    match DateTime::parse_from_rfc3339(head) {
        Ok(ts) => (Some(ts.timestamp_millis()), rest.trim_start()),
        Err(_) => (None, raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000_000;

    #[test]
    fn test_json_object_is_kept() {
        let record = parse_line(r#"{"level":30,"msg":"hi","time":5}"#, NOW).unwrap();
        assert_eq!(record, json!({ "level": 30, "msg": "hi", "time": 5 }));
    }

    #[test]
    fn test_plain_text_is_wrapped() {
        let record = parse_line("  starting worker  ", NOW).unwrap();
        assert_eq!(record, json!({ "msg": "starting worker", "time": NOW }));
    }

    #[test]
    fn test_non_object_json_is_wrapped() {
        let record = parse_line("[1,2]", NOW).unwrap();
        assert_eq!(record["msg"], "[1,2]");
    }

    #[test]
    fn test_timestamp_prefix() {
        let record = parse_line("2024-01-15T10:30:00.123Z {\"msg\":\"up\"}", NOW).unwrap();
        assert_eq!(record, json!({ "msg": "up", "time": 1_705_314_600_123i64 }));

        let record = parse_line("2024-01-15T10:30:00Z plain text", NOW).unwrap();
        assert_eq!(record, json!({ "msg": "plain text", "time": 1_705_314_600_000i64 }));

        // an own time wins over the prefix
        let record = parse_line("2024-01-15T10:30:00Z {\"time\":1}", NOW).unwrap();
        assert_eq!(record["time"], 1);
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        assert_eq!(parse_line("   ", NOW), None);
    }
}
