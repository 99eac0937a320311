//! Helpers shared by the tool definitions.
//!
//! Backend responses use the envelope `{ data, timestamp?, path? }`.

use serde_json::{Map, Value};

use crate::domains::tools::validation::is_truthy;

/// The `data` member of a backend envelope (`null` when absent).
pub fn data(payload: &Value) -> &Value {
    &payload["data"]
}

/// Build a successful result from `(key, value)` pairs and a message.
pub fn success<I>(fields: I, message: &str) -> Value
where
    I: IntoIterator<Item = (&'static str, Value)>,
{
    let mut result = Map::new();
    result.insert("success".to_string(), Value::Bool(true));
    for (key, value) in fields {
        result.insert(key.to_string(), value);
    }
    result.insert("message".to_string(), Value::String(message.to_string()));
    Value::Object(result)
}

/// `{ success, <key>: data, message }`.
pub fn record(payload: &Value, key: &'static str, message: &str) -> Value {
    success([(key, data(payload).clone())], message)
}

/// `{ success, <key>: data.content, <total_key>: data.totalElements, message }`.
pub fn page(payload: &Value, key: &'static str, total_key: &'static str, message: &str) -> Value {
    let data = data(payload);
    success(
        [
            (key, data["content"].clone()),
            (total_key, data["totalElements"].clone()),
        ],
        message,
    )
}

/// Parse a JSON document stored as a string; anything else is `[]`.
pub fn parse_embedded_json(value: &Value) -> Value {
    value
        .as_str()
        .and_then(|s| serde_json::from_str(s).ok())
        .unwrap_or_else(|| Value::Array(Vec::new()))
}

/// The value when truthy, otherwise `null`.
pub fn or_null(value: &Value) -> Value {
    if is_truthy(Some(value)) {
        value.clone()
    } else {
        Value::Null
    }
}

/// Copy of `value` unless it is missing or empty, otherwise `fallback`.
pub fn or_default(value: &Value, fallback: Value) -> Value {
    if is_truthy(Some(value)) {
        value.clone()
    } else {
        fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record() {
        let payload = json!({"data": {"recCode": "L1"}, "timestamp": "t"});
        assert_eq!(
            record(&payload, "lead", "done"),
            json!({"success": true, "lead": {"recCode": "L1"}, "message": "done"})
        );
    }

    #[test]
    fn test_page() {
        let payload = json!({"data": {"content": [1, 2], "totalElements": 2}});
        assert_eq!(
            page(&payload, "items", "totalItems", "ok"),
            json!({"success": true, "items": [1, 2], "totalItems": 2, "message": "ok"})
        );
    }

    #[test]
    fn test_missing_envelope_is_null() {
        let shaped = page(&json!("plain text"), "units", "totalUnits", "ok");
        assert_eq!(shaped["units"], Value::Null);
    }

    #[test]
    fn test_parse_embedded_json() {
        assert_eq!(parse_embedded_json(&json!("[\"a\",\"b\"]")), json!(["a", "b"]));
        assert_eq!(parse_embedded_json(&json!("not json")), json!([]));
        assert_eq!(parse_embedded_json(&json!(null)), json!([]));
        assert_eq!(parse_embedded_json(&json!(["already"])), json!([]));
    }

    #[test]
    fn test_or_null() {
        assert_eq!(or_null(&json!("")), Value::Null);
        assert_eq!(or_null(&json!("p1")), json!("p1"));
        assert_eq!(or_default(&json!(0), json!(5)), json!(5));
    }
}
