//! Argument validation, run before any I/O.
//!
//! Only presence of required fields and membership of enum fields are
//! checked. Types are not; the backend is the authority on those.

use serde_json::Value;

use super::error::ToolError;
use super::registry::{Arguments, FieldSpec};

/// Absent, `null`, or a blank string.
pub fn is_missing(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

/// JavaScript-style truthiness.
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// Scalar value as it appears in a URL.
pub fn value_as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Check `args` against the declared fields.
pub fn validate(fields: &[FieldSpec], args: &Arguments) -> Result<(), ToolError> {
    for field in fields.iter().filter(|f| f.required) {
        if is_missing(args.get(field.name)) {
            return Err(ToolError::missing_argument(field.name));
        }
    }

    for field in fields.iter().filter(|f| !f.allowed_values.is_empty()) {
        let value = args.get(field.name);
        if is_missing(value) {
            continue;
        }
        let accepted = value
            .and_then(Value::as_str)
            .is_some_and(|v| field.allowed_values.iter().any(|allowed| *allowed == v));
        if !accepted {
            return Err(ToolError::invalid_argument(
                field.name,
                format!("Allowed: {}", field.allowed_values.join(", ")),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::registry::FieldKind;
    use serde_json::json;

    const STATUS_VALUES: &[&str] = &["Open", "Closed"];
    const FIELDS: &[FieldSpec] = &[
        FieldSpec::required("id", FieldKind::String, "Record id"),
        FieldSpec::optional("status", FieldKind::String, "Status").one_of(STATUS_VALUES),
    ];

    fn args(value: Value) -> Arguments {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_missing_values() {
        assert!(is_missing(None));
        assert!(is_missing(Some(&Value::Null)));
        assert!(is_missing(Some(&json!("  "))));
        assert!(!is_missing(Some(&json!(0))));
        assert!(!is_missing(Some(&json!(false))));
        assert!(!is_missing(Some(&json!([]))));
    }

    #[test]
    fn test_truthiness() {
        assert!(is_truthy(Some(&json!("x"))));
        assert!(is_truthy(Some(&json!(1))));
        assert!(!is_truthy(Some(&json!(""))));
        assert!(!is_truthy(Some(&json!(0))));
        assert!(!is_truthy(Some(&json!(false))));
        assert!(!is_truthy(None));
    }

    #[test]
    fn test_valid_arguments() {
        assert!(validate(FIELDS, &args(json!({"id": "1"}))).is_ok());
        assert!(validate(FIELDS, &args(json!({"id": "1", "status": "Open"}))).is_ok());
        // Optional enum fields may be empty.
        assert!(validate(FIELDS, &args(json!({"id": "1", "status": ""}))).is_ok());
    }

    #[test]
    fn test_required_field() {
        for bad in [json!({}), json!({"id": null}), json!({"id": ""})] {
            let err = validate(FIELDS, &args(bad)).unwrap_err();
            assert!(matches!(err, ToolError::MissingArgument(ref f) if f == "id"));
        }
    }

    #[test]
    fn test_enum_field() {
        let err = validate(FIELDS, &args(json!({"id": "1", "status": "Flying"}))).unwrap_err();
        match err {
            ToolError::InvalidArgument { field, reason } => {
                assert_eq!(field, "status");
                assert_eq!(reason, "Allowed: Open, Closed");
            }
            other => panic!("unexpected error: {:?}", other),
        }

        let err = validate(FIELDS, &args(json!({"id": "1", "status": 3}))).unwrap_err();
        assert!(err.is_validation());
    }
}
