//! Structured body decoding.
//!
//! Parsing never fails the request: malformed input comes back as
//! [`ParseOutcome::Failed`] carrying a diagnostic and the untouched raw
//! buffer.

use bytes::Bytes;
use serde_json::Value;
use thiserror::Error;

/// The captured body could not be decoded.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ParseFailure {
    /// Human-readable diagnostic.
    pub message: String,
    /// The raw bytes that failed to decode.
    pub raw: Bytes,
}

/// What the parser made of a captured body.
#[derive(Debug, Clone)]
pub enum ParseOutcome {
    Parsed(Value),
    /// Zero bytes were received.
    Empty,
    Failed(ParseFailure),
}

impl ParseOutcome {
    pub fn value(&self) -> Option<&Value> {
        match self {
            ParseOutcome::Parsed(value) => Some(value),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&ParseFailure> {
        match self {
            ParseOutcome::Failed(failure) => Some(failure),
            _ => None,
        }
    }
}

/// JSON decoder for captured bodies.
#[derive(Debug, Clone, Copy)]
pub struct BodyParser {
    strict: bool,
}

impl BodyParser {
    /// In strict mode only objects and arrays are accepted at the top level.
    pub fn new(strict: bool) -> Self {
        Self { strict }
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    pub fn parse(&self, raw: &Bytes) -> ParseOutcome {
        if raw.is_empty() {
            return ParseOutcome::Empty;
        }

        let value = match serde_json::from_slice::<Value>(raw) {
            Ok(value) => value,
            Err(e) => {
                return ParseOutcome::Failed(ParseFailure {
                    message: e.to_string(),
                    raw: raw.clone(),
                })
            }
        };

        if self.strict && !(value.is_object() || value.is_array()) {
            return ParseOutcome::Failed(ParseFailure {
                message: format!(
                    "top-level JSON value must be an object or array, found {}",
                    kind(&value)
                ),
                raw: raw.clone(),
            });
        }

        ParseOutcome::Parsed(value)
    }
}

impl Default for BodyParser {
    fn default() -> Self {
        Self::new(true)
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn valid_json_decodes_exactly() {
        let raw = Bytes::from_static(br#"{"id":1,"pago":{"monto":10.5,"items":[1,"a",null,{"x":true}]}}"#);
        let outcome = BodyParser::default().parse(&raw);

        assert_eq!(
            outcome.value(),
            Some(&json!({"id": 1, "pago": {"monto": 10.5, "items": [1, "a", null, {"x": true}]}}))
        );
    }

    #[test]
    fn malformed_json_keeps_raw_bytes() {
        let raw = Bytes::from_static(b"not-json");
        let outcome = BodyParser::default().parse(&raw);

        let failure = outcome.failure().expect("should fail");
        assert_eq!(failure.raw, raw);
        assert!(!failure.message.is_empty());
        assert!(outcome.value().is_none());
    }

    #[test]
    fn truncated_object_is_a_failure() {
        let raw = Bytes::from_static(b"{\"id\":");
        assert!(BodyParser::default().parse(&raw).failure().is_some());
    }

    #[test]
    fn strict_mode_rejects_scalars() {
        let raw = Bytes::from_static(b"42");
        let failure = BodyParser::new(true).parse(&raw).failure().cloned().unwrap();
        assert!(failure.message.contains("found number"));

        assert_eq!(BodyParser::new(false).parse(&raw).value(), Some(&json!(42)));
    }

    #[test]
    fn arrays_are_accepted_in_strict_mode() {
        let raw = Bytes::from_static(b"[1,2]");
        assert_eq!(BodyParser::new(true).parse(&raw).value(), Some(&json!([1, 2])));
    }

    #[test]
    fn empty_body_is_not_a_failure() {
        let outcome = BodyParser::default().parse(&Bytes::new());
        assert!(matches!(outcome, ParseOutcome::Empty));
    }
}
