//! Log records.
//!
//! A [`LogRecord`] is built once per request from the request metadata, the
//! captured bytes and the parse outcome. It is immutable afterwards and is
//! serialized as one line of JSON by the sink.

use axum::http::{HeaderMap, Method};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::capture::parser::ParseOutcome;
use crate::capture::raw::CaptureError;
use crate::routing::RouteParams;

/// One header value as received. Serialized like [`RawBody`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderText(Bytes);

impl HeaderText {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<&str> for HeaderText {
    fn from(value: &str) -> Self {
        Self(Bytes::copy_from_slice(value.as_bytes()))
    }
}

impl Serialize for HeaderText {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_octets(&self.0, serializer)
    }
}

/// Value of one header name: single, or every value of a repeated header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum HeaderField {
    Single(HeaderText),
    Multiple(Vec<HeaderText>),
}

/// Inbound headers in order of first appearance, names lower-cased.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderFields(Vec<(String, HeaderField)>);

impl HeaderFields {
    pub fn from_header_map(headers: &HeaderMap) -> Self {
        let mut fields = Vec::with_capacity(headers.keys_len());
        for name in headers.keys() {
            let mut values: Vec<HeaderText> = headers
                .get_all(name)
                .iter()
                .map(|v| HeaderText(Bytes::copy_from_slice(v.as_bytes())))
                .collect();
            let field = if values.len() == 1 {
                HeaderField::Single(values.remove(0))
            } else {
                HeaderField::Multiple(values)
            };
            fields.push((name.as_str().to_string(), field));
        }
        Self(fields)
    }

    pub fn get(&self, name: &str) -> Option<&HeaderField> {
        let name = name.to_ascii_lowercase();
        self.0.iter().find(|(n, _)| *n == name).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for HeaderFields {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Exact request bytes. Serialized as text when valid UTF-8, otherwise as
/// `{"hex": "..."}` so nothing is lost. Header values use the same form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawBody(Bytes);

impl RawBody {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for RawBody {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_octets(&self.0, serializer)
    }
}

fn serialize_octets<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    match std::str::from_utf8(bytes) {
        Ok(text) => serializer.serialize_str(text),
        Err(_) => {
            let mut map = serializer.serialize_map(Some(1))?;
            map.serialize_entry("hex", &hex::encode(bytes))?;
            map.end()
        }
    }
}

/// Request metadata known before the body is read.
#[derive(Debug, Clone)]
pub struct RequestMeta {
    pub id: Uuid,
    pub method: Method,
    pub endpoint: String,
    pub params: RouteParams,
    pub headers: HeaderFields,
}

/// One captured notification.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRecord {
    id: Uuid,
    endpoint: String,
    method: String,
    headers: HeaderFields,
    params: RouteParams,
    raw_body: RawBody,
    body: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    capture_error: Option<String>,
    timestamp: DateTime<Utc>,
}

impl LogRecord {
    /// Assemble a record. Never fails: a missing parse outcome (capture
    /// failed) or a failed parse leaves `body` absent.
    pub fn build(
        meta: RequestMeta,
        raw: Bytes,
        outcome: Option<&ParseOutcome>,
        capture_error: Option<&CaptureError>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let (body, parse_error) = match outcome {
            Some(ParseOutcome::Parsed(value)) => (Some(value.clone()), None),
            Some(ParseOutcome::Failed(failure)) => (None, Some(failure.message.clone())),
            Some(ParseOutcome::Empty) | None => (None, None),
        };

        Self {
            id: meta.id,
            endpoint: meta.endpoint,
            method: meta.method.to_string(),
            headers: meta.headers,
            params: meta.params,
            raw_body: RawBody(raw),
            body,
            parse_error,
            capture_error: capture_error.map(ToString::to_string),
            timestamp,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn headers(&self) -> &HeaderFields {
        &self.headers
    }

    pub fn params(&self) -> &RouteParams {
        &self.params
    }

    pub fn raw_body(&self) -> &RawBody {
        &self.raw_body
    }

    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    pub fn parse_error(&self) -> Option<&str> {
        self.parse_error.as_deref()
    }

    pub fn capture_error(&self) -> Option<&str> {
        self.capture_error.as_deref()
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// One newline-terminated JSON line.
    pub fn to_line(&self) -> Result<String, serde_json::Error> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }
}
