//! Response bodies.
//!
//! # Responsibilities
//! - Acknowledgement body built from a log record
//! - Client errors: malformed JSON, unknown route, wrong method, oversized body
//! - Health status body

use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::capture::{HeaderFields, LogRecord};
use crate::routing::RouteParams;

/// `200 { message, data }`.
#[derive(Debug, Serialize)]
pub struct Ack<'a> {
    pub message: &'a str,
    pub data: AckData<'a>,
}

/// Record view returned to the caller.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AckData<'a> {
    pub endpoint: &'a str,
    pub method: &'a str,
    pub headers: &'a HeaderFields,
    /// Parsed body, or `{}` when none was decoded.
    pub body: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<&'a RouteParams>,
    pub timestamp: DateTime<Utc>,
    pub request_id: Uuid,
}

impl<'a> Ack<'a> {
    pub fn new(message: &'a str, record: &'a LogRecord) -> Self {
        let params = Some(record.params()).filter(|p| !p.is_empty());
        Self {
            message,
            data: AckData {
                endpoint: record.endpoint(),
                method: record.method(),
                headers: record.headers(),
                body: record
                    .body()
                    .cloned()
                    .unwrap_or_else(|| Value::Object(Default::default())),
                params,
                timestamp: record.timestamp(),
                request_id: record.id(),
            },
        }
    }
}

impl IntoResponse for Ack<'_> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<String>,
}

/// Errors answered to the caller.
#[derive(Debug)]
pub enum ApiError {
    /// Body failed strict JSON decoding.
    MalformedJson(String),
    NotFound(String),
    MethodNotAllowed(Vec<Method>),
    /// Chunked body cut off at `max_body_size`.
    PayloadTooLarge(usize),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::MalformedJson(detail) => (
                StatusCode::BAD_REQUEST,
                Json(ErrorBody {
                    error: "JSON inválido",
                    detail: Some(detail),
                    path: None,
                }),
            )
                .into_response(),
            ApiError::NotFound(path) => (
                StatusCode::NOT_FOUND,
                Json(ErrorBody {
                    error: "Ruta no encontrada",
                    detail: None,
                    path: Some(path),
                }),
            )
                .into_response(),
            ApiError::PayloadTooLarge(limit) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                Json(ErrorBody {
                    error: "Cuerpo demasiado grande",
                    detail: Some(format!("límite: {limit} bytes")),
                    path: None,
                }),
            )
                .into_response(),
            ApiError::MethodNotAllowed(allowed) => {
                let allow = allowed
                    .iter()
                    .map(Method::as_str)
                    .collect::<Vec<_>>()
                    .join(", ");
                let mut response = (
                    StatusCode::METHOD_NOT_ALLOWED,
                    Json(ErrorBody {
                        error: "Método no permitido",
                        detail: Some(format!("métodos aceptados: {allow}")),
                        path: None,
                    }),
                )
                    .into_response();
                if let Ok(value) = HeaderValue::from_str(&allow) {
                    response.headers_mut().insert(header::ALLOW, value);
                }
                response
            }
        }
    }
}

/// `GET /health` body.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    pub fn up() -> Self {
        Self {
            status: "up",
            timestamp: Utc::now(),
        }
    }
}
