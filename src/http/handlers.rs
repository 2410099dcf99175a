//! Request handlers.
//!
//! The notification handler drives one request through
//! `Receiving → Captured → {Parsed | ParseFailed} → Logged → Responded`.
//! Logging is a channel send; the response never waits for the disk.
//!
//! A body that fails mid-stream is still recorded with `captureError`. If
//! the size limit cut it off the caller gets 413; on a transport abort the
//! usual acknowledgement is built and the transport discards it.

use std::time::Instant;

use axum::extract::{Request, State};
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::capture::{capture, CaptureError, HeaderFields, LogRecord, ParseOutcome, RequestMeta};
use crate::config::MalformedPolicy;
use crate::http::request::RequestIdExt;
use crate::http::response::{Ack, ApiError, HealthResponse};
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::routing::Lookup;

/// `GET /health`. Does not touch the sink.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::up())
}

/// Every request that is not `/health` lands here and is dispatched
/// through the route table.
pub async fn notification(State(state): State<AppState>, request: Request) -> Response {
    let start = Instant::now();
    let (parts, body) = request.into_parts();
    let path = parts.uri.path();

    let matched = match state.routes.lookup(&parts.method, path) {
        Lookup::Matched(matched) => matched,
        Lookup::MethodNotAllowed(allowed) => {
            tracing::debug!(method = %parts.method, path = %path, "Method not allowed");
            metrics::record_request("none", 405, start);
            return ApiError::MethodNotAllowed(allowed).into_response();
        }
        Lookup::NotFound => {
            tracing::debug!(method = %parts.method, path = %path, "No route matched");
            metrics::record_request("none", 404, start);
            return ApiError::NotFound(path.to_string()).into_response();
        }
    };

    let route = matched.route;
    let meta = RequestMeta {
        id: parts.headers.request_uuid(),
        method: parts.method.clone(),
        endpoint: matched.endpoint,
        params: matched.params,
        headers: HeaderFields::from_header_map(&parts.headers),
    };

    let (raw, capture_error) = capture(body).await.into_parts();
    let timestamp = state.stamps.next();

    let outcome = match &capture_error {
        None => Some(state.parser.parse(&raw)),
        Some(e) => {
            metrics::record_capture_failure(&route.name);
            tracing::warn!(
                request_id = %meta.id,
                route = %route.name,
                error = %e,
                length_limit = e.is_length_limit(),
                "Body capture failed, recording partial request"
            );
            None
        }
    };

    let record = LogRecord::build(meta, raw, outcome.as_ref(), capture_error.as_ref(), timestamp);

    let too_large = capture_error.as_ref().is_some_and(CaptureError::is_length_limit);
    let response = match outcome.as_ref().and_then(ParseOutcome::failure) {
        _ if too_large => ApiError::PayloadTooLarge(state.max_body_size).into_response(),
        Some(failure) => {
            metrics::record_parse_failure(state.policy.as_str());
            tracing::warn!(
                request_id = %record.id(),
                route = %route.name,
                policy = state.policy.as_str(),
                error = %failure,
                "Malformed body"
            );
            match state.policy {
                MalformedPolicy::Reject => ApiError::MalformedJson(failure.message.clone()).into_response(),
                MalformedPolicy::Accept => Ack::new(&route.message, &record).into_response(),
            }
        }
        None => Ack::new(&route.message, &record).into_response(),
    };

    tracing::info!(
        request_id = %record.id(),
        route = %route.name,
        endpoint = %record.endpoint(),
        bytes = record.raw_body().len(),
        status = response.status().as_u16(),
        "Notification captured"
    );

    state.sink.submit(record);
    metrics::record_request(&route.name, response.status().as_u16(), start);
    response
}
