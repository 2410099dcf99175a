//! Raw body capture.
//!
//! # Responsibilities
//! - Drain the request body stream frame by frame
//! - Materialize the exact bytes as one immutable buffer
//! - Keep the partial bytes when the stream fails
//!
//! # Design Decisions
//! - No size limit here; the transport layer enforces `max_body_size`
//! - No content-type interpretation
//! - Stream failures are a `CaptureError`, never a parse failure
//! - A chunked body crossing `max_body_size` surfaces here as a stream
//!   failure; `CaptureError::is_length_limit` tells it apart from an abort

use axum::body::Body;
use bytes::{Bytes, BytesMut};
use futures_util::StreamExt;
use http_body_util::LengthLimitError;
use thiserror::Error;

/// The body stream failed before it ended.
#[derive(Debug, Error)]
#[error("request body stream failed after {received} bytes: {source}")]
pub struct CaptureError {
    /// Bytes collected before the failure.
    pub received: usize,
    #[source]
    pub source: axum::Error,
}

impl CaptureError {
    /// The body was cut off by the transport size limit rather than by the peer.
    pub fn is_length_limit(&self) -> bool {
        let mut current: Option<&(dyn std::error::Error + 'static)> = Some(&self.source);
        while let Some(error) = current {
            if error.is::<LengthLimitError>() {
                return true;
            }
            current = error.source();
        }
        false
    }
}

/// Result of draining a request body.
#[derive(Debug)]
pub struct Captured {
    bytes: Bytes,
    error: Option<CaptureError>,
}

impl Captured {
    /// The captured bytes; partial if `error()` is set.
    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn error(&self) -> Option<&CaptureError> {
        self.error.as_ref()
    }

    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }

    pub fn into_parts(self) -> (Bytes, Option<CaptureError>) {
        (self.bytes, self.error)
    }
}

/// Read the whole body, stopping at the first stream error.
pub async fn capture(body: Body) -> Captured {
    let mut stream = body.into_data_stream();
    let mut buf = BytesMut::new();

    while let Some(frame) = stream.next().await {
        match frame {
            Ok(chunk) => buf.extend_from_slice(&chunk),
            Err(source) => {
                let received = buf.len();
                return Captured {
                    bytes: buf.freeze(),
                    error: Some(CaptureError { received, source }),
                };
            }
        }
    }

    Captured {
        bytes: buf.freeze(),
        error: None,
    }
}
