//! Payment notification recorder.
//!
//! Receives webhook-style payment notifications, appends every request
//! (headers, exact body bytes, decoded body, route parameters) to an
//! append-only log, and acknowledges the caller.
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌──────────────────────────────────────────────────────┐
//!                 │                 WEBHOOK RECORDER                     │
//!   Notification  │  ┌─────────┐   ┌──────────┐   ┌─────────┐            │
//!   ──────────────┼─▶│  http   │──▶│ routing  │──▶│ capture │            │
//!                 │  │ server  │   │  table   │   │raw/parse│            │
//!                 │  └─────────┘   └──────────┘   └────┬────┘            │
//!                 │       ▲                            │ LogRecord       │
//!                 │       │ ack / 400                  ▼                 │
//!   Response      │  ┌─────────┐               ┌──────────────┐  append  │
//!   ◀─────────────┼──│response │               │ sink writer  │─────────▶│ logs.txt
//!                 │  └─────────┘               │ (single task)│          │
//!                 │                            └──────────────┘          │
//!                 │  ┌────────────────────────────────────────────────┐  │
//!                 │  │ config · observability · lifecycle             │  │
//!                 │  └────────────────────────────────────────────────┘  │
//!                 └──────────────────────────────────────────────────────┘
//! ```

pub mod capture;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod sink;

pub use config::ServiceConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use sink::LogSink;
