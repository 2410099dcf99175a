//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Structured fields, JSON output available for machine parsing
//! - Request ID flows from the HTTP layer into every record
//! - Sink failures are reported here, never to the caller

pub mod logging;
pub mod metrics;
