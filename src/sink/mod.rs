//! Durable log sink subsystem.
//!
//! # Data Flow
//! ```text
//! Request handler
//!     → LogSink::submit (unbounded channel, returns immediately)
//!     → writer.rs (single task drains the queue in order)
//!     → file.rs (one write_all per newline-terminated record)
//!
//! Failures:
//!     open/write/sync error → tracing::error! + metric, writer keeps going
//!
//! Shutdown:
//!     all LogSink handles dropped → queue drained → file closed
//! ```
//!
//! # Design Decisions
//! - One writer owns the file, so records never interleave
//! - The response path never waits on disk
//! - Never read, rotated or truncated

pub mod file;
pub mod writer;

pub use file::{AppendFile, SinkError};
pub use writer::{LogSink, SinkWriter, WriterStats};
