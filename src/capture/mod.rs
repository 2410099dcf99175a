//! Request capture subsystem.
//!
//! # Data Flow
//! ```text
//! Request body stream
//!     → raw.rs (drain frames into one immutable buffer)
//!     → parser.rs (JSON decode; failure is a value, not an error)
//!     → record.rs (LogRecord from metadata + bytes + outcome)
//!     → clock.rs (strictly increasing capture timestamp)
//!     → handed to the sink
//! ```
//!
//! # Design Decisions
//! - Bytes are captured before any parsing is attempted
//! - The raw buffer survives every failure, including partial capture
//! - Record construction is infallible

pub mod clock;
pub mod parser;
pub mod raw;
pub mod record;

pub use clock::{Clock, SystemClock, Timestamper};
pub use parser::{BodyParser, ParseFailure, ParseOutcome};
pub use raw::{capture, CaptureError, Captured};
pub use record::{HeaderField, HeaderFields, HeaderText, LogRecord, RawBody, RequestMeta};
