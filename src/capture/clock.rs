//! Capture timestamps.
//!
//! Every record gets its timestamp from a [`Timestamper`], which never hands
//! out the same instant twice. Two identical requests arriving within the
//! clock's resolution still produce records with distinct timestamps.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, TimeZone, Utc};

/// Source of wall-clock time.
pub trait Clock: Send + Sync + std::fmt::Debug {
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Strictly increasing timestamps on top of a [`Clock`].
#[derive(Debug)]
pub struct Timestamper<C = SystemClock> {
    clock: C,
    last_nanos: AtomicI64,
}

impl Timestamper<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for Timestamper<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> Timestamper<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            clock,
            last_nanos: AtomicI64::new(i64::MIN),
        }
    }

    /// Next timestamp: the clock's reading, bumped past the previous one if needed.
    pub fn next(&self) -> DateTime<Utc> {
        // timestamp_nanos_opt only fails past year 2262
        let now = self.clock.now().timestamp_nanos_opt().unwrap_or(i64::MAX - 1);

        let mut last = self.last_nanos.load(Ordering::Relaxed);
        loop {
            let candidate = if now > last { now } else { last + 1 };
            match self.last_nanos.compare_exchange_weak(
                last,
                candidate,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return Utc.timestamp_nanos(candidate),
                Err(actual) => last = actual,
            }
        }
    }
}
