// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Wall clock abstraction and minute truncation.
//!
//! The sync timestamp is a minute-granularity logical clock, so every
//! "now" that enters the system goes through [`minute_floor`]. The
//! [`Clock`] trait allows injecting a fixed clock for testing.

use chrono::{DateTime, Timelike, Utc};

/// Trait for getting the current wall clock time.
///
/// This allows injecting a mock clock for testing.
pub trait Clock: Send + Sync {
    /// Returns the current wall clock time.
    fn now(&self) -> DateTime<Utc>;
}

/// System clock implementation using `chrono::Utc::now`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Truncate a timestamp to minute precision (seconds and below zeroed).
pub fn minute_floor(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(ts)
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
