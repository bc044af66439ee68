//! Timestamp type used throughout the engine.
//!
//! Timestamps are Unix epoch seconds (UTC). Campaign and stage time windows
//! are advisory gates checked at call time, never background timers, so the
//! engine only ever compares timestamps handed in by the caller.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Seconds since the Unix epoch (UTC).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(u64);

impl Timestamp {
    /// Time zero, used where a window has no recorded start.
    pub const EPOCH: Self = Self(0);

    pub fn new(secs: u64) -> Self {
        Self(secs)
    }

    pub fn secs(&self) -> u64 {
        self.0
    }

    /// Whether a window of `duration_secs` starting here has elapsed by `now`.
    /// Saturates, so a window far in the future never wraps into the past.
    pub fn has_expired(&self, duration_secs: u64, now: Timestamp) -> bool {
        now.0 >= self.0.saturating_add(duration_secs)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}
