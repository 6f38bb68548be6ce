//! Wall-clock abstraction for entry timestamps.
//!
//! The namespace stamps created/modified/accessed times through a
//! `TimeSource`, so tests can swap in
//! [`SimulatedTimeSource`](crate::simulation::SimulatedTimeSource) and get
//! deterministic stamps.

use std::time::{SystemTime, UNIX_EPOCH};

/// Abstraction over time operations.
pub trait TimeSource {
    /// Get the current time in milliseconds since Unix epoch.
    fn now_ms(&self) -> u64;
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}

/// Real time source using the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    #[allow(clippy::cast_possible_truncation)] // Milliseconds won't overflow u64 for billions of years
    fn now_ms(&self) -> u64 {
        // A clock set before 1970 stamps entries with the epoch.
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |duration| duration.as_millis() as u64)
    }
}
