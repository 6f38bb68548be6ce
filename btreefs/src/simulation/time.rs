//! Simulated time source for deterministic testing.

use std::cell::Cell;

use crate::time::TimeSource;

/// A time source that only moves when told to.
///
/// Unlike [`SystemTimeSource`](crate::time::SystemTimeSource), this never
/// reads the real clock, so timestamps in tests are exact.
///
/// # Thread Safety
///
/// Uses [`Cell`] for interior mutability and is therefore single-threaded
/// only, which is all the namespace needs.
///
/// # Example
///
/// ```
/// use btreefs::simulation::SimulatedTimeSource;
/// use btreefs::time::TimeSource;
///
/// let time = SimulatedTimeSource::new(1000);
/// assert_eq!(time.now_ms(), 1000);
///
/// time.advance(100);
/// assert_eq!(time.now_ms(), 1100);
///
/// time.set(5000);
/// assert_eq!(time.now_ms(), 5000);
/// ```
#[derive(Debug)]
pub struct SimulatedTimeSource {
    /// Current simulated time in milliseconds since Unix epoch.
    current_time_ms: Cell<u64>,
}

impl SimulatedTimeSource {
    /// Create a new simulated time source with the given initial time.
    #[must_use]
    pub const fn new(initial_time_ms: u64) -> Self {
        Self {
            current_time_ms: Cell::new(initial_time_ms),
        }
    }

    /// Start at `1_700_000_000_000` (November 2023).
    #[must_use]
    pub const fn default_start() -> Self {
        Self::new(1_700_000_000_000)
    }

    /// Advance time by the given number of milliseconds, saturating at
    /// `u64::MAX`.
    pub fn advance(&self, ms: u64) {
        let current = self.current_time_ms.get();
        self.current_time_ms.set(current.saturating_add(ms));
    }

    /// Set the current time. May move time backwards.
    pub fn set(&self, time_ms: u64) {
        self.current_time_ms.set(time_ms);
    }
}

impl Default for SimulatedTimeSource {
    fn default() -> Self {
        Self::default_start()
    }
}

impl TimeSource for SimulatedTimeSource {
    fn now_ms(&self) -> u64 {
        self.current_time_ms.get()
    }
}
