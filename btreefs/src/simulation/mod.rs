//! Deterministic simulation testing.
//!
//! This module provides tools for exercising the index with:
//! - Controlled time (no real system time)
//! - Reproducible random operation sequences
//! - Invariant checking after each operation
//!
//! Given the same seed, a run is identical.
//!
//! # Usage
//!
//! ```
//! use btreefs::simulation::{Simulator, SimulatorConfig};
//!
//! let config = SimulatorConfig::new(12345).with_operations(500);
//! let result = Simulator::new(config).run();
//!
//! assert!(result.passed(), "{:?}", result.violations);
//! ```

mod simulator;
mod time;

pub use simulator::{SimulationResult, Simulator, SimulatorConfig};
pub use time::SimulatedTimeSource;
