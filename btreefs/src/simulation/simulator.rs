//! Simulator harness: random insert/delete sequences against a model.

use std::collections::BTreeSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::time::SimulatedTimeSource;
use crate::btree::Index;
use crate::entry::{Entry, EntryKind};
use crate::time::TimeSource;

/// Configuration for the simulator.
#[derive(Debug, Clone)]
pub struct SimulatorConfig {
    /// Random seed for reproducibility.
    pub seed: u64,
    /// Number of operations to run.
    pub operations: usize,
    /// Number of distinct names operations draw from.
    pub name_space: usize,
    /// Probability that an operation is a delete rather than an insert.
    pub delete_rate: f64,
    /// Probability that an inserted entry is a directory.
    pub directory_rate: f64,
    /// Compare the full traversal with the model every this many operations.
    pub full_check_interval: usize,
}

impl SimulatorConfig {
    /// Create a new simulator config with the given seed.
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self {
            seed,
            operations: 1_000,
            name_space: 256,
            delete_rate: 0.4,
            directory_rate: 0.2,
            full_check_interval: 64,
        }
    }

    #[must_use]
    pub const fn with_operations(mut self, operations: usize) -> Self {
        self.operations = operations;
        self
    }

    #[must_use]
    pub const fn with_name_space(mut self, name_space: usize) -> Self {
        self.name_space = name_space;
        self
    }

    #[must_use]
    pub const fn with_delete_rate(mut self, rate: f64) -> Self {
        self.delete_rate = rate;
        self
    }
}

/// Results from a simulation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationResult {
    /// The seed used for this simulation.
    pub seed: u64,
    /// Entries inserted.
    pub inserts: u64,
    /// Deletes that removed an entry.
    pub deletes: u64,
    /// Deletes of names that were not present (no-ops).
    pub absent_deletes: u64,
    /// Inserts skipped because the name already existed.
    pub duplicate_skips: u64,
    /// Largest tree height observed.
    pub max_height: usize,
    /// Entries left at the end.
    pub final_len: usize,
    /// Invariant violations detected, one message each.
    pub violations: Vec<String>,
}

impl SimulationResult {
    /// Check if the simulation passed (no invariant violations).
    #[must_use]
    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Drives one index and a `BTreeSet` model through the same operations.
pub struct Simulator {
    config: SimulatorConfig,
    rng: StdRng,
    index: Index,
    model: BTreeSet<String>,
    time: SimulatedTimeSource,
    result: SimulationResult,
}

impl Simulator {
    /// Create a new simulator with the given configuration.
    #[must_use]
    pub fn new(config: SimulatorConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        let result = SimulationResult {
            seed: config.seed,
            inserts: 0,
            deletes: 0,
            absent_deletes: 0,
            duplicate_skips: 0,
            max_height: 1,
            final_len: 0,
            violations: Vec::new(),
        };
        Self {
            config,
            rng,
            index: Index::new(),
            model: BTreeSet::new(),
            time: SimulatedTimeSource::default_start(),
            result,
        }
    }

    /// Run every configured operation and return the results.
    #[must_use]
    pub fn run(mut self) -> SimulationResult {
        tracing::debug!(
            seed = self.config.seed,
            operations = self.config.operations,
            "simulation started"
        );

        for op in 0..self.config.operations {
            self.time.advance(1);
            let name = self.random_name();

            if self.rng.random_bool(self.config.delete_rate) {
                self.delete(op, &name);
            } else {
                self.insert(op, &name);
            }

            if let Err(violation) = self.index.check_invariants() {
                self.violation(op, &violation.to_string());
            }
            self.result.max_height = self.result.max_height.max(self.index.height());

            let interval = self.config.full_check_interval.max(1);
            if (op + 1) % interval == 0 {
                self.compare_with_model(op);
            }
        }

        self.compare_with_model(self.config.operations);
        self.result.final_len = self.index.len();

        if !self.result.passed() {
            tracing::warn!(
                seed = self.config.seed,
                violations = self.result.violations.len(),
                "simulation found violations"
            );
        }
        self.result
    }

    fn random_name(&mut self) -> String {
        let slot = self.rng.random_range(0..self.config.name_space.max(1));
        format!("n{slot:05}")
    }

    fn insert(&mut self, op: usize, name: &str) {
        let present = self.index.contains(name);
        if present != self.model.contains(name) {
            self.violation(op, &format!("search for '{name}' disagrees with model"));
        }
        if present {
            self.result.duplicate_skips += 1;
            return;
        }

        let now = self.time.now_ms();
        let kind = if self.rng.random_bool(self.config.directory_rate) {
            EntryKind::Directory
        } else {
            EntryKind::File
        };
        let entry = match kind {
            EntryKind::File => Entry::file(name, name, now),
            EntryKind::Directory => self.populated_directory(name, now),
        };

        self.index.insert(entry);
        self.model.insert(name.to_owned());
        self.result.inserts += 1;

        match self.index.search(name).map(Entry::kind) {
            Some(found) if found == kind => {}
            Some(_) => self.violation(op, &format!("'{name}' found with the wrong kind")),
            None => self.violation(op, &format!("'{name}' missing right after insert")),
        }
    }

    /// A directory entry with a few files of its own, so deleting it tears
    /// down a non-empty nested index.
    fn populated_directory(&mut self, name: &str, now: u64) -> Entry {
        let mut entry = Entry::directory(name, now);
        let children = self.rng.random_range(0..8);
        if let Some(dir) = entry.as_directory_mut() {
            for i in 0..children {
                dir.index_mut()
                    .insert(Entry::file(format!("child{i}"), "", now));
            }
        }
        entry
    }

    fn delete(&mut self, op: usize, name: &str) {
        let removed = self.index.delete(name);
        let expected = self.model.remove(name);

        match (removed, expected) {
            (Some(entry), true) => {
                if entry.name() != name {
                    self.violation(
                        op,
                        &format!("delete of '{name}' returned '{}'", entry.name()),
                    );
                }
                self.result.deletes += 1;
            }
            (None, false) => self.result.absent_deletes += 1,
            (Some(_), false) => self.violation(op, &format!("deleted '{name}' not in model")),
            (None, true) => self.violation(op, &format!("'{name}' in model but not deleted")),
        }

        if self.index.contains(name) {
            self.violation(op, &format!("'{name}' still found after delete"));
        }
    }

    fn compare_with_model(&mut self, op: usize) {
        let traversed: Vec<&str> = self.index.iter().map(Entry::name).collect();
        let expected: Vec<&str> = self.model.iter().map(String::as_str).collect();
        if traversed != expected {
            let message = format!(
                "traversal has {} entries, model has {}",
                traversed.len(),
                expected.len()
            );
            self.violation(op, &message);
        }
    }

    fn violation(&mut self, op: usize, message: &str) {
        tracing::debug!(seed = self.config.seed, op, message, "invariant violation");
        self.result
            .violations
            .push(format!("operation {op}: {message}"));
    }
}
