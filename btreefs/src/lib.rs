// Test code is allowed to use expect() and unwrap() for convenience.
#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

//! A hierarchical in-memory namespace whose directories are indexed by
//! B-trees of minimum degree 3.
//!
//! Layers, bottom up:
//!  - [`btree`]: the ordered index (insert, search, delete, traverse)
//!  - [`entry`]: what the index stores; a directory entry owns another index
//!  - [`namespace`]: the tree of directories plus a current-directory cursor
//!  - [`shell`]: line-oriented commands over a namespace
//!
//! [`simulation`] drives the index through seeded random workloads and checks
//! its structural invariants after every step.

pub mod btree;
pub mod config;
pub mod entry;
pub mod export;
pub mod format;
pub mod namespace;
pub mod shell;
pub mod simulation;
pub mod time;

mod e2e_tests;
