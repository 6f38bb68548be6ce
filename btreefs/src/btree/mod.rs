//! In-memory B-tree used to index the children of every directory.
//!
//! # Structure
//!
//! Each directory owns one [`Index`]. The index owns a root [`Node`]; nodes
//! own their entries and child nodes. Every node other than the root holds
//! between `MIN_KEYS` and `MAX_KEYS` entries, and all leaves sit at the same
//! depth.
//!
//! # Usage
//!
//! ```
//! use btreefs::btree::Index;
//! use btreefs::entry::Entry;
//!
//! let mut index = Index::new();
//! for name in ["c", "a", "b"] {
//!     index.insert(Entry::file(name, "", 0));
//! }
//!
//! let names: Vec<&str> = index.iter().map(Entry::name).collect();
//! assert_eq!(names, ["a", "b", "c"]);
//!
//! assert!(index.delete("b").is_some());
//! assert!(index.search("b").is_none());
//! ```

mod node;
mod tree;

pub use node::{MAX_KEYS, MIN_DEGREE, MIN_KEYS, Node};
pub use tree::{Index, InvariantViolation, Iter};
