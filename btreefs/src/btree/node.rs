//! B-tree node and the per-node algorithms.
//!
//! A node holds up to `MAX_KEYS` entries sorted by name and, when internal,
//! exactly one more child than keys:
//! - `children[i]` holds names < `keys[i]`
//! - `children[i + 1]` holds names > `keys[i]`
//!
//! Insertion splits full children on the way down, so a node is never entered
//! full. Deletion tops up minimal children on the way down (borrow or merge),
//! so a node is never entered minimal unless it is the root.

use std::mem;

use crate::entry::Entry;

/// Minimum degree of the tree.
pub const MIN_DEGREE: usize = 3;

/// Maximum number of keys in any node (`2t - 1`).
pub const MAX_KEYS: usize = 2 * MIN_DEGREE - 1;

/// Minimum number of keys in any non-root node (`t - 1`).
pub const MIN_KEYS: usize = MIN_DEGREE - 1;

/// A single B-tree node.
#[derive(Debug)]
pub struct Node {
    pub(super) leaf: bool,
    /// Entries in ascending name order.
    pub(super) keys: Vec<Entry>,
    /// Child nodes. Empty for leaves, `keys.len() + 1` otherwise.
    pub(super) children: Vec<Self>,
}

impl Node {
    /// Create an empty leaf node.
    #[must_use]
    pub fn new_leaf() -> Self {
        Self::with_kind(true)
    }

    /// Create an empty internal node. Callers attach children before use.
    #[must_use]
    pub fn new_internal() -> Self {
        Self::with_kind(false)
    }

    fn with_kind(leaf: bool) -> Self {
        Self {
            leaf,
            keys: Vec::with_capacity(MAX_KEYS),
            children: if leaf {
                Vec::new()
            } else {
                Vec::with_capacity(MAX_KEYS + 1)
            },
        }
    }

    #[must_use]
    pub const fn is_leaf(&self) -> bool {
        self.leaf
    }

    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // Vec::len() is not const-stable
    pub fn key_count(&self) -> usize {
        self.keys.len()
    }

    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn is_full(&self) -> bool {
        self.keys.len() == MAX_KEYS
    }

    #[must_use]
    pub fn keys(&self) -> &[Entry] {
        &self.keys
    }

    #[must_use]
    pub fn children(&self) -> &[Self] {
        &self.children
    }

    /// Names of the keys in this node, in order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.keys.iter().map(Entry::name).collect()
    }

    /// Index of the first key whose name is >= `name`.
    ///
    /// A linear scan: a node never holds more than `MAX_KEYS` entries.
    #[must_use]
    pub fn find_key(&self, name: &str) -> usize {
        self.keys
            .iter()
            .position(|key| key.name() >= name)
            .unwrap_or(self.keys.len())
    }

    fn holds_at(&self, idx: usize, name: &str) -> bool {
        self.keys.get(idx).is_some_and(|key| key.name() == name)
    }

    /// Look up `name` in the subtree rooted at this node.
    #[must_use]
    pub fn search(&self, name: &str) -> Option<&Entry> {
        let idx = self.find_key(name);
        if self.holds_at(idx, name) {
            return self.keys.get(idx);
        }
        if self.leaf {
            return None;
        }
        self.children.get(idx)?.search(name)
    }

    pub fn search_mut(&mut self, name: &str) -> Option<&mut Entry> {
        let idx = self.find_key(name);
        if self.holds_at(idx, name) {
            return self.keys.get_mut(idx);
        }
        if self.leaf {
            return None;
        }
        self.children.get_mut(idx)?.search_mut(name)
    }

    /// Split the full child at `index`.
    ///
    /// The child keeps its first `t - 1` keys (and first `t` children), the
    /// median key moves up into this node at `index`, and the trailing
    /// `t - 1` keys (and `t` children) form a new right sibling at
    /// `index + 1`. This node must not be full.
    pub fn split_child(&mut self, index: usize) {
        let child = &mut self.children[index];
        debug_assert!(child.is_full(), "split_child called on a non-full child");

        let mut right = Self::with_kind(child.leaf);
        right.keys = child.keys.split_off(MIN_DEGREE);
        if !child.leaf {
            right.children = child.children.split_off(MIN_DEGREE);
        }
        let Some(median) = child.keys.pop() else {
            return;
        };

        self.keys.insert(index, median);
        self.children.insert(index + 1, right);
    }

    /// Insert into the subtree rooted at this node, which must not be full.
    ///
    /// The caller guarantees `entry`'s name is not already present.
    pub fn insert_non_full(&mut self, entry: Entry) {
        let mut idx = self
            .keys
            .iter()
            .take_while(|key| key.name() <= entry.name())
            .count();

        if self.leaf {
            self.keys.insert(idx, entry);
            return;
        }

        if self.children[idx].is_full() {
            self.split_child(idx);
            if entry.name() > self.keys[idx].name() {
                idx += 1;
            }
        }
        self.children[idx].insert_non_full(entry);
    }

    /// Remove `name` from the subtree rooted at this node.
    ///
    /// Returns the removed entry, or `None` if the name is absent. Children
    /// visited on the way down are topped up to at least `t` keys first.
    pub fn remove(&mut self, name: &str) -> Option<Entry> {
        let idx = self.find_key(name);

        if self.holds_at(idx, name) {
            if self.leaf {
                return Some(self.keys.remove(idx));
            }
            return self.remove_from_internal(idx);
        }

        if self.leaf {
            return None;
        }

        let was_last = idx == self.keys.len();
        if self.children[idx].keys.len() < MIN_DEGREE {
            self.fill(idx);
        }

        // Filling the last child may have merged it into its left sibling.
        if was_last && idx > self.keys.len() {
            self.children[idx - 1].remove(name)
        } else {
            self.children[idx].remove(name)
        }
    }

    /// Remove the key at `idx` of this internal node.
    fn remove_from_internal(&mut self, idx: usize) -> Option<Entry> {
        if self.children[idx].keys.len() >= MIN_DEGREE {
            let predecessor_name = self.children[idx].max_name()?.to_owned();
            let predecessor = self.children[idx].remove(&predecessor_name)?;
            return Some(mem::replace(&mut self.keys[idx], predecessor));
        }

        if self.children[idx + 1].keys.len() >= MIN_DEGREE {
            let successor_name = self.children[idx + 1].min_name()?.to_owned();
            let successor = self.children[idx + 1].remove(&successor_name)?;
            return Some(mem::replace(&mut self.keys[idx], successor));
        }

        let name = self.keys[idx].name().to_owned();
        self.merge(idx);
        self.children[idx].remove(&name)
    }

    /// Name of the rightmost key in this subtree (in-order predecessor source).
    fn max_name(&self) -> Option<&str> {
        let mut node = self;
        while !node.leaf {
            node = node.children.last()?;
        }
        node.keys.last().map(Entry::name)
    }

    /// Name of the leftmost key in this subtree (in-order successor source).
    fn min_name(&self) -> Option<&str> {
        let mut node = self;
        while !node.leaf {
            node = node.children.first()?;
        }
        node.keys.first().map(Entry::name)
    }

    /// Bring `children[idx]` up from `t - 1` keys to at least `t`.
    fn fill(&mut self, idx: usize) {
        if idx != 0 && self.children[idx - 1].keys.len() >= MIN_DEGREE {
            self.borrow_from_prev(idx);
        } else if idx != self.keys.len() && self.children[idx + 1].keys.len() >= MIN_DEGREE {
            self.borrow_from_next(idx);
        } else if idx != self.keys.len() {
            self.merge(idx);
        } else {
            self.merge(idx - 1);
        }
    }

    /// Rotate the last key of `children[idx - 1]` up into this node and the
    /// separator down to the front of `children[idx]`.
    pub(super) fn borrow_from_prev(&mut self, idx: usize) {
        let (left, right) = self.children.split_at_mut(idx);
        let sibling = &mut left[idx - 1];
        let child = &mut right[0];

        let Some(lifted) = sibling.keys.pop() else {
            return;
        };
        let separator = mem::replace(&mut self.keys[idx - 1], lifted);
        child.keys.insert(0, separator);

        if !child.leaf {
            if let Some(moved) = sibling.children.pop() {
                child.children.insert(0, moved);
            }
        }
    }

    /// Rotate the first key of `children[idx + 1]` up into this node and the
    /// separator down to the back of `children[idx]`.
    pub(super) fn borrow_from_next(&mut self, idx: usize) {
        let (left, right) = self.children.split_at_mut(idx + 1);
        let child = &mut left[idx];
        let sibling = &mut right[0];

        if sibling.keys.is_empty() {
            return;
        }
        let lifted = sibling.keys.remove(0);
        let separator = mem::replace(&mut self.keys[idx], lifted);
        child.keys.push(separator);

        if !child.leaf && !sibling.children.is_empty() {
            child.children.push(sibling.children.remove(0));
        }
    }

    /// Merge `children[idx + 1]` and the separator `keys[idx]` into
    /// `children[idx]`. The exact inverse of [`Self::split_child`].
    pub(super) fn merge(&mut self, idx: usize) {
        let sibling = self.children.remove(idx + 1);
        let separator = self.keys.remove(idx);

        let child = &mut self.children[idx];
        child.keys.push(separator);
        child.keys.extend(sibling.keys);
        child.children.extend(sibling.children);
    }

    /// In-order traversal of this subtree.
    pub fn traverse<F>(&self, visit: &mut F)
    where
        F: FnMut(&Entry),
    {
        for (i, key) in self.keys.iter().enumerate() {
            if !self.leaf {
                self.children[i].traverse(visit);
            }
            visit(key);
        }
        if !self.leaf {
            if let Some(last) = self.children.last() {
                last.traverse(visit);
            }
        }
    }
}
