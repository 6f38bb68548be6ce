//! The per-directory index.
//!
//! An [`Index`] owns the root [`Node`] of one B-tree of entries keyed by name.
//! The tree grows by one level when a full root is split on insert and shrinks
//! by one level when a delete leaves an internal root with no keys.

use std::mem;

use crate::btree::node::{MAX_KEYS, MIN_KEYS, Node};
use crate::entry::Entry;

/// A B-tree of entries ordered by name.
#[derive(Debug)]
pub struct Index {
    root: Node,
}

impl Default for Index {
    fn default() -> Self {
        Self::new()
    }
}

impl Index {
    /// Create an empty index whose root is an empty leaf.
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: Node::new_leaf(),
        }
    }

    #[must_use]
    pub const fn root(&self) -> &Node {
        &self.root
    }

    /// Whether the index holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.key_count() == 0
    }

    /// Number of entries in the index (this level only).
    #[must_use]
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Number of node levels; an empty index has height 1.
    #[must_use]
    pub fn height(&self) -> usize {
        let mut height = 1;
        let mut node = &self.root;
        while let Some(first) = node.children().first() {
            node = first;
            height += 1;
        }
        height
    }

    /// Look up an entry by name.
    #[must_use]
    pub fn search(&self, name: &str) -> Option<&Entry> {
        self.root.search(name)
    }

    /// Look up an entry by name for in-place updates (timestamps, nested
    /// directory contents). The name itself cannot be changed through this.
    pub fn search_mut(&mut self, name: &str) -> Option<&mut Entry> {
        self.root.search_mut(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.search(name).is_some()
    }

    /// Insert an entry.
    ///
    /// The caller must have checked that no entry with the same name exists;
    /// inserting a duplicate leaves two equal keys in the tree and later
    /// lookups of that name are unspecified.
    pub fn insert(&mut self, entry: Entry) {
        if self.root.is_full() {
            let old_root = mem::replace(&mut self.root, Node::new_internal());
            self.root.children.push(old_root);
            self.root.split_child(0);
            tracing::trace!(height = self.height(), "index root split");
        }
        self.root.insert_non_full(entry);
    }

    /// Remove an entry by name, returning it.
    ///
    /// Removing a name that is not present is a no-op and returns `None`.
    /// Dropping the returned entry tears down any nested index it owns.
    pub fn delete(&mut self, name: &str) -> Option<Entry> {
        let removed = self.root.remove(name);

        if self.root.key_count() == 0 && !self.root.is_leaf() {
            if let Some(child) = self.root.children.pop() {
                self.root = child;
                tracing::trace!(height = self.height(), "index root collapsed");
            }
        }

        removed
    }

    /// Visit every entry of this level in ascending name order, passing
    /// `depth` through to the visitor. Nested directory indexes are not
    /// entered.
    pub fn traverse<F>(&self, depth: usize, mut visit: F)
    where
        F: FnMut(&Entry, usize),
    {
        self.root.traverse(&mut |entry| visit(entry, depth));
    }

    /// Iterate over the entries of this level in ascending name order.
    #[must_use]
    pub fn iter(&self) -> Iter<'_> {
        Iter::new(&self.root)
    }

    /// Verify the structural invariants of the tree.
    ///
    /// Checks key-count bounds, strict ordering within and across nodes,
    /// child counts of internal nodes, and that all leaves share one depth.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let mut leaf_depth = None;
        check_node(&self.root, 0, true, None, None, &mut leaf_depth)
    }
}

impl<'a> IntoIterator for &'a Index {
    type Item = &'a Entry;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// In-order iterator over one index, driven by an explicit stack.
pub struct Iter<'a> {
    /// Pending nodes and the position of the next key to yield in each.
    stack: Vec<(&'a Node, usize)>,
}

impl<'a> Iter<'a> {
    fn new(root: &'a Node) -> Self {
        let mut iter = Self { stack: Vec::new() };
        iter.descend_left(root);
        iter
    }

    fn descend_left(&mut self, mut node: &'a Node) {
        loop {
            self.stack.push((node, 0));
            match node.children().first() {
                Some(child) => node = child,
                None => break,
            }
        }
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Entry;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (node, pos) = self.stack.pop()?;
            if let Some(entry) = node.keys().get(pos) {
                self.stack.push((node, pos + 1));
                if let Some(child) = node.children().get(pos + 1) {
                    self.descend_left(child);
                }
                return Some(entry);
            }
        }
    }
}

fn check_node(
    node: &Node,
    depth: usize,
    is_root: bool,
    lower: Option<&str>,
    upper: Option<&str>,
    leaf_depth: &mut Option<usize>,
) -> Result<(), InvariantViolation> {
    let count = node.key_count();
    if count > MAX_KEYS {
        return Err(InvariantViolation::Overfull { depth, count });
    }
    if !is_root && count < MIN_KEYS {
        return Err(InvariantViolation::Underfull { depth, count });
    }
    if is_root && !node.is_leaf() && count == 0 {
        return Err(InvariantViolation::EmptyInternalRoot);
    }

    let names = node.names();
    for pair in names.windows(2) {
        if pair[0] >= pair[1] {
            return Err(InvariantViolation::OutOfOrder {
                left: pair[0].to_owned(),
                right: pair[1].to_owned(),
            });
        }
    }
    if let (Some(low), Some(first)) = (lower, names.first()) {
        if *first <= low {
            return Err(InvariantViolation::OutOfOrder {
                left: low.to_owned(),
                right: (*first).to_owned(),
            });
        }
    }
    if let (Some(high), Some(last)) = (upper, names.last()) {
        if *last >= high {
            return Err(InvariantViolation::OutOfOrder {
                left: (*last).to_owned(),
                right: high.to_owned(),
            });
        }
    }

    if node.is_leaf() {
        if !node.children().is_empty() {
            return Err(InvariantViolation::LeafWithChildren { depth });
        }
        match *leaf_depth {
            None => *leaf_depth = Some(depth),
            Some(expected) if expected != depth => {
                return Err(InvariantViolation::UnevenLeaves {
                    expected,
                    found: depth,
                });
            }
            Some(_) => {}
        }
        return Ok(());
    }

    if node.children().len() != count + 1 {
        return Err(InvariantViolation::ChildCount {
            depth,
            keys: count,
            children: node.children().len(),
        });
    }
    for (i, child) in node.children().iter().enumerate() {
        let low = if i == 0 { lower } else { Some(names[i - 1]) };
        let high = names.get(i).copied().or(upper);
        check_node(child, depth + 1, false, low, high, leaf_depth)?;
    }
    Ok(())
}

/// A broken B-tree invariant, reported by [`Index::check_invariants`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    /// A node holds more than `2t - 1` keys.
    Overfull { depth: usize, count: usize },
    /// A non-root node holds fewer than `t - 1` keys.
    Underfull { depth: usize, count: usize },
    /// The root is internal but holds no keys.
    EmptyInternalRoot,
    /// Two keys are not strictly increasing.
    OutOfOrder { left: String, right: String },
    /// An internal node does not have exactly one more child than keys.
    ChildCount {
        depth: usize,
        keys: usize,
        children: usize,
    },
    /// A leaf node carries children.
    LeafWithChildren { depth: usize },
    /// Leaves occur at different depths.
    UnevenLeaves { expected: usize, found: usize },
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Overfull { depth, count } => {
                write!(f, "node at depth {depth} holds {count} keys (max {MAX_KEYS})")
            }
            Self::Underfull { depth, count } => {
                write!(f, "node at depth {depth} holds {count} keys (min {MIN_KEYS})")
            }
            Self::EmptyInternalRoot => write!(f, "internal root holds no keys"),
            Self::OutOfOrder { left, right } => {
                write!(f, "keys out of order: '{left}' before '{right}'")
            }
            Self::ChildCount {
                depth,
                keys,
                children,
            } => write!(
                f,
                "internal node at depth {depth} has {keys} keys but {children} children"
            ),
            Self::LeafWithChildren { depth } => write!(f, "leaf at depth {depth} has children"),
            Self::UnevenLeaves { expected, found } => {
                write!(f, "leaf at depth {found}, expected depth {expected}")
            }
        }
    }
}

impl std::error::Error for InvariantViolation {}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::{Rng, SeedableRng};

    use super::*;

    fn file(name: &str) -> Entry {
        Entry::file(name, "", 0)
    }

    fn index_with(names: &[&str]) -> Index {
        let mut index = Index::new();
        for name in names {
            index.insert(file(name));
        }
        index
    }

    fn collect_names(index: &Index) -> Vec<String> {
        index.iter().map(|e| e.name().to_owned()).collect()
    }

    #[test]
    fn test_new_index_is_empty_leaf() {
        let index = Index::new();

        assert!(index.is_empty());
        assert!(index.root().is_leaf());
        assert_eq!(index.root().key_count(), 0);
        assert_eq!(index.height(), 1);
        assert_eq!(index.len(), 0);
        assert!(index.search("anything").is_none());
        index.check_invariants().expect("empty tree is valid");
    }

    #[test]
    fn test_five_keys_fill_root_leaf() {
        let index = index_with(&["a", "b", "c", "d", "e"]);

        assert!(index.root().is_leaf());
        assert!(index.root().is_full());
        assert_eq!(index.root().names(), vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn test_sixth_key_splits_root() {
        let index = index_with(&["a", "b", "c", "d", "e", "f"]);

        let root = index.root();
        assert!(!root.is_leaf());
        assert_eq!(root.names(), vec!["c"]);
        assert_eq!(root.children()[0].names(), vec!["a", "b"]);
        assert_eq!(root.children()[1].names(), vec!["d", "e", "f"]);
        assert_eq!(index.height(), 2);

        // The promoted median is found at the root, "f" one level down.
        assert_eq!(index.search("c").map(Entry::name), Some("c"));
        assert_eq!(index.search("f").map(Entry::name), Some("f"));
        index.check_invariants().expect("valid after split");
    }

    #[test]
    fn test_delete_merges_and_shrinks_height() {
        let mut index = index_with(&["a", "b", "c", "d", "e", "f"]);

        // The right child still has t keys, so "d" comes straight out of it.
        assert!(index.delete("d").is_some());
        assert_eq!(index.root().children()[1].names(), vec!["e", "f"]);
        assert_eq!(index.height(), 2);
        index.check_invariants().expect("valid after leaf delete");

        // Descending into the minimal right child with a minimal left sibling
        // merges both around "c"; the empty root is dropped.
        assert!(index.delete("e").is_some());
        assert!(index.root().is_leaf());
        assert_eq!(index.root().names(), vec!["a", "b", "c", "f"]);
        assert_eq!(index.height(), 1);
        index.check_invariants().expect("valid after merge");

        let removed = index.delete("c").expect("c present");
        assert_eq!(removed.name(), "c");
        assert_eq!(index.root().names(), vec!["a", "b", "f"]);
    }

    #[test]
    fn test_delete_absent_is_noop() {
        let mut index = index_with(&["a", "b", "c", "d", "e", "f", "g", "h"]);
        let before = collect_names(&index);

        assert!(index.delete("zzz").is_none());
        assert!(index.delete("").is_none());

        assert_eq!(collect_names(&index), before);
        index.check_invariants().expect("valid after absent delete");
    }

    #[test]
    fn test_delete_on_empty_index() {
        let mut index = Index::new();
        assert!(index.delete("a").is_none());
        assert!(index.is_empty());
        assert!(index.root().is_leaf());
    }

    #[test]
    fn test_iteration_matches_traverse() {
        let names: Vec<String> = (0..40).map(|i| format!("n{:03}", (i * 17) % 40)).collect();
        let mut index = Index::new();
        for name in &names {
            index.insert(file(name));
        }

        let mut traversed = Vec::new();
        index.traverse(3, |entry, depth| {
            assert_eq!(depth, 3);
            traversed.push(entry.name().to_owned());
        });

        let mut sorted = names;
        sorted.sort();
        assert_eq!(traversed, sorted);
        assert_eq!(collect_names(&index), sorted);
        assert_eq!((&index).into_iter().count(), 40);
    }

    #[test]
    fn test_traverse_does_not_enter_nested_directories() {
        let mut index = Index::new();
        let mut dir = Entry::directory("dir", 0);
        dir.as_directory_mut()
            .expect("directory")
            .index_mut()
            .insert(file("inner.txt"));
        index.insert(dir);
        index.insert(file("outer.txt"));

        let mut seen = Vec::new();
        index.traverse(0, |entry, _| seen.push(entry.name().to_owned()));
        assert_eq!(seen, vec!["dir", "outer.txt"]);
    }

    #[test]
    fn test_search_mut_updates_in_place() {
        let mut index = index_with(&["a", "b", "c", "d", "e", "f", "g"]);

        index.search_mut("g").expect("g present").touch_accessed(99);

        assert_eq!(index.search("g").map(Entry::accessed_ms), Some(99));
        assert!(index.search_mut("missing").is_none());
    }

    #[test]
    fn test_sequential_inserts_then_full_teardown() {
        let mut index = Index::new();
        for i in 0..200 {
            index.insert(file(&format!("f{i:04}")));
            index.check_invariants().expect("valid after insert");
        }
        assert_eq!(index.len(), 200);
        assert!(index.height() > 2);

        for i in (0..200).rev() {
            let name = format!("f{i:04}");
            assert!(index.delete(&name).is_some(), "{name} should be present");
            index.check_invariants().expect("valid after delete");
        }

        assert!(index.is_empty());
        assert!(index.root().is_leaf());
        assert_eq!(index.height(), 1);
    }

    #[test]
    fn test_random_operations_preserve_invariants() {
        let mut rng = StdRng::seed_from_u64(0x5EED);
        let mut index = Index::new();
        let mut model = BTreeSet::new();

        for _ in 0..2_000 {
            let name = format!("k{:03}", rng.random_range(0..300));
            if rng.random_bool(0.55) {
                if !index.contains(&name) {
                    index.insert(file(&name));
                    model.insert(name.clone());
                }
            } else {
                let removed = index.delete(&name);
                assert_eq!(removed.is_some(), model.remove(&name), "delete {name}");
                assert!(index.search(&name).is_none());
            }
            index.check_invariants().expect("valid after random op");
        }

        let expected: Vec<String> = model.iter().cloned().collect();
        assert_eq!(collect_names(&index), expected);
        for name in &model {
            assert!(index.contains(name), "{name} should be found");
        }
    }

    #[test]
    fn test_delete_in_shuffled_order_empties_tree() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut names: Vec<String> = (0..150).map(|i| format!("item-{i}")).collect();
        names.shuffle(&mut rng);

        let mut index = Index::new();
        for name in &names {
            index.insert(file(name));
        }

        names.shuffle(&mut rng);
        for (deleted, name) in names.iter().enumerate() {
            assert_eq!(index.delete(name).map(|e| e.name().to_owned()), Some(name.clone()));
            index.check_invariants().expect("valid after delete");
            assert_eq!(index.len(), names.len() - deleted - 1);
            for remaining in &names[deleted + 1..] {
                assert!(index.contains(remaining));
            }
        }

        assert!(index.is_empty());
        assert!(index.root().is_leaf());
    }

    #[test]
    fn test_check_invariants_reports_disorder() {
        let mut index = Index::new();
        index.root.keys.push(file("b"));
        index.root.keys.push(file("a"));

        let err = index.check_invariants().expect_err("out of order");
        assert_eq!(
            err,
            InvariantViolation::OutOfOrder {
                left: "b".to_owned(),
                right: "a".to_owned(),
            }
        );
        assert_eq!(err.to_string(), "keys out of order: 'b' before 'a'");
    }

    #[test]
    fn test_check_invariants_reports_underfull_child() {
        let mut index = index_with(&["a", "b", "c", "d", "e", "f"]);
        index.root.children[0].keys.pop();

        let err = index.check_invariants().expect_err("underfull");
        assert_eq!(err, InvariantViolation::Underfull { depth: 1, count: 1 });
    }
}
