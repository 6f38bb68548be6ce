//! Namespace entries.
//!
//! An [`Entry`] is the value stored as a key in a directory's [`Index`]. It is
//! either a file record or a directory record; a directory record owns the
//! nested [`Index`] holding its own children, which is what turns the
//! namespace into a tree of trees.

use crate::btree::Index;

/// Discriminates the two kinds of entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

impl EntryKind {
    /// Human-readable label used by `stat`.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Directory => "directory",
        }
    }
}

/// Payload of a file entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileData {
    content: String,
}

impl FileData {
    #[must_use]
    pub const fn new(content: String) -> Self {
        Self { content }
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Size of the content in bytes.
    #[must_use]
    pub fn size(&self) -> usize {
        self.content.len()
    }
}

/// Payload of a directory entry: exclusive ownership of the child index.
///
/// Dropping a `Directory` drops its index, which drops every node and entry
/// in it, which in turn drops every nested directory below.
#[derive(Debug, Default)]
pub struct Directory {
    index: Index,
}

impl Directory {
    /// Create a directory with an empty index (a single empty leaf root).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn index(&self) -> &Index {
        &self.index
    }

    pub const fn index_mut(&mut self) -> &mut Index {
        &mut self.index
    }

    /// Whether the directory has no children (its root holds zero keys).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

#[derive(Debug)]
pub enum Payload {
    File(FileData),
    Directory(Directory),
}

/// A named file or directory with its three timestamps.
///
/// Timestamps are milliseconds since the Unix epoch. The name is fixed at
/// construction; there is no rename.
#[derive(Debug)]
pub struct Entry {
    name: String,
    created_ms: u64,
    modified_ms: u64,
    accessed_ms: u64,
    payload: Payload,
}

impl Entry {
    /// Create a file entry stamped with `now_ms`.
    #[must_use]
    pub fn file(name: impl Into<String>, content: impl Into<String>, now_ms: u64) -> Self {
        Self::with_payload(
            name.into(),
            Payload::File(FileData::new(content.into())),
            now_ms,
        )
    }

    /// Create a directory entry with a fresh empty index, stamped with `now_ms`.
    #[must_use]
    pub fn directory(name: impl Into<String>, now_ms: u64) -> Self {
        Self::with_payload(name.into(), Payload::Directory(Directory::new()), now_ms)
    }

    const fn with_payload(name: String, payload: Payload, now_ms: u64) -> Self {
        Self {
            name,
            created_ms: now_ms,
            modified_ms: now_ms,
            accessed_ms: now_ms,
            payload,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn kind(&self) -> EntryKind {
        match self.payload {
            Payload::File(_) => EntryKind::File,
            Payload::Directory(_) => EntryKind::Directory,
        }
    }

    #[must_use]
    pub const fn is_directory(&self) -> bool {
        matches!(self.payload, Payload::Directory(_))
    }

    #[must_use]
    pub const fn payload(&self) -> &Payload {
        &self.payload
    }

    #[must_use]
    pub const fn as_file(&self) -> Option<&FileData> {
        match &self.payload {
            Payload::File(file) => Some(file),
            Payload::Directory(_) => None,
        }
    }

    /// The nested directory, if this entry is a directory.
    #[must_use]
    pub const fn as_directory(&self) -> Option<&Directory> {
        match &self.payload {
            Payload::Directory(dir) => Some(dir),
            Payload::File(_) => None,
        }
    }

    pub const fn as_directory_mut(&mut self) -> Option<&mut Directory> {
        match &mut self.payload {
            Payload::Directory(dir) => Some(dir),
            Payload::File(_) => None,
        }
    }

    #[must_use]
    pub const fn created_ms(&self) -> u64 {
        self.created_ms
    }

    #[must_use]
    pub const fn modified_ms(&self) -> u64 {
        self.modified_ms
    }

    #[must_use]
    pub const fn accessed_ms(&self) -> u64 {
        self.accessed_ms
    }

    pub const fn touch_accessed(&mut self, now_ms: u64) {
        self.accessed_ms = now_ms;
    }

    pub const fn touch_modified(&mut self, now_ms: u64) {
        self.modified_ms = now_ms;
    }

    /// Snapshot of the entry's metadata.
    #[must_use]
    pub fn metadata(&self) -> Metadata {
        let file = self.as_file();
        Metadata {
            name: self.name.to_owned(),
            kind: self.kind(),
            size: file.map(FileData::size),
            content: file.map(|f| f.content().to_owned()),
            created_ms: self.created_ms,
            modified_ms: self.modified_ms,
            accessed_ms: self.accessed_ms,
        }
    }
}

/// Owned copy of an entry's metadata, detached from the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    pub name: String,
    pub kind: EntryKind,
    /// Content size in bytes (files only).
    pub size: Option<usize>,
    /// File content (files only).
    pub content: Option<String>,
    pub created_ms: u64,
    pub modified_ms: u64,
    pub accessed_ms: u64,
}
