//! The namespace: a root directory plus a cursor for the current directory.
//!
//! Ownership runs strictly downwards: the root directory owns its index, the
//! index owns its entries, and every directory entry owns its own index. The
//! way back up is the cursor, the list of names leading from the root to the
//! current directory. It never owns anything; `..` just pops a name.
//!
//! Every operation here is a thin layer over [`Index`](crate::btree::Index)
//! calls on the current directory's tree. Uniqueness is checked with a search
//! before every insert, since the index itself does not reject duplicates.

use std::io::{self, Write};
use std::path::Path;

use crate::entry::{Directory, Entry, Metadata};
use crate::export;
use crate::time::{SystemTimeSource, TimeSource};

/// Errors reported by namespace operations.
#[derive(Debug)]
pub enum NamespaceError {
    /// The name is empty, contains `/`, or is `.` / `..`.
    InvalidName(String),
    /// An entry with this name already exists in the current directory.
    AlreadyExists(String),
    /// No entry with this name exists.
    NotFound(String),
    /// The entry exists but is a file where a directory was required.
    NotADirectory(String),
    /// The entry exists but is a directory where a file was required.
    IsADirectory(String),
    /// The directory still has children.
    DirectoryNotEmpty(String),
    /// The file name lacks the required extension.
    InvalidFileExtension { name: String, extension: String },
    /// Writing an image failed.
    Io(io::Error),
}

impl std::fmt::Display for NamespaceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidName(name) => write!(f, "invalid name '{name}'"),
            Self::AlreadyExists(name) => write!(f, "'{name}': entry already exists"),
            Self::NotFound(name) => write!(f, "'{name}': no such file or directory"),
            Self::NotADirectory(name) => write!(f, "'{name}': not a directory"),
            Self::IsADirectory(name) => write!(f, "'{name}': is a directory"),
            Self::DirectoryNotEmpty(name) => write!(f, "'{name}': directory not empty"),
            Self::InvalidFileExtension { name, extension } => {
                write!(f, "'{name}': file names must end with '{extension}'")
            }
            Self::Io(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for NamespaceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for NamespaceError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

/// A hierarchical namespace of files and directories.
#[derive(Debug)]
pub struct Namespace<C = SystemTimeSource> {
    root: Directory,
    /// Names from the root to the current directory.
    cwd: Vec<String>,
    clock: C,
    /// Required file-name suffix; empty means any name is accepted.
    file_extension: String,
}

impl Default for Namespace<SystemTimeSource> {
    fn default() -> Self {
        Self::with_clock(SystemTimeSource)
    }
}

impl Namespace<SystemTimeSource> {
    /// Create an empty namespace stamped by the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C: TimeSource> Namespace<C> {
    /// Create an empty namespace with the given time source.
    #[must_use]
    pub fn with_clock(clock: C) -> Self {
        Self {
            root: Directory::new(),
            cwd: Vec::new(),
            clock,
            file_extension: String::new(),
        }
    }

    /// Require every file name passed to `create_file` / `remove_file` to
    /// end with `extension`. An empty extension disables the check.
    #[must_use]
    pub fn with_file_extension(mut self, extension: impl Into<String>) -> Self {
        self.file_extension = extension.into();
        self
    }

    #[must_use]
    pub const fn root(&self) -> &Directory {
        &self.root
    }

    #[must_use]
    pub const fn clock(&self) -> &C {
        &self.clock
    }

    /// Names from the root to the current directory.
    #[must_use]
    pub fn cwd(&self) -> &[String] {
        &self.cwd
    }

    /// Absolute path of the current directory (`/` at the root).
    #[must_use]
    pub fn current_path(&self) -> String {
        path_string(&self.cwd)
    }

    /// The current directory.
    pub fn current_directory(&self) -> Result<&Directory, NamespaceError> {
        directory_at(&self.root, &self.cwd)
            .ok_or_else(|| NamespaceError::NotFound(path_string(&self.cwd)))
    }

    fn current_directory_mut(&mut self) -> Result<&mut Directory, NamespaceError> {
        directory_at_mut(&mut self.root, &self.cwd)
            .ok_or_else(|| NamespaceError::NotFound(path_string(&self.cwd)))
    }

    /// The current directory's own entry in its parent (`None` at the root).
    fn current_entry_mut(&mut self) -> Option<&mut Entry> {
        entry_at_mut(&mut self.root, &self.cwd)
    }

    fn check_file_name(&self, name: &str) -> Result<(), NamespaceError> {
        if self.file_extension.is_empty() || name.ends_with(&self.file_extension) {
            return Ok(());
        }
        Err(NamespaceError::InvalidFileExtension {
            name: name.to_owned(),
            extension: self.file_extension.to_owned(),
        })
    }

    /// Record a change to the current directory on its own entry.
    fn touch_current_modified(&mut self, now_ms: u64) {
        if let Some(entry) = self.current_entry_mut() {
            entry.touch_modified(now_ms);
        }
    }

    fn insert_new(&mut self, entry: Entry) -> Result<(), NamespaceError> {
        let now = entry.created_ms();
        let dir = self.current_directory_mut()?;
        if dir.index().contains(entry.name()) {
            return Err(NamespaceError::AlreadyExists(entry.name().to_owned()));
        }
        dir.index_mut().insert(entry);
        self.touch_current_modified(now);
        Ok(())
    }

    /// Create an empty directory in the current directory.
    pub fn make_directory(&mut self, name: &str) -> Result<(), NamespaceError> {
        validate_name(name)?;
        let now = self.clock.now_ms();
        self.insert_new(Entry::directory(name, now))?;
        tracing::debug!(path = %self.current_path(), name, "directory created");
        Ok(())
    }

    /// Create a file with the given content in the current directory.
    pub fn create_file(&mut self, name: &str, content: &str) -> Result<(), NamespaceError> {
        validate_name(name)?;
        self.check_file_name(name)?;
        let now = self.clock.now_ms();
        self.insert_new(Entry::file(name, content, now))?;
        tracing::debug!(
            path = %self.current_path(),
            name,
            size = content.len(),
            "file created"
        );
        Ok(())
    }

    /// Remove a file from the current directory, returning its entry.
    pub fn remove_file(&mut self, name: &str) -> Result<Entry, NamespaceError> {
        self.check_file_name(name)?;
        let now = self.clock.now_ms();
        let dir = self.current_directory_mut()?;
        match dir.index().search(name) {
            None => return Err(NamespaceError::NotFound(name.to_owned())),
            Some(entry) if entry.is_directory() => {
                return Err(NamespaceError::IsADirectory(name.to_owned()));
            }
            Some(_) => {}
        }
        let removed = dir
            .index_mut()
            .delete(name)
            .ok_or_else(|| NamespaceError::NotFound(name.to_owned()))?;
        self.touch_current_modified(now);
        tracing::debug!(path = %self.current_path(), name, "file removed");
        Ok(removed)
    }

    /// Remove an empty directory from the current directory, returning its
    /// entry. Dropping the entry releases its (empty) index.
    pub fn remove_directory(&mut self, name: &str) -> Result<Entry, NamespaceError> {
        let now = self.clock.now_ms();
        let dir = self.current_directory_mut()?;
        match dir.index().search(name).map(Entry::as_directory) {
            None => return Err(NamespaceError::NotFound(name.to_owned())),
            Some(None) => return Err(NamespaceError::NotADirectory(name.to_owned())),
            Some(Some(child)) if !child.is_empty() => {
                return Err(NamespaceError::DirectoryNotEmpty(name.to_owned()));
            }
            Some(Some(_)) => {}
        }
        let removed = dir
            .index_mut()
            .delete(name)
            .ok_or_else(|| NamespaceError::NotFound(name.to_owned()))?;
        self.touch_current_modified(now);
        tracing::debug!(path = %self.current_path(), name, "directory removed");
        Ok(removed)
    }

    /// Move the cursor.
    ///
    /// Accepts `.`, `..`, `/`, plain names and `/`-separated paths, absolute
    /// or relative. Every directory descended into has its access time
    /// updated. On error the cursor does not move and no stamp changes.
    pub fn change_directory(&mut self, path: &str) -> Result<(), NamespaceError> {
        let mut target = if path.starts_with('/') {
            Vec::new()
        } else {
            self.cwd.to_vec()
        };
        let mut descended = Vec::new();

        for component in path.split('/') {
            match component {
                "" | "." => {}
                ".." => {
                    target.pop();
                }
                name => {
                    let parent = directory_at(&self.root, &target)
                        .ok_or_else(|| NamespaceError::NotFound(path_string(&target)))?;
                    match parent.index().search(name) {
                        None => return Err(NamespaceError::NotFound(name.to_owned())),
                        Some(entry) if !entry.is_directory() => {
                            return Err(NamespaceError::NotADirectory(name.to_owned()));
                        }
                        Some(_) => {}
                    }
                    target.push(name.to_owned());
                    descended.push(target.to_vec());
                }
            }
        }

        let now = self.clock.now_ms();
        for visited in &descended {
            if let Some(entry) = entry_at_mut(&mut self.root, visited) {
                entry.touch_accessed(now);
            }
        }
        self.cwd = target;
        tracing::debug!(path = %self.current_path(), "changed directory");
        Ok(())
    }

    /// Metadata of the current directory's entries in ascending name order.
    ///
    /// Marks the current directory itself as accessed.
    pub fn list(&mut self) -> Result<Vec<Metadata>, NamespaceError> {
        let now = self.clock.now_ms();
        let entries: Vec<Metadata> = self
            .current_directory()?
            .index()
            .iter()
            .map(Entry::metadata)
            .collect();
        if let Some(entry) = self.current_entry_mut() {
            entry.touch_accessed(now);
        }
        Ok(entries)
    }

    /// Metadata of one entry of the current directory, as it was before this
    /// call. Marks the entry as accessed.
    pub fn stat(&mut self, name: &str) -> Result<Metadata, NamespaceError> {
        let now = self.clock.now_ms();
        let entry = self
            .current_directory_mut()?
            .index_mut()
            .search_mut(name)
            .ok_or_else(|| NamespaceError::NotFound(name.to_owned()))?;
        let metadata = entry.metadata();
        entry.touch_accessed(now);
        Ok(metadata)
    }

    /// Write the image of the current directory subtree to `out`.
    pub fn export<W: Write>(&self, out: &mut W) -> Result<(), NamespaceError> {
        let dir = self.current_directory()?;
        export::write_image(out, &self.current_path(), dir)?;
        Ok(())
    }

    /// Write the image of the current directory subtree to a file.
    pub fn save(&self, path: &Path) -> Result<(), NamespaceError> {
        let dir = self.current_directory()?;
        export::save_image(path, &self.current_path(), dir)?;
        tracing::debug!(
            path = %self.current_path(),
            image = %path.display(),
            "image saved"
        );
        Ok(())
    }
}

fn validate_name(name: &str) -> Result<(), NamespaceError> {
    if name.is_empty() || name == "." || name == ".." || name.contains('/') {
        return Err(NamespaceError::InvalidName(name.to_owned()));
    }
    Ok(())
}

fn path_string(components: &[String]) -> String {
    format!("/{}", components.join("/"))
}

fn directory_at<'a>(root: &'a Directory, path: &[String]) -> Option<&'a Directory> {
    let mut dir = root;
    for name in path {
        dir = dir.index().search(name)?.as_directory()?;
    }
    Some(dir)
}

fn directory_at_mut<'a>(root: &'a mut Directory, path: &[String]) -> Option<&'a mut Directory> {
    let mut dir = root;
    for name in path {
        dir = dir.index_mut().search_mut(name)?.as_directory_mut()?;
    }
    Some(dir)
}

fn entry_at_mut<'a>(root: &'a mut Directory, path: &[String]) -> Option<&'a mut Entry> {
    let (name, parent) = path.split_last()?;
    directory_at_mut(root, parent)?.index_mut().search_mut(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::EntryKind;
    use crate::simulation::SimulatedTimeSource;

    fn namespace() -> Namespace<SimulatedTimeSource> {
        Namespace::with_clock(SimulatedTimeSource::new(1_000)).with_file_extension(".txt")
    }

    fn names(entries: &[Metadata]) -> Vec<&str> {
        entries.iter().map(|m| m.name.as_str()).collect()
    }

    #[test]
    fn test_new_namespace_is_empty_root() {
        let mut ns = namespace();
        assert_eq!(ns.current_path(), "/");
        assert!(ns.cwd().is_empty());
        assert!(ns.root().is_empty());
        assert!(ns.list().expect("list").is_empty());
    }

    #[test]
    fn test_make_directory_and_file() {
        let mut ns = namespace();
        ns.make_directory("docs").expect("mkdir");
        ns.create_file("b.txt", "bee").expect("touch");
        ns.create_file("a.txt", "").expect("touch");

        let entries = ns.list().expect("list");
        assert_eq!(names(&entries), vec!["a.txt", "b.txt", "docs"]);
        assert_eq!(entries[1].size, Some(3));
        assert_eq!(entries[2].kind, EntryKind::Directory);
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let mut ns = namespace();
        ns.make_directory("x.txt").expect("mkdir");

        assert!(matches!(
            ns.create_file("x.txt", ""),
            Err(NamespaceError::AlreadyExists(ref n)) if n == "x.txt"
        ));
        assert!(matches!(
            ns.make_directory("x.txt"),
            Err(NamespaceError::AlreadyExists(_))
        ));
        assert_eq!(ns.list().expect("list").len(), 1);
    }

    #[test]
    fn test_invalid_names_rejected() {
        let mut ns = namespace();
        for bad in ["", ".", "..", "a/b"] {
            assert!(matches!(
                ns.make_directory(bad),
                Err(NamespaceError::InvalidName(_))
            ));
        }
        assert!(matches!(
            ns.create_file("notes.md", ""),
            Err(NamespaceError::InvalidFileExtension { .. })
        ));
    }

    #[test]
    fn test_remove_file_errors() {
        let mut ns = namespace();
        ns.make_directory("dir.txt").expect("mkdir");

        assert!(matches!(
            ns.remove_file("missing.txt"),
            Err(NamespaceError::NotFound(_))
        ));
        assert!(matches!(
            ns.remove_file("dir.txt"),
            Err(NamespaceError::IsADirectory(_))
        ));
        assert!(matches!(
            ns.remove_file("dir"),
            Err(NamespaceError::InvalidFileExtension { .. })
        ));

        ns.create_file("f.txt", "x").expect("touch");
        let removed = ns.remove_file("f.txt").expect("rm");
        assert_eq!(removed.name(), "f.txt");
        assert!(matches!(ns.stat("f.txt"), Err(NamespaceError::NotFound(_))));
    }

    #[test]
    fn test_remove_directory_rules() {
        let mut ns = namespace();
        ns.make_directory("full").expect("mkdir");
        ns.make_directory("empty").expect("mkdir");
        ns.create_file("f.txt", "").expect("touch");
        ns.change_directory("full").expect("cd");
        ns.create_file("inner.txt", "").expect("touch");
        ns.change_directory("..").expect("cd ..");

        assert!(matches!(
            ns.remove_directory("full"),
            Err(NamespaceError::DirectoryNotEmpty(_))
        ));
        assert!(matches!(
            ns.remove_directory("f.txt"),
            Err(NamespaceError::NotADirectory(_))
        ));
        assert!(matches!(
            ns.remove_directory("nope"),
            Err(NamespaceError::NotFound(_))
        ));

        ns.remove_directory("empty").expect("rmdir");
        assert_eq!(names(&ns.list().expect("list")), vec!["f.txt", "full"]);
    }

    #[test]
    fn test_change_directory_paths() {
        let mut ns = namespace();
        ns.make_directory("a").expect("mkdir");
        ns.change_directory("a").expect("cd a");
        ns.make_directory("b").expect("mkdir");
        ns.change_directory("b").expect("cd b");
        assert_eq!(ns.current_path(), "/a/b");

        ns.change_directory("..").expect("cd ..");
        assert_eq!(ns.current_path(), "/a");

        ns.change_directory("/").expect("cd /");
        assert_eq!(ns.current_path(), "/");

        ns.change_directory("..").expect("cd .. at root");
        assert_eq!(ns.current_path(), "/");

        ns.change_directory("/a/./b").expect("absolute path");
        assert_eq!(ns.current_path(), "/a/b");

        ns.change_directory("../../a/b/..").expect("relative path");
        assert_eq!(ns.current_path(), "/a");
    }

    #[test]
    fn test_change_directory_failure_leaves_cursor() {
        let mut ns = namespace();
        ns.make_directory("a").expect("mkdir");
        ns.create_file("f.txt", "").expect("touch");
        ns.clock().advance(10);

        assert!(matches!(
            ns.change_directory("a/missing"),
            Err(NamespaceError::NotFound(ref n)) if n == "missing"
        ));
        assert!(matches!(
            ns.change_directory("f.txt"),
            Err(NamespaceError::NotADirectory(_))
        ));
        assert_eq!(ns.current_path(), "/");

        // The failed walk passed through "a" but did not stamp it.
        assert_eq!(ns.stat("a").expect("stat").accessed_ms, 1_000);
    }

    #[test]
    fn test_timestamps() {
        let mut ns = namespace();
        ns.make_directory("dir").expect("mkdir");
        let created = ns.stat("dir").expect("stat");
        assert_eq!(created.created_ms, 1_000);
        assert_eq!(created.modified_ms, 1_000);

        // stat reports the stamp from before the call, then moves it.
        ns.clock().advance(5);
        let first = ns.stat("dir").expect("stat");
        assert_eq!(first.accessed_ms, 1_000);
        let second = ns.stat("dir").expect("stat");
        assert_eq!(second.accessed_ms, 1_005);

        // Entering a directory marks it accessed.
        ns.clock().advance(5);
        ns.change_directory("dir").expect("cd");

        // Creating a child marks the directory modified.
        ns.clock().advance(5);
        ns.create_file("child.txt", "").expect("touch");

        // Listing marks the directory accessed.
        ns.clock().advance(5);
        ns.list().expect("list");

        ns.change_directory("..").expect("cd ..");
        let meta = ns.stat("dir").expect("stat");
        assert_eq!(meta.created_ms, 1_000);
        assert_eq!(meta.modified_ms, 1_015);
        assert_eq!(meta.accessed_ms, 1_020);
    }

    #[test]
    fn test_listing_is_one_level() {
        let mut ns = namespace();
        ns.make_directory("outer").expect("mkdir");
        ns.change_directory("outer").expect("cd");
        for i in 0..20 {
            ns.create_file(&format!("f{i:02}.txt"), "").expect("touch");
        }
        ns.change_directory("/").expect("cd /");

        assert_eq!(names(&ns.list().expect("list")), vec!["outer"]);
    }

    #[test]
    fn test_many_entries_stay_sorted() {
        let mut ns = namespace();
        for i in (0..100).rev() {
            ns.create_file(&format!("file{i:03}.txt"), "").expect("touch");
        }
        for i in (0..100).step_by(3) {
            ns.remove_file(&format!("file{i:03}.txt")).expect("rm");
        }

        let entries = ns.list().expect("list");
        assert_eq!(entries.len(), 66);
        assert!(entries.windows(2).all(|w| w[0].name < w[1].name));
        ns.current_directory()
            .expect("cwd")
            .index()
            .check_invariants()
            .expect("valid index");
    }

    #[test]
    fn test_export_current_subtree() {
        let mut ns = namespace();
        ns.make_directory("a").expect("mkdir");
        ns.create_file("z.txt", "").expect("touch");
        ns.change_directory("a").expect("cd");
        ns.create_file("inner.txt", "").expect("touch");

        let mut out = Vec::new();
        ns.export(&mut out).expect("export");
        assert_eq!(String::from_utf8(out).expect("utf8"), "/a\n|-- inner.txt\n");
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            NamespaceError::DirectoryNotEmpty("d".to_owned()).to_string(),
            "'d': directory not empty"
        );
        assert_eq!(
            NamespaceError::InvalidFileExtension {
                name: "a".to_owned(),
                extension: ".txt".to_owned(),
            }
            .to_string(),
            "'a': file names must end with '.txt'"
        );
    }
}
