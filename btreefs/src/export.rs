//! Textual image of a directory subtree.
//!
//! The image starts with a header line (the directory's path) followed by one
//! line per entry, depth-first in ascending name order:
//!
//! ```text
//! /
//! |-- docs/
//!   |-- notes.txt
//! |-- readme.txt
//! ```

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::btree::Index;
use crate::entry::{Directory, Entry};

/// Visit every entry below `index`, depth-first, with its nesting depth.
///
/// Each level is walked in ascending name order; a directory's children are
/// visited right after the directory itself.
pub fn walk<F>(index: &Index, depth: usize, visit: &mut F)
where
    F: FnMut(&Entry, usize),
{
    index.traverse(depth, |entry, level| {
        visit(entry, level);
        if let Some(child) = entry.as_directory() {
            walk(child.index(), level + 1, &mut *visit);
        }
    });
}

/// Write the image of `dir` to `out` under the given header.
pub fn write_image<W: Write>(out: &mut W, header: &str, dir: &Directory) -> io::Result<()> {
    writeln!(out, "{header}")?;

    let mut result = Ok(());
    walk(dir.index(), 0, &mut |entry, depth| {
        if result.is_err() {
            return;
        }
        let suffix = if entry.is_directory() { "/" } else { "" };
        result = writeln!(out, "{}|-- {}{suffix}", "  ".repeat(depth), entry.name());
    });
    result
}

/// Write the image of `dir` to a file at `path`, replacing it.
pub fn save_image(path: &Path, header: &str, dir: &Directory) -> io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    write_image(&mut out, header, dir)?;
    out.flush()
}
