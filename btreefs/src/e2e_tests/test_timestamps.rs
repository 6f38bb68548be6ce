//! Test how commands move the three timestamps.

use crate::e2e_tests::helpers::*;

const START: u64 = 1_700_000_000_000;

#[test]
fn test_new_entries_stamped_with_clock() {
    let mut test = TestShell::new();
    test.advance(500);
    test.quiet(&["touch a.txt"]);

    let entry = test.namespace().root().index().search("a.txt").expect("a.txt");
    assert_eq!(entry.created_ms(), START + 500);
    assert_eq!(entry.modified_ms(), START + 500);
    assert_eq!(entry.accessed_ms(), START + 500);
}

#[test]
fn test_changes_mark_directory_modified() {
    let mut test = TestShell::new();
    test.quiet(&["mkdir docs", "cd docs"]);

    test.advance(1_000);
    test.quiet(&["touch a.txt"]);
    test.advance(1_000);
    test.quiet(&["cd /"]);

    let docs = test.namespace().root().index().search("docs").expect("docs");
    assert_eq!(docs.created_ms(), START);
    assert_eq!(docs.modified_ms(), START + 1_000);
}

#[test]
fn test_cd_and_ls_mark_directory_accessed() {
    let mut test = TestShell::new();
    test.quiet(&["mkdir docs"]);

    test.advance(10);
    test.quiet(&["cd docs"]);
    test.advance(10);
    test.run("ls");
    test.quiet(&["cd /"]);

    let docs = test.namespace().root().index().search("docs").expect("docs");
    assert_eq!(docs.accessed_ms(), START + 20);
    assert_eq!(docs.modified_ms(), START);
}

#[test]
fn test_stat_marks_entry_accessed() {
    let mut test = TestShell::new();
    test.quiet(&["touch a.txt"]);

    test.advance(250);
    test.run("stat a.txt");

    let entry = test.namespace().root().index().search("a.txt").expect("a.txt");
    assert_eq!(entry.accessed_ms(), START + 250);
    assert_eq!(entry.modified_ms(), START);
}
