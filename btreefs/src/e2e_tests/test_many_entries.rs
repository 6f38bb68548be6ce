//! Test directories large enough to split and merge index nodes.

use crate::e2e_tests::helpers::*;

#[test]
fn test_many_files_listed_in_order() {
    let mut test = TestShell::new();

    // Insert in reverse so every insert lands at the front of the index.
    for i in (0..60).rev() {
        test.quiet(&[&format!("touch f{i:02}.txt")]);
    }

    let index = test.namespace().root().index();
    assert_eq!(index.len(), 60);
    assert!(index.height() >= 3);
    index.check_invariants().expect("index invariants");

    let expected: Vec<String> = (0..60).map(|i| format!("f{i:02}.txt")).collect();
    assert_eq!(
        test.run("ls"),
        format!("Contents of /:\n{}\n", expected.join("  "))
    );
}

#[test]
fn test_remove_every_other_then_all() {
    let mut test = TestShell::new();
    for i in 0..40 {
        test.quiet(&[&format!("touch f{i:02}.txt")]);
    }

    for i in (0..40).step_by(2) {
        assert_eq!(
            test.run(&format!("rm f{i:02}.txt")),
            format!("Removed 'f{i:02}.txt'.\n")
        );
        test.namespace()
            .root()
            .index()
            .check_invariants()
            .expect("index invariants");
    }

    let remaining: Vec<&str> = test
        .namespace()
        .root()
        .index()
        .iter()
        .map(|entry| entry.name())
        .collect();
    let expected: Vec<String> = (1..40).step_by(2).map(|i| format!("f{i:02}.txt")).collect();
    assert_eq!(remaining, expected);

    for i in (1..40).step_by(2) {
        assert_eq!(
            test.run(&format!("rm f{i:02}.txt")),
            format!("Removed 'f{i:02}.txt'.\n")
        );
    }
    assert_eq!(test.run("ls"), "Directory / is empty.\n");
    assert_eq!(test.namespace().root().index().height(), 1);
}

#[test]
fn test_nested_directories_with_many_children() {
    let mut test = TestShell::new();
    for d in 0..8 {
        test.quiet(&[&format!("mkdir d{d}"), &format!("cd d{d}")]);
        for f in 0..12 {
            test.quiet(&[&format!("touch f{f:02}.txt")]);
        }
        test.quiet(&["cd /"]);
    }

    test.quiet(&["cd d5"]);
    let listing = test.run("ls");
    assert!(listing.starts_with("Contents of /d5:\nf00.txt  f01.txt"));
    assert!(listing.ends_with("f11.txt\n"));

    test.quiet(&["cd /"]);
    assert_eq!(test.run("rmdir d3"), "rmdir: 'd3': directory not empty\n");
}
