//! Test creating, inspecting and removing files.

use crate::config::ShellConfig;
use crate::e2e_tests::helpers::*;

#[test]
fn test_touch_and_stat() {
    let mut test = TestShell::new();
    test.quiet(&[r#"touch notes.txt "buy milk""#, "touch empty.txt"]);

    let report = test.run("stat notes.txt");
    assert!(report.contains("    Name: notes.txt\n"));
    assert!(report.contains("    Type: file\n"));
    assert!(report.contains("    Size: 8 bytes\n"));
    assert!(report.contains(" Content: buy milk\n"));

    let report = test.run("stat empty.txt");
    assert!(report.contains("    Size: 0 bytes\n"));
}

#[test]
fn test_stat_directory() {
    let mut test = TestShell::new();
    test.quiet(&["mkdir docs"]);

    let report = test.run("stat docs");
    assert!(report.contains("    Type: directory\n"));
    assert!(!report.contains("Size"));
    assert_eq!(
        test.run("stat ghost"),
        "stat: 'ghost': no such file or directory\n"
    );
}

#[test]
fn test_touch_requires_extension() {
    let mut test = TestShell::new();

    assert_eq!(
        test.run("touch notes"),
        "touch: 'notes': file names must end with '.txt'\n"
    );
    assert_eq!(
        test.run("touch notes.txt.bak"),
        "touch: 'notes.txt.bak': file names must end with '.txt'\n"
    );
    assert_eq!(test.run("ls"), "Directory / is empty.\n");
}

#[test]
fn test_touch_existing_name() {
    let mut test = TestShell::new();
    test.quiet(&[r#"touch a.txt "first""#]);

    assert_eq!(
        test.run(r#"touch a.txt "second""#),
        "touch: 'a.txt': entry already exists\n"
    );
    let entry = test.namespace().root().index().search("a.txt").expect("a.txt");
    assert_eq!(entry.as_file().expect("file").content(), "first");
}

#[test]
fn test_rm() {
    let mut test = TestShell::new();
    test.quiet(&["touch a.txt", "touch b.txt", "mkdir dir.txt"]);

    assert_eq!(test.run("rm a.txt"), "Removed 'a.txt'.\n");
    assert_eq!(test.run("rm a.txt"), "rm: 'a.txt': no such file or directory\n");
    assert_eq!(test.run("rm dir.txt"), "rm: 'dir.txt': is a directory\n");
    assert_eq!(
        test.run("rm b"),
        "rm: 'b': file names must end with '.txt'\n"
    );
    assert_eq!(test.run("ls"), "Contents of /:\nb.txt  dir.txt/\n");
}

#[test]
fn test_unterminated_quote_does_nothing() {
    let mut test = TestShell::new();
    assert_eq!(test.run(r#"touch a.txt "oops"#), "unterminated quote\n");
    assert!(test.namespace().root().is_empty());
}

#[test]
fn test_custom_extension() {
    let mut test = TestShell::with_config(ShellConfig {
        file_extension: ".md".to_owned(),
        ..ShellConfig::default()
    });

    test.quiet(&["touch readme.md"]);
    assert_eq!(
        test.run("touch notes.txt"),
        "touch: 'notes.txt': file names must end with '.md'\n"
    );
}

#[test]
fn test_empty_extension_accepts_any_name() {
    let mut test = TestShell::with_config(ShellConfig {
        file_extension: String::new(),
        ..ShellConfig::default()
    });

    test.quiet(&["touch Makefile", "touch notes.txt"]);
    assert_eq!(test.run("rm Makefile"), "Removed 'Makefile'.\n");
    assert_eq!(test.run("ls"), "Contents of /:\nnotes.txt\n");
}
