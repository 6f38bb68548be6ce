//! Test creating, entering, listing and removing directories.

use crate::e2e_tests::helpers::*;

#[test]
fn test_mkdir_cd_ls() {
    let mut test = TestShell::new();

    test.quiet(&["mkdir docs", "mkdir src", "cd docs", "mkdir drafts"]);
    assert_eq!(test.prompt(), "fs:/docs$ ");
    assert_eq!(test.run("ls"), "Contents of /docs:\ndrafts/\n");

    test.quiet(&["cd .."]);
    assert_eq!(test.run("ls"), "Contents of /:\ndocs/  src/\n");
}

#[test]
fn test_cd_accepts_paths() {
    let mut test = TestShell::new();
    test.quiet(&["mkdir a", "cd a", "mkdir b", "cd b", "mkdir c", "cd /"]);

    test.quiet(&["cd a/b/c"]);
    assert_eq!(test.prompt(), "fs:/a/b/c$ ");

    test.quiet(&["cd ../.."]);
    assert_eq!(test.prompt(), "fs:/a$ ");

    test.quiet(&["cd /a/b"]);
    assert_eq!(test.prompt(), "fs:/a/b$ ");

    test.quiet(&["cd .", "cd /", "cd .."]);
    assert_eq!(test.prompt(), "fs:/$ ");
}

#[test]
fn test_cd_errors_leave_cursor() {
    let mut test = TestShell::new();
    test.quiet(&["mkdir a", "touch f.txt", "cd a"]);

    assert_eq!(
        test.run("cd missing"),
        "cd: 'missing': no such file or directory\n"
    );
    assert_eq!(test.run("cd /f.txt"), "cd: 'f.txt': not a directory\n");
    assert_eq!(test.run("cd"), "cd: missing operand\n");
    assert_eq!(test.prompt(), "fs:/a$ ");
}

#[test]
fn test_rmdir_rules() {
    let mut test = TestShell::new();
    test.quiet(&["mkdir full", "mkdir empty", "touch f.txt", "cd full", "mkdir x", "cd .."]);

    assert_eq!(test.run("rmdir full"), "rmdir: 'full': directory not empty\n");
    assert_eq!(test.run("rmdir f.txt"), "rmdir: 'f.txt': not a directory\n");
    assert_eq!(
        test.run("rmdir ghost"),
        "rmdir: 'ghost': no such file or directory\n"
    );

    test.quiet(&["rmdir empty", "cd full", "rmdir x", "cd ..", "rmdir full"]);
    assert_eq!(test.run("ls"), "Contents of /:\nf.txt\n");
}

#[test]
fn test_mkdir_rejects_bad_names() {
    let mut test = TestShell::new();
    test.quiet(&["mkdir docs"]);

    assert_eq!(test.run("mkdir docs"), "mkdir: 'docs': entry already exists\n");
    assert_eq!(test.run("mkdir a/b"), "mkdir: invalid name 'a/b'\n");
    assert_eq!(test.run("mkdir .."), "mkdir: invalid name '..'\n");
    assert_eq!(test.run(r#"mkdir """#), "mkdir: invalid name ''\n");
    assert_eq!(test.run("ls"), "Contents of /:\ndocs/\n");
}

#[test]
fn test_empty_directory_listing() {
    let mut test = TestShell::new();
    assert_eq!(test.run("ls"), "Directory / is empty.\n");

    test.quiet(&["mkdir a", "cd a"]);
    assert_eq!(test.run("ls -l"), "Directory /a is empty.\n");
}
