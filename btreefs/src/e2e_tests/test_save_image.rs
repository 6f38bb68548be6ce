//! Test writing images of the namespace to disk.

use crate::e2e_tests::helpers::*;

#[test]
fn test_save_root_image() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut test = TestShell::with_image_directory(dir.path());
    test.quiet(&[
        "mkdir docs",
        "cd docs",
        "touch b.txt",
        "mkdir inner",
        "cd inner",
        "touch deep.txt",
        "cd /",
        "touch a.txt",
    ]);

    let path = dir.path().join("fs.img");
    assert_eq!(
        test.run("save fs.img"),
        format!("Image saved to {}\n", path.display())
    );

    let image = std::fs::read_to_string(&path).expect("read image");
    assert_eq!(
        image,
        "/\n|-- a.txt\n|-- docs/\n  |-- b.txt\n  |-- inner/\n    |-- deep.txt\n"
    );
    assert_eq!(image, test.image());
}

#[test]
fn test_save_current_subtree() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut test = TestShell::with_image_directory(dir.path());
    test.quiet(&["mkdir docs", "touch top.txt", "cd docs", "touch x.txt"]);

    let target = dir.path().join("docs.img");
    let line = format!("save {}", target.display());
    test.run(&line);

    let image = std::fs::read_to_string(&target).expect("read image");
    assert_eq!(image, "/docs\n|-- x.txt\n");
}

#[test]
fn test_save_reports_io_errors() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut test = TestShell::with_image_directory(&dir.path().join("missing"));

    let output = test.run("save fs.img");
    assert!(output.starts_with("save: "), "unexpected output: {output}");
}
