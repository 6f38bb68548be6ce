//! Test that a script produces the same transcript on every run.

use crate::e2e_tests::helpers::*;

const SCRIPT: &str = "\
mkdir docs
cd docs
touch a.txt \"alpha\"
touch b.txt
ls
cd ..
ls
rmdir docs
rm nothing.txt
help
exit
ls
";

#[test]
fn test_transcript_is_deterministic() {
    assert_eq!(transcript(SCRIPT), transcript(SCRIPT));
}

#[test]
fn test_transcript_contents() {
    let text = transcript(SCRIPT);

    assert!(text.contains("fs:/docs$ Contents of /docs:\na.txt  b.txt\n"));
    assert!(text.contains("fs:/$ Contents of /:\ndocs/\n"));
    assert!(text.contains("rmdir: 'docs': directory not empty\n"));
    assert!(text.contains("rm: 'nothing.txt': no such file or directory\n"));
    assert!(text.contains("Available commands:"));
    assert!(text.ends_with("fs:/$ Exiting...\n"));
}

#[test]
fn test_end_of_input_exits() {
    let text = transcript("mkdir a\n");
    assert_eq!(text, "fs:/$ fs:/$ \nExiting...\n");
}
