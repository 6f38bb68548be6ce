//! Common helpers for end-to-end tests.

use std::path::Path;

use crate::config::ShellConfig;
use crate::namespace::Namespace;
use crate::shell::{Flow, Shell};
use crate::simulation::SimulatedTimeSource;

/// A shell on a simulated clock, with its output captured per command.
pub struct TestShell {
    shell: Shell<SimulatedTimeSource>,
}

impl TestShell {
    /// Create a shell with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ShellConfig::default())
    }

    /// Create a shell whose relative images land in `dir`.
    #[must_use]
    pub fn with_image_directory(dir: &Path) -> Self {
        Self::with_config(ShellConfig {
            image_directory: dir.to_path_buf(),
            ..ShellConfig::default()
        })
    }

    #[must_use]
    pub fn with_config(config: ShellConfig) -> Self {
        Self {
            shell: Shell::new(config, SimulatedTimeSource::default_start()),
        }
    }

    /// Execute one line and return everything it printed.
    pub fn run(&mut self, line: &str) -> String {
        let mut out = Vec::new();
        let flow = self.shell.execute_line(line, &mut out).expect("write to vec");
        assert_eq!(flow, Flow::Continue, "'{line}' ended the session");
        String::from_utf8(out).expect("utf8 output")
    }

    /// Execute each line in turn, expecting none of them to print anything.
    pub fn quiet(&mut self, lines: &[&str]) {
        for line in lines {
            let output = self.run(line);
            assert!(output.is_empty(), "'{line}' printed: {output}");
        }
    }

    /// Move the simulated clock forward.
    pub fn advance(&self, ms: u64) {
        self.namespace().clock().advance(ms);
    }

    #[must_use]
    pub fn namespace(&self) -> &Namespace<SimulatedTimeSource> {
        self.shell.namespace()
    }

    #[must_use]
    pub fn prompt(&self) -> String {
        self.shell.prompt()
    }

    /// Export the current directory subtree as a string.
    #[must_use]
    pub fn image(&self) -> String {
        let mut out = Vec::new();
        self.namespace().export(&mut out).expect("export");
        String::from_utf8(out).expect("utf8 image")
    }
}

impl Default for TestShell {
    fn default() -> Self {
        Self::new()
    }
}

/// Run a whole script through `Shell::run` and return the transcript.
pub fn transcript(script: &str) -> String {
    let mut shell = Shell::new(
        ShellConfig::default(),
        SimulatedTimeSource::default_start(),
    );
    let mut out = Vec::new();
    shell.run(script.as_bytes(), &mut out).expect("run script");
    String::from_utf8(out).expect("utf8 transcript")
}
