//! Interactive command shell over a [`Namespace`].
//!
//! Lines are split into whitespace-separated tokens (a double-quoted span may
//! contain spaces), parsed into a [`Command`], and executed against the
//! namespace. Every failure is reported as a single line on the output stream
//! and the shell keeps going; only I/O errors on the streams themselves end
//! the session.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::config::ShellConfig;
use crate::format::{render_listing, render_metadata};
use crate::namespace::{Namespace, NamespaceError};
use crate::time::{SystemTimeSource, TimeSource};

const HELP: &str = "\
Available commands:
  ls                    list the current directory
  ls -l                 list with modification times
  cd <path>             change directory (supports ., .., / and a/b)
  mkdir <dir>           create a directory
  rmdir <dir>           remove an empty directory
  touch <file> [\"text\"] create a file, optionally with content
  rm <file>             remove a file
  stat <name>           show the metadata of a file or directory
  save <image>          write an image of the current directory tree
  help                  show this help
  exit                  leave the shell
";

/// A parsed shell command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List { long: bool },
    ChangeDirectory(String),
    MakeDirectory(String),
    RemoveDirectory(String),
    Touch { name: String, content: String },
    Remove(String),
    Stat(String),
    Save(String),
    Help,
    Exit,
}

/// Errors produced while parsing a command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// The named command needs an operand that was not given.
    MissingOperand(&'static str),
    /// The first token is not a known command.
    UnknownCommand(String),
    /// A double quote was opened and never closed.
    UnterminatedQuote,
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingOperand(command) => write!(f, "{command}: missing operand"),
            Self::UnknownCommand(command) => write!(f, "command not found: {command}"),
            Self::UnterminatedQuote => write!(f, "unterminated quote"),
        }
    }
}

impl std::error::Error for CommandError {}

/// Split a line into tokens.
///
/// Tokens are separated by whitespace. Text between double quotes is taken
/// literally, spaces included, and the quotes are dropped; `""` yields an
/// empty token.
pub fn tokenize(line: &str) -> Result<Vec<String>, CommandError> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                in_token = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            c => {
                current.push(c);
                in_token = true;
            }
        }
    }

    if in_quotes {
        return Err(CommandError::UnterminatedQuote);
    }
    if in_token {
        tokens.push(current);
    }
    Ok(tokens)
}

impl Command {
    /// Parse one input line. Blank lines parse to `None`.
    pub fn parse(line: &str) -> Result<Option<Self>, CommandError> {
        let tokens = tokenize(line)?;
        let Some((command, args)) = tokens.split_first() else {
            return Ok(None);
        };
        let operand = |name: &'static str| {
            args.first()
                .map(ToOwned::to_owned)
                .ok_or(CommandError::MissingOperand(name))
        };

        let parsed = match command.as_str() {
            "ls" => Self::List {
                long: args.first().is_some_and(|arg| arg == "-l"),
            },
            "cd" => Self::ChangeDirectory(operand("cd")?),
            "mkdir" => Self::MakeDirectory(operand("mkdir")?),
            "rmdir" => Self::RemoveDirectory(operand("rmdir")?),
            "touch" => Self::Touch {
                name: operand("touch")?,
                content: args.get(1).map(ToOwned::to_owned).unwrap_or_default(),
            },
            "rm" => Self::Remove(operand("rm")?),
            "stat" => Self::Stat(operand("stat")?),
            "save" => Self::Save(operand("save")?),
            "help" => Self::Help,
            "exit" => Self::Exit,
            other => return Err(CommandError::UnknownCommand(other.to_owned())),
        };
        Ok(Some(parsed))
    }
}

/// Whether the shell should keep reading commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// A shell session: one namespace plus the configuration it runs under.
#[derive(Debug)]
pub struct Shell<C = SystemTimeSource> {
    namespace: Namespace<C>,
    config: ShellConfig,
}

impl<C: TimeSource> Shell<C> {
    /// Start a session on an empty namespace.
    #[must_use]
    pub fn new(config: ShellConfig, clock: C) -> Self {
        let namespace =
            Namespace::with_clock(clock).with_file_extension(config.file_extension.clone());
        Self { namespace, config }
    }

    #[must_use]
    pub const fn namespace(&self) -> &Namespace<C> {
        &self.namespace
    }

    #[must_use]
    pub fn prompt(&self) -> String {
        format!("{}:{}$ ", self.config.prompt, self.namespace.current_path())
    }

    /// Read commands from `input` until `exit` or end of input.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, out: &mut W) -> io::Result<()> {
        let mut lines = input.lines();
        loop {
            write!(out, "{}", self.prompt())?;
            out.flush()?;

            let Some(line) = lines.next() else {
                writeln!(out)?;
                break;
            };
            if self.execute_line(&line?, out)? == Flow::Exit {
                break;
            }
        }
        writeln!(out, "Exiting...")?;
        Ok(())
    }

    /// Parse and execute one line.
    pub fn execute_line<W: Write>(&mut self, line: &str, out: &mut W) -> io::Result<Flow> {
        match Command::parse(line) {
            Ok(Some(command)) => self.execute(command, out),
            Ok(None) => Ok(Flow::Continue),
            Err(err) => {
                writeln!(out, "{err}")?;
                Ok(Flow::Continue)
            }
        }
    }

    /// Execute one parsed command, writing its output to `out`.
    pub fn execute<W: Write>(&mut self, command: Command, out: &mut W) -> io::Result<Flow> {
        tracing::debug!(?command, "executing command");

        match command {
            Command::List { long } => self.list(long, out)?,
            Command::ChangeDirectory(path) => {
                let result = self.namespace.change_directory(&path);
                report(out, "cd", result)?;
            }
            Command::MakeDirectory(name) => {
                let result = self.namespace.make_directory(&name);
                report(out, "mkdir", result)?;
            }
            Command::RemoveDirectory(name) => {
                let result = self.namespace.remove_directory(&name).map(drop);
                report(out, "rmdir", result)?;
            }
            Command::Touch { name, content } => {
                let result = self.namespace.create_file(&name, &content);
                report(out, "touch", result)?;
            }
            Command::Remove(name) => match self.namespace.remove_file(&name) {
                Ok(_) => writeln!(out, "Removed '{name}'.")?,
                Err(err) => writeln!(out, "rm: {err}")?,
            },
            Command::Stat(name) => match self.namespace.stat(&name) {
                Ok(meta) => write!(out, "{}", render_metadata(&meta, &Local))?,
                Err(err) => writeln!(out, "stat: {err}")?,
            },
            Command::Save(target) => {
                let path = self.image_path(&target);
                match self.namespace.save(&path) {
                    Ok(()) => writeln!(out, "Image saved to {}", path.display())?,
                    Err(err) => writeln!(out, "save: {err}")?,
                }
            }
            Command::Help => write!(out, "{HELP}")?,
            Command::Exit => return Ok(Flow::Exit),
        }
        Ok(Flow::Continue)
    }

    fn list<W: Write>(&mut self, long: bool, out: &mut W) -> io::Result<()> {
        let path = self.namespace.current_path();
        match self.namespace.list() {
            Ok(entries) if entries.is_empty() => writeln!(out, "Directory {path} is empty."),
            Ok(entries) => {
                writeln!(out, "Contents of {path}:")?;
                write!(out, "{}", render_listing(&entries, long, &Local))
            }
            Err(err) => writeln!(out, "ls: {err}"),
        }
    }

    /// Relative image targets land in the configured image directory.
    fn image_path(&self, target: &str) -> PathBuf {
        let path = Path::new(target);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.config.image_directory.join(path)
        }
    }
}

fn report<W: Write>(
    out: &mut W,
    command: &str,
    result: Result<(), NamespaceError>,
) -> io::Result<()> {
    match result {
        Ok(()) => Ok(()),
        Err(err) => writeln!(out, "{command}: {err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::SimulatedTimeSource;

    fn shell() -> Shell<SimulatedTimeSource> {
        Shell::new(ShellConfig::default(), SimulatedTimeSource::default_start())
    }

    fn run_line(shell: &mut Shell<SimulatedTimeSource>, line: &str) -> String {
        let mut out = Vec::new();
        shell.execute_line(line, &mut out).expect("write to vec");
        String::from_utf8(out).expect("utf8")
    }

    #[test]
    fn test_tokenize() {
        assert_eq!(tokenize("  ls   -l ").expect("ok"), vec!["ls", "-l"]);
        assert_eq!(
            tokenize(r#"touch a.txt "hello world""#).expect("ok"),
            vec!["touch", "a.txt", "hello world"]
        );
        assert_eq!(tokenize(r#"touch a.txt """#).expect("ok"), vec!["touch", "a.txt", ""]);
        assert_eq!(tokenize(r#"x"y z"w"#).expect("ok"), vec!["xy zw"]);
        assert!(tokenize("").expect("ok").is_empty());
        assert_eq!(
            tokenize(r#"touch "open"#),
            Err(CommandError::UnterminatedQuote)
        );
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("   "), Ok(None));
        assert_eq!(Command::parse("ls"), Ok(Some(Command::List { long: false })));
        assert_eq!(Command::parse("ls -l"), Ok(Some(Command::List { long: true })));
        assert_eq!(
            Command::parse("cd .."),
            Ok(Some(Command::ChangeDirectory("..".to_owned())))
        );
        assert_eq!(
            Command::parse("touch a.txt"),
            Ok(Some(Command::Touch {
                name: "a.txt".to_owned(),
                content: String::new(),
            }))
        );
        assert_eq!(
            Command::parse(r#"touch a.txt "some text""#),
            Ok(Some(Command::Touch {
                name: "a.txt".to_owned(),
                content: "some text".to_owned(),
            }))
        );
        assert_eq!(Command::parse("exit"), Ok(Some(Command::Exit)));
    }

    #[test]
    fn test_parse_errors() {
        for command in ["cd", "mkdir", "rmdir", "touch", "rm", "stat", "save"] {
            let err = Command::parse(command).expect_err("missing operand");
            assert_eq!(err.to_string(), format!("{command}: missing operand"));
        }
        assert_eq!(
            Command::parse("format c:"),
            Err(CommandError::UnknownCommand("format".to_owned()))
        );
    }

    #[test]
    fn test_prompt_follows_cursor() {
        let mut shell = shell();
        assert_eq!(shell.prompt(), "fs:/$ ");
        run_line(&mut shell, "mkdir docs");
        run_line(&mut shell, "cd docs");
        assert_eq!(shell.prompt(), "fs:/docs$ ");
    }

    #[test]
    fn test_ls_output() {
        let mut shell = shell();
        assert_eq!(run_line(&mut shell, "ls"), "Directory / is empty.\n");

        run_line(&mut shell, "mkdir docs");
        run_line(&mut shell, "touch b.txt");
        assert_eq!(run_line(&mut shell, "ls"), "Contents of /:\nb.txt  docs/\n");

        let long = run_line(&mut shell, "ls -l");
        assert!(long.starts_with("Contents of /:\n"));
        assert!(long.contains("  b.txt\n"));
        assert!(long.contains("  docs/\n"));
    }

    #[test]
    fn test_error_messages() {
        let mut shell = shell();
        run_line(&mut shell, "mkdir docs");

        assert_eq!(
            run_line(&mut shell, "mkdir docs"),
            "mkdir: 'docs': entry already exists\n"
        );
        assert_eq!(
            run_line(&mut shell, "touch notes"),
            "touch: 'notes': file names must end with '.txt'\n"
        );
        assert_eq!(
            run_line(&mut shell, "cd nowhere"),
            "cd: 'nowhere': no such file or directory\n"
        );
        assert_eq!(
            run_line(&mut shell, "rmdir nowhere"),
            "rmdir: 'nowhere': no such file or directory\n"
        );
        assert_eq!(run_line(&mut shell, "bogus"), "command not found: bogus\n");
    }

    #[test]
    fn test_stat_output() {
        let mut shell = shell();
        run_line(&mut shell, r#"touch a.txt "hi there""#);

        let report = run_line(&mut shell, "stat a.txt");
        assert!(report.contains("Name: a.txt"));
        assert!(report.contains("Size: 8 bytes"));
        assert!(report.contains("Content: hi there"));
    }

    #[test]
    fn test_run_until_exit() {
        let mut shell = shell();
        let input = b"mkdir a\ncd a\nexit\nmkdir never\n";
        let mut out = Vec::new();

        shell.run(&input[..], &mut out).expect("run");

        let text = String::from_utf8(out).expect("utf8");
        assert!(text.starts_with("fs:/$ fs:/$ fs:/a$ "));
        assert!(text.ends_with("Exiting...\n"));
        assert_eq!(shell.namespace().current_path(), "/a");
    }

    #[test]
    fn test_run_stops_at_end_of_input() {
        let mut shell = shell();
        let mut out = Vec::new();

        shell.run(&b"touch x.txt"[..], &mut out).expect("run");

        let text = String::from_utf8(out).expect("utf8");
        assert!(text.ends_with("fs:/$ \nExiting...\n"));
        assert!(shell.namespace().root().index().contains("x.txt"));
    }

    #[test]
    fn test_image_path_resolution() {
        let config = ShellConfig {
            image_directory: PathBuf::from("/var/images"),
            ..ShellConfig::default()
        };
        let shell = Shell::new(config, SimulatedTimeSource::default_start());

        assert_eq!(shell.image_path("fs.img"), PathBuf::from("/var/images/fs.img"));
        assert_eq!(shell.image_path("/tmp/fs.img"), PathBuf::from("/tmp/fs.img"));
    }
}
