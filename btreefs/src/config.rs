//! Shell configuration.
//!
//! Loaded once at startup from environment variables. Every variable is
//! optional; parsing is kept separate from `std::env` so it can be tested
//! with a plain lookup function.

use std::path::PathBuf;

/// Configuration for the interactive shell.
///
/// # Post-conditions
///
/// - `file_extension` is empty or starts with `.` and contains no `/`
/// - `prompt` is never empty
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellConfig {
    /// Suffix every file name passed to `touch` and `rm` must carry.
    /// Empty disables the check.
    pub file_extension: String,
    /// Directory that relative `save` targets are resolved against.
    pub image_directory: PathBuf,
    /// Prompt prefix, rendered as `<prompt>:<path>$ `.
    pub prompt: String,
}

/// Error returned when loading configuration fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment variable has an invalid value.
    InvalidValue { name: String, message: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { name, message } => {
                write!(f, "invalid value for {name}: {message}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            file_extension: Self::DEFAULT_FILE_EXTENSION.to_owned(),
            image_directory: PathBuf::from(Self::DEFAULT_IMAGE_DIRECTORY),
            prompt: Self::DEFAULT_PROMPT.to_owned(),
        }
    }
}

impl ShellConfig {
    /// Default required file suffix.
    pub const DEFAULT_FILE_EXTENSION: &'static str = ".txt";
    /// Default directory for saved images.
    pub const DEFAULT_IMAGE_DIRECTORY: &'static str = ".";
    /// Default prompt prefix.
    pub const DEFAULT_PROMPT: &'static str = "fs";

    const FILE_EXTENSION_VAR: &'static str = "BTREEFS_FILE_EXTENSION";
    const IMAGE_DIRECTORY_VAR: &'static str = "BTREEFS_IMAGE_DIRECTORY";
    const PROMPT_VAR: &'static str = "BTREEFS_PROMPT";

    /// Load configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `BTREEFS_FILE_EXTENSION`: required file suffix (default: `.txt`)
    /// - `BTREEFS_IMAGE_DIRECTORY`: base directory for `save` (default: `.`)
    /// - `BTREEFS_PROMPT`: prompt prefix (default: `fs`)
    ///
    /// # Errors
    ///
    /// Returns an error if `BTREEFS_FILE_EXTENSION` is non-empty and does not
    /// look like `.ext`, or if `BTREEFS_PROMPT` is set but empty.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file_extension = Self::load_file_extension(lookup(Self::FILE_EXTENSION_VAR))?;
        let image_directory = lookup(Self::IMAGE_DIRECTORY_VAR).map_or_else(
            || PathBuf::from(Self::DEFAULT_IMAGE_DIRECTORY),
            PathBuf::from,
        );
        let prompt = Self::load_prompt(lookup(Self::PROMPT_VAR))?;

        Ok(Self {
            file_extension,
            image_directory,
            prompt,
        })
    }

    fn load_file_extension(value: Option<String>) -> Result<String, ConfigError> {
        let Some(value) = value else {
            return Ok(Self::DEFAULT_FILE_EXTENSION.to_owned());
        };
        if value.is_empty() {
            return Ok(value);
        }
        if !value.starts_with('.') || value.len() < 2 || value.contains('/') {
            return Err(ConfigError::InvalidValue {
                name: Self::FILE_EXTENSION_VAR.to_owned(),
                message: format!("'{value}' must look like '.ext'"),
            });
        }
        Ok(value)
    }

    fn load_prompt(value: Option<String>) -> Result<String, ConfigError> {
        match value {
            Some(value) if value.is_empty() => Err(ConfigError::InvalidValue {
                name: Self::PROMPT_VAR.to_owned(),
                message: "must not be empty".to_owned(),
            }),
            Some(value) => Ok(value),
            None => Ok(Self::DEFAULT_PROMPT.to_owned()),
        }
    }
}
