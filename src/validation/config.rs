//! Gate configuration: the ordered list of checks to run.

use camino::Utf8Path;
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Timeout applied to checks that do not set one.
pub const DEFAULT_CHECK_TIMEOUT_SECS: u64 = 120;

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "taskgate.toml";

/// Category of a check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckKind {
    /// Compilation.
    Build,
    /// Static analysis.
    Lint,
    /// Documentation generation.
    Docs,
    /// Formatting.
    Format,
}

impl fmt::Display for CheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Build => "build",
            Self::Lint => "lint",
            Self::Docs => "docs",
            Self::Format => "format",
        })
    }
}

/// One external check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckDefinition {
    /// Name used to prefix this check's diagnostics.
    pub name: String,
    /// Check category.
    pub kind: CheckKind,
    /// Program to execute.
    pub program: String,
    /// Program arguments.
    #[serde(default)]
    pub args: Vec<String>,
    /// Per-check timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

const fn default_timeout_secs() -> u64 {
    DEFAULT_CHECK_TIMEOUT_SECS
}

impl CheckDefinition {
    /// Creates a check with the default timeout.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        kind: CheckKind,
        program: impl Into<String>,
        args: &[&str],
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            program: program.into(),
            args: args.iter().map(|arg| (*arg).to_owned()).collect(),
            timeout_secs: DEFAULT_CHECK_TIMEOUT_SECS,
        }
    }

    /// Sets the timeout.
    #[must_use]
    pub const fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Returns the timeout as a [`Duration`].
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Ordered checks run by the validation gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateConfig {
    /// Checks in execution order.
    pub checks: Vec<CheckDefinition>,
}

impl Default for GateConfig {
    /// `cargo check`, `cargo clippy`, `cargo doc` and `cargo fmt --check`.
    fn default() -> Self {
        Self {
            checks: vec![
                CheckDefinition::new(
                    "build",
                    CheckKind::Build,
                    "cargo",
                    &["check", "--all-targets"],
                ),
                CheckDefinition::new(
                    "clippy",
                    CheckKind::Lint,
                    "cargo",
                    &["clippy", "--all-targets", "--", "-D", "warnings"],
                ),
                CheckDefinition::new("docs", CheckKind::Docs, "cargo", &["doc", "--no-deps"]),
                CheckDefinition::new("format", CheckKind::Format, "cargo", &["fmt", "--check"]),
            ],
        }
    }
}

impl GateConfig {
    /// Parses a configuration from TOML text with `[[checks]]` tables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for invalid TOML and
    /// [`ConfigError::Invalid`] when the check list is empty or a check has
    /// a blank name or program, or a zero timeout.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|err| ConfigError::Parse(Arc::new(err)))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] when the file cannot be read, otherwise
    /// as [`GateConfig::from_toml_str`].
    pub fn load(path: &Utf8Path) -> Result<Self, ConfigError> {
        let read_error = |source| ConfigError::Read {
            path: path.to_string(),
            source: Arc::new(source),
        };
        let file_name = path
            .file_name()
            .ok_or_else(|| read_error(std::io::Error::other("path must include a file name")))?;
        let parent = path
            .parent()
            .filter(|parent| !parent.as_str().is_empty())
            .unwrap_or_else(|| Utf8Path::new("."));
        let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(read_error)?;
        let text = dir.read_to_string(file_name).map_err(read_error)?;
        Self::from_toml_str(&text)
    }

    /// Loads `path` when given, else `taskgate.toml` in `workdir` when it
    /// exists, else the defaults.
    ///
    /// # Errors
    ///
    /// As [`GateConfig::load`].
    pub fn discover(path: Option<&Utf8Path>, workdir: &Utf8Path) -> Result<Self, ConfigError> {
        if let Some(explicit) = path {
            return Self::load(explicit);
        }
        let candidate = workdir.join(DEFAULT_CONFIG_FILE);
        if candidate.is_file() {
            Self::load(&candidate)
        } else {
            Ok(Self::default())
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.checks.is_empty() {
            return Err(ConfigError::Invalid("at least one check is required".to_owned()));
        }
        for check in &self.checks {
            if check.name.trim().is_empty() || check.program.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "every check needs a name and a program".to_owned(),
                ));
            }
            if check.timeout_secs == 0 {
                return Err(ConfigError::Invalid(format!(
                    "check '{}' has a zero timeout",
                    check.name
                )));
            }
        }
        Ok(())
    }
}

/// Errors raised while loading gate configuration.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// Offending path.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: Arc<std::io::Error>,
    },

    /// The file is not valid TOML for a gate configuration.
    #[error("invalid gate configuration: {0}")]
    Parse(Arc<toml::de::Error>),

    /// The configuration parsed but is not usable.
    #[error("invalid gate configuration: {0}")]
    Invalid(String),
}
