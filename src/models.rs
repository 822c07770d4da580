// src/models.rs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::constants::DEFAULT_RESERVED_ENVIRONMENTS;

// --- ENVIRONMENT MODELS ---

/// A named conda environment and its root directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Environment {
    pub name: String,
    pub path: PathBuf,
}

impl Environment {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.path.display())
    }
}

/// Directory layout of a conda installation.
///
/// Windows installs put interpreters directly in the environment root,
/// everything else uses a `bin/` subdirectory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    Posix,
}

impl Platform {
    /// The layout of the machine we are running on.
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Self::Windows
        } else {
            Self::Posix
        }
    }

    pub fn separator(self) -> char {
        match self {
            Self::Windows => '\\',
            Self::Posix => '/',
        }
    }

    /// Separator between entries of a `PATH`-like variable.
    pub fn path_list_separator(self) -> char {
        match self {
            Self::Windows => ';',
            Self::Posix => ':',
        }
    }
}

/// Which interpreter binary of an environment to launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PythonVariant {
    Python,
    /// The console-less interpreter (`pythonw`).
    Windowed,
}

impl PythonVariant {
    pub fn from_flag(use_pythonw: bool) -> Self {
        if use_pythonw { Self::Windowed } else { Self::Python }
    }

    pub fn binary_name(self) -> &'static str {
        match self {
            Self::Python => "python",
            Self::Windowed => "pythonw",
        }
    }
}

// --- COMMAND MODELS ---

/// A fully shaped process invocation: an executable plus discrete argument
/// tokens. Never a shell string.
///
/// Values are built once and only read afterwards; the `with_*` methods
/// consume `self` and hand back a new value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    executable: PathBuf,
    arguments: Vec<String>,
    environment_overrides: BTreeMap<OsString, OsString>,
    working_directory: Option<PathBuf>,
    run_through_shell: bool,
}

impl CommandSpec {
    pub fn new<I, S>(executable: impl Into<PathBuf>, arguments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            executable: executable.into(),
            arguments: arguments.into_iter().map(Into::into).collect(),
            environment_overrides: BTreeMap::new(),
            working_directory: None,
            run_through_shell: false,
        }
    }

    /// Splits an already tokenized command line into executable and arguments.
    /// Returns `None` for an empty vector.
    pub fn from_argv(argv: &[String]) -> Option<Self> {
        let (program, rest) = argv.split_first()?;
        Some(Self::new(program, rest.iter().cloned()))
    }

    pub fn with_env(mut self, key: impl Into<OsString>, value: impl Into<OsString>) -> Self {
        self.environment_overrides.insert(key.into(), value.into());
        self
    }

    pub fn with_working_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_directory = Some(dir.into());
        self
    }

    pub fn through_shell(mut self, enabled: bool) -> Self {
        self.run_through_shell = enabled;
        self
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    pub fn environment_overrides(&self) -> &BTreeMap<OsString, OsString> {
        &self.environment_overrides
    }

    pub fn working_directory(&self) -> Option<&Path> {
        self.working_directory.as_deref()
    }

    pub fn runs_through_shell(&self) -> bool {
        self.run_through_shell
    }

    /// The executable followed by every argument, as one token vector.
    pub fn argv(&self) -> Vec<String> {
        std::iter::once(self.executable.to_string_lossy().into_owned())
            .chain(self.arguments.iter().cloned())
            .collect()
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let argv = self.argv();
        let rendered = shlex::try_join(argv.iter().map(String::as_str))
            .unwrap_or_else(|_| argv.join(" "));
        f.write_str(&rendered)
    }
}

/// A `major.minor.micro` release number reported by the package manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VersionTuple {
    pub major: u32,
    pub minor: u32,
    pub micro: u32,
}

impl VersionTuple {
    pub fn new(major: u32, minor: u32, micro: u32) -> Self {
        Self {
            major,
            minor,
            micro,
        }
    }

    /// True when this version is `major.minor.0` or later.
    pub fn at_least(&self, (major, minor): (u32, u32)) -> bool {
        (self.major, self.minor) >= (major, minor)
    }
}

impl fmt::Display for VersionTuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.micro)
    }
}

/// The outcome of a query whose result is shown to a user.
///
/// Keeps "nothing there" apart from "could not find out", so no caller ever
/// has to smuggle a message through the item list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listing<T> {
    Empty,
    Unavailable(String),
    Items(Vec<T>),
}

impl<T> Listing<T> {
    pub fn from_items(items: Vec<T>) -> Self {
        if items.is_empty() {
            Self::Empty
        } else {
            Self::Items(items)
        }
    }

    pub fn items(&self) -> &[T] {
        match self {
            Self::Items(items) => items,
            Self::Empty | Self::Unavailable(_) => &[],
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Listing<U> {
        match self {
            Self::Items(items) => Listing::Items(items.into_iter().map(f).collect()),
            Self::Empty => Listing::Empty,
            Self::Unavailable(reason) => Listing::Unavailable(reason),
        }
    }
}

// --- `settings.toml` MODELS ---

/// Output shape requested from `conda list`.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ListFormat {
    #[default]
    Text,
    Json,
}

/// The deserialized `settings.toml`. Paths are stored as written by the user
/// (possibly with `~`); see `ResolvedSettings` for the expanded form.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Settings {
    /// The Python interpreter of the conda installation (`python -m conda` is run through it).
    pub executable: String,
    /// Directory holding the named environments.
    pub environment_directory: String,
    /// The `.condarc` whose channels are listed and edited.
    pub configuration: String,
    /// Architecture suffix of the package index (`64`, `32`, `aarch64`...).
    pub architecture: String,
    #[serde(default)]
    pub use_pythonw: bool,
    #[serde(default)]
    pub run_through_shell: bool,
    #[serde(default = "default_reserved_environments")]
    pub reserved_environments: Vec<String>,
    #[serde(default)]
    pub list_format: ListFormat,
    #[serde(default = "default_quiet")]
    pub quiet: bool,
}

fn default_reserved_environments() -> Vec<String> {
    DEFAULT_RESERVED_ENVIRONMENTS
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_quiet() -> bool {
    true
}

impl Settings {
    /// Defaults matching a stock Miniconda install for the given layout.
    pub fn defaults_for(platform: Platform) -> Self {
        let (executable, environment_directory, configuration) = match platform {
            Platform::Windows => (
                r"~\Miniconda3\python.exe",
                r"~\Miniconda3\envs\",
                r"~\.condarc",
            ),
            Platform::Posix => (
                "~/miniconda3/bin/python",
                "~/miniconda3/envs/",
                "~/.condarc",
            ),
        };
        Self {
            executable: executable.to_string(),
            environment_directory: environment_directory.to_string(),
            configuration: configuration.to_string(),
            architecture: "64".to_string(),
            use_pythonw: false,
            run_through_shell: false,
            reserved_environments: default_reserved_environments(),
            list_format: ListFormat::default(),
            quiet: default_quiet(),
        }
    }
}

/// `Settings` after home-directory and variable expansion.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSettings {
    pub executable: PathBuf,
    pub environment_directory: PathBuf,
    pub configuration: PathBuf,
    pub architecture: String,
    pub use_pythonw: bool,
    pub run_through_shell: bool,
    pub reserved_environments: Vec<String>,
    pub list_format: ListFormat,
    pub quiet: bool,
}
