// src/core/paths.rs

use crate::constants::{BASE_ENVIRONMENT_NAME, SETTINGS_ENV_VAR, SETTINGS_FILENAME};
use crate::models::{Platform, PythonVariant};
use lazy_static::lazy_static;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

lazy_static! {
    static ref CONDAX_CONFIG_DIR: Mutex<Option<PathBuf>> = Mutex::new(None);
}

#[derive(Error, Debug)]
pub enum PathError {
    #[error("Could not find system config directory.")]
    ConfigDirNotFound,
    #[error("Could not create config directory at '{path}': {source}")]
    ConfigDirCreation {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to expand path '{template}': {message}")]
    Expansion { template: String, message: String },
}

/// Returns the condax configuration directory (`~/.config/condax`), creating
/// it on first use. The result is memoized for the life of the process.
pub fn get_condax_config_dir() -> Result<PathBuf, PathError> {
    let mut cached = CONDAX_CONFIG_DIR
        .lock()
        .unwrap_or_else(PoisonError::into_inner);

    if let Some(path) = &*cached {
        return Ok(path.clone());
    }

    let config_path = dirs::config_dir()
        .ok_or(PathError::ConfigDirNotFound)?
        .join("condax");

    if !config_path.exists() {
        fs::create_dir_all(&config_path).map_err(|e| PathError::ConfigDirCreation {
            path: config_path.display().to_string(),
            source: e,
        })?;
    }

    *cached = Some(config_path.clone());
    Ok(config_path)
}

/// Location of `settings.toml`, honouring the `CONDAX_SETTINGS` override.
pub fn get_settings_path() -> Result<PathBuf, PathError> {
    if let Ok(custom) = std::env::var(SETTINGS_ENV_VAR) {
        return expand_user_path(&custom);
    }
    get_condax_config_dir().map(|dir| dir.join(SETTINGS_FILENAME))
}

/// Expands `~` and `$VAR`/`${VAR}` in a user supplied path.
pub fn expand_user_path(template: &str) -> Result<PathBuf, PathError> {
    let expanded = shellexpand::full(template).map_err(|e| PathError::Expansion {
        template: template.to_string(),
        message: e.to_string(),
    })?;
    Ok(PathBuf::from(expanded.into_owned()))
}

// --- Lexical path handling ---
//
// Paths are handled as text for the target layout rather than through
// `std::path`, so a Windows layout can be computed (and tested) on a POSIX
// host and vice versa.

#[derive(Debug, Clone, PartialEq, Eq)]
struct LexicalPath {
    prefix: String,
    absolute: bool,
    parts: Vec<String>,
}

fn is_separator(c: char, platform: Platform) -> bool {
    match platform {
        Platform::Windows => c == '\\' || c == '/',
        Platform::Posix => c == '/',
    }
}

impl LexicalPath {
    fn parse(path: &Path, platform: Platform) -> Self {
        let raw = dunce::simplified(path).to_string_lossy().into_owned();
        let (prefix, rest, absolute) = split_prefix(&raw, platform);

        let mut parts: Vec<String> = Vec::new();
        for part in rest.split(|c| is_separator(c, platform)) {
            match part {
                "" | "." => {}
                ".." => match parts.last() {
                    Some(last) if last != ".." => {
                        parts.pop();
                    }
                    // `..` above the root is the root.
                    _ if absolute => {}
                    _ => parts.push("..".to_string()),
                },
                other => parts.push(other.to_string()),
            }
        }

        Self {
            prefix,
            absolute,
            parts,
        }
    }

    fn render(&self, platform: Platform) -> PathBuf {
        let separator = platform.separator();
        let mut out = self.prefix.clone();
        if self.absolute {
            out.push(separator);
        }
        out.push_str(&self.parts.join(&separator.to_string()));
        if out.is_empty() {
            out.push('.');
        }
        PathBuf::from(out)
    }

    fn file_name(&self) -> Option<&str> {
        self.parts.last().map(String::as_str)
    }

    fn parent(mut self) -> Self {
        self.parts.pop();
        self
    }

    fn join(mut self, segment: &str) -> Self {
        self.parts.push(segment.to_string());
        self
    }
}

/// Splits a drive (`C:`) or UNC (`\\server\share`) prefix off a Windows path.
fn split_prefix(raw: &str, platform: Platform) -> (String, &str, bool) {
    let starts_with_separator = |s: &str| s.chars().next().is_some_and(|c| is_separator(c, platform));

    if platform == Platform::Windows {
        if let Some(unc) = raw.strip_prefix(r"\\").or_else(|| raw.strip_prefix("//")) {
            let mut pieces = unc.splitn(3, |c| is_separator(c, platform));
            let server = pieces.next().unwrap_or_default();
            let share = pieces.next().unwrap_or_default();
            let rest = pieces.next().unwrap_or_default();
            return (format!(r"\\{}\{}", server, share), rest, true);
        }

        let mut chars = raw.chars();
        if let (Some(drive), Some(':')) = (chars.next(), chars.next()) {
            if drive.is_ascii_alphabetic() {
                let rest = raw.get(2..).unwrap_or_default();
                return (format!("{}:", drive), rest, starts_with_separator(rest));
            }
        }
    }

    (String::new(), raw, starts_with_separator(raw))
}

/// Collapses `.`/`..`, repeated and trailing separators, and rewrites
/// separators for the target layout.
pub fn normalize(path: &Path, platform: Platform) -> PathBuf {
    LexicalPath::parse(path, platform).render(platform)
}

/// Follows symlinks when the path exists on this machine; otherwise falls
/// back to the lexical form.
fn canonical_form(path: &Path, platform: Platform) -> PathBuf {
    if platform == Platform::current() {
        if let Ok(resolved) = dunce::canonicalize(path) {
            return normalize(&resolved, platform);
        }
    }
    normalize(path, platform)
}

fn same_path(a: &Path, b: &Path, platform: Platform) -> bool {
    let a = canonical_form(a, platform);
    let b = canonical_form(b, platform);
    match platform {
        Platform::Windows => a
            .to_string_lossy()
            .eq_ignore_ascii_case(&b.to_string_lossy()),
        Platform::Posix => a == b,
    }
}

/// Root of the installation that owns `executable`.
///
/// On POSIX the interpreter lives in `<root>/bin/`, so the `bin` segment is
/// dropped; on Windows it sits directly in `<root>`.
pub fn base_path_for(executable: &Path, platform: Platform) -> PathBuf {
    let exe = LexicalPath::parse(&canonical_form(executable, platform), platform);
    let parent = exe.parent();
    let root = match platform {
        Platform::Posix if parent.file_name() == Some("bin") => parent.parent(),
        _ => parent,
    };
    root.render(platform)
}

/// Translates between environment directories and the binaries inside them
/// for one conda installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathResolver {
    executable: PathBuf,
    platform: Platform,
}

impl PathResolver {
    pub fn new(executable: impl Into<PathBuf>, platform: Platform) -> Self {
        Self {
            executable: executable.into(),
            platform,
        }
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// The configured interpreter of the installation.
    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// Directory of the `base` environment.
    pub fn base_path(&self) -> PathBuf {
        base_path_for(&self.executable, self.platform)
    }

    pub fn is_base(&self, path: &Path) -> bool {
        same_path(path, &self.base_path(), self.platform)
    }

    /// `"base"` for the installation root, otherwise the directory name.
    pub fn name_for_path(&self, path: &Path) -> String {
        if self.is_base(path) {
            return BASE_ENVIRONMENT_NAME.to_string();
        }
        let lexical = LexicalPath::parse(path, self.platform);
        match lexical.file_name() {
            Some(name) => name.to_string(),
            None => lexical.render(self.platform).to_string_lossy().into_owned(),
        }
    }

    /// Path of binary `variant` inside `environment`.
    ///
    /// The file is not required to exist; a missing interpreter surfaces
    /// when the process fails to launch.
    pub fn executable_for_environment(&self, environment: &Path, variant: &str) -> PathBuf {
        let root = LexicalPath::parse(environment, self.platform);
        let located = match self.platform {
            Platform::Posix => root.join("bin").join(variant),
            Platform::Windows => {
                if variant.to_ascii_lowercase().ends_with(".exe") {
                    root.join(variant)
                } else {
                    root.join(&format!("{}.exe", variant))
                }
            }
        };
        located.render(self.platform)
    }

    pub fn python_for_environment(&self, environment: &Path, variant: PythonVariant) -> PathBuf {
        self.executable_for_environment(environment, variant.binary_name())
    }

    /// Directory holding an environment's shared libraries and helper binaries.
    pub fn library_bin_dir(&self, environment: &Path) -> PathBuf {
        let root = LexicalPath::parse(environment, self.platform);
        let dir = match self.platform {
            Platform::Windows => root.join("Library").join("bin"),
            Platform::Posix => root.join("bin"),
        };
        dir.render(self.platform)
    }

    pub fn normalize(&self, path: &Path) -> PathBuf {
        normalize(path, self.platform)
    }

    /// True when `path` is an existing directory, or is the installation root.
    pub fn recognizes(&self, path: &Path) -> bool {
        path.is_dir() || self.is_base(path)
    }
}
