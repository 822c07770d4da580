// src/core/commands.rs

//! Shapes every conda invocation as an executable plus discrete argument
//! tokens, and parses what conda prints back.
//!
//! Nothing in here spawns a process. Argument vectors are never joined into
//! a shell string; a package or environment name with spaces, quotes, or
//! `;` in it reaches conda as exactly one argument.

use crate::constants::MANAGER_MODULE;
use crate::models::{CommandSpec, ListFormat, Listing, VersionTuple};
use crate::system::executor::ExecutionError;
use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Marker that tells `conda remove` to delete the whole environment.
pub const REMOVE_ALL_FLAG: &str = "--all";
const YES_FLAG: &str = "-y";
const QUIET_FLAG: &str = "-q";
const JSON_FLAG: &str = "--json";

/// Failures talking to conda: it could not be run, or it printed something
/// we could not make sense of.
#[derive(Error, Debug)]
pub enum ExternalToolError {
    #[error("conda could not be invoked: {0}")]
    Invocation(#[from] ExecutionError),
    #[error("conda returned malformed JSON for {what}: {source}")]
    MalformedJson {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("conda returned an unexpected {what}: {detail}")]
    UnexpectedShape { what: &'static str, detail: String },
    #[error("'{0}' is not a major.minor.micro version")]
    BadVersion(String),
    #[error("Could not read the package index at '{url}': {message}")]
    PackageIndex { url: String, message: String },
    #[error("'{0}' starts with '-' and would be read by conda as an option")]
    OptionLikeOperand(String),
}

/// Builds conda commands run through one interpreter (`<python> -m conda ...`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandBuilder {
    executable: PathBuf,
    quiet: bool,
    list_format: ListFormat,
}

impl CommandBuilder {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            quiet: true,
            list_format: ListFormat::Text,
        }
    }

    /// Whether confirmation-free operations also pass `-q`.
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn list_format(mut self, format: ListFormat) -> Self {
        self.list_format = format;
        self
    }

    pub fn format(&self) -> ListFormat {
        self.list_format
    }

    fn command<'a>(&self, action: &'a str, rest: impl IntoIterator<Item = &'a str>) -> CommandSpec {
        let arguments: Vec<&str> = ["-m", MANAGER_MODULE, action].into_iter().chain(rest).collect();
        CommandSpec::new(&self.executable, arguments)
    }

    /// `-y` always, `-q` when configured.
    fn confirmed<'a>(&self, mut tokens: Vec<&'a str>) -> Vec<&'a str> {
        tokens.push(YES_FLAG);
        if self.quiet {
            tokens.push(QUIET_FLAG);
        }
        tokens
    }

    /// `create --name <name> <version_spec> -y [-q]`
    pub fn create(&self, name: &str, version_spec: &str) -> CommandSpec {
        self.command("create", self.confirmed(vec!["--name", name, version_spec]))
    }

    /// `remove --name <name> --all -y [-q]`
    pub fn remove(&self, name: &str) -> CommandSpec {
        self.command("remove", self.confirmed(vec!["--name", name, REMOVE_ALL_FLAG]))
    }

    /// `install <package> --name <environment> -y [-q]`
    pub fn install_package(&self, environment: &str, package: &str) -> CommandSpec {
        self.command("install", self.confirmed(vec![package, "--name", environment]))
    }

    /// `remove <package> --name <environment> -y [-q]`
    pub fn remove_package(&self, environment: &str, package: &str) -> CommandSpec {
        self.command("remove", self.confirmed(vec![package, "--name", environment]))
    }

    /// `list --name <environment> [--json]`
    pub fn list_packages(&self, environment: &str) -> CommandSpec {
        let mut tokens = vec!["--name", environment];
        if self.list_format == ListFormat::Json {
            tokens.push(JSON_FLAG);
        }
        self.command("list", tokens)
    }

    /// `search <package>`
    pub fn search(&self, package: &str) -> CommandSpec {
        self.command("search", [package])
    }

    /// `config --add channels <channel>`
    pub fn add_channel(&self, channel: &str) -> CommandSpec {
        self.command("config", ["--add", "channels", channel])
    }

    /// `config --remove channels <channel>`
    pub fn remove_channel(&self, channel: &str) -> CommandSpec {
        self.command("config", ["--remove", "channels", channel])
    }

    /// `config --show-sources --json`
    pub fn show_sources(&self) -> CommandSpec {
        self.command("config", ["--show-sources", JSON_FLAG])
    }

    /// `info --json`
    pub fn info(&self) -> CommandSpec {
        self.command("info", [JSON_FLAG])
    }
}

/// `[<python>, -u, -i, <file>?]`: an unbuffered interactive interpreter,
/// started in the file's directory when there is one.
pub fn repl_command(python: &Path, file: Option<&Path>) -> CommandSpec {
    let mut arguments = vec!["-u".to_string(), "-i".to_string()];
    let mut working_directory = None;
    if let Some(file) = file {
        arguments.push(file.to_string_lossy().into_owned());
        working_directory = file.parent().filter(|p| !p.as_os_str().is_empty());
    }
    let spec = CommandSpec::new(python, arguments);
    match working_directory {
        Some(dir) => spec.with_working_directory(dir),
        None => spec,
    }
}

/// Refuses an environment, package, or channel name that conda would parse
/// as a flag instead of an operand.
pub fn check_operand(value: &str) -> Result<&str, ExternalToolError> {
    if value.starts_with('-') {
        return Err(ExternalToolError::OptionLikeOperand(value.to_string()));
    }
    Ok(value)
}

// --- Output parsing ---

fn parse_json(output: &str, what: &'static str) -> Result<Value, ExternalToolError> {
    serde_json::from_str(output).map_err(|source| ExternalToolError::MalformedJson { what, source })
}

/// Package names from `conda list` output.
///
/// Text output starts with `#` comment lines; every other non-blank line
/// begins with the package name. JSON output is an array of objects with a
/// `name` field.
pub fn parse_package_names(output: &str, format: ListFormat) -> Result<Vec<String>, ExternalToolError> {
    match format {
        ListFormat::Text => Ok(output
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(|line| line.split_whitespace().next())
            .map(str::to_string)
            .collect()),
        ListFormat::Json => {
            let Value::Array(entries) = parse_json(output, "package list")? else {
                return Err(ExternalToolError::UnexpectedShape {
                    what: "package list",
                    detail: "expected a JSON array".to_string(),
                });
            };
            entries
                .iter()
                .map(|entry| {
                    entry
                        .get("name")
                        .and_then(Value::as_str)
                        .map(str::to_string)
                        .ok_or_else(|| ExternalToolError::UnexpectedShape {
                            what: "package list",
                            detail: format!("entry without a name: {}", entry),
                        })
                })
                .collect()
        }
    }
}

/// Channels declared in `configuration`, from `conda config --show-sources --json`.
///
/// A configuration file conda does not know about, or one without a
/// `channels` key, is `Unavailable`; an empty list is `Empty`.
pub fn parse_channel_sources(output: &str, configuration: &Path) -> Result<Listing<String>, ExternalToolError> {
    let Value::Object(sources) = parse_json(output, "configuration sources")? else {
        return Err(ExternalToolError::UnexpectedShape {
            what: "configuration sources",
            detail: "expected a JSON object".to_string(),
        });
    };

    let wanted = configuration.to_string_lossy();
    let source = sources
        .iter()
        .find(|(key, _)| key.as_str() == wanted || Path::new(key.as_str()) == configuration)
        .map(|(_, value)| value);

    let Some(source) = source else {
        return Ok(Listing::Unavailable(format!(
            "no channel sources in {}",
            configuration.display()
        )));
    };

    match source.get("channels") {
        None | Some(Value::Null) => Ok(Listing::Unavailable(format!(
            "no channel sources in {}",
            configuration.display()
        ))),
        Some(Value::Array(channels)) => {
            let names = channels
                .iter()
                .map(|channel| {
                    channel.as_str().map(str::to_string).ok_or_else(|| {
                        ExternalToolError::UnexpectedShape {
                            what: "channel list",
                            detail: format!("non-string channel {}", channel),
                        }
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Listing::from_items(names))
        }
        Some(other) => Err(ExternalToolError::UnexpectedShape {
            what: "channel list",
            detail: format!("expected an array, found {}", other),
        }),
    }
}

/// Strictly `major.minor.micro`, all integers.
pub fn parse_version_string(raw: &str) -> Result<VersionTuple, ExternalToolError> {
    let bad = || ExternalToolError::BadVersion(raw.to_string());
    let numbers = raw
        .trim()
        .split('.')
        .map(|part| part.parse::<u32>().map_err(|_| bad()))
        .collect::<Result<Vec<_>, _>>()?;
    match numbers.as_slice() {
        [major, minor, micro] => Ok(VersionTuple::new(*major, *minor, *micro)),
        _ => Err(bad()),
    }
}

/// The `conda_version` field of `conda info --json`.
pub fn parse_version(output: &str) -> Result<VersionTuple, ExternalToolError> {
    let info = parse_json(output, "info")?;
    let raw = info
        .get("conda_version")
        .and_then(Value::as_str)
        .ok_or_else(|| ExternalToolError::UnexpectedShape {
            what: "info",
            detail: "missing 'conda_version'".to_string(),
        })?;
    parse_version_string(raw)
}
