// src/system/executor.rs

use crate::models::CommandSpec;
use crate::system::env_table::EnvMap;
use std::process::{Command as StdCommand, Stdio};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Command '{0}' cannot be passed to a shell (it contains a NUL byte or a line break).")]
    Unquotable(String),
    #[error("Command '{0}' could not be executed: {1}")]
    CommandFailed(String, std::io::Error),
    #[error("Command '{command}' exited with status {code}.")]
    NonZeroExitStatus { command: String, code: String },
    #[error("Command '{command}' produced output that was not valid UTF-8")]
    InvalidUtf8Output {
        command: String,
        #[source]
        source: std::string::FromUtf8Error,
    },
}

/// Runs `CommandSpec`s. The engine only shapes commands; this is the one
/// place that turns them into processes.
pub trait CommandRunner {
    /// Runs to completion with output streamed to the terminal. `env` is the
    /// complete environment of the child.
    fn run(&self, spec: &CommandSpec, env: &EnvMap) -> Result<(), ExecutionError>;

    /// Runs to completion and returns stdout. Stderr is passed through.
    fn capture(&self, spec: &CommandSpec) -> Result<String, ExecutionError>;
}

/// Spawns real processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, spec: &CommandSpec, env: &EnvMap) -> Result<(), ExecutionError> {
        let display = spec.to_string();
        log::debug!("Running: {}", display);

        let mut command = build_command(spec)?;
        command
            .env_clear()
            .envs(env)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let status = command
            .status()
            .map_err(|e| ExecutionError::CommandFailed(display.clone(), e))?;

        if !status.success() {
            return Err(ExecutionError::NonZeroExitStatus {
                command: display,
                code: exit_code(status.code()),
            });
        }
        Ok(())
    }

    fn capture(&self, spec: &CommandSpec) -> Result<String, ExecutionError> {
        let display = spec.to_string();
        log::debug!("Capturing: {}", display);

        let output = build_command(spec)?
            .envs(spec.environment_overrides())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .output()
            .map_err(|e| ExecutionError::CommandFailed(display.clone(), e))?;

        if !output.status.success() {
            return Err(ExecutionError::NonZeroExitStatus {
                command: display,
                code: exit_code(output.status.code()),
            });
        }

        String::from_utf8(output.stdout).map_err(|e| ExecutionError::InvalidUtf8Output {
            command: display,
            source: e,
        })
    }
}

fn exit_code(code: Option<i32>) -> String {
    code.map_or_else(|| "terminated by signal".to_string(), |c| c.to_string())
}

/// Translates a spec into a `std::process::Command`, going through the
/// platform shell only when the spec asks for it.
fn build_command(spec: &CommandSpec) -> Result<StdCommand, ExecutionError> {
    let mut command = if spec.runs_through_shell() {
        shell_command(&spec.argv())?
    } else {
        let mut c = StdCommand::new(spec.executable());
        c.args(spec.arguments());
        c
    };

    if let Some(dir) = spec.working_directory() {
        command.current_dir(dunce::simplified(dir));
    }
    hide_console_window(&mut command);
    Ok(command)
}

/// `cmd /S /C "<line>"`. The line is handed over verbatim: the default
/// argument quoting would wrap it in a second, backslash-escaped layer that
/// cmd does not understand.
#[cfg(target_os = "windows")]
fn shell_command(argv: &[String]) -> Result<StdCommand, ExecutionError> {
    use std::os::windows::process::CommandExt;
    let line = cmd_line(argv)?;
    let mut c = StdCommand::new("cmd");
    c.raw_arg("/S /C").raw_arg(format!("\"{}\"", line));
    Ok(c)
}

/// `sh -c '<line>'` with POSIX shell quoting.
#[cfg(not(target_os = "windows"))]
fn shell_command(argv: &[String]) -> Result<StdCommand, ExecutionError> {
    let line = shlex::try_join(argv.iter().map(String::as_str))
        .map_err(|_| ExecutionError::Unquotable(argv.join(" ")))?;
    let mut c = StdCommand::new("sh");
    c.arg("-c").arg(line);
    Ok(c)
}

/// Joins `argv` into one cmd.exe command line.
///
/// Tokens with whitespace, quotes, or cmd operators are double-quoted, with
/// inner quotes doubled (`""`). Inside quotes cmd takes `& | < > ^ ( )`
/// literally, so no caret escaping is needed there.
#[cfg_attr(not(target_os = "windows"), allow(dead_code))]
fn cmd_line(argv: &[String]) -> Result<String, ExecutionError> {
    const SPECIAL: [char; 10] = [' ', '\t', '"', '&', '|', '<', '>', '^', '(', ')'];
    if argv.iter().any(|token| token.contains(['\0', '\n', '\r'])) {
        return Err(ExecutionError::Unquotable(argv.join(" ")));
    }
    Ok(argv
        .iter()
        .map(|token| {
            if token.is_empty() || token.contains(SPECIAL) {
                format!("\"{}\"", token.replace('"', "\"\""))
            } else {
                token.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(" "))
}

#[cfg(target_os = "windows")]
fn hide_console_window(command: &mut StdCommand) {
    use std::os::windows::process::CommandExt;
    const CREATE_NO_WINDOW: u32 = 0x0800_0000;
    command.creation_flags(CREATE_NO_WINDOW);
}

#[cfg(not(target_os = "windows"))]
fn hide_console_window(_command: &mut StdCommand) {}
