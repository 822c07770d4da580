// src/bin/condax.rs

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use condax::{
    cli::{Cli, handlers},
    state::AppContext,
    t,
};
use std::env;

// --- Command Definition and Registry ---

/// A CLI action, its aliases, and its handler.
struct CommandDefinition {
    name: &'static str,
    aliases: &'static [&'static str],
    handler: fn(Vec<String>, &AppContext) -> Result<()>,
}

/// Every action condax understands. Adding one is a matter of adding an entry.
static COMMAND_REGISTRY: &[CommandDefinition] = &[
    CommandDefinition {
        name: "activate",
        aliases: &["use"],
        handler: handlers::activate::handle,
    },
    CommandDefinition {
        name: "active",
        aliases: &["current"],
        handler: handlers::active::handle,
    },
    CommandDefinition {
        name: "channel-add",
        aliases: &[],
        handler: handlers::channel_add::handle,
    },
    CommandDefinition {
        name: "channel-remove",
        aliases: &[],
        handler: handlers::channel_remove::handle,
    },
    CommandDefinition {
        name: "channels",
        aliases: &[],
        handler: handlers::channels::handle,
    },
    CommandDefinition {
        name: "create",
        aliases: &["new"],
        handler: handlers::create::handle,
    },
    CommandDefinition {
        name: "deactivate",
        aliases: &[],
        handler: handlers::deactivate::handle,
    },
    CommandDefinition {
        name: "envs",
        aliases: &["ls"],
        handler: handlers::envs::handle,
    },
    CommandDefinition {
        name: "install",
        aliases: &["add"],
        handler: handlers::install::handle,
    },
    CommandDefinition {
        name: "packages",
        aliases: &["list"],
        handler: handlers::packages::handle,
    },
    CommandDefinition {
        name: "pythons",
        aliases: &[],
        handler: handlers::pythons::handle,
    },
    CommandDefinition {
        name: "remove",
        aliases: &["rm"],
        handler: handlers::remove::handle,
    },
    CommandDefinition {
        name: "repl",
        aliases: &[],
        handler: handlers::repl::handle,
    },
    CommandDefinition {
        name: "run",
        aliases: &[],
        handler: handlers::run::handle,
    },
    CommandDefinition {
        name: "search",
        aliases: &[],
        handler: handlers::search::handle,
    },
    CommandDefinition {
        name: "uninstall",
        aliases: &[],
        handler: handlers::uninstall::handle,
    },
    CommandDefinition {
        name: "version",
        aliases: &[],
        handler: handlers::version::handle,
    },
];

/// Finds a command definition in the registry by its name or alias.
fn find_command(name: &str) -> Option<&'static CommandDefinition> {
    COMMAND_REGISTRY
        .iter()
        .find(|cmd| cmd.name == name || cmd.aliases.contains(&name))
}

fn main() {
    env_logger::init();

    if let Err(e) = run_cli(Cli::parse()) {
        // Handler argument errors (and `--help`) print the way clap prints them.
        if let Some(clap_err) = e.downcast_ref::<clap::Error>() {
            clap_err.exit();
        }
        eprintln!("\n{}: {:#}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

/// Routes `condax <action> [args...]` to its handler.
fn run_cli(cli: Cli) -> Result<()> {
    log::debug!("CLI args parsed: {:?}", cli);

    let mut args = cli.args.into_iter();
    let Some(action) = args.next() else {
        println!("{}", t!("cli.info.no_action"));
        return Ok(());
    };

    let command = find_command(&action)
        .ok_or_else(|| anyhow::anyhow!(t!("error.unknown_action"), action = action))?;

    let project_root = match cli.project {
        Some(dir) => dir,
        None => env::current_dir().context(t!("error.no_current_dir"))?,
    };
    let ctx = AppContext::load(project_root)?;

    (command.handler)(args.collect(), &ctx)
}
