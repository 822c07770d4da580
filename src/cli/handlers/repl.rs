// src/cli/handlers/repl.rs

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use crate::{
    cli::handlers::commons,
    core::commands::repl_command,
    models::PythonVariant,
    state::AppContext,
};

#[derive(Parser, Debug, Default)]
#[command(
    no_binary_name = true,
    about = "Opens an interactive interpreter of the active environment."
)]
struct ReplArgs {
    /// Script to load before the prompt appears.
    file: Option<PathBuf>,
}

pub fn handle(args: Vec<String>, ctx: &AppContext) -> Result<()> {
    let repl_args = ReplArgs::try_parse_from(&args)?;
    let environment = commons::require_active(ctx)?;

    // An interactive prompt needs a console, so never the windowed interpreter.
    let python = ctx
        .resolver
        .python_for_environment(&environment.path, PythonVariant::Python);
    let spec = repl_command(&python, repl_args.file.as_deref());

    log::info!("Starting REPL in '{}'", environment.name);
    ctx.run_tool(&spec)?;
    Ok(())
}
