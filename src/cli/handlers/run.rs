// src/cli/handlers/run.rs

use anyhow::Result;
use clap::Parser;

use crate::state::AppContext;

#[derive(Parser, Debug, Default)]
#[command(
    no_binary_name = true,
    about = "Runs a command with the project's active environment interpreter."
)]
struct RunArgs {
    /// The command to run, e.g. `python build.py --release`. The first token is
    /// replaced by the active environment's interpreter.
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    command: Vec<String>,

    /// Print the resolved command instead of running it.
    #[arg(long)]
    dry_run: bool,
}

pub fn handle(args: Vec<String>, ctx: &AppContext) -> Result<()> {
    let run_args = RunArgs::try_parse_from(&args)?;
    let dispatcher = ctx.dispatcher();
    let spec = dispatcher.resolve_run_command(&ctx.project, &run_args.command, ctx.resolver.platform())?;

    if run_args.dry_run {
        println!("{}", spec);
        for (key, value) in spec.environment_overrides() {
            println!("  {}={}", key.to_string_lossy(), value.to_string_lossy());
        }
        return Ok(());
    }

    log::info!("Dispatching: {}", spec);
    dispatcher.dispatch(&spec, &ctx.runner)?;
    Ok(())
}
