// src/cli/handlers/activate.rs

use anyhow::Result;
use clap::Parser;
use colored::*;

use crate::{cli::handlers::commons, state::AppContext};

#[derive(Parser, Debug, Default)]
#[command(
    no_binary_name = true,
    about = "Makes an environment the active one for the project."
)]
struct ActivateArgs {
    /// Environment to activate. Prompts for one when omitted.
    name: Option<String>,
}

pub fn handle(args: Vec<String>, ctx: &AppContext) -> Result<()> {
    let activate_args = ActivateArgs::try_parse_from(&args)?;
    let Some(environment) = commons::select_environment(
        ctx,
        activate_args.name,
        t!("activate.prompt.select"),
        true,
    )?
    else {
        return Ok(());
    };

    ctx.store.set(&ctx.project, &environment)?;
    commons::print_success(&format!(
        t!("activate.success"),
        name = environment.name.cyan(),
        project = ctx.project_root().display()
    ));
    Ok(())
}
