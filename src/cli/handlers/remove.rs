// src/cli/handlers/remove.rs

use anyhow::Result;
use clap::Parser;
use colored::*;

use crate::{cli::handlers::commons, core::commands::check_operand, state::AppContext};

#[derive(Parser, Debug, Default)]
#[command(
    no_binary_name = true,
    about = "Deletes a conda environment and everything installed in it."
)]
struct RemoveArgs {
    /// Environment to delete. Prompts for one when omitted.
    name: Option<String>,

    /// Skip the confirmation prompt.
    #[arg(long, short = 'y')]
    yes: bool,
}

pub fn handle(args: Vec<String>, ctx: &AppContext) -> Result<()> {
    let remove_args = RemoveArgs::try_parse_from(&args)?;
    let Some(environment) = commons::select_environment(
        ctx,
        remove_args.name,
        t!("remove.prompt.select"),
        false,
    )?
    else {
        return Ok(());
    };
    check_operand(&environment.name)?;

    println!(
        "\n{}",
        format!(
            t!("remove.warning.destructive"),
            name = environment.name,
            path = environment.path.display()
        )
        .red()
        .bold()
    );
    if !commons::confirm(t!("common.prompt.are_you_sure"), remove_args.yes)? {
        return Ok(());
    }

    let was_active = ctx.active_environment().as_ref() == Some(&environment);
    ctx.run_tool(&ctx.builder.remove(&environment.name))?;
    if was_active {
        ctx.store.clear(&ctx.project)?;
        log::info!("Cleared '{}' as the active environment.", environment.name);
    }

    commons::print_success(&format!(t!("remove.success"), name = environment.name.cyan()));
    Ok(())
}
