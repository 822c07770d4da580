// src/cli/handlers/install.rs

use anyhow::Result;
use clap::Parser;
use colored::*;

use crate::{cli::handlers::commons, core::commands::check_operand, state::AppContext};

#[derive(Parser, Debug, Default)]
#[command(
    no_binary_name = true,
    about = "Installs a package into the active environment."
)]
struct InstallArgs {
    /// Package (or `name=version` spec) to install.
    package: String,
}

pub fn handle(args: Vec<String>, ctx: &AppContext) -> Result<()> {
    let install_args = InstallArgs::try_parse_from(&args)?;
    check_operand(&install_args.package)?;
    let environment = commons::require_active(ctx)?;

    ctx.run_tool(
        &ctx.builder
            .install_package(&environment.name, &install_args.package),
    )?;

    commons::print_success(&format!(
        t!("install.success"),
        package = install_args.package.cyan(),
        name = environment.name
    ));
    Ok(())
}
