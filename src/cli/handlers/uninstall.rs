// src/cli/handlers/uninstall.rs

use anyhow::Result;
use clap::Parser;
use colored::*;

use crate::{
    cli::handlers::commons,
    core::{commands::check_operand, queries},
    models::Listing,
    state::AppContext,
};

#[derive(Parser, Debug, Default)]
#[command(
    no_binary_name = true,
    about = "Removes a package from the active environment."
)]
struct UninstallArgs {
    /// Package to remove. Prompts with the installed packages when omitted.
    package: Option<String>,
}

pub fn handle(args: Vec<String>, ctx: &AppContext) -> Result<()> {
    let uninstall_args = UninstallArgs::try_parse_from(&args)?;
    let environment = commons::require_active(ctx)?;

    let package = match uninstall_args.package {
        Some(package) => package,
        None => {
            let listing = queries::environment_packages(&ctx.runner, &ctx.builder, Some(&environment))?;
            let Listing::Items(packages) = listing else {
                println!("\n{}", t!("uninstall.info.nothing_installed"));
                return Ok(());
            };
            let Some(choice) = commons::select_item(t!("uninstall.prompt.select"), &packages)? else {
                return Ok(());
            };
            match packages.into_iter().nth(choice) {
                Some(package) => package,
                None => return Ok(()),
            }
        }
    };

    ctx.run_tool(&ctx.builder.remove_package(&environment.name, check_operand(&package)?))?;
    commons::print_success(&format!(
        t!("uninstall.success"),
        package = package.cyan(),
        name = environment.name
    ));
    Ok(())
}
