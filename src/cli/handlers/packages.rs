// src/cli/handlers/packages.rs

use anyhow::Result;
use clap::Parser;

use crate::{cli::handlers::commons, core::queries, state::AppContext};

#[derive(Parser, Debug, Default)]
#[command(
    no_binary_name = true,
    about = "Lists the packages installed in the active environment."
)]
struct PackagesArgs {}

pub fn handle(args: Vec<String>, ctx: &AppContext) -> Result<()> {
    let _packages_args = PackagesArgs::try_parse_from(&args)?;
    let active = ctx.active_environment();
    let listing = queries::environment_packages(&ctx.runner, &ctx.builder, active.as_ref())?;

    let title = match &active {
        Some(env) => format!(t!("packages.header"), name = env.name),
        None => t!("packages.header_inactive").to_string(),
    };
    commons::print_listing(&title, &listing);
    Ok(())
}
