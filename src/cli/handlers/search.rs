// src/cli/handlers/search.rs

use anyhow::Result;
use clap::Parser;

use crate::{core::commands::check_operand, state::AppContext};

#[derive(Parser, Debug, Default)]
#[command(
    no_binary_name = true,
    about = "Searches the configured channels for a package."
)]
struct SearchArgs {
    /// Package name or match spec.
    package: String,
}

pub fn handle(args: Vec<String>, ctx: &AppContext) -> Result<()> {
    let search_args = SearchArgs::try_parse_from(&args)?;
    ctx.run_tool(&ctx.builder.search(check_operand(&search_args.package)?))?;
    Ok(())
}
