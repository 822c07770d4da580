// src/cli/handlers/active.rs

use anyhow::Result;
use clap::Parser;

use crate::{cli::handlers::commons, state::AppContext};

#[derive(Parser, Debug, Default)]
#[command(
    no_binary_name = true,
    about = "Shows the project's active environment."
)]
struct ActiveArgs {}

pub fn handle(args: Vec<String>, ctx: &AppContext) -> Result<()> {
    let _active_args = ActiveArgs::try_parse_from(&args)?;
    let listing = ctx.store.status(&ctx.project).map(|env| env.to_string());
    commons::print_listing(t!("active.header"), &listing);
    Ok(())
}
