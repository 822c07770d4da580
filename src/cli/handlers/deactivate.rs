// src/cli/handlers/deactivate.rs

use anyhow::Result;
use clap::Parser;

use crate::{cli::handlers::commons, state::AppContext};

#[derive(Parser, Debug, Default)]
#[command(
    no_binary_name = true,
    about = "Clears the project's active environment."
)]
struct DeactivateArgs {}

pub fn handle(args: Vec<String>, ctx: &AppContext) -> Result<()> {
    let _deactivate_args = DeactivateArgs::try_parse_from(&args)?;
    if ctx.store.clear(&ctx.project)? {
        commons::print_success(t!("deactivate.success"));
    } else {
        println!("\n{}", t!("deactivate.info.nothing_active"));
    }
    Ok(())
}
