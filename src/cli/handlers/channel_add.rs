// src/cli/handlers/channel_add.rs

use anyhow::Result;
use clap::Parser;
use colored::*;

use crate::{cli::handlers::commons, core::commands::check_operand, state::AppContext};

#[derive(Parser, Debug, Default)]
#[command(
    no_binary_name = true,
    about = "Adds a channel to the configured .condarc."
)]
struct ChannelAddArgs {
    /// Channel name or URL.
    channel: String,
}

pub fn handle(args: Vec<String>, ctx: &AppContext) -> Result<()> {
    let add_args = ChannelAddArgs::try_parse_from(&args)?;
    ctx.run_tool(&ctx.builder.add_channel(check_operand(&add_args.channel)?))?;
    commons::print_success(&format!(
        t!("channel_add.success"),
        channel = add_args.channel.cyan()
    ));
    Ok(())
}
