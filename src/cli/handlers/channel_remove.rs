// src/cli/handlers/channel_remove.rs

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
    about = "Removes a channel from the configured .condarc."
)]
struct ChannelRemoveArgs {
    /// Channel to remove. Prompts with the configured channels when omitted.
    channel: Option<String>,
}

pub fn handle(args: Vec<String>, ctx: &AppContext) -> Result<()> {
    let remove_args = ChannelRemoveArgs::try_parse_from(&args)?;

    let channel = match remove_args.channel {
        Some(channel) => channel,
        None => {
            match queries::channel_sources(&ctx.runner, &ctx.builder, &ctx.settings.configuration)? {
                Listing::Items(channels) => {
                    let Some(choice) = commons::select_item(t!("channel_remove.prompt.select"), &channels)?
                    else {
                        return Ok(());
                    };
                    match channels.into_iter().nth(choice) {
                        Some(channel) => channel,
                        None => return Ok(()),
                    }
                }
                Listing::Empty => {
                    println!("\n{}", t!("channel_remove.info.no_channels"));
                    return Ok(());
                }
                Listing::Unavailable(reason) => {
                    println!("\n{}", reason);
                    return Ok(());
                }
            }
        }
    };

    ctx.run_tool(&ctx.builder.remove_channel(check_operand(&channel)?))?;
    commons::print_success(&format!(t!("channel_remove.success"), channel = channel.cyan()));
    Ok(())
}
