// src/cli/handlers/channels.rs

use anyhow::Result;
use clap::Parser;

use crate::{cli::handlers::commons, core::queries, state::AppContext};

#[derive(Parser, Debug, Default)]
#[command(
    no_binary_name = true,
    about = "Lists the channels declared in the configured .condarc."
)]
struct ChannelsArgs {}

pub fn handle(args: Vec<String>, ctx: &AppContext) -> Result<()> {
    let _channels_args = ChannelsArgs::try_parse_from(&args)?;
    let listing = queries::channel_sources(&ctx.runner, &ctx.builder, &ctx.settings.configuration)?;
    commons::print_listing(
        &format!(
            t!("channels.header"),
            path = ctx.settings.configuration.display()
        ),
        &listing,
    );
    Ok(())
}
