// src/cli/handlers/envs.rs

use anyhow::Result;
use clap::Parser;
use colored::*;

use crate::state::AppContext;

#[derive(Parser, Debug, Default)]
#[command(
    no_binary_name = true,
    about = "Lists the environments of the configured conda installation."
)]
struct EnvsArgs {
    /// Print one `name<TAB>path` line per environment, without decoration.
    #[arg(long)]
    plain: bool,
}

pub fn handle(args: Vec<String>, ctx: &AppContext) -> Result<()> {
    let envs_args = EnvsArgs::try_parse_from(&args)?;
    let environments = ctx.catalog.list();
    let active = ctx.active_environment();

    if envs_args.plain {
        for env in &environments {
            println!("{}\t{}", env.name, env.path.display());
        }
        return Ok(());
    }

    println!(
        "\n--- {} ({}) ---",
        t!("envs.header").yellow(),
        ctx.catalog.environments_root().display()
    );
    for env in &environments {
        let marker = if active.as_ref() == Some(env) { "*" } else { " " };
        println!(
            "{} {:<20} {}",
            marker.green().bold(),
            env.name.cyan(),
            env.path.display().to_string().dimmed()
        );
    }
    Ok(())
}
