// src/cli/handlers/version.rs

use anyhow::Result;
use clap::Parser;
use colored::*;

use crate::{constants::PATH_OVERRIDE_MIN_VERSION, models::Platform, state::AppContext};

#[derive(Parser, Debug, Default)]
#[command(
    no_binary_name = true,
    about = "Shows the version of the configured conda installation."
)]
struct VersionArgs {}

pub fn handle(args: Vec<String>, ctx: &AppContext) -> Result<()> {
    let _version_args = VersionArgs::try_parse_from(&args)?;
    let version = ctx.versions.version()?;

    println!("\n--- {} ---", t!("version.header").yellow());
    println!("  {:<15} {}", t!("version.label.conda").blue(), version);
    println!(
        "  {:<15} {}",
        t!("version.label.executable").blue(),
        ctx.settings.executable.display()
    );
    println!(
        "  {:<15} {}",
        t!("version.label.base").blue(),
        ctx.resolver.base_path().display()
    );
    if ctx.resolver.platform() == Platform::Windows {
        let applies = version.at_least(PATH_OVERRIDE_MIN_VERSION);
        println!(
            "  {:<15} {}",
            t!("version.label.path_fix").blue(),
            if applies { t!("common.yes") } else { t!("common.no") }
        );
    }
    Ok(())
}
