// src/cli/handlers/create.rs

use anyhow::{Result, anyhow};
use clap::Parser;
use colored::*;

use crate::{
    cli::handlers::commons,
    core::{
        commands::{check_operand, parse_version_string},
        python_versions,
    },
    state::AppContext,
};

#[derive(Parser, Debug, Default)]
#[command(
    no_binary_name = true,
    about = "Creates a new conda environment with a pinned Python version."
)]
struct CreateArgs {
    /// Name of the new environment.
    name: String,

    /// Python version (`X.Y.Z`). When omitted, the versions available on the
    /// package index are offered for selection.
    #[arg(long)]
    python: Option<String>,
}

pub fn handle(args: Vec<String>, ctx: &AppContext) -> Result<()> {
    let create_args = CreateArgs::try_parse_from(&args)?;
    if create_args.name.trim().is_empty() {
        return Err(anyhow!(t!("create.error.empty_name")));
    }
    check_operand(&create_args.name)?;
    if ctx.catalog.find(&create_args.name).is_some() {
        return Err(anyhow!(
            t!("create.error.already_exists"),
            name = create_args.name
        ));
    }

    let version = match create_args.python {
        Some(raw) => parse_version_string(&raw)?,
        None => {
            println!("{}", t!("create.info.fetching_versions").dimmed());
            let versions = python_versions::fetch_python_versions(&ctx.settings.architecture)?;
            if versions.is_empty() {
                return Err(anyhow!(t!("create.error.no_versions")));
            }
            let labels: Vec<String> = versions.iter().map(|v| format!("Python {}", v)).collect();
            let Some(choice) = commons::select_item(t!("create.prompt.select_version"), &labels)?
            else {
                println!("\n{}", t!("common.info.operation_cancelled"));
                return Ok(());
            };
            versions
                .get(choice)
                .copied()
                .ok_or_else(|| anyhow!(t!("create.error.no_versions")))?
        }
    };

    let spec = ctx
        .builder
        .create(&create_args.name, &python_versions::version_spec(version));
    log::info!("Creating environment '{}' with Python {}", create_args.name, version);
    ctx.run_tool(&spec)?;

    commons::print_success(&format!(
        t!("create.success"),
        name = create_args.name.cyan(),
        version = version
    ));
    Ok(())
}
