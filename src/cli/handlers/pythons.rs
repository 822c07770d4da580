// src/cli/handlers/pythons.rs

use anyhow::Result;
use clap::Parser;

use crate::{cli::handlers::commons, core::python_versions, models::Listing, state::AppContext};

#[derive(Parser, Debug, Default)]
#[command(
    no_binary_name = true,
    about = "Lists the Python versions available on the package index."
)]
struct PythonsArgs {
    /// Architecture suffix to query instead of the configured one (`64`, `aarch64`...).
    #[arg(long)]
    architecture: Option<String>,
}

pub fn handle(args: Vec<String>, ctx: &AppContext) -> Result<()> {
    let pythons_args = PythonsArgs::try_parse_from(&args)?;
    let architecture = pythons_args
        .architecture
        .unwrap_or_else(|| ctx.settings.architecture.clone());

    let versions = python_versions::fetch_python_versions(&architecture)?;
    let listing = Listing::from_items(versions.iter().map(ToString::to_string).collect());
    commons::print_listing(
        &format!(
            t!("pythons.header"),
            url = python_versions::index_url(&architecture)
        ),
        &listing,
    );
    Ok(())
}
