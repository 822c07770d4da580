// src/cli/handlers/commons.rs

// Shared helpers for the handlers: picking an environment, asking for
// confirmation, and printing listings.

use anyhow::{Result, anyhow};
use colored::Colorize;
use dialoguer::{Confirm, Select, theme::ColorfulTheme};

use crate::{
    constants::BASE_ENVIRONMENT_NAME,
    models::{Environment, Listing},
    state::AppContext,
};

/// Resolves `name` in the catalog, or lets the user pick one when it is absent.
///
/// Returns `None` when the user dismisses the picker.
pub fn select_environment(
    ctx: &AppContext,
    name: Option<String>,
    prompt: &str,
    include_base: bool,
) -> Result<Option<Environment>> {
    if let Some(name) = name {
        if !include_base && name == BASE_ENVIRONMENT_NAME {
            return Err(anyhow!(t!("error.base_not_allowed")));
        }
        return ctx
            .catalog
            .find(&name)
            .map(Some)
            .ok_or_else(|| anyhow!(t!("error.environment_not_found"), name = name));
    }

    let candidates: Vec<Environment> = ctx
        .catalog
        .list()
        .into_iter()
        .filter(|env| include_base || env.name != BASE_ENVIRONMENT_NAME)
        .collect();
    if candidates.is_empty() {
        println!("{}", t!("common.info.no_environments").yellow());
        return Ok(None);
    }

    let labels: Vec<&str> = candidates.iter().map(|env| env.name.as_str()).collect();
    select_item(prompt, &labels).map(|choice| choice.and_then(|i| candidates.into_iter().nth(i)))
}

/// Lets the user pick one of `items`. `None` when dismissed.
pub fn select_item<T: std::fmt::Display>(prompt: &str, items: &[T]) -> Result<Option<usize>> {
    Ok(Select::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .items(items)
        .default(0)
        .interact_opt()?)
}

/// The project's active environment, or an error telling the user to pick one.
pub fn require_active(ctx: &AppContext) -> Result<Environment> {
    ctx.active_environment()
        .ok_or_else(|| anyhow!(t!("error.no_active_environment")))
}

/// Asks before a destructive operation unless `assume_yes` is set.
pub fn confirm(prompt: &str, assume_yes: bool) -> Result<bool> {
    if assume_yes {
        return Ok(true);
    }
    if !Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .default(false)
        .interact()?
    {
        println!("\n{}", t!("common.info.operation_cancelled"));
        return Ok(false);
    }
    Ok(true)
}

/// Prints a listing under `title`, distinguishing "nothing" from "could not tell".
pub fn print_listing(title: &str, listing: &Listing<String>) {
    println!("\n--- {} ---", title.yellow());
    match listing {
        Listing::Empty => println!("  {}", t!("common.info.empty").dimmed()),
        Listing::Unavailable(reason) => println!("  {}", reason.dimmed()),
        Listing::Items(items) => {
            for item in items {
                println!("  - {}", item);
            }
        }
    }
}

pub fn print_success(message: &str) {
    println!("\n{} {}", t!("common.success").green().bold(), message);
}
