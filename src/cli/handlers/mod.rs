// src/cli/handlers/mod.rs

// One module per CLI action. Every handler has the same signature so the
// binary can keep them in a single registry.

pub mod commons;

pub mod activate;
pub mod active;
pub mod channel_add;
pub mod channel_remove;
pub mod channels;
pub mod create;
pub mod deactivate;
pub mod envs;
pub mod install;
pub mod packages;
pub mod pythons;
pub mod remove;
pub mod repl;
pub mod run;
pub mod search;
pub mod uninstall;
pub mod version;
