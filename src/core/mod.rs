// src/core/mod.rs

//! Environment resolution and build dispatch.
//!
//! Everything here is host independent: the project data, the process
//! runner, and the version probe all come in through traits.

pub mod active_env;
pub mod catalog;
pub mod commands;
pub mod dispatcher;
pub mod paths;
pub mod python_versions;
pub mod queries;
pub mod settings;
pub mod version_cache;
