//! # System Interaction Layer
//!
//! The boundary between the engine and the operating system.
//!
//! ## Modules
//!
//! - **`executor`**: Turns a `CommandSpec` into a child process, either attached to the
//!   terminal or with its output captured. Going through `sh -c` / `cmd /C` only happens
//!   when a spec asks for it.
//! - **`env_table`**: The environment handed to children. Temporary overrides (such as the
//!   Windows `PATH` prefix) are applied to this owned table under a lock and rolled back
//!   when the child exits, so the real process environment is never mutated.

pub mod env_table;
pub mod executor;
