// src/constants.rs

/// Name reported for the environment that ships with the conda installation itself.
pub const BASE_ENVIRONMENT_NAME: &str = "base";

/// Environment names conda creates for its own bookkeeping (`conda run` scratch
/// environments). They never show up in the catalog.
pub const DEFAULT_RESERVED_ENVIRONMENTS: &[&str] = &["_run"];

/// The only field of the project data this crate reads or writes.
pub const ACTIVE_ENVIRONMENT_KEY: &str = "active_environment";

/// Directory (inside a project) holding condax project state.
pub const PROJECT_DIR: &str = ".condax";

/// File (inside `PROJECT_DIR`) holding the project data object.
pub const PROJECT_DATA_FILENAME: &str = "project.json";

/// Name of the user settings file (in `~/.config/condax/`).
pub const SETTINGS_FILENAME: &str = "settings.toml";

/// Overrides the location of the settings file when set.
pub const SETTINGS_ENV_VAR: &str = "CONDAX_SETTINGS";

/// Name of the conda module invoked through the configured interpreter (`python -m conda`).
pub const MANAGER_MODULE: &str = "conda";

/// First conda release whose Windows environments need `Library\bin` on `PATH`.
pub const PATH_OVERRIDE_MIN_VERSION: (u32, u32) = (4, 6);

/// Environment variable prepended to when running inside a Windows environment.
pub const PATH_VARIABLE: &str = "PATH";

/// Base URL of the package index queried for available Python versions.
pub const PACKAGE_INDEX_URL: &str = "https://repo.anaconda.com/pkgs/main";
