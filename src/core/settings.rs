// src/core/settings.rs

use crate::core::paths::{PathError, expand_user_path, get_settings_path};
use crate::models::{Platform, ResolvedSettings, Settings};
use log::{debug, info};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error(transparent)]
    Path(#[from] PathError),
    #[error("Failed to access settings file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse settings file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("Failed to serialize default settings: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Setting '{field}' must not be empty.")]
    EmptyField { field: &'static str },
}

/// Loads `settings.toml` from its usual place, writing the defaults for this
/// machine first if the file does not exist yet.
pub fn load_settings() -> Result<Settings, SettingsError> {
    let path = get_settings_path()?;
    load_settings_from(&path, Platform::current())
}

pub fn load_settings_from(path: &Path, platform: Platform) -> Result<Settings, SettingsError> {
    let io_error = |source| SettingsError::Io {
        path: path.display().to_string(),
        source,
    };

    if !path.exists() {
        let defaults = Settings::defaults_for(platform);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
        fs::write(path, toml::to_string_pretty(&defaults)?).map_err(io_error)?;
        info!("Default settings written to '{}'.", path.display());
        return Ok(defaults);
    }

    let content = fs::read_to_string(path).map_err(io_error)?;
    let settings: Settings = toml::from_str(&content).map_err(|source| SettingsError::Parse {
        path: path.display().to_string(),
        source,
    })?;
    debug!("Settings loaded from '{}'.", path.display());
    Ok(settings)
}

/// Expands `~` and variables in the path settings.
pub fn resolve(settings: Settings) -> Result<ResolvedSettings, SettingsError> {
    for (field, value) in [
        ("executable", &settings.executable),
        ("environment_directory", &settings.environment_directory),
    ] {
        if value.trim().is_empty() {
            return Err(SettingsError::EmptyField { field });
        }
    }

    Ok(ResolvedSettings {
        executable: expand_user_path(&settings.executable)?,
        environment_directory: expand_user_path(&settings.environment_directory)?,
        configuration: expand_user_path(&settings.configuration)?,
        architecture: settings.architecture,
        use_pythonw: settings.use_pythonw,
        run_through_shell: settings.run_through_shell,
        reserved_environments: settings.reserved_environments,
        list_format: settings.list_format,
        quiet: settings.quiet,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ListFormat;
    use std::path::PathBuf;

    #[test]
    fn test_missing_file_is_created_with_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested").join("settings.toml");

        let settings = load_settings_from(&path, Platform::Posix).unwrap();

        assert_eq!(settings, Settings::defaults_for(Platform::Posix));
        assert!(path.exists());
        assert_eq!(load_settings_from(&path, Platform::Posix).unwrap(), settings);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("settings.toml");
        fs::write(
            &path,
            r#"
executable = "/opt/conda/bin/python"
environment_directory = "/opt/conda/envs"
configuration = "/opt/conda/.condarc"
architecture = "aarch64"
list_format = "json"
"#,
        )
        .unwrap();

        let settings = load_settings_from(&path, Platform::Posix).unwrap();
        assert_eq!(settings.architecture, "aarch64");
        assert_eq!(settings.list_format, ListFormat::Json);
        assert_eq!(settings.reserved_environments, ["_run".to_string()]);
        assert!(settings.quiet);
        assert!(!settings.use_pythonw);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("settings.toml");
        fs::write(&path, "executable = ").unwrap();
        assert!(matches!(
            load_settings_from(&path, Platform::Posix),
            Err(SettingsError::Parse { .. })
        ));
    }

    #[test]
    fn test_resolve_expands_home() {
        let home = dirs::home_dir().unwrap();
        let resolved = resolve(Settings::defaults_for(Platform::Posix)).unwrap();
        assert_eq!(resolved.executable, home.join("miniconda3/bin/python"));
        assert_eq!(resolved.configuration, home.join(".condarc"));
        assert_eq!(resolved.architecture, "64");
    }

    #[test]
    fn test_resolve_rejects_empty_executable() {
        let mut settings = Settings::defaults_for(Platform::Posix);
        settings.executable = "  ".to_string();
        assert!(matches!(
            resolve(settings),
            Err(SettingsError::EmptyField { field: "executable" })
        ));
    }

    #[test]
    fn test_resolve_keeps_absolute_paths() {
        let mut settings = Settings::defaults_for(Platform::Posix);
        settings.environment_directory = "/srv/envs".to_string();
        assert_eq!(
            resolve(settings).unwrap().environment_directory,
            PathBuf::from("/srv/envs")
        );
    }
}
