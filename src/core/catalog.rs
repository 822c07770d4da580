// src/core/catalog.rs

use crate::constants::BASE_ENVIRONMENT_NAME;
use crate::core::paths::PathResolver;
use crate::models::Environment;
use log::{debug, warn};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Lists the environments of one conda installation.
///
/// Nothing is cached: every call re-reads the environments directory, since
/// the filesystem is the only source of truth.
#[derive(Debug, Clone)]
pub struct EnvironmentCatalog {
    resolver: PathResolver,
    environments_root: PathBuf,
    reserved: Vec<String>,
}

impl EnvironmentCatalog {
    pub fn new(
        resolver: PathResolver,
        environments_root: impl Into<PathBuf>,
        reserved: Vec<String>,
    ) -> Self {
        Self {
            resolver,
            environments_root: environments_root.into(),
            reserved,
        }
    }

    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    pub fn environments_root(&self) -> &Path {
        &self.environments_root
    }

    /// `base` first, then every environment directory in the order the
    /// filesystem reports it.
    ///
    /// A missing or unreadable root yields just `[base]`.
    pub fn list(&self) -> Vec<Environment> {
        let mut environments = vec![Environment::new(
            BASE_ENVIRONMENT_NAME,
            self.resolver.base_path(),
        )];

        let entries = match fs::read_dir(&self.environments_root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(
                    "Environments directory '{}' does not exist.",
                    self.environments_root.display()
                );
                return environments;
            }
            Err(e) => {
                warn!(
                    "Could not read environments directory '{}': {}",
                    self.environments_root.display(),
                    e
                );
                return environments;
            }
        };

        for entry in entries.flatten() {
            let path = entry.path();
            // `is_dir` follows symlinks, so linked environments are listed too.
            if !path.is_dir() {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                warn!("Skipping environment with a non UTF-8 name: {}", path.display());
                continue;
            };
            if self.is_reserved(&name) {
                debug!("Skipping reserved environment '{}'.", name);
                continue;
            }
            if name == BASE_ENVIRONMENT_NAME {
                debug!("Skipping '{}': the name belongs to the root installation.", path.display());
                continue;
            }
            environments.push(Environment::new(name, self.resolver.normalize(&path)));
        }

        environments
    }

    /// Looks an environment up by the name shown in `list()`.
    pub fn find(&self, name: &str) -> Option<Environment> {
        self.list().into_iter().find(|env| env.name == name)
    }

    fn is_reserved(&self, name: &str) -> bool {
        self.reserved.iter().any(|r| r == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Platform;
    use tempfile::TempDir;

    struct Fixture {
        _tmp: TempDir,
        install: PathBuf,
        envs: PathBuf,
    }

    fn fixture() -> Fixture {
        let tmp = tempfile::tempdir().unwrap();
        let install = tmp.path().join("miniconda3");
        fs::create_dir_all(install.join("bin")).unwrap();
        let envs = install.join("envs");
        Fixture {
            _tmp: tmp,
            install,
            envs,
        }
    }

    fn catalog(fx: &Fixture) -> EnvironmentCatalog {
        let resolver = PathResolver::new(fx.install.join("bin").join("python"), Platform::Posix);
        EnvironmentCatalog::new(resolver, &fx.envs, vec!["_run".to_string()])
    }

    fn names(envs: &[Environment]) -> Vec<&str> {
        envs.iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn test_missing_root_lists_only_base() {
        let fx = fixture();
        let listed = catalog(&fx).list();
        assert_eq!(names(&listed), ["base"]);
        assert_eq!(listed[0].path, fx.install);
    }

    #[test]
    fn test_reserved_names_are_excluded() {
        let fx = fixture();
        fs::create_dir_all(fx.envs.join("foo")).unwrap();
        fs::create_dir_all(fx.envs.join("_run")).unwrap();

        let listed = catalog(&fx).list();
        assert_eq!(names(&listed), ["base", "foo"]);
        assert_eq!(listed[1].path, fx.envs.join("foo"));
    }

    #[test]
    fn test_only_directories_are_listed() {
        let fx = fixture();
        fs::create_dir_all(fx.envs.join("foo")).unwrap();
        fs::write(fx.envs.join(".conda_envs_dir_test"), b"").unwrap();

        assert_eq!(names(&catalog(&fx).list()), ["base", "foo"]);
    }

    #[test]
    fn test_base_appears_exactly_once_and_first() {
        let fx = fixture();
        for name in ["b", "base", "a", "c"] {
            fs::create_dir_all(fx.envs.join(name)).unwrap();
        }

        let listed = catalog(&fx).list();
        assert_eq!(listed.iter().filter(|e| e.name == "base").count(), 1);
        assert_eq!(listed[0].name, "base");
        assert_eq!(listed.len(), 4);
    }

    #[test]
    fn test_order_matches_directory_enumeration() {
        let fx = fixture();
        for name in ["zeta", "alpha", "mid"] {
            fs::create_dir_all(fx.envs.join(name)).unwrap();
        }

        let expected: Vec<String> = fs::read_dir(&fx.envs)
            .unwrap()
            .flatten()
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        let listed = catalog(&fx).list();
        let discovered: Vec<&str> = names(&listed).into_iter().skip(1).collect();
        assert_eq!(discovered, expected);
    }

    #[test]
    fn test_empty_reserved_list_keeps_everything() {
        let fx = fixture();
        fs::create_dir_all(fx.envs.join("_run")).unwrap();
        let resolver = PathResolver::new(fx.install.join("bin").join("python"), Platform::Posix);
        let listed = EnvironmentCatalog::new(resolver, &fx.envs, vec![]).list();
        assert_eq!(names(&listed), ["base", "_run"]);
    }

    #[test]
    fn test_find_by_name() {
        let fx = fixture();
        fs::create_dir_all(fx.envs.join("foo")).unwrap();
        let catalog = catalog(&fx);
        assert_eq!(catalog.find("foo").unwrap().path, fx.envs.join("foo"));
        assert_eq!(catalog.find("base").unwrap().path, fx.install);
        assert!(catalog.find("missing").is_none());
    }
}
