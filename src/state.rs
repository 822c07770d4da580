// src/state.rs

use crate::core::active_env::{ActiveEnvironmentStore, JsonProjectFile};
use crate::core::catalog::EnvironmentCatalog;
use crate::core::commands::CommandBuilder;
use crate::core::dispatcher::{BuildDispatcher, DispatchOptions};
use crate::core::paths::PathResolver;
use crate::core::settings::{self, SettingsError};
use crate::core::version_cache::{ToolVersionProbe, VersionCache};
use crate::models::{CommandSpec, Environment, Platform, ResolvedSettings};
use crate::system::env_table::process_table;
use crate::system::executor::{ExecutionError, SystemRunner};
use std::path::{Path, PathBuf};

/// Everything a command handler needs, wired together once per invocation.
///
/// Owns the version cache, so within one process conda is asked for its
/// version at most once.
#[derive(Debug)]
pub struct AppContext {
    pub settings: ResolvedSettings,
    pub resolver: PathResolver,
    pub builder: CommandBuilder,
    pub catalog: EnvironmentCatalog,
    pub store: ActiveEnvironmentStore,
    pub project: JsonProjectFile,
    pub versions: VersionCache,
    pub runner: SystemRunner,
    project_root: PathBuf,
}

impl AppContext {
    /// Loads (or creates) the user settings and binds them to `project_root`.
    pub fn load(project_root: PathBuf) -> Result<Self, SettingsError> {
        let settings = settings::resolve(settings::load_settings()?)?;
        Ok(Self::from_settings(settings, project_root, Platform::current()))
    }

    pub fn from_settings(settings: ResolvedSettings, project_root: PathBuf, platform: Platform) -> Self {
        let resolver = PathResolver::new(&settings.executable, platform);
        let builder = CommandBuilder::new(&settings.executable)
            .quiet(settings.quiet)
            .list_format(settings.list_format);
        let catalog = EnvironmentCatalog::new(
            resolver.clone(),
            &settings.environment_directory,
            settings.reserved_environments.clone(),
        );
        let versions = VersionCache::new(ToolVersionProbe::new(SystemRunner, builder.clone()));

        Self {
            store: ActiveEnvironmentStore::new(resolver.clone()),
            project: JsonProjectFile::for_project(&project_root),
            resolver,
            builder,
            catalog,
            versions,
            runner: SystemRunner,
            settings,
            project_root,
        }
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn active_environment(&self) -> Option<Environment> {
        self.store.get(&self.project)
    }

    pub fn dispatcher(&self) -> BuildDispatcher<'_> {
        BuildDispatcher::new(
            &self.resolver,
            &self.store,
            &self.versions,
            process_table(),
            DispatchOptions {
                use_pythonw: self.settings.use_pythonw,
                run_through_shell: self.settings.run_through_shell,
            },
        )
    }

    /// Runs a conda command with the terminal attached.
    pub fn run_tool(&self, spec: &CommandSpec) -> Result<(), ExecutionError> {
        self.dispatcher().dispatch(spec, &self.runner)
    }
}
