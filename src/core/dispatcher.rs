// src/core/dispatcher.rs

use crate::constants::{PATH_OVERRIDE_MIN_VERSION, PATH_VARIABLE};
use crate::core::active_env::{ActiveEnvironmentStore, ProjectData};
use crate::core::commands::ExternalToolError;
use crate::core::paths::PathResolver;
use crate::core::version_cache::VersionCache;
use crate::models::{CommandSpec, Environment, Platform, PythonVariant};
use crate::system::env_table::EnvTable;
use crate::system::executor::{CommandRunner, ExecutionError};
use log::debug;
use std::ffi::OsString;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("No command specified to run.")]
    EmptyCommand,
    #[error(transparent)]
    ExternalTool(#[from] ExternalToolError),
}

/// How the interpreter of the active environment is launched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchOptions {
    pub use_pythonw: bool,
    pub run_through_shell: bool,
}

/// Decides which interpreter a "run this file" action uses and runs it.
#[derive(Debug)]
pub struct BuildDispatcher<'a> {
    resolver: &'a PathResolver,
    store: &'a ActiveEnvironmentStore,
    versions: &'a VersionCache,
    env_table: &'a EnvTable,
    options: DispatchOptions,
}

impl<'a> BuildDispatcher<'a> {
    pub fn new(
        resolver: &'a PathResolver,
        store: &'a ActiveEnvironmentStore,
        versions: &'a VersionCache,
        env_table: &'a EnvTable,
        options: DispatchOptions,
    ) -> Self {
        Self {
            resolver,
            store,
            versions,
            env_table,
            options,
        }
    }

    /// Rewrites `base_command` to run under the project's active environment.
    ///
    /// The first token is swapped for the environment's interpreter. With no
    /// active environment the command comes back exactly as given. On
    /// Windows with conda 4.6 or later, the environment's `Library\bin` is
    /// put in front of `PATH` for the child.
    ///
    /// An empty `base_command` has no program to pass through or swap, so it
    /// is `DispatchError::EmptyCommand` whether or not an environment is active.
    pub fn resolve_run_command(
        &self,
        project: &dyn ProjectData,
        base_command: &[String],
        platform: Platform,
    ) -> Result<CommandSpec, DispatchError> {
        let base = CommandSpec::from_argv(base_command).ok_or(DispatchError::EmptyCommand)?;

        let Some(environment) = self.store.get(project) else {
            debug!("No active environment; running the command unchanged.");
            return Ok(base);
        };

        let resolver = PathResolver::new(self.resolver.executable(), platform);
        let python = resolver.python_for_environment(
            &environment.path,
            PythonVariant::from_flag(self.options.use_pythonw),
        );
        debug!(
            "Running through '{}' from environment '{}'.",
            python.display(),
            environment.name
        );

        let spec = CommandSpec::new(python, base.arguments().iter().cloned())
            .through_shell(self.options.run_through_shell);

        self.with_path_override(spec, &resolver, &environment)
    }

    fn with_path_override(
        &self,
        spec: CommandSpec,
        resolver: &PathResolver,
        environment: &Environment,
    ) -> Result<CommandSpec, DispatchError> {
        if resolver.platform() != Platform::Windows {
            return Ok(spec);
        }

        let version = self.versions.version()?;
        if !version.at_least(PATH_OVERRIDE_MIN_VERSION) {
            debug!("conda {} predates the PATH fix; leaving PATH alone.", version);
            return Ok(spec);
        }

        let mut value = resolver.library_bin_dir(&environment.path).into_os_string();
        let key = match self.env_table.lookup(PATH_VARIABLE) {
            Some((key, prior)) => {
                if !prior.is_empty() {
                    value.push(Platform::Windows.path_list_separator().to_string());
                    value.push(prior);
                }
                key
            }
            None => OsString::from(PATH_VARIABLE),
        };
        Ok(spec.with_env(key, value))
    }

    /// Runs `spec` with its environment overrides applied to the shared
    /// table for exactly the lifetime of the child process.
    pub fn dispatch(&self, spec: &CommandSpec, runner: &dyn CommandRunner) -> Result<(), ExecutionError> {
        self.env_table
            .with_overrides(spec.environment_overrides(), |env| runner.run(spec, env))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::active_env::MemoryProject;
    use crate::core::version_cache::VersionProbe;
    use crate::models::VersionTuple;
    use std::cell::RefCell;
    use crate::system::env_table::EnvMap;
    use std::collections::HashMap;
    use std::ffi::OsStr;
    use std::fs;
    use std::path::PathBuf;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    struct FixedProbe {
        version: Option<VersionTuple>,
        calls: Arc<AtomicUsize>,
    }

    impl VersionProbe for FixedProbe {
        fn probe(&self) -> Result<VersionTuple, ExternalToolError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.version
                .ok_or_else(|| ExternalToolError::BadVersion("unavailable".to_string()))
        }
    }

    struct Harness {
        _tmp: TempDir,
        envs: PathBuf,
        resolver: PathResolver,
        store: ActiveEnvironmentStore,
        versions: VersionCache,
        probe_calls: Arc<AtomicUsize>,
        table: EnvTable,
    }

    fn harness(version: Option<VersionTuple>) -> Harness {
        let tmp = tempfile::tempdir().unwrap();
        let install = tmp.path().join("conda");
        let envs = install.join("envs");
        fs::create_dir_all(envs.join("foo")).unwrap();
        let resolver = PathResolver::new(install.join("bin").join("python"), Platform::Posix);
        let probe_calls = Arc::new(AtomicUsize::new(0));
        Harness {
            envs,
            store: ActiveEnvironmentStore::new(resolver.clone()),
            resolver,
            versions: VersionCache::new(FixedProbe {
                version,
                calls: Arc::clone(&probe_calls),
            }),
            probe_calls,
            table: EnvTable::from_map(HashMap::from([(
                OsString::from("PATH"),
                OsString::from(r"C:\Windows\system32"),
            )])),
            _tmp: tmp,
        }
    }

    impl Harness {
        fn dispatcher(&self, options: DispatchOptions) -> BuildDispatcher<'_> {
            BuildDispatcher::new(&self.resolver, &self.store, &self.versions, &self.table, options)
        }

        fn project_with_foo(&self) -> MemoryProject {
            let project = MemoryProject::default();
            self.store
                .set(&project, &Environment::new("foo", self.envs.join("foo")))
                .unwrap();
            project
        }
    }

    fn argv(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_no_active_environment_passes_command_through() {
        let h = harness(None);
        let base = argv(&["python", "script.py"]);
        for platform in [Platform::Posix, Platform::Windows] {
            let spec = h
                .dispatcher(DispatchOptions { use_pythonw: true, run_through_shell: true })
                .resolve_run_command(&MemoryProject::default(), &base, platform)
                .unwrap();
            assert_eq!(spec.argv(), base);
            assert!(!spec.runs_through_shell());
            assert!(spec.environment_overrides().is_empty());
        }
        assert_eq!(h.probe_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_active_environment_swaps_interpreter_on_posix() {
        let h = harness(None);
        let project = h.project_with_foo();
        let spec = h
            .dispatcher(DispatchOptions::default())
            .resolve_run_command(&project, &argv(&["python", "script.py"]), Platform::Posix)
            .unwrap();

        let expected_python = h.envs.join("foo").join("bin").join("python");
        assert_eq!(spec.argv(), argv(&[expected_python.to_str().unwrap(), "script.py"]));
        assert!(spec.environment_overrides().is_empty());
        assert_eq!(h.probe_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_pythonw_and_shell_flags() {
        let h = harness(None);
        let project = h.project_with_foo();
        let spec = h
            .dispatcher(DispatchOptions { use_pythonw: true, run_through_shell: true })
            .resolve_run_command(&project, &argv(&["python", "-u", "app.py"]), Platform::Posix)
            .unwrap();
        assert_eq!(spec.executable(), h.envs.join("foo").join("bin").join("pythonw"));
        assert_eq!(spec.arguments(), argv(&["-u", "app.py"]));
        assert!(spec.runs_through_shell());
    }

    #[test]
    fn test_windows_recent_conda_prepends_library_bin() {
        let h = harness(Some(VersionTuple::new(4, 6, 14)));
        let project = h.project_with_foo();
        let spec = h
            .dispatcher(DispatchOptions::default())
            .resolve_run_command(&project, &argv(&["python", "script.py"]), Platform::Windows)
            .unwrap();

        let path = spec.environment_overrides()[OsStr::new("PATH")].to_string_lossy();
        assert!(path.ends_with(r"\Library\bin;C:\Windows\system32"), "{path}");
        assert!(spec.executable().to_string_lossy().ends_with(r"\foo\python.exe"));
    }

    #[test]
    fn test_windows_old_conda_leaves_path_alone() {
        let h = harness(Some(VersionTuple::new(4, 5, 12)));
        let project = h.project_with_foo();
        let spec = h
            .dispatcher(DispatchOptions::default())
            .resolve_run_command(&project, &argv(&["python", "script.py"]), Platform::Windows)
            .unwrap();
        assert!(spec.environment_overrides().is_empty());
    }

    #[test]
    fn test_windows_version_is_probed_once() {
        let h = harness(Some(VersionTuple::new(23, 1, 0)));
        let project = h.project_with_foo();
        let dispatcher = h.dispatcher(DispatchOptions::default());
        for _ in 0..3 {
            dispatcher
                .resolve_run_command(&project, &argv(&["python", "x.py"]), Platform::Windows)
                .unwrap();
        }
        assert_eq!(h.probe_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_windows_version_failure_aborts() {
        let h = harness(None);
        let project = h.project_with_foo();
        let result = h
            .dispatcher(DispatchOptions::default())
            .resolve_run_command(&project, &argv(&["python", "x.py"]), Platform::Windows);
        assert!(matches!(result, Err(DispatchError::ExternalTool(_))));
    }

    #[test]
    fn test_empty_command_is_rejected_with_or_without_environment() {
        let h = harness(None);
        let dispatcher = h.dispatcher(DispatchOptions::default());
        for project in [MemoryProject::default(), h.project_with_foo()] {
            let result = dispatcher.resolve_run_command(&project, &[], Platform::Posix);
            assert!(matches!(result, Err(DispatchError::EmptyCommand)));
        }
    }

    /// Records the environment each run saw; optionally fails to "spawn".
    struct RecordingRunner {
        seen: RefCell<Vec<EnvMap>>,
        fail: bool,
    }

    impl CommandRunner for RecordingRunner {
        fn run(&self, spec: &CommandSpec, env: &EnvMap) -> Result<(), ExecutionError> {
            self.seen.borrow_mut().push(env.clone());
            if self.fail {
                return Err(ExecutionError::CommandFailed(
                    spec.to_string(),
                    std::io::Error::from(std::io::ErrorKind::NotFound),
                ));
            }
            Ok(())
        }

        fn capture(&self, _: &CommandSpec) -> Result<String, ExecutionError> {
            Ok(String::new())
        }
    }

    #[test]
    fn test_dispatch_scopes_path_override_to_the_child() {
        for fail in [false, true] {
            let h = harness(Some(VersionTuple::new(4, 6, 0)));
            let project = h.project_with_foo();
            let dispatcher = h.dispatcher(DispatchOptions::default());
            let spec = dispatcher
                .resolve_run_command(&project, &argv(&["python", "x.py"]), Platform::Windows)
                .unwrap();
            let runner = RecordingRunner {
                seen: RefCell::new(Vec::new()),
                fail,
            };

            let outcome = dispatcher.dispatch(&spec, &runner);

            assert_eq!(outcome.is_err(), fail);
            let seen = runner.seen.borrow();
            assert!(seen[0][OsStr::new("PATH")].to_string_lossy().contains(r"\Library\bin;"));
            assert_eq!(h.table.get("PATH"), Some(OsString::from(r"C:\Windows\system32")));
        }
    }
}
