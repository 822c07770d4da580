// src/core/queries.rs

use crate::core::commands::{CommandBuilder, ExternalToolError, parse_channel_sources, parse_package_names};
use crate::models::{Environment, Listing};
use crate::system::executor::CommandRunner;
use std::path::Path;

/// Channels declared in the configured `.condarc`.
pub fn channel_sources(
    runner: &dyn CommandRunner,
    builder: &CommandBuilder,
    configuration: &Path,
) -> Result<Listing<String>, ExternalToolError> {
    let output = runner.capture(&builder.show_sources())?;
    parse_channel_sources(&output, configuration)
}

/// Packages installed in `environment`; `Unavailable` without one.
pub fn environment_packages(
    runner: &dyn CommandRunner,
    builder: &CommandBuilder,
    environment: Option<&Environment>,
) -> Result<Listing<String>, ExternalToolError> {
    let Some(environment) = environment else {
        return Ok(Listing::Unavailable("no active environment".to_string()));
    };
    let output = runner.capture(&builder.list_packages(&environment.name))?;
    Ok(Listing::from_items(parse_package_names(&output, builder.format())?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CommandSpec, ListFormat};
    use crate::system::executor::ExecutionError;
    use std::cell::RefCell;
    use crate::system::env_table::EnvMap;

    struct FakeRunner {
        output: &'static str,
        captured: RefCell<Vec<Vec<String>>>,
    }

    impl FakeRunner {
        fn new(output: &'static str) -> Self {
            Self {
                output,
                captured: RefCell::new(Vec::new()),
            }
        }
    }

    impl CommandRunner for FakeRunner {
        fn run(&self, _: &CommandSpec, _: &EnvMap) -> Result<(), ExecutionError> {
            Ok(())
        }

        fn capture(&self, spec: &CommandSpec) -> Result<String, ExecutionError> {
            self.captured.borrow_mut().push(spec.arguments().to_vec());
            Ok(self.output.to_string())
        }
    }

    #[test]
    fn test_channel_sources_reads_configured_file() {
        let runner = FakeRunner::new(r#"{"/home/me/.condarc": {"channels": ["conda-forge", "defaults"]}}"#);
        let listing = channel_sources(&runner, &CommandBuilder::new("python"), Path::new("/home/me/.condarc")).unwrap();
        assert_eq!(listing, Listing::Items(vec!["conda-forge".into(), "defaults".into()]));
        assert_eq!(
            runner.captured.borrow()[0],
            ["-m", "conda", "config", "--show-sources", "--json"]
        );
    }

    #[test]
    fn test_channel_sources_for_unknown_file_is_unavailable() {
        let runner = FakeRunner::new(r#"{"/etc/condarc": {"channels": ["x"]}}"#);
        let listing = channel_sources(&runner, &CommandBuilder::new("python"), Path::new("/home/me/.condarc")).unwrap();
        assert!(matches!(listing, Listing::Unavailable(_)));
    }

    #[test]
    fn test_packages_without_environment_skips_conda() {
        let runner = FakeRunner::new("");
        let listing = environment_packages(&runner, &CommandBuilder::new("python"), None).unwrap();
        assert_eq!(listing, Listing::Unavailable("no active environment".into()));
        assert!(runner.captured.borrow().is_empty());
    }

    #[test]
    fn test_packages_text_listing() {
        let runner = FakeRunner::new(
            "# packages in environment at /envs/foo:\n#\n# Name  Version  Build  Channel\nnumpy  1.26.4  py311  defaults\npip  24.0  py311_0\n",
        );
        let env = Environment::new("foo", "/envs/foo");
        let listing = environment_packages(&runner, &CommandBuilder::new("python"), Some(&env)).unwrap();
        assert_eq!(listing.items(), ["numpy".to_string(), "pip".to_string()]);
        assert_eq!(runner.captured.borrow()[0], ["-m", "conda", "list", "--name", "foo"]);
    }

    #[test]
    fn test_packages_json_listing_and_empty() {
        let env = Environment::new("foo", "/envs/foo");
        let builder = CommandBuilder::new("python").list_format(ListFormat::Json);

        let runner = FakeRunner::new(r#"[{"name": "numpy"}, {"name": "scipy"}]"#);
        let listing = environment_packages(&runner, &builder, Some(&env)).unwrap();
        assert_eq!(listing.items(), ["numpy".to_string(), "scipy".to_string()]);

        let empty = FakeRunner::new("[]");
        assert_eq!(environment_packages(&empty, &builder, Some(&env)).unwrap(), Listing::Empty);
    }
}
