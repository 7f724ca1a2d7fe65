//! Runner configuration
//!
//! An optional `anvil.yml` seeds the property store before a run; a few
//! environment variables override its values so CI jobs can retarget a
//! script without editing it.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::context::Context;
use crate::props::keys;
use crate::types::AnvilResult;

/// Environment variable overriding [`RunnerConfig::solution`].
pub const ENV_SOLUTION: &str = "ANVIL_SOLUTION";
/// Environment variable overriding [`RunnerConfig::configuration`].
pub const ENV_CONFIGURATION: &str = "ANVIL_CONFIGURATION";
/// Environment variable overriding [`RunnerConfig::transfer_url`].
pub const ENV_TRANSFER_URL: &str = "ANVIL_TRANSFER_URL";

/// On-disk runner configuration (`anvil.yml`).
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RunnerConfig {
    /// Solution or project file injected into build invocations.
    pub solution: Option<String>,
    /// Build configuration injected as `-c`.
    pub configuration: Option<String>,
    /// Base URL of the package transfer service.
    pub transfer_url: Option<String>,
    /// Free-form string properties, stored under their own names.
    pub properties: Option<HashMap<String, String>>,
}

pub fn parse_runner_config(yaml_str: &str) -> AnvilResult<RunnerConfig> {
    let config: RunnerConfig = serde_yaml::from_str(yaml_str)?;
    Ok(config)
}

pub fn load_runner_config(path: &Path) -> AnvilResult<RunnerConfig> {
    let contents = fs::read_to_string(path)?;
    parse_runner_config(&contents)
}

impl RunnerConfig {
    /// Apply environment overrides on top of file-provided values.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(solution) = env::var(ENV_SOLUTION) {
            self.solution = Some(solution);
        }
        if let Ok(configuration) = env::var(ENV_CONFIGURATION) {
            self.configuration = Some(configuration);
        }
        if let Ok(url) = env::var(ENV_TRANSFER_URL) {
            self.transfer_url = Some(url);
        }
        self
    }

    /// Seed a run context's property store from this configuration.
    pub fn seed(&self, ctx: &mut Context) {
        if let Some(solution) = &self.solution {
            ctx.props_mut().set(keys::SOLUTION_FILE, solution.clone());
        }
        if let Some(configuration) = &self.configuration {
            ctx.props_mut()
                .set(keys::BUILD_CONFIGURATION, configuration.clone());
        }
        if let Some(url) = &self.transfer_url {
            ctx.props_mut().set(keys::TRANSFER_URL, url.clone());
        }
        if let Some(properties) = &self.properties {
            for (name, value) in properties {
                ctx.props_mut().set_string(name.as_str(), value.as_str());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
solution: App.sln
configuration: Release
transferUrl: "http://packages.internal:5000"
properties:
  artifactDir: out/packages
"#;

        let config = parse_runner_config(yaml).unwrap();

        assert_eq!(config.solution.as_deref(), Some("App.sln"));
        assert_eq!(config.configuration.as_deref(), Some("Release"));
        assert_eq!(
            config.transfer_url.as_deref(),
            Some("http://packages.internal:5000")
        );
    }

    #[test]
    fn test_parse_partial_config() {
        let config = parse_runner_config("solution: App.sln\n").unwrap();

        assert_eq!(config.solution.as_deref(), Some("App.sln"));
        assert_eq!(config.configuration, None);
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        let result = parse_runner_config("solutionFile: App.sln\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_seed_fills_the_property_store() {
        let yaml = r#"
solution: App.sln
configuration: Release
properties:
  channel: nightly
"#;
        let config = parse_runner_config(yaml).unwrap();
        let mut ctx = Context::recording().0;

        config.seed(&mut ctx);

        assert_eq!(
            ctx.props().get(keys::SOLUTION_FILE),
            Some("App.sln".to_string())
        );
        assert_eq!(
            ctx.props().get(keys::BUILD_CONFIGURATION),
            Some("Release".to_string())
        );
        assert_eq!(ctx.props().get_string("channel"), Some("nightly".to_string()));
        assert_eq!(ctx.props().get(keys::TRANSFER_URL), None);
    }

    #[test]
    fn test_env_overrides_replace_file_values() {
        env::set_var(ENV_SOLUTION, "FromEnv.sln");
        env::set_var(ENV_CONFIGURATION, "Debug");

        let config = RunnerConfig {
            solution: Some("FromFile.sln".to_string()),
            ..RunnerConfig::default()
        }
        .with_env_overrides();

        env::remove_var(ENV_SOLUTION);
        env::remove_var(ENV_CONFIGURATION);

        assert_eq!(config.solution.as_deref(), Some("FromEnv.sln"));
        assert_eq!(config.configuration.as_deref(), Some("Debug"));
        assert_eq!(config.transfer_url, None);
    }

    #[test]
    fn test_load_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("anvil.yml");
        fs::write(&path, "configuration: Release\n").unwrap();

        let config = load_runner_config(&path).unwrap();

        assert_eq!(config.configuration.as_deref(), Some("Release"));
    }
}
