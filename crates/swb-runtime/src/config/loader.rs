//! Configuration loader with hierarchical merging.

use super::{
    default_config_path, ConfigError, SwitchboardConfig, PROJECT_CONFIG_DIR, PROJECT_CONFIG_FILE,
};
use std::path::{Path, PathBuf};
use swb_deploy::DeployStrategy;
use tracing::debug;

/// Configuration loader with builder pattern.
///
/// # Example
///
/// ```
/// use swb_runtime::config::ConfigLoader;
///
/// let config = ConfigLoader::new()
///     .skip_global_config()
///     .skip_project_config()
///     .skip_env_vars() // For testing
///     .load()
///     .unwrap();
/// assert!(!config.debug);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    /// Global config file path (defaults to ~/.switchboard/config.toml).
    global_config_path: Option<PathBuf>,

    /// Project root directory.
    project_root: Option<PathBuf>,

    /// Skip environment variable loading.
    skip_env: bool,

    /// Skip global config loading.
    skip_global: bool,

    /// Skip project config loading.
    skip_project: bool,
}

impl ConfigLoader {
    /// Creates a new loader with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a custom global config path.
    #[must_use]
    pub fn with_global_config(mut self, path: impl Into<PathBuf>) -> Self {
        self.global_config_path = Some(path.into());
        self
    }

    /// Sets the project root directory.
    ///
    /// Project config is loaded from
    /// `<project_root>/.switchboard/config.toml`.
    #[must_use]
    pub fn with_project_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.project_root = Some(path.into());
        self
    }

    /// Skips environment variable loading.
    ///
    /// Useful for testing with deterministic config.
    #[must_use]
    pub fn skip_env_vars(mut self) -> Self {
        self.skip_env = true;
        self
    }

    /// Skips global config loading.
    #[must_use]
    pub fn skip_global_config(mut self) -> Self {
        self.skip_global = true;
        self
    }

    /// Skips project config loading.
    #[must_use]
    pub fn skip_project_config(mut self) -> Self {
        self.skip_project = true;
        self
    }

    /// Loads and merges configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if any config file exists but cannot be
    /// parsed, or an environment variable carries an invalid value.
    /// Missing config files are silently ignored.
    pub fn load(&self) -> Result<SwitchboardConfig, ConfigError> {
        let mut config = SwitchboardConfig::default();

        if !self.skip_global {
            let global_path = self
                .global_config_path
                .clone()
                .unwrap_or_else(default_config_path);
            if let Some(global_config) = self.load_file(&global_path)? {
                debug!(path = %global_path.display(), "loaded global config");
                config.merge(&global_config);
            }
        }

        if !self.skip_project {
            if let Some(ref project_root) = self.project_root {
                let project_path = project_root
                    .join(PROJECT_CONFIG_DIR)
                    .join(PROJECT_CONFIG_FILE);
                if let Some(project_config) = self.load_file(&project_path)? {
                    debug!(path = %project_path.display(), "loaded project config");
                    config.merge(&project_config);
                }
            }
        }

        if !self.skip_env {
            apply_env_vars(&mut config)?;
        }

        Ok(config)
    }

    /// Loads a config file, returning `None` if it doesn't exist.
    fn load_file(&self, path: &Path) -> Result<Option<SwitchboardConfig>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        let config = SwitchboardConfig::from_toml(&content)
            .map_err(|e| ConfigError::parse_toml(path, e))?;
        Ok(Some(config))
    }
}

/// Applies environment variable overrides.
fn apply_env_vars(config: &mut SwitchboardConfig) -> Result<(), ConfigError> {
    if let Ok(val) = std::env::var("SWB_DEBUG") {
        config.debug =
            parse_bool(&val).ok_or_else(|| ConfigError::invalid_env_var("SWB_DEBUG", "expected bool"))?;
    }
    if let Ok(val) = std::env::var("SWB_SESSION_TTL_SECS") {
        config.session.ttl_secs = val
            .parse()
            .map_err(|_| ConfigError::invalid_env_var("SWB_SESSION_TTL_SECS", "expected integer"))?;
    }
    if let Ok(val) = std::env::var("SWB_SWEEP_INTERVAL_SECS") {
        config.session.sweep_interval_secs = val.parse().map_err(|_| {
            ConfigError::invalid_env_var("SWB_SWEEP_INTERVAL_SECS", "expected integer")
        })?;
    }
    if let Ok(val) = std::env::var("SWB_SESSION_FILE") {
        config.session.file = Some(PathBuf::from(val));
    }
    if let Ok(val) = std::env::var("SWB_DEPLOY_STRATEGY") {
        config.deploy.strategy = match val.to_lowercase().as_str() {
            "batch" => DeployStrategy::Batch,
            "incremental" => DeployStrategy::Incremental,
            _ => {
                return Err(ConfigError::invalid_env_var(
                    "SWB_DEPLOY_STRATEGY",
                    "expected batch or incremental",
                ))
            }
        };
    }
    if let Ok(val) = std::env::var("SWB_SNAPSHOT_DIR") {
        config.deploy.snapshot_dir = Some(PathBuf::from(val));
    }
    Ok(())
}

/// Parses a boolean from string.
///
/// Accepts: "true", "false", "1", "0", "yes", "no", "on", "off"
/// (case-insensitive).
fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_config_file(dir: &Path, content: &str) -> PathBuf {
        let path = dir.join("config.toml");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn load_defaults_only() {
        let config = ConfigLoader::new()
            .skip_global_config()
            .skip_project_config()
            .skip_env_vars()
            .load()
            .unwrap();
        assert_eq!(config, SwitchboardConfig::default());
    }

    #[test]
    fn load_global_config() {
        let temp = TempDir::new().unwrap();
        let config_path = create_config_file(
            temp.path(),
            r#"
debug = true

[session]
ttl_secs = 120
"#,
        );

        let config = ConfigLoader::new()
            .with_global_config(&config_path)
            .skip_project_config()
            .skip_env_vars()
            .load()
            .unwrap();

        assert!(config.debug);
        assert_eq!(config.session.ttl_secs, 120);
    }

    #[test]
    fn project_overrides_global() {
        let global_temp = TempDir::new().unwrap();
        let project_temp = TempDir::new().unwrap();

        let swb_dir = project_temp.path().join(PROJECT_CONFIG_DIR);
        std::fs::create_dir_all(&swb_dir).unwrap();

        let global_path = create_config_file(
            global_temp.path(),
            r#"
debug = true

[deploy]
strategy = "incremental"
"#,
        );
        create_config_file(
            &swb_dir,
            r#"
[deploy]
strategy = "batch"
snapshot_dir = "/tmp/swb-snapshots"
"#,
        );

        let config = ConfigLoader::new()
            .with_global_config(&global_path)
            .with_project_root(project_temp.path())
            .skip_env_vars()
            .load()
            .unwrap();

        // debug from global (not overridden by the project layer)
        assert!(config.debug);
        // "batch" is the default, so the global "incremental" survives
        // the project merge; only snapshot_dir is taken.
        assert_eq!(config.deploy.strategy, DeployStrategy::Incremental);
        assert_eq!(
            config.deploy.snapshot_dir,
            Some(PathBuf::from("/tmp/swb-snapshots"))
        );
    }

    #[test]
    fn missing_config_files_ok() {
        let config = ConfigLoader::new()
            .with_global_config("/nonexistent/path/config.toml")
            .with_project_root("/nonexistent/project")
            .skip_env_vars()
            .load()
            .unwrap();
        assert_eq!(config, SwitchboardConfig::default());
    }

    #[test]
    fn malformed_config_file_errors() {
        let temp = TempDir::new().unwrap();
        let path = create_config_file(temp.path(), "not [valid toml");

        let err = ConfigLoader::new()
            .with_global_config(&path)
            .skip_project_config()
            .skip_env_vars()
            .load()
            .unwrap_err();
        assert!(matches!(err, ConfigError::ParseToml { .. }));
    }

    #[test]
    fn parse_bool_values() {
        assert_eq!(parse_bool("true"), Some(true));
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("off"), Some(false));
        assert_eq!(parse_bool("invalid"), None);
    }

    #[test]
    fn env_var_override() {
        // This test modifies env vars, run in isolation.
        std::env::set_var("SWB_DEBUG", "true");
        std::env::set_var("SWB_SESSION_TTL_SECS", "30");

        let config = ConfigLoader::new()
            .skip_global_config()
            .skip_project_config()
            .load()
            .unwrap();

        assert!(config.debug);
        assert_eq!(config.session.ttl_secs, 30);

        std::env::remove_var("SWB_DEBUG");
        std::env::remove_var("SWB_SESSION_TTL_SECS");
    }
}
