//! Configuration types and loading
//!
//! Config path precedence: `--config` CLI arg > CONFIG_PATH env var >
//! `token-sim.toml` in the working directory. An explicitly named file must
//! exist; the default file is optional and every setting has a default, so a
//! bare `token-sim` run needs no configuration at all.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use token_pool::{DEFAULT_POOL_SIZE, DEFAULT_RESET_INTERVAL, SimulationMode};

use crate::error::{Error, Result};

/// File name looked up in the working directory when no path is given.
const DEFAULT_CONFIG_FILE: &str = "token-sim.toml";

/// Root configuration
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub pool: PoolConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Token pool sizing and reset cadence
#[derive(Debug, Deserialize)]
pub struct PoolConfig {
    #[serde(default = "default_pool_size")]
    pub size: usize,
    #[serde(default = "default_reset_interval_secs")]
    pub reset_interval_secs: u64,
}

/// Simulation accounting
#[derive(Debug, Deserialize)]
pub struct SimulationConfig {
    /// Count one extra use on the caller side for every simulated operation.
    #[serde(default = "default_caller_increment")]
    pub caller_increment: bool,
}

/// Report rendering
#[derive(Debug, Default, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
    /// Print the Prometheus exposition after the report.
    #[serde(default)]
    pub metrics: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Where the config file path came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Named by `--config` or CONFIG_PATH; must exist.
    Explicit(PathBuf),
    /// Fallback file name; may be absent.
    Default(PathBuf),
}

fn default_pool_size() -> usize {
    DEFAULT_POOL_SIZE
}

fn default_reset_interval_secs() -> u64 {
    DEFAULT_RESET_INTERVAL.as_secs()
}

fn default_caller_increment() -> bool {
    true
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            size: default_pool_size(),
            reset_interval_secs: default_reset_interval_secs(),
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            caller_increment: default_caller_increment(),
        }
    }
}

impl SimulationConfig {
    pub fn mode(&self) -> SimulationMode {
        if self.caller_increment {
            SimulationMode::CallerIncrement
        } else {
            SimulationMode::SingleIncrement
        }
    }
}

impl Config {
    /// Load and validate configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from the resolved source, falling back to defaults when the
    /// default file is absent.
    pub fn from_source(source: &ConfigSource) -> Result<Self> {
        match source {
            ConfigSource::Explicit(path) => Self::load(path),
            ConfigSource::Default(path) if path.exists() => Self::load(path),
            ConfigSource::Default(_) => Ok(Self::default()),
        }
    }

    /// Resolve config file path from CLI arg or CONFIG_PATH env var.
    pub fn resolve_path(cli_path: Option<&str>) -> ConfigSource {
        if let Some(p) = cli_path {
            return ConfigSource::Explicit(PathBuf::from(p));
        }
        if let Ok(p) = std::env::var("CONFIG_PATH") {
            return ConfigSource::Explicit(PathBuf::from(p));
        }
        ConfigSource::Default(PathBuf::from(DEFAULT_CONFIG_FILE))
    }

    pub fn reset_interval(&self) -> Duration {
        Duration::from_secs(self.pool.reset_interval_secs)
    }

    fn validate(&self) -> Result<()> {
        if self.pool.size == 0 {
            return Err(Error::Config("pool.size must be greater than 0".into()));
        }
        if self.pool.reset_interval_secs == 0 {
            return Err(Error::Config(
                "pool.reset_interval_secs must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Mutex to serialize tests that mutate environment variables, preventing
    /// data races when tests run in parallel.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// SAFETY: Callers must hold ENV_MUTEX to prevent concurrent env mutation.
    unsafe fn set_env(key: &str, val: &str) {
        unsafe { std::env::set_var(key, val) };
    }

    unsafe fn remove_env(key: &str) {
        unsafe { std::env::remove_var(key) };
    }

    fn write_config(dir: &tempfile::TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join("token-sim.toml");
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_load_full_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            r#"
[pool]
size = 50
reset_interval_secs = 3600

[simulation]
caller_increment = false

[output]
format = "json"
metrics = true
"#,
        );

        let config = Config::load(&path).unwrap();
        assert_eq!(config.pool.size, 50);
        assert_eq!(config.reset_interval(), Duration::from_secs(3600));
        assert_eq!(config.simulation.mode(), SimulationMode::SingleIncrement);
        assert_eq!(config.output.format, OutputFormat::Json);
        assert!(config.output.metrics);
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "");

        let config = Config::load(&path).unwrap();
        assert_eq!(config.pool.size, 1000);
        assert_eq!(config.reset_interval(), Duration::from_secs(86_400));
        assert_eq!(config.simulation.mode(), SimulationMode::CallerIncrement);
        assert_eq!(config.output.format, OutputFormat::Text);
        assert!(!config.output.metrics);
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "[pool]\nsize = 3\n");

        let config = Config::load(&path).unwrap();
        assert_eq!(config.pool.size, 3);
        assert_eq!(config.pool.reset_interval_secs, 86_400);
    }

    #[test]
    fn test_zero_pool_size_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "[pool]\nsize = 0\n");

        let err = Config::load(&path).unwrap_err();
        assert!(
            err.to_string().contains("pool.size must be greater than 0"),
            "got: {err}"
        );
    }

    #[test]
    fn test_zero_reset_interval_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "[pool]\nreset_interval_secs = 0\n");

        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn test_negative_pool_size_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "[pool]\nsize = -4\n");

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, Error::Toml(_)), "got: {err:?}");
    }

    #[test]
    fn test_unknown_output_format_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "[output]\nformat = \"yaml\"\n");

        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn test_load_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "not valid {{{{ toml");

        assert!(matches!(Config::load(&path), Err(Error::Toml(_))));
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let source = ConfigSource::Explicit(PathBuf::from("/nonexistent/token-sim.toml"));
        assert!(matches!(Config::from_source(&source), Err(Error::Io(_))));
    }

    #[test]
    fn test_default_missing_file_uses_defaults() {
        let source = ConfigSource::Default(PathBuf::from("/nonexistent/token-sim.toml"));
        let config = Config::from_source(&source).unwrap();
        assert_eq!(config.pool.size, DEFAULT_POOL_SIZE);
    }

    #[test]
    fn test_default_existing_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "[pool]\nsize = 7\n");

        let config = Config::from_source(&ConfigSource::Default(path)).unwrap();
        assert_eq!(config.pool.size, 7);
    }

    #[test]
    fn test_resolve_path_cli_arg() {
        let source = Config::resolve_path(Some("/custom/path.toml"));
        assert_eq!(
            source,
            ConfigSource::Explicit(PathBuf::from("/custom/path.toml"))
        );
    }

    #[test]
    fn test_resolve_path_env_var() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe { set_env("CONFIG_PATH", "/env/path.toml") };
        let source = Config::resolve_path(None);
        assert_eq!(source, ConfigSource::Explicit(PathBuf::from("/env/path.toml")));
        unsafe { remove_env("CONFIG_PATH") };
    }

    #[test]
    fn test_resolve_path_default() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe { remove_env("CONFIG_PATH") };
        let source = Config::resolve_path(None);
        assert_eq!(source, ConfigSource::Default(PathBuf::from("token-sim.toml")));
    }

    #[test]
    fn test_resolve_path_cli_overrides_env() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe { set_env("CONFIG_PATH", "/env/should-lose.toml") };
        let source = Config::resolve_path(Some("/cli/wins.toml"));
        assert_eq!(
            source,
            ConfigSource::Explicit(PathBuf::from("/cli/wins.toml")),
            "CLI arg must take precedence over CONFIG_PATH env var"
        );
        unsafe { remove_env("CONFIG_PATH") };
    }
}
