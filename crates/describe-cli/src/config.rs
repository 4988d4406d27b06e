//! Configuration for the describe binary
//!
//! Loads configuration from:
//! 1. describe.yaml (or `--config` / `DESCRIBE_CONFIG`) - store, render and logging settings
//! 2. .env file - loaded into the environment before anything else
//!
//! Environment variables override the file; command-line flags override both.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use describe_duck::StoreSettings;
use describe_vega::RenderConfig;

/// Looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "describe.yaml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse YAML in {}: {source}", .path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Database configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// DuckDB database file; in-memory when unset
    pub database: Option<PathBuf>,

    /// DuckDB memory limit, e.g. "4GB"
    pub memory_limit: Option<String>,

    pub threads: Option<u32>,
}

impl StoreConfig {
    pub fn settings(&self) -> StoreSettings {
        StoreSettings {
            memory_limit: self.memory_limit.clone(),
            threads: self.threads,
        }
    }
}

/// Rendering configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSection {
    /// Command that opens HTML pages for `--show`
    pub browser: String,

    /// Converter template for non-HTML formats
    pub converter: String,

    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl Default for RenderSection {
    fn default() -> Self {
        let render = RenderConfig::default();
        Self {
            browser: render.browser,
            converter: render.converter,
            width: None,
            height: None,
        }
    }
}

impl RenderSection {
    pub fn render_config(&self) -> RenderConfig {
        RenderConfig {
            browser: self.browser.clone(),
            converter: self.converter.clone(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error) or module-specific
    pub level: String,

    /// Output format: pretty, json, compact
    pub format: String,

    /// Output destination: stdout, file, both
    pub output: String,

    /// Directory for log files
    pub directory: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "compact".to_string(),
            output: "stdout".to_string(),
            directory: "./logs".to_string(),
        }
    }
}

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub store: StoreConfig,
    pub render: RenderSection,
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file with environment variable overrides
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Config = if contents.trim().is_empty() {
            Config::default()
        } else {
            serde_yaml::from_str(&contents).map_err(|source| ConfigError::Yaml {
                path: path.to_path_buf(),
                source,
            })?
        };

        config.apply_env();
        Ok(config)
    }

    /// Find and load the configuration file, or fall back to defaults.
    ///
    /// An explicit path (flag, then `DESCRIBE_CONFIG`) must exist; the default
    /// `describe.yaml` is optional.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let from_env = std::env::var_os("DESCRIBE_CONFIG").map(PathBuf::from);
        match explicit.map(Path::to_path_buf).or(from_env) {
            Some(path) => Self::load(path),
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => Self::load(DEFAULT_CONFIG_FILE),
            None => {
                let mut config = Config::default();
                config.apply_env();
                Ok(config)
            }
        }
    }

    /// Override values with environment variables if present
    pub fn apply_env(&mut self) {
        if let Ok(database) = std::env::var("DESCRIBE_DATABASE") {
            self.store.database = Some(PathBuf::from(database));
        }
        if let Ok(limit) = std::env::var("DESCRIBE_MEMORY_LIMIT") {
            self.store.memory_limit = Some(limit);
        }
        if let Ok(threads) = std::env::var("DESCRIBE_THREADS") {
            if let Ok(threads) = threads.parse() {
                self.store.threads = Some(threads);
            }
        }

        if let Ok(browser) = std::env::var("DESCRIBE_BROWSER") {
            self.render.browser = browser;
        }
        if let Ok(converter) = std::env::var("DESCRIBE_CONVERTER") {
            self.render.converter = converter;
        }

        if let Ok(level) = std::env::var("RUST_LOG") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("LOG_FORMAT") {
            self.logging.format = format;
        }
        if let Ok(output) = std::env::var("LOG_OUTPUT") {
            self.logging.output = output;
        }
        if let Ok(dir) = std::env::var("LOG_DIR") {
            self.logging.directory = dir;
        }
    }

    /// Set logging environment variables for the logging module
    pub fn apply_logging_env(&self) {
        std::env::set_var("RUST_LOG", &self.logging.level);
        std::env::set_var("LOG_FORMAT", &self.logging.format);
        std::env::set_var("LOG_OUTPUT", &self.logging.output);
        std::env::set_var("LOG_DIR", &self.logging.directory);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.store.database, None);
        assert_eq!(config.render.browser, "xdg-open");
        assert!(config.render.converter.starts_with("vl-convert"));
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.output, "stdout");
    }

    #[test]
    fn test_partial_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("describe.yaml");
        std::fs::write(
            &path,
            r#"
store:
  memory_limit: "2GB"
render:
  width: 640
"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.store.memory_limit.as_deref(), Some("2GB"));
        assert_eq!(config.render.width, Some(640));
        assert_eq!(config.render.height, None);
        assert_eq!(config.store.settings().memory_limit.as_deref(), Some("2GB"));
    }

    #[test]
    fn test_env_var_override() {
        std::env::set_var("DESCRIBE_THREADS", "3");
        std::env::set_var("DESCRIBE_BROWSER", "firefox");

        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("describe.yaml");
        std::fs::write(
            &path,
            r#"
store:
  threads: 8
render:
  browser: "open"
"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.store.threads, Some(3)); // Overridden
        assert_eq!(config.render.browser, "firefox"); // Overridden
        assert_eq!(config.render.render_config().browser, "firefox");

        std::env::remove_var("DESCRIBE_THREADS");
        std::env::remove_var("DESCRIBE_BROWSER");
    }

    #[test]
    fn test_bad_yaml_names_the_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("broken.yaml");
        std::fs::write(&path, "store: [unclosed").unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Yaml { .. }));
        assert!(err.to_string().contains("broken.yaml"));
    }

    #[test]
    fn test_explicit_path_must_exist() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = Config::discover(Some(&dir.path().join("missing.yaml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
