//! Configuration module for the ping listener.
//!
//! The listen address and buffer size are fixed; only logging can be
//! tuned from the command line or a TOML file. CLI arguments take
//! precedence over config file values.

use clap::Parser;
use serde::Deserialize;
use std::path::PathBuf;

/// Host the listener binds to.
pub const DEFAULT_HOST: &str = "localhost";

/// Port the listener binds to.
pub const DEFAULT_PORT: u16 = 9001;

/// Capacity of the per-read buffer.
pub const DEFAULT_BUFFER_SIZE: usize = 1024;

/// Command-line arguments for the listener
#[derive(Parser, Debug)]
#[command(name = "ping-listener")]
#[command(version = "0.1.0")]
#[command(about = "A single-connection TCP server answering ping with pong", long_about = None)]
pub struct CliArgs {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

/// TOML configuration file structure
#[derive(Debug, Deserialize, Default)]
pub struct TomlConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Final resolved configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub buffer_size: usize,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            buffer_size: DEFAULT_BUFFER_SIZE,
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from CLI args and optional TOML file.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_cli(CliArgs::parse())
    }

    fn from_cli(cli: CliArgs) -> Result<Self, ConfigError> {
        let toml_config = if let Some(ref config_path) = cli.config {
            let contents = std::fs::read_to_string(config_path)
                .map_err(|e| ConfigError::FileRead(config_path.clone(), e))?;
            toml::from_str(&contents)
                .map_err(|e| ConfigError::TomlParse(config_path.clone(), e))?
        } else {
            TomlConfig::default()
        };

        Ok(Config {
            log_level: if cli.log_level != "info" {
                cli.log_level
            } else {
                toml_config.logging.level
            },
            ..Config::default()
        })
    }

    /// Address string in `host:port` form.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Configuration loading errors
#[derive(Debug)]
pub enum ConfigError {
    FileRead(PathBuf, std::io::Error),
    TomlParse(PathBuf, toml::de::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::FileRead(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::TomlParse(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 9001);
        assert_eq!(config.buffer_size, 1024);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.listen_addr(), "localhost:9001");
    }

    #[test]
    fn test_toml_parsing() {
        let toml_str = r#"
            [logging]
            level = "debug"
        "#;

        let config: TomlConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.logging.level, "debug");

        let empty: TomlConfig = toml::from_str("").unwrap();
        assert_eq!(empty.logging.level, "info");
    }

    #[test]
    fn test_cli_overrides_log_level() {
        let cli = CliArgs::parse_from(["ping-listener", "--log-level", "trace"]);
        let config = Config::from_cli(cli).unwrap();
        assert_eq!(config.log_level, "trace");
        assert_eq!(config.port, DEFAULT_PORT);
    }

    #[test]
    fn test_missing_config_file() {
        let cli = CliArgs::parse_from(["ping-listener", "-c", "/nonexistent/ping-listener.toml"]);
        match Config::from_cli(cli) {
            Err(ConfigError::FileRead(path, _)) => {
                assert_eq!(path, PathBuf::from("/nonexistent/ping-listener.toml"));
            }
            other => panic!("unexpected: {:?}", other),
        }
    }
}
