use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;

/// Log configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LogConfig {
    /// Log file path, if not set, logs will be printed to stdout
    pub file: Option<String>,
    /// Log level, default is "info"
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            file: None,
            level: default_log_level(),
        }
    }
}

/// Replybot configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    /// HTTP server listening address
    #[serde(default = "default_server_addr")]
    pub server_addr: String,

    /// Path of the JSON data file backing the answer store
    #[serde(default = "default_data_file")]
    pub data_file: String,

    /// Log configuration
    #[serde(default)]
    pub log: LogConfig,
}

fn default_server_addr() -> String {
    "0.0.0.0:6403".to_string()
}

fn default_data_file() -> String {
    "data.json".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_addr: default_server_addr(),
            data_file: default_data_file(),
            log: LogConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let config_str = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path))?;

        let config: Config = toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file '{}'", path))?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config_str = r#"
server_addr = "127.0.0.1:8080"
data_file = "/var/lib/replybot/data.json"

[log]
level = "debug"
"#;

        let config: Config = toml::from_str(config_str).unwrap();
        assert_eq!(config.server_addr, "127.0.0.1:8080");
        assert_eq!(config.data_file, "/var/lib/replybot/data.json");
        assert_eq!(config.log.level, "debug");
        assert!(config.log.file.is_none());
    }

    #[test]
    fn test_defaults_fill_missing_fields() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server_addr, "0.0.0.0:6403");
        assert_eq!(config.data_file, "data.json");
        assert_eq!(config.log.level, "info");
    }
}
