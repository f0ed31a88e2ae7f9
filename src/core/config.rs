use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    pub panel: PanelConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_num_threads")]
    pub num_threads: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PanelConfig {
    /// Directory fetch endpoint.
    pub base_url: String,
    /// Traffic report endpoint.
    pub traffic_url: String,
    pub api_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_gateway_base")]
    pub base_url: String,
    /// The gateway's own config file; `trafficStats.secret` is read from it
    /// once per sync cycle.
    #[serde(default = "default_gateway_config")]
    pub config_file: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    #[serde(default = "default_sync_interval")]
    pub interval_seconds: u64,
    /// Disable for auth-only deployments.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub console: bool,
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    28262
}

fn default_num_threads() -> usize {
    num_cpus::get()
}

fn default_gateway_base() -> String {
    "http://127.0.0.1:25413".to_string()
}

fn default_gateway_config() -> PathBuf {
    PathBuf::from("/etc/hysteria/config.json")
}

fn default_sync_interval() -> u64 {
    60
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            num_threads: default_num_threads(),
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: default_gateway_base(),
            config_file: default_gateway_config(),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            interval_seconds: default_sync_interval(),
            enabled: default_true(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            console: false,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            bail!("Server port must be greater than 0");
        }

        if self.server.num_threads == 0 {
            bail!("num_threads must be greater than 0");
        }

        if self.panel.base_url.is_empty() {
            bail!("panel.base_url must not be empty");
        }

        if self.panel.traffic_url.is_empty() {
            bail!("panel.traffic_url must not be empty");
        }

        if self.panel.api_key.is_empty() {
            bail!("panel.api_key must not be empty");
        }

        if self.gateway.base_url.is_empty() {
            bail!("gateway.base_url must not be empty");
        }

        if self.sync.interval_seconds == 0 {
            bail!("sync.interval_seconds must be greater than 0");
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            bail!(
                "Invalid log level '{}'. Must be one of: trace, debug, info, warn, error",
                self.logging.level
            );
        }

        let valid_formats = ["json", "console"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            bail!(
                "Invalid log format '{}'. Must be one of: json, console",
                self.logging.format
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const MINIMAL: &str = r#"
        [panel]
        base_url = "https://panel.example.com/api/users"
        traffic_url = "https://panel.example.com/api/traffic"
        api_key = "test-key"
    "#;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let file = write_config(MINIMAL);
        let config = Config::from_file(&file.path().to_path_buf()).unwrap();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 28262);
        assert_eq!(config.gateway.base_url, "http://127.0.0.1:25413");
        assert_eq!(config.sync.interval_seconds, 60);
        assert!(config.sync.enabled);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_full_config_overrides() {
        let file = write_config(
            r#"
            [server]
            host = "127.0.0.1"
            port = 9000
            num_threads = 2

            [panel]
            base_url = "https://panel.example.com/api/users"
            traffic_url = "https://panel.example.com/api/traffic"
            api_key = "k"

            [gateway]
            base_url = "http://10.0.0.1:25413"
            config_file = "/tmp/gw.json"

            [sync]
            interval_seconds = 30
            enabled = false

            [logging]
            level = "debug"
            format = "console"
            console = true
            "#,
        );
        let config = Config::from_file(&file.path().to_path_buf()).unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.gateway.config_file, PathBuf::from("/tmp/gw.json"));
        assert_eq!(config.sync.interval_seconds, 30);
        assert!(!config.sync.enabled);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_missing_panel_section_fails() {
        let file = write_config("[server]\nport = 9000\n");
        assert!(Config::from_file(&file.path().to_path_buf()).is_err());
    }

    #[test]
    fn test_empty_api_key_rejected() {
        let file = write_config(
            r#"
            [panel]
            base_url = "https://panel.example.com/api/users"
            traffic_url = "https://panel.example.com/api/traffic"
            api_key = ""
            "#,
        );
        assert!(Config::from_file(&file.path().to_path_buf()).is_err());
    }

    #[test]
    fn test_zero_sync_interval_rejected() {
        let file = write_config(&format!("{MINIMAL}\n[sync]\ninterval_seconds = 0\n"));
        assert!(Config::from_file(&file.path().to_path_buf()).is_err());
    }

    #[test]
    fn test_invalid_log_level_rejected() {
        let file = write_config(&format!("{MINIMAL}\n[logging]\nlevel = \"loud\"\n"));
        assert!(Config::from_file(&file.path().to_path_buf()).is_err());
    }
}
