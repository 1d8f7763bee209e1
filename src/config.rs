use crate::clients::anilist::ANILIST_API;
use crate::clients::tvdb::TVDB_API;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub providers: ProvidersConfig,

    pub hooks: HooksConfig,

    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub database_path: String,

    pub log_level: String,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,

    pub max_db_connections: u32,

    pub min_db_connections: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_path: "sqlite:data/showkeeper.db".to_string(),
            log_level: "info".to_string(),
            worker_threads: 2,
            max_db_connections: 5,
            min_db_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub enabled: bool,

    pub port: u16,

    pub cors_allowed_origins: Vec<String>,

    /// Keys accepted via `X-Api-Key` or `Authorization: Bearer`.
    /// When empty, every protected route rejects the request.
    pub api_keys: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: 8080,
            cors_allowed_origins: vec![
                "http://localhost:8080".to_string(),
                "http://127.0.0.1:8080".to_string(),
            ],
            api_keys: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    pub anilist: AnilistConfig,

    pub tvdb: TvdbConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnilistConfig {
    pub endpoint: String,

    pub timeout_seconds: u64,
}

impl Default for AnilistConfig {
    fn default() -> Self {
        Self {
            endpoint: ANILIST_API.to_string(),
            timeout_seconds: 15,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TvdbConfig {
    pub base_url: String,

    /// Leave empty to disable TVDB; requests then fail as unsupported.
    pub api_key: String,

    pub pin: String,

    pub timeout_seconds: u64,

    /// Log truncated raw response bodies at debug level.
    pub debug: bool,
}

impl Default for TvdbConfig {
    fn default() -> Self {
        Self {
            base_url: TVDB_API.to_string(),
            api_key: String::new(),
            pin: String::new(),
            timeout_seconds: 20,
            debug: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HooksConfig {
    pub request_timeout_seconds: u64,
}

impl Default for HooksConfig {
    fn default() -> Self {
        Self {
            request_timeout_seconds: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,

    pub loki_enabled: bool,

    pub loki_url: String,

    pub loki_labels: std::collections::HashMap<String, String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        let mut labels = std::collections::HashMap::new();
        labels.insert("app".to_string(), "showkeeper".to_string());

        Self {
            metrics_enabled: true,
            loki_enabled: false,
            loki_url: "http://localhost:3100".to_string(),
            loki_labels: labels,
        }
    }
}

fn truthy(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "1" | "true" | "yes")
}

impl Config {
    pub fn load() -> Result<Self> {
        let paths = Self::config_paths();

        let mut config = paths
            .iter()
            .find(|path| path.exists())
            .map_or_else(
                || {
                    info!("No config file found, using defaults");
                    Ok(Self::default())
                },
                |path| {
                    info!("Loading config from: {}", path.display());
                    Self::load_from_path(path)
                },
            )?;

        config.apply_env_overrides();
        Ok(config)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("showkeeper").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".showkeeper").join("config.toml"));
        }

        paths
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    pub fn create_default_if_missing() -> Result<bool> {
        let path = Self::default_config_path();
        if path.exists() {
            Ok(false)
        } else {
            Self::default().save_to_path(&path)?;
            Ok(true)
        }
    }

    /// Applies secrets and legacy deployment settings from the process
    /// environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(value) = get("TVDB_API_KEY") {
            self.providers.tvdb.api_key = value;
        }
        if let Some(value) = get("TVDB_PIN") {
            self.providers.tvdb.pin = value;
        }
        if let Some(value) = get("TVDB_BASE_URL") {
            self.providers.tvdb.base_url = value;
        }
        if let Some(value) = get("TVDB_DEBUG") {
            self.providers.tvdb.debug = truthy(&value);
        }
        if let Some(value) = get("DATABASE_URL") {
            self.general.database_path = value;
        }
        if let Some(port) = get("PORT").and_then(|v| v.parse().ok()) {
            self.server.port = port;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.general.database_path.trim().is_empty() {
            anyhow::bail!("general.database_path cannot be empty");
        }

        if self.server.enabled && self.server.port == 0 {
            anyhow::bail!("server.port must be > 0");
        }

        if self.providers.anilist.timeout_seconds == 0 || self.providers.tvdb.timeout_seconds == 0 {
            anyhow::bail!("provider timeouts must be > 0");
        }

        if self.hooks.request_timeout_seconds == 0 {
            anyhow::bail!("hooks.request_timeout_seconds must be > 0");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.general.database_path, "sqlite:data/showkeeper.db");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.providers.anilist.endpoint, "https://graphql.anilist.co");
        assert_eq!(config.providers.anilist.timeout_seconds, 15);
        assert_eq!(config.providers.tvdb.base_url, "https://api4.thetvdb.com/v4");
        assert_eq!(config.providers.tvdb.timeout_seconds, 20);
        assert_eq!(config.hooks.request_timeout_seconds, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let toml_str = toml::to_string_pretty(&Config::default()).unwrap();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[providers.tvdb]"));
        assert!(toml_str.contains("[hooks]"));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [general]
            log_level = "debug"

            [providers.tvdb]
            api_key = "abc"
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.providers.tvdb.api_key, "abc");
        assert_eq!(config.providers.tvdb.timeout_seconds, 20);
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("TVDB_API_KEY", " key "),
            ("TVDB_PIN", ""),
            ("TVDB_DEBUG", "TRUE"),
            ("DATABASE_URL", "sqlite:/tmp/x.db"),
            ("PORT", "9090"),
        ]);

        let mut config = Config::default();
        config.providers.tvdb.pin = "keep".to_string();
        config.apply_overrides(|key| env.get(key).map(ToString::to_string));

        assert_eq!(config.providers.tvdb.api_key, "key");
        assert_eq!(config.providers.tvdb.pin, "keep");
        assert!(config.providers.tvdb.debug);
        assert_eq!(config.general.database_path, "sqlite:/tmp/x.db");
        assert_eq!(config.server.port, 9090);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.server.port = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.hooks.request_timeout_seconds = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.general.database_path = "  ".to_string();
        assert!(config.validate().is_err());
    }
}
