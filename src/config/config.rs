// SPDX-License-Identifier: GPL-3.0-only
use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// SQLite database path for the plot and wishlist registries
    pub registry_db_path: PathBuf,

    /// Local API bind address (e.g., "127.0.0.1:8080")
    pub local_api_bind: SocketAddr,

    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Emit logs as JSON lines instead of human-readable text
    #[serde(default)]
    pub log_json: bool,

    /// Origin allowed to call the API from a browser
    #[serde(default)]
    pub cors_allowed_origin: Option<String>,
}

impl Config {
    /// Load configuration from TOML file with environment variable overrides
    pub fn load() -> anyhow::Result<Self> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// Same as [`Config::load`], reading variables through `lookup` instead of the process environment
    pub fn load_with(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let config_path = lookup("PLOTSCART_CONFIG").unwrap_or_else(|| "config.toml".to_string());

        let mut config: Config = if std::path::Path::new(&config_path).exists() {
            let contents = std::fs::read_to_string(&config_path)?;
            toml::from_str(&contents)?
        } else {
            // Use default configuration
            Config::default()
        };

        config.apply_overrides(lookup)?;
        Ok(config)
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<()> {
        if let Some(val) = lookup("PLOTSCART_REGISTRY_DB_PATH") {
            self.registry_db_path = PathBuf::from(val);
        }
        if let Some(val) = lookup("PLOTSCART_LOCAL_API_BIND") {
            self.local_api_bind = SocketAddr::from_str(&val)?;
        }
        if let Some(val) = lookup("PLOTSCART_LOG_LEVEL") {
            self.log_level = val;
        }
        if let Some(val) = lookup("PLOTSCART_LOG_JSON") {
            self.log_json = val.parse()?;
        }
        if let Some(val) = lookup("PLOTSCART_CORS_ALLOWED_ORIGIN") {
            // An empty value disables CORS entirely
            self.cors_allowed_origin = if val.trim().is_empty() { None } else { Some(val) };
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            registry_db_path: PathBuf::from("plotscart.db"),
            local_api_bind: SocketAddr::from((Ipv4Addr::LOCALHOST, 8080)),
            log_level: String::from("info"),
            log_json: false,
            cors_allowed_origin: Some(String::from("http://localhost:3000")),
        }
    }
}
