//! Server configuration.
//!
//! Configuration is layered: built-in defaults, then an optional TOML file
//! (`till.toml`, or the path in `TILL_CONFIG`), then `TILL_*` environment
//! variables. Nested keys use a double underscore, e.g. `TILL_STORE__NAME`.

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use till_core::StoreInfo;
use till_db::DbConfig;

const DEFAULT_CONFIG_FILE: &str = "till.toml";

/// Till server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind
    pub host: String,

    /// HTTP port
    pub port: u16,

    /// SQLite database file
    pub database_path: String,

    /// Pool size
    pub max_connections: u32,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,

    /// Emit logs as JSON lines
    pub log_json: bool,

    /// Shop details printed on invoices
    pub store: StoreInfo,

    /// Prefix added to 10-digit customer numbers in share links
    pub whatsapp_country_code: String,
}

impl ServerConfig {
    /// Loads configuration from defaults, the optional config file and the
    /// environment.
    pub fn load() -> Result<Self, ConfigError> {
        let path = env::var("TILL_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        let environment = Environment::with_prefix("TILL")
            .prefix_separator("_")
            .separator("__");
        Self::load_from(&path, environment)
    }

    fn load_from(path: &str, environment: Environment) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(Config::try_from(&ServerConfig::default())?)
            .add_source(File::with_name(path).required(false))
            .add_source(environment)
            .build()?;

        let config: ServerConfig = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::InvalidValue("port".to_string()));
        }

        if self.database_path.trim().is_empty() {
            return Err(ConfigError::MissingRequired("database_path".to_string()));
        }

        if self.max_connections == 0 {
            return Err(ConfigError::InvalidValue("max_connections".to_string()));
        }

        if self.whatsapp_country_code.is_empty()
            || !self.whatsapp_country_code.chars().all(|c| c.is_ascii_digit())
        {
            return Err(ConfigError::InvalidValue(
                "whatsapp_country_code".to_string(),
            ));
        }

        Ok(())
    }

    /// Socket address to listen on.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| ConfigError::InvalidValue("host".to_string()))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Pool settings for till-db.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database_path).max_connections(self.max_connections)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "0.0.0.0".to_string(),
            port: 8080,
            database_path: "./till.db".to_string(),
            max_connections: 5,
            request_timeout_secs: 30,
            log_json: false,
            store: StoreInfo {
                name: "Till POS".to_string(),
                address: String::new(),
                phone: String::new(),
            },
            whatsapp_country_code: "91".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    #[error(transparent)]
    Load(#[from] config::ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_from(pairs: &[(&str, &str)]) -> Environment {
        let source: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Environment::with_prefix("TILL")
            .prefix_separator("_")
            .separator("__")
            .source(Some(source))
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::load_from("does-not-exist.toml", env_from(&[])).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.database_path, "./till.db");
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.whatsapp_country_code, "91");
        assert!(!config.log_json);
        assert_eq!(config.bind_addr().unwrap().port(), 8080);
    }

    #[test]
    fn test_environment_overrides() {
        let config = ServerConfig::load_from(
            "does-not-exist.toml",
            env_from(&[
                ("TILL_PORT", "9090"),
                ("TILL_DATABASE_PATH", "/tmp/shop.db"),
                ("TILL_STORE__NAME", "Meera Collections"),
            ]),
        )
        .unwrap();

        assert_eq!(config.port, 9090);
        assert_eq!(config.database_path, "/tmp/shop.db");
        assert_eq!(config.store.name, "Meera Collections");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let base = ServerConfig::load_from("does-not-exist.toml", env_from(&[])).unwrap();

        let mut config = base.clone();
        config.port = 0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidValue(_))));

        let mut config = base.clone();
        config.database_path = "  ".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::MissingRequired(_))));

        let mut config = base.clone();
        config.max_connections = 0;
        assert!(config.validate().is_err());

        let mut config = base;
        config.whatsapp_country_code = "+91".to_string();
        assert!(config.validate().is_err());
    }
}
