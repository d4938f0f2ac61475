//! Application configuration management.

use std::path::PathBuf;

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// JWT configuration.
    pub jwt: JwtSettings,
    /// Media storage configuration.
    pub storage: StorageSettings,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

/// JWT configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtSettings {
    /// Secret key for signing tokens.
    pub secret: String,
    /// Access token expiration in hours.
    #[serde(default = "default_token_expiry_hours")]
    pub token_expiry_hours: i64,
}

fn default_token_expiry_hours() -> i64 {
    168 // 7 days
}

/// Media storage configuration.
///
/// The remote credential fields are all optional: the storage layer goes
/// remote only when the complete set is present, and falls back to the
/// local filesystem otherwise.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    /// Public base URL that serves stored media, without a trailing slash.
    pub media_base_url: String,
    /// Root directory for the local filesystem backend.
    #[serde(default = "default_local_root")]
    pub local_root: PathBuf,
    /// Remote endpoint URL (S3-compatible). Optional; the provider default
    /// applies when absent.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Remote bucket name.
    #[serde(default)]
    pub bucket: Option<String>,
    /// Remote access key ID.
    #[serde(default)]
    pub access_key_id: Option<String>,
    /// Remote secret access key.
    #[serde(default)]
    pub secret_access_key: Option<String>,
    /// Remote region.
    #[serde(default)]
    pub region: Option<String>,
}

fn default_local_root() -> PathBuf {
    PathBuf::from("./uploads")
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("MUGSHOT").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_settings_defaults() {
        let settings: StorageSettings = serde_json::from_value(serde_json::json!({
            "media_base_url": "https://media.example.com"
        }))
        .unwrap();

        assert_eq!(settings.local_root, PathBuf::from("./uploads"));
        assert!(settings.bucket.is_none());
        assert!(settings.access_key_id.is_none());
    }
}
