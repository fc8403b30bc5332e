use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::constants::{
    DEFAULT_COLLECTION, DEFAULT_DATABASE, DEFAULT_FIRESTORE_URL, DEFAULT_PORT, DEFAULT_SEARCH_URL,
    DEFAULT_TOKEN_URL, ENV_CLIENT_ID, ENV_CLIENT_SECRET, ENV_FIRESTORE_TOKEN, ENV_PORT,
};
use crate::error::ConfigError;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_token_url")]
    pub token_url: String,
    #[serde(default = "default_search_url")]
    pub search_url: String,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Memory,
    Firestore,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    pub project_id: Option<String>,
    #[serde(default = "default_database")]
    pub database: String,
    #[serde(default = "default_collection")]
    pub collection: String,
    #[serde(default = "default_firestore_url")]
    pub base_url: String,
    pub access_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_token_url() -> String {
    DEFAULT_TOKEN_URL.to_string()
}

fn default_search_url() -> String {
    DEFAULT_SEARCH_URL.to_string()
}

fn default_database() -> String {
    DEFAULT_DATABASE.to_string()
}

fn default_collection() -> String {
    DEFAULT_COLLECTION.to_string()
}

fn default_firestore_url() -> String {
    DEFAULT_FIRESTORE_URL.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            token_url: default_token_url(),
            search_url: default_search_url(),
            client_id: None,
            client_secret: None,
            timeout_seconds: None,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            project_id: None,
            database: default_database(),
            collection: default_collection(),
            base_url: default_firestore_url(),
            access_token: None,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

impl ProviderConfig {
    /// Client id and secret, both required to be non-empty.
    pub fn credentials(&self) -> Result<(&str, &str), ConfigError> {
        let id = non_empty(self.client_id.as_deref())
            .ok_or_else(|| ConfigError::Missing(format!("provider.client_id or {}", ENV_CLIENT_ID)))?;
        let secret = non_empty(self.client_secret.as_deref()).ok_or_else(|| {
            ConfigError::Missing(format!("provider.client_secret or {}", ENV_CLIENT_SECRET))
        })?;
        Ok((id, secret))
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }
}

impl Config {
    /// Load `path` if it exists, then apply environment overrides (after `.env`).
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let mut config = if path.exists() {
            let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.display().to_string(),
                source,
            })?;
            Self::from_toml_str(&content)?
        } else {
            Self::default()
        };

        config.apply_overrides(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Environment values win over file values when set and non-empty.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(id) = get(ENV_CLIENT_ID) {
            self.provider.client_id = Some(id);
        }
        if let Some(secret) = get(ENV_CLIENT_SECRET) {
            self.provider.client_secret = Some(secret);
        }
        if let Some(token) = get(ENV_FIRESTORE_TOKEN) {
            self.store.access_token = Some(token);
        }
        if let Some(port) = get(ENV_PORT).and_then(|p| p.trim().parse().ok()) {
            self.server.port = port;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.provider.credentials()?;
        if self.store.backend == StoreBackend::Firestore
            && non_empty(self.store.project_id.as_deref()).is_none()
        {
            return Err(ConfigError::Missing(
                "store.project_id (required for the firestore backend)".to_string(),
            ));
        }
        if self.store.collection.trim().is_empty() {
            return Err(ConfigError::Invalid("store.collection must not be empty".to_string()));
        }
        Ok(())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
