//! Server configuration.
//!
//! Configuration is read from environment variables:
//! - `HOST` - Optional. Listen address. Defaults to `0.0.0.0`.
//! - `PORT` - Optional. Listen port. Defaults to `8080`.
//! - `TASK_STORE_URL` - Optional. Task store connection string. Defaults to
//!   `redis://127.0.0.1:6379`; `memory://` selects the in-memory store.
//! - `USE_DB_AUTH` - Optional. When `true`, `DB_USERNAME` and `DB_PASSWORD`
//!   are required and passed to the store.

use thiserror::Error;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_STORE_URL: &str = "redis://127.0.0.1:6379";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Credentials applied on top of the store URL.
#[derive(Clone, PartialEq, Eq)]
pub struct StoreCredentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for StoreCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub store_url: String,
    pub store_credentials: Option<StoreCredentials>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            store_url: DEFAULT_STORE_URL.to_string(),
            store_credentials: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|e| ConfigError::InvalidValue("PORT".to_string(), e.to_string()))?,
            None => DEFAULT_PORT,
        };

        let store_url = lookup("TASK_STORE_URL")
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_STORE_URL.to_string());

        let use_auth = match lookup("USE_DB_AUTH").as_deref().map(str::trim) {
            None | Some("") | Some("false") | Some("0") => false,
            Some("true") | Some("1") => true,
            Some(other) => {
                return Err(ConfigError::InvalidValue(
                    "USE_DB_AUTH".to_string(),
                    other.to_string(),
                ))
            }
        };

        let store_credentials = if use_auth {
            let username = lookup("DB_USERNAME")
                .ok_or_else(|| ConfigError::MissingEnvVar("DB_USERNAME".to_string()))?;
            let password = lookup("DB_PASSWORD")
                .ok_or_else(|| ConfigError::MissingEnvVar("DB_PASSWORD".to_string()))?;
            Some(StoreCredentials { username, password })
        } else {
            None
        };

        Ok(Self {
            host,
            port,
            store_url,
            store_credentials,
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
