use std::time::Duration;

use reqwest::Url;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{key} is not valid: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Runtime settings, read from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub account_service_url: Url,
    pub catalog_service_url: Url,
    pub host: String,
    pub port: u16,
    /// Deadline for each call to the account or catalog service.
    pub upstream_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |key: &'static str| lookup(key).ok_or(ConfigError::Missing(key));
        let url = |key: &'static str| {
            Url::parse(&required(key)?).map_err(|e| ConfigError::Invalid {
                key,
                reason: e.to_string(),
            })
        };

        let port: u16 = match lookup("PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                key: "PORT",
                reason: format!("'{raw}' is not a port number"),
            })?,
            None => 8080,
        };
        let timeout_ms: u64 = match lookup("UPSTREAM_TIMEOUT_MS") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                key: "UPSTREAM_TIMEOUT_MS",
                reason: format!("'{raw}' is not a number of milliseconds"),
            })?,
            None => 3000,
        };

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            account_service_url: url("ACCOUNT_SERVICE_URL")?,
            catalog_service_url: url("CATALOG_SERVICE_URL")?,
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            upstream_timeout: Duration::from_millis(timeout_ms),
        })
    }
}
