use std::{env, time::Duration};

use thiserror::Error;

const HOST: &str = "0.0.0.0";
const PORT: u16 = 8080;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} has an invalid value '{value}'")]
    Invalid { name: String, value: String },
}

/// Process-level settings. Service-specific settings live next to each
/// service in its own `*Config::from_env`.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Without a URI the server runs with in-memory caches and no saved trips.
    pub mongodb_uri: Option<String>,
    pub http_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: HOST.to_string(),
            port: PORT,
            mongodb_uri: None,
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: parse_var("PORT")?.unwrap_or(defaults.port),
            mongodb_uri: env::var("MONGODB_URI").ok().filter(|uri| !uri.trim().is_empty()),
            http_timeout: parse_var("HTTP_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.http_timeout),
        })
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Result<Option<T>, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid {
                name: name.to_string(),
                value,
            }),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_defaults_when_unset() {
        env::remove_var("HOST");
        env::remove_var("PORT");
        env::remove_var("MONGODB_URI");
        env::remove_var("HTTP_TIMEOUT_SECS");

        let config = ServerConfig::from_env().unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert!(config.mongodb_uri.is_none());
        assert_eq!(config.http_timeout, Duration::from_secs(15));
    }

    #[test]
    #[serial]
    fn test_invalid_port_is_an_error() {
        env::set_var("PORT", "eighty");
        let result = ServerConfig::from_env();
        env::remove_var("PORT");

        assert!(matches!(result, Err(ConfigError::Invalid { name, .. }) if name == "PORT"));
    }
}
