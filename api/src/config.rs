//! Process configuration, read once at startup.
//!
//! Values come from the environment (optionally seeded from a `.env` file by
//! `dotenvy` in `main`). Nothing here is reloaded at runtime.

use std::time::Duration;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://bank.db";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("missing environment variable: {0}")]
    Missing(&'static str),
    #[error("invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub port: u16,
    pub max_connections: u32,
    pub busy_timeout: Duration,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &self.database_url)
            .field("jwt_secret", &"<redacted>")
            .field("port", &self.port)
            .field("max_connections", &self.max_connections)
            .field("busy_timeout", &self.busy_timeout)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let jwt_secret = get("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let database_url = get("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.into());

        let port = match get("PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|e| ConfigError::Invalid {
                key: "PORT",
                message: e.to_string(),
            })?,
            None => DEFAULT_PORT,
        };

        let max_connections = match get("DATABASE_MAX_CONNECTIONS") {
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(0) => {
                    return Err(ConfigError::Invalid {
                        key: "DATABASE_MAX_CONNECTIONS",
                        message: "must be at least 1".into(),
                    })
                }
                Ok(n) => n,
                Err(e) => {
                    return Err(ConfigError::Invalid {
                        key: "DATABASE_MAX_CONNECTIONS",
                        message: e.to_string(),
                    })
                }
            },
            None => DEFAULT_MAX_CONNECTIONS,
        };

        let busy_timeout = match get("DATABASE_BUSY_TIMEOUT_MS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|e| ConfigError::Invalid {
                    key: "DATABASE_BUSY_TIMEOUT_MS",
                    message: e.to_string(),
                })?,
            None => DEFAULT_BUSY_TIMEOUT,
        };

        Ok(Config {
            database_url,
            jwt_secret,
            port,
            max_connections,
            busy_timeout,
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_secret_is_set() {
        let config = Config::from_lookup(lookup(&[("JWT_SECRET", "s3cret")])).unwrap();

        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.max_connections, DEFAULT_MAX_CONNECTIONS);
        assert_eq!(config.busy_timeout, DEFAULT_BUSY_TIMEOUT);
        assert_eq!(config.listen_addr(), "0.0.0.0:3000");
    }

    #[test]
    fn secret_is_required() {
        let err = Config::from_lookup(lookup(&[("PORT", "8080")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("JWT_SECRET"));

        let err = Config::from_lookup(lookup(&[("JWT_SECRET", "  ")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("JWT_SECRET"));
    }

    #[test]
    fn explicit_values_override_defaults() {
        let config = Config::from_lookup(lookup(&[
            ("JWT_SECRET", "s3cret"),
            ("DATABASE_URL", "sqlite::memory:"),
            ("PORT", "8080"),
            ("DATABASE_MAX_CONNECTIONS", "12"),
            ("DATABASE_BUSY_TIMEOUT_MS", "250"),
        ]))
        .unwrap();

        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.port, 8080);
        assert_eq!(config.max_connections, 12);
        assert_eq!(config.busy_timeout, Duration::from_millis(250));
    }

    #[test]
    fn bad_numbers_are_rejected() {
        let err = Config::from_lookup(lookup(&[("JWT_SECRET", "s"), ("PORT", "http")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "PORT", .. }));

        let err = Config::from_lookup(lookup(&[
            ("JWT_SECRET", "s"),
            ("DATABASE_MAX_CONNECTIONS", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                key: "DATABASE_MAX_CONNECTIONS",
                ..
            }
        ));
    }

    #[test]
    fn debug_output_hides_the_secret() {
        let config = Config::from_lookup(lookup(&[("JWT_SECRET", "hunter2")])).unwrap();
        assert!(!format!("{:?}", config).contains("hunter2"));
    }
}
