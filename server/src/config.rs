//! Server configuration module.
//!
//! Parses configuration from environment variables for the Gatherly server.
//!
//! # Environment Variables
//!
//! | Variable | Required | Default | Description |
//! |----------|----------|---------|-------------|
//! | `GATHERLY_JWT_SECRET` | Yes | - | HMAC secret used to sign bearer tokens |
//! | `GATHERLY_MONGODB_URI` | No | - | MongoDB connection string; when unset the server uses an in-memory store |
//! | `GATHERLY_DATABASE` | No | gatherly | MongoDB database name |
//! | `PORT` | No | 8080 | HTTP server port |

use std::env;

use thiserror::Error;

/// Default HTTP server port.
const DEFAULT_PORT: u16 = 8080;

/// Default MongoDB database name.
const DEFAULT_DATABASE: &str = "gatherly";

/// Errors that can occur when parsing configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable is missing.
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    /// Environment variable has invalid format.
    #[error("invalid format for {var}: {message}")]
    InvalidFormat { var: String, message: String },

    /// Port number is invalid.
    #[error("invalid port number: {0}")]
    InvalidPort(#[from] std::num::ParseIntError),
}

/// Server configuration parsed from environment variables.
///
/// The token secret and store connection are explicit values handed to
/// constructors; nothing reads the process environment after startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Secret used to sign and verify bearer tokens.
    pub jwt_secret: String,

    /// MongoDB connection string. `None` selects the in-memory store.
    pub mongodb_uri: Option<String>,

    /// MongoDB database name.
    pub database: String,

    /// HTTP server port.
    pub port: u16,
}

impl Config {
    /// Parse configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `GATHERLY_JWT_SECRET` is missing or empty,
    /// or if `PORT` is not a valid u16.
    pub fn from_env() -> Result<Self, ConfigError> {
        let jwt_secret = match env::var("GATHERLY_JWT_SECRET") {
            Ok(s) if !s.is_empty() => s,
            _ => {
                return Err(ConfigError::MissingEnvVar(
                    "GATHERLY_JWT_SECRET".to_string(),
                ))
            }
        };

        let mongodb_uri = env::var("GATHERLY_MONGODB_URI")
            .ok()
            .filter(|s| !s.is_empty());
        let database =
            env::var("GATHERLY_DATABASE").unwrap_or_else(|_| DEFAULT_DATABASE.to_string());
        let port = parse_port()?;

        Ok(Self {
            jwt_secret,
            mongodb_uri,
            database,
            port,
        })
    }
}

/// Parse the PORT environment variable.
///
/// Returns the default port if not set.
fn parse_port() -> Result<u16, ConfigError> {
    match env::var("PORT") {
        Ok(port_str) => Ok(port_str.parse()?),
        Err(env::VarError::NotPresent) => Ok(DEFAULT_PORT),
        Err(env::VarError::NotUnicode(_)) => Err(ConfigError::InvalidFormat {
            var: "PORT".to_string(),
            message: "contains invalid unicode".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    /// Helper to temporarily set environment variables for testing.
    struct EnvGuard {
        vars: Vec<(String, Option<String>)>,
    }

    impl EnvGuard {
        fn new() -> Self {
            Self { vars: Vec::new() }
        }

        fn set(&mut self, key: &str, value: &str) {
            let old_value = env::var(key).ok();
            self.vars.push((key.to_string(), old_value));
            env::set_var(key, value);
        }

        fn remove(&mut self, key: &str) {
            let old_value = env::var(key).ok();
            self.vars.push((key.to_string(), old_value));
            env::remove_var(key);
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for (key, value) in &self.vars {
                match value {
                    Some(v) => env::set_var(key, v),
                    None => env::remove_var(key),
                }
            }
        }
    }

    #[test]
    #[serial]
    fn config_with_only_secret_uses_defaults() {
        let mut guard = EnvGuard::new();
        guard.set("GATHERLY_JWT_SECRET", "secret");
        guard.remove("GATHERLY_MONGODB_URI");
        guard.remove("GATHERLY_DATABASE");
        guard.remove("PORT");

        let config = Config::from_env().expect("should parse config");
        assert_eq!(config.jwt_secret, "secret");
        assert!(config.mongodb_uri.is_none());
        assert_eq!(config.database, DEFAULT_DATABASE);
        assert_eq!(config.port, DEFAULT_PORT);
    }

    #[test]
    #[serial]
    fn config_with_all_variables_set() {
        let mut guard = EnvGuard::new();
        guard.set("GATHERLY_JWT_SECRET", "secret");
        guard.set("GATHERLY_MONGODB_URI", "mongodb://localhost:27017");
        guard.set("GATHERLY_DATABASE", "gatherly_test");
        guard.set("PORT", "9090");

        let config = Config::from_env().expect("should parse config");
        assert_eq!(
            config.mongodb_uri,
            Some("mongodb://localhost:27017".to_string())
        );
        assert_eq!(config.database, "gatherly_test");
        assert_eq!(config.port, 9090);
    }

    #[test]
    #[serial]
    fn config_missing_jwt_secret_fails() {
        let mut guard = EnvGuard::new();
        guard.remove("GATHERLY_JWT_SECRET");

        let result = Config::from_env();
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref v) if v == "GATHERLY_JWT_SECRET"));
    }

    #[test]
    #[serial]
    fn config_empty_jwt_secret_fails() {
        let mut guard = EnvGuard::new();
        guard.set("GATHERLY_JWT_SECRET", "");

        assert!(Config::from_env().is_err());
    }

    #[test]
    #[serial]
    fn config_empty_mongodb_uri_counts_as_unset() {
        let mut guard = EnvGuard::new();
        guard.set("GATHERLY_JWT_SECRET", "secret");
        guard.set("GATHERLY_MONGODB_URI", "");

        let config = Config::from_env().expect("should parse config");
        assert!(config.mongodb_uri.is_none());
    }

    #[test]
    #[serial]
    fn parse_port_default() {
        let mut guard = EnvGuard::new();
        guard.remove("PORT");

        let port = parse_port().expect("should parse port");
        assert_eq!(port, DEFAULT_PORT);
    }

    #[test]
    #[serial]
    fn parse_port_invalid() {
        let mut guard = EnvGuard::new();
        guard.set("PORT", "not-a-number");

        let result = parse_port();
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), ConfigError::InvalidPort(_)));
    }

    #[test]
    #[serial]
    fn parse_port_out_of_range() {
        let mut guard = EnvGuard::new();
        guard.set("PORT", "99999");

        assert!(parse_port().is_err());
    }
}
