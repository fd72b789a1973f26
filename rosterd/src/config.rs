//! Application configuration.
//!
//! Loaded from a YAML file merged with `ROSTERD_`-prefixed environment
//! variables (nested fields split on `__`), plus the common `DATABASE_URL`
//! pattern. All knobs have defaults; only `secret_key` has to be supplied
//! before tokens can be issued.

use clap::Parser;
use figment::{
    providers::{Env, Format, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Simple CLI args - just for specifying config file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "ROSTERD_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit without starting the server.
    #[arg(long)]
    pub validate: bool,
}

/// Main application configuration.
///
/// This is the root configuration structure loaded from YAML and environment
/// variables. All fields have defaults defined in the `Default` implementation.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTTP server host to bind to (e.g., "0.0.0.0" for all interfaces)
    pub host: String,
    /// HTTP server port to bind to
    pub port: u16,
    /// SQLite database URL, e.g. "sqlite:rosterd.db"
    pub database_url: String,
    /// Secret key for JWT signing (required before any token can be issued)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<String>,
    /// Authentication configuration
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthConfig {
    /// Lifetime of issued bearer tokens (e.g. "30m", "12h")
    #[serde(with = "humantime_serde")]
    pub token_expiry: Duration,
    /// Password length rules enforced at registration
    pub password: PasswordConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct PasswordConfig {
    pub min_length: usize,
    pub max_length: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            database_url: "sqlite:rosterd.db".to_string(),
            secret_key: None,
            auth: AuthConfig::default(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_expiry: Duration::from_secs(30 * 60),
            password: PasswordConfig::default(),
        }
    }
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            min_length: 8,
            max_length: 128,
        }
    }
}

impl Config {
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        let config: Self = Self::figment(args).extract()?;
        config.validate().map_err(|e| figment::Error::from(e.to_string()))?;
        Ok(config)
    }

    pub fn figment(args: &Args) -> Figment {
        Figment::new()
            // Load base config file
            .merge(Yaml::file(&args.config))
            // Environment variables can still override specific values
            .merge(Env::prefixed("ROSTERD_").split("__"))
            // Common DATABASE_URL pattern
            .merge(Env::raw().only(&["DATABASE_URL"]))
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.auth.password.min_length > self.auth.password.max_length {
            anyhow::bail!(
                "Config validation: password.min_length ({}) cannot be greater than password.max_length ({})",
                self.auth.password.min_length,
                self.auth.password.max_length
            );
        }
        if self.auth.token_expiry.is_zero() {
            anyhow::bail!("Config validation: auth.token_expiry must be non-zero");
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.bind_address(), "127.0.0.1:8080");
        assert_eq!(config.auth.token_expiry, Duration::from_secs(1800));
        assert!(config.secret_key.is_none());
    }

    #[test]
    fn test_validate_rejects_inverted_password_lengths() {
        let mut config = Config::default();
        config.auth.password.min_length = 200;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_expiry() {
        let mut config = Config::default();
        config.auth.token_expiry = Duration::ZERO;
        assert!(config.validate().is_err());
    }
}
