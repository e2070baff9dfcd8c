//! Configuration module
//!
//! Loads configuration from environment variables.

use std::env;
use std::str::FromStr;

use chrono::Duration;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(()),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Database connection URL
    pub database_url: String,

    /// Maximum database connections in pool
    pub database_max_connections: u32,

    /// Seconds to wait for a pooled connection
    pub database_acquire_timeout_secs: u64,

    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Environment (development, production)
    pub environment: String,

    pub access_token_ttl_minutes: i64,
    pub refresh_token_ttl_minutes: i64,
    pub idempotency_key_ttl_hours: i64,

    /// Apply `migrations/0001_init.sql` at startup
    pub auto_migrate: bool,

    pub log_format: LogFormat,
}

fn parse_var<T: FromStr>(name: &'static str, default: &str) -> Result<T, ConfigError> {
    env::var(name)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .map_err(|_| ConfigError::InvalidValue(name))
}

fn positive(name: &'static str, value: i64) -> Result<i64, ConfigError> {
    if value <= 0 {
        return Err(ConfigError::InvalidValue(name));
    }
    Ok(value)
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| ConfigError::MissingEnv("DATABASE_URL"))?;

        let database_max_connections = parse_var("DATABASE_MAX_CONNECTIONS", "10")?;
        let database_acquire_timeout_secs = parse_var("DATABASE_ACQUIRE_TIMEOUT_SECS", "30")?;

        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = parse_var("PORT", "9090")?;

        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        let access_token_ttl_minutes = positive(
            "ACCESS_TOKEN_TTL_MINUTES",
            parse_var("ACCESS_TOKEN_TTL_MINUTES", "15")?,
        )?;
        let refresh_token_ttl_minutes = positive(
            "REFRESH_TOKEN_TTL_MINUTES",
            parse_var("REFRESH_TOKEN_TTL_MINUTES", "4320")?,
        )?;
        let idempotency_key_ttl_hours = positive(
            "IDEMPOTENCY_KEY_TTL_HOURS",
            parse_var("IDEMPOTENCY_KEY_TTL_HOURS", "24")?,
        )?;

        let auto_migrate = parse_var("AUTO_MIGRATE", "false")?;
        let log_format = parse_var("LOG_FORMAT", "pretty")?;

        Ok(Self {
            database_url,
            database_max_connections,
            database_acquire_timeout_secs,
            host,
            port,
            environment,
            access_token_ttl_minutes,
            refresh_token_ttl_minutes,
            idempotency_key_ttl_hours,
            auto_migrate,
            log_format,
        })
    }

    pub fn access_token_ttl(&self) -> Duration {
        Duration::minutes(self.access_token_ttl_minutes)
    }

    pub fn refresh_token_ttl(&self) -> Duration {
        Duration::minutes(self.refresh_token_ttl_minutes)
    }

    pub fn idempotency_key_ttl(&self) -> Duration {
        Duration::hours(self.idempotency_key_ttl_hours)
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnv(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parse() {
        assert_eq!("json".parse::<LogFormat>(), Ok(LogFormat::Json));
        assert_eq!("Pretty".parse::<LogFormat>(), Ok(LogFormat::Pretty));
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_positive_rejects_zero() {
        assert!(matches!(
            positive("PORT", 0),
            Err(ConfigError::InvalidValue("PORT"))
        ));
        assert_eq!(positive("PORT", 5).unwrap(), 5);
    }
}
