use std::env;
use std::str::FromStr;

use crate::error::AppError;

/// Runtime configuration, read from the environment (and `.env` via `dotenv`).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub server_port: u16,
    pub server_host: String,
    /// HMAC secret for bearer tokens. Changing it invalidates every issued token.
    pub jwt_secret: String,
    pub token_ttl_minutes: i64,
    pub bcrypt_cost: u32,
    pub max_db_connections: u32,
    /// How many times startup pings the database before giving up.
    pub db_connect_retries: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Builds a `Config` from an arbitrary key lookup.
    pub fn from_vars<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = required(&lookup, "DATABASE_URL")?;
        let jwt_secret = required(&lookup, "JWT_SECRET")?;

        let token_ttl_minutes: i64 = parsed(&lookup, "TOKEN_TTL_MINUTES", 30)?;
        if token_ttl_minutes <= 0 {
            return Err(config_error("TOKEN_TTL_MINUTES must be positive"));
        }

        let bcrypt_cost: u32 = parsed(&lookup, "BCRYPT_COST", bcrypt::DEFAULT_COST)?;
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(config_error("BCRYPT_COST must be between 4 and 31"));
        }

        Ok(Self {
            database_url,
            server_port: parsed(&lookup, "SERVER_PORT", 8080)?,
            server_host: lookup("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            jwt_secret,
            token_ttl_minutes,
            bcrypt_cost,
            max_db_connections: parsed(&lookup, "DATABASE_MAX_CONNECTIONS", 10)?,
            db_connect_retries: parsed(&lookup, "DATABASE_CONNECT_RETRIES", 5)?,
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}

fn config_error(msg: &str) -> AppError {
    AppError::InternalServerError(format!("Invalid configuration: {}", msg))
}

fn required<F>(lookup: &F, key: &str) -> Result<String, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(config_error(&format!("{} must be set", key))),
    }
}

fn parsed<F, T>(lookup: &F, key: &str, default: T) -> Result<T, AppError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| config_error(&format!("{} must be a number", key))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::from_vars(lookup_from(&[
            ("DATABASE_URL", "postgres://test"),
            ("JWT_SECRET", "secret"),
        ]))
        .unwrap();

        assert_eq!(config.database_url, "postgres://test");
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.server_host, "127.0.0.1");
        assert_eq!(config.token_ttl_minutes, 30);
        assert_eq!(config.bcrypt_cost, 12);
        assert_eq!(config.max_db_connections, 10);
        assert_eq!(config.db_connect_retries, 5);
        assert_eq!(config.server_url(), "http://127.0.0.1:8080");
    }

    #[test]
    fn test_config_custom_values() {
        let config = Config::from_vars(lookup_from(&[
            ("DATABASE_URL", "postgres://test"),
            ("JWT_SECRET", "secret"),
            ("SERVER_PORT", "3000"),
            ("SERVER_HOST", "0.0.0.0"),
            ("TOKEN_TTL_MINUTES", "5"),
            ("BCRYPT_COST", "4"),
        ]))
        .unwrap();

        assert_eq!(config.server_port, 3000);
        assert_eq!(config.server_host, "0.0.0.0");
        assert_eq!(config.token_ttl_minutes, 5);
        assert_eq!(config.bcrypt_cost, 4);
    }

    #[test]
    fn test_config_rejects_missing_and_invalid_values() {
        assert!(Config::from_vars(lookup_from(&[("JWT_SECRET", "secret")])).is_err());
        assert!(Config::from_vars(lookup_from(&[
            ("DATABASE_URL", "postgres://test"),
            ("JWT_SECRET", "  "),
        ]))
        .is_err());
        assert!(Config::from_vars(lookup_from(&[
            ("DATABASE_URL", "postgres://test"),
            ("JWT_SECRET", "secret"),
            ("SERVER_PORT", "eighty"),
        ]))
        .is_err());
        assert!(Config::from_vars(lookup_from(&[
            ("DATABASE_URL", "postgres://test"),
            ("JWT_SECRET", "secret"),
            ("BCRYPT_COST", "40"),
        ]))
        .is_err());
        assert!(Config::from_vars(lookup_from(&[
            ("DATABASE_URL", "postgres://test"),
            ("JWT_SECRET", "secret"),
            ("TOKEN_TTL_MINUTES", "0"),
        ]))
        .is_err());
    }
}
