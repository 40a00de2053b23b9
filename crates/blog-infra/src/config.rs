//! Configuration loaded from environment variables.

use std::env;
use std::str::FromStr;

use thiserror::Error;

use crate::database::DatabaseConfig;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {var}: '{value}'")]
    Invalid { var: &'static str, value: String },
}

/// Blog configuration.
#[derive(Debug, Clone)]
pub struct BlogConfig {
    pub database: Option<DatabaseConfig>,
    /// Enable JSON logging (for production).
    pub json_logs: bool,
}

impl BlogConfig {
    /// Load configuration from the environment, reading `.env` first if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let database = match env::var("DATABASE_URL") {
            Ok(url) => Some(DatabaseConfig {
                url,
                max_connections: parse_var("DB_MAX_CONNECTIONS", 10)?,
                min_connections: parse_var("DB_MIN_CONNECTIONS", 1)?,
            }),
            Err(_) => None,
        };

        Ok(Self {
            database,
            json_logs: env::var("LOG_FORMAT")
                .map(|v| v.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
        })
    }

    /// The database section, which the PostgreSQL adapter cannot run without.
    pub fn require_database(&self) -> Result<&DatabaseConfig, ConfigError> {
        self.database
            .as_ref()
            .ok_or(ConfigError::Missing("DATABASE_URL"))
    }
}

fn parse_var<T: FromStr>(var: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(var) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_var_default_when_unset() {
        let value: u32 = parse_var("BLOG_TEST_UNSET_VARIABLE", 7).unwrap();
        assert_eq!(value, 7);
    }

    #[test]
    fn test_require_database() {
        let config = BlogConfig {
            database: None,
            json_logs: false,
        };
        assert!(matches!(
            config.require_database(),
            Err(ConfigError::Missing("DATABASE_URL"))
        ));
    }
}
