use secrecy::SecretString;

use crate::config::helpers::{optional_env, parse_string_env, parse_u16_env, parse_usize_env};
use crate::error::ConfigError;
use crate::settings::Settings;

/// PostgreSQL connection settings consumed by the `postgres` backend.
///
/// Environment overrides follow the libpq names (`PGHOST`, `PGPORT`,
/// `PGUSER`, `PGPASSWORD`, `PGDATABASE`); the pool size override is
/// `LEXBOARD_DB_POOL_SIZE`.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: Option<SecretString>,
    pub dbname: String,
    pub pool_size: usize,
}

fn validate_pool_size(value: usize) -> Result<usize, ConfigError> {
    if value == 0 || value > 100 {
        return Err(ConfigError::InvalidValue {
            key: "LEXBOARD_DB_POOL_SIZE".to_string(),
            message: format!("must be between 1 and 100, got {value}"),
        });
    }
    Ok(value)
}

fn validate_non_empty(key: &str, value: String) -> Result<String, ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: "must not be empty".to_string(),
        });
    }
    Ok(value)
}

impl DatabaseConfig {
    pub fn resolve(settings: &Settings) -> Result<Self, ConfigError> {
        let database = &settings.database;
        let password = optional_env("PGPASSWORD")?
            .or_else(|| database.password.clone())
            .map(SecretString::from);

        Ok(Self {
            host: validate_non_empty(
                "PGHOST",
                parse_string_env("PGHOST", database.host.clone())?,
            )?,
            port: parse_u16_env("PGPORT", database.port)?,
            user: validate_non_empty(
                "PGUSER",
                parse_string_env("PGUSER", database.user.clone())?,
            )?,
            password,
            dbname: validate_non_empty(
                "PGDATABASE",
                parse_string_env("PGDATABASE", database.dbname.clone())?,
            )?,
            pool_size: validate_pool_size(parse_usize_env(
                "LEXBOARD_DB_POOL_SIZE",
                database.pool_size,
            )?)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Ambient libpq variables (PGHOST and friends) on the host machine would
    // override the settings under test. The tests only remove keys and never
    // set them, so parallel execution stays safe.
    #[allow(unsafe_code)]
    fn clear_env_overrides() {
        for key in [
            "PGHOST",
            "PGPORT",
            "PGUSER",
            "PGPASSWORD",
            "PGDATABASE",
            "LEXBOARD_DB_POOL_SIZE",
        ] {
            unsafe { std::env::remove_var(key) };
        }
    }

    #[test]
    fn resolve_uses_settings_defaults() {
        clear_env_overrides();
        let config =
            DatabaseConfig::resolve(&Settings::default()).expect("defaults should resolve");
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 5432);
        assert_eq!(config.dbname, "lexboard");
        assert_eq!(config.pool_size, 16);
    }

    #[test]
    fn resolve_rejects_empty_host() {
        clear_env_overrides();
        let mut settings = Settings::default();
        settings.database.host = "   ".to_string();
        let err = DatabaseConfig::resolve(&settings).expect_err("blank host must fail");
        let ConfigError::InvalidValue { key, .. } = err else {
            panic!("expected ConfigError::InvalidValue");
        };
        assert_eq!(key, "PGHOST");
    }

    #[test]
    fn resolve_rejects_zero_pool() {
        clear_env_overrides();
        let mut settings = Settings::default();
        settings.database.pool_size = 0;
        let err = DatabaseConfig::resolve(&settings).expect_err("zero pool must fail");
        let ConfigError::InvalidValue { key, message } = err else {
            panic!("expected ConfigError::InvalidValue");
        };
        assert_eq!(key, "LEXBOARD_DB_POOL_SIZE");
        assert!(message.contains("between 1 and 100"));
    }
}
