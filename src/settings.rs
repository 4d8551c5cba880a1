//! TOML-backed settings.
//!
//! `Settings` is the raw deserialized document; the `config` module resolves
//! it into validated config values with environment overrides applied. The
//! host application owns file discovery and loading.

use serde::Deserialize;

use crate::error::ConfigError;

/// Raw settings document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub dashboard: DashboardSettings,
    pub database: DatabaseSettings,
}

impl Settings {
    /// Parse a TOML settings document. Missing tables and keys fall back to
    /// defaults.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        toml::from_str(raw).map_err(|err| ConfigError::Parse(err.to_string()))
    }
}

/// `[dashboard]` table.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DashboardSettings {
    /// Days ahead of the reference date a deadline counts as upcoming.
    pub upcoming_horizon_days: i64,
    /// Cap on the upcoming-deadline list.
    pub deadline_list_limit: usize,
    /// Cap on the top-client list.
    pub top_client_limit: usize,
    /// Cap on the recent-document list.
    pub recent_document_limit: usize,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            upcoming_horizon_days: 14,
            deadline_list_limit: 10,
            top_client_limit: 5,
            recent_document_limit: 5,
        }
    }
}

/// `[database]` table.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    /// Plain-text password in the file is allowed but the environment
    /// override (`PGPASSWORD`) is preferred.
    pub password: Option<String>,
    pub dbname: String,
    pub pool_size: usize,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            user: "lexboard".to_string(),
            password: None,
            dbname: "lexboard".to_string(),
            pool_size: 16,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let settings = Settings::from_toml_str("").expect("empty settings should parse");
        assert_eq!(settings.dashboard.upcoming_horizon_days, 14);
        assert_eq!(settings.database.port, 5432);
        assert!(settings.database.password.is_none());
    }

    #[test]
    fn partial_tables_keep_remaining_defaults() {
        let raw = r#"
            [dashboard]
            upcoming_horizon_days = 30

            [database]
            host = "db.internal"
        "#;
        let settings = Settings::from_toml_str(raw).expect("partial settings should parse");
        assert_eq!(settings.dashboard.upcoming_horizon_days, 30);
        assert_eq!(settings.dashboard.deadline_list_limit, 10);
        assert_eq!(settings.database.host, "db.internal");
        assert_eq!(settings.database.dbname, "lexboard");
    }

    #[test]
    fn malformed_document_reports_parse_error() {
        let err = Settings::from_toml_str("dashboard = 5").expect_err("scalar table must fail");
        let ConfigError::Parse(message) = err else {
            panic!("expected ConfigError::Parse, got {err:?}");
        };
        assert!(!message.is_empty());
    }
}
