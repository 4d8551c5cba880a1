use crate::config::helpers::{parse_i64_env, parse_usize_env};
use crate::error::ConfigError;
use crate::settings::Settings;

/// Aggregation tunables.
///
/// Limits cap the list-shaped sub-metrics; the horizon bounds how far ahead
/// of the reference date a deadline still counts as upcoming. Counters and
/// rates are never capped.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub upcoming_horizon_days: i64,
    pub deadline_list_limit: usize,
    pub top_client_limit: usize,
    pub recent_document_limit: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            upcoming_horizon_days: 14,
            deadline_list_limit: 10,
            top_client_limit: 5,
            recent_document_limit: 5,
        }
    }
}

fn validate_horizon(key: &str, days: i64) -> Result<i64, ConfigError> {
    if !(1..=365).contains(&days) {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("must be between 1 and 365 days, got {days}"),
        });
    }
    Ok(days)
}

fn validate_limit(key: &str, value: usize) -> Result<usize, ConfigError> {
    if value == 0 || value > 100 {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("must be between 1 and 100, got {value}"),
        });
    }
    Ok(value)
}

impl DashboardConfig {
    pub fn resolve(settings: &Settings) -> Result<Self, ConfigError> {
        let dashboard = &settings.dashboard;
        Ok(Self {
            upcoming_horizon_days: validate_horizon(
                "LEXBOARD_UPCOMING_HORIZON_DAYS",
                parse_i64_env(
                    "LEXBOARD_UPCOMING_HORIZON_DAYS",
                    dashboard.upcoming_horizon_days,
                )?,
            )?,
            deadline_list_limit: validate_limit(
                "LEXBOARD_DEADLINE_LIST_LIMIT",
                parse_usize_env("LEXBOARD_DEADLINE_LIST_LIMIT", dashboard.deadline_list_limit)?,
            )?,
            top_client_limit: validate_limit(
                "LEXBOARD_TOP_CLIENT_LIMIT",
                parse_usize_env("LEXBOARD_TOP_CLIENT_LIMIT", dashboard.top_client_limit)?,
            )?,
            recent_document_limit: validate_limit(
                "LEXBOARD_RECENT_DOCUMENT_LIMIT",
                parse_usize_env(
                    "LEXBOARD_RECENT_DOCUMENT_LIMIT",
                    dashboard.recent_document_limit,
                )?,
            )?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Exported LEXBOARD_* overrides (the README documents them) would leak
    // into these resolutions. The tests only remove keys and never set them,
    // so parallel execution stays safe.
    #[allow(unsafe_code)]
    fn clear_env_overrides() {
        for key in [
            "LEXBOARD_UPCOMING_HORIZON_DAYS",
            "LEXBOARD_DEADLINE_LIST_LIMIT",
            "LEXBOARD_TOP_CLIENT_LIMIT",
            "LEXBOARD_RECENT_DOCUMENT_LIMIT",
        ] {
            unsafe { std::env::remove_var(key) };
        }
    }

    #[test]
    fn resolve_uses_settings_defaults() {
        clear_env_overrides();
        let config =
            DashboardConfig::resolve(&Settings::default()).expect("defaults should resolve");
        assert_eq!(config.upcoming_horizon_days, 14);
        assert_eq!(config.deadline_list_limit, 10);
        assert_eq!(config.top_client_limit, 5);
        assert_eq!(config.recent_document_limit, 5);
    }

    #[test]
    fn resolve_rejects_zero_horizon() {
        clear_env_overrides();
        let mut settings = Settings::default();
        settings.dashboard.upcoming_horizon_days = 0;
        let err = DashboardConfig::resolve(&settings).expect_err("zero horizon must fail");
        let ConfigError::InvalidValue { key, message } = err else {
            panic!("expected ConfigError::InvalidValue");
        };
        assert_eq!(key, "LEXBOARD_UPCOMING_HORIZON_DAYS");
        assert!(message.contains("between 1 and 365"));
    }

    #[test]
    fn resolve_rejects_oversized_list_limit() {
        clear_env_overrides();
        let mut settings = Settings::default();
        settings.dashboard.deadline_list_limit = 500;
        let err = DashboardConfig::resolve(&settings).expect_err("oversized limit must fail");
        let ConfigError::InvalidValue { key, .. } = err else {
            panic!("expected ConfigError::InvalidValue");
        };
        assert_eq!(key, "LEXBOARD_DEADLINE_LIST_LIMIT");
    }
}
