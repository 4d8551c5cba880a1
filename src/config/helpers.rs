//! Environment override parsing shared by the config resolvers.

use crate::error::ConfigError;

/// Read an environment variable, treating unset and blank values as absent.
pub(crate) fn optional_env(key: &str) -> Result<Option<String>, ConfigError> {
    match std::env::var(key) {
        Ok(value) => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                Ok(None)
            } else {
                Ok(Some(trimmed.to_string()))
            }
        }
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(std::env::VarError::NotUnicode(_)) => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: "environment value is not valid UTF-8".to_string(),
        }),
    }
}

pub(crate) fn parse_string_env(key: &str, default: String) -> Result<String, ConfigError> {
    Ok(optional_env(key)?.unwrap_or(default))
}

pub(crate) fn parse_i64_env(key: &str, default: i64) -> Result<i64, ConfigError> {
    match optional_env(key)? {
        Some(raw) => raw.parse::<i64>().map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("expected an integer, got '{raw}'"),
        }),
        None => Ok(default),
    }
}

pub(crate) fn parse_usize_env(key: &str, default: usize) -> Result<usize, ConfigError> {
    match optional_env(key)? {
        Some(raw) => raw.parse::<usize>().map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("expected a non-negative integer, got '{raw}'"),
        }),
        None => Ok(default),
    }
}

pub(crate) fn parse_u16_env(key: &str, default: u16) -> Result<u16, ConfigError> {
    match optional_env(key)? {
        Some(raw) => raw.parse::<u16>().map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("expected a port number, got '{raw}'"),
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Each test owns a distinct variable name so parallel test threads never
    // touch the same key.
    #[allow(unsafe_code)]
    fn set_env_var_for_test(key: &str, value: &str) {
        unsafe { std::env::set_var(key, value) };
    }

    #[allow(unsafe_code)]
    fn remove_env_var_for_test(key: &str) {
        unsafe { std::env::remove_var(key) };
    }

    #[test]
    fn environment_value_wins_over_the_default() {
        let key = "LEXBOARD_HELPERS_TEST_PORT";
        set_env_var_for_test(key, "6432");
        let resolved = parse_u16_env(key, 5432);
        remove_env_var_for_test(key);
        assert_eq!(resolved.expect("parse override"), 6432);
    }

    #[test]
    fn blank_environment_value_falls_back_to_the_default() {
        let key = "LEXBOARD_HELPERS_TEST_BLANK";
        set_env_var_for_test(key, "   ");
        let resolved = parse_string_env(key, "fallback".to_string());
        remove_env_var_for_test(key);
        assert_eq!(resolved.expect("parse blank"), "fallback");
    }

    #[test]
    fn malformed_integer_reports_the_key() {
        let key = "LEXBOARD_HELPERS_TEST_BAD_INT";
        set_env_var_for_test(key, "often");
        let result = parse_i64_env(key, 30);
        remove_env_var_for_test(key);
        let Err(ConfigError::InvalidValue { key: reported, .. }) = result else {
            panic!("expected InvalidValue, got {result:?}");
        };
        assert_eq!(reported, "LEXBOARD_HELPERS_TEST_BAD_INT");
    }

    #[test]
    fn unset_variable_yields_the_default() {
        let resolved = parse_usize_env("LEXBOARD_HELPERS_TEST_UNSET", 7);
        assert_eq!(resolved.expect("parse default"), 7);
    }
}
