//! Error taxonomy for the dashboard aggregation layer.
//!
//! `InvalidPeriod` and `Forbidden` are caller errors surfaced immediately.
//! `Unavailable` wraps store failures and is fatal for the request: no
//! partial KPI set is ever returned. Empty data and zero denominators are
//! not errors; the aggregator folds them into a complete zero result.

use chrono::NaiveDate;
use thiserror::Error;

use crate::dashboard::DashboardSection;
use crate::dashboard::scope::Role;

/// Errors surfaced to dashboard callers.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// A custom reporting period was malformed.
    #[error("invalid period: start {start} is after end {end}")]
    InvalidPeriod { start: NaiveDate, end: NaiveDate },

    /// The caller's role does not grant the requested section.
    #[error("role '{role}' may not request the '{section}' section")]
    Forbidden {
        role: Role,
        section: DashboardSection,
    },

    /// The underlying store could not be reached or failed mid-query.
    #[error("data source unavailable: {0}")]
    Unavailable(#[from] StoreError),
}

/// Errors raised by store backends.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Connection pool creation or checkout failed.
    #[error("database pool error: {0}")]
    Pool(String),

    /// A query failed mid-flight.
    #[error("query failed: {0}")]
    Query(String),

    /// A row held a value the record types cannot represent.
    #[error("row deserialization failed: {0}")]
    Serialization(String),
}

#[cfg(feature = "postgres")]
impl From<tokio_postgres::Error> for StoreError {
    fn from(err: tokio_postgres::Error) -> Self {
        StoreError::Query(err.to_string())
    }
}

#[cfg(feature = "postgres")]
impl From<deadpool_postgres::PoolError> for StoreError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        StoreError::Pool(err.to_string())
    }
}

/// Errors raised while resolving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A setting or environment override is out of range or unparseable.
    #[error("invalid config value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// The settings document itself could not be parsed.
    #[error("failed to parse settings: {0}")]
    Parse(String),
}
