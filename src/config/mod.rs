//! Validated configuration resolved from settings and environment overrides.

pub(crate) mod helpers;

pub mod dashboard;
pub mod database;

pub use dashboard::DashboardConfig;
pub use database::DatabaseConfig;
