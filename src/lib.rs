//! lexboard - role-scoped dashboard metrics for legal case management.
//!
//! Aggregates cases, invoices, time entries, calendar events, and documents
//! into per-role KPI snapshots. The caller supplies a role, an actor id, and
//! a reporting period; the library resolves what that role may see, reduces
//! the visible rows in process, and hands back a snapshot that serializes to
//! stable JSON. Storage is abstracted behind [`db::DashboardStore`], with a
//! pooled PostgreSQL backend and an in-memory backend for tests and embedded
//! use.

pub mod config;
pub mod dashboard;
pub mod db;
pub mod error;
pub mod settings;
pub mod testing;

pub use config::{DashboardConfig, DatabaseConfig};
pub use dashboard::{
    DashboardRequest, DashboardSection, DashboardSnapshot, MetricsAggregator, Period, Role,
    SectionData,
};
pub use error::{ConfigError, DashboardError, StoreError};
pub use settings::Settings;
