//! Read-only store abstraction for dashboard aggregation.
//!
//! Provides backend-agnostic per-entity read traits unified by the
//! `DashboardStore` supertrait. Two implementations exist:
//!
//! - `postgres` (default, feature-gated): `deadpool-postgres` + `tokio-postgres`
//! - `memory`: in-process vectors for tests and embedded deployment
//!
//! The five record types mirror the entities owned by the surrounding
//! case-management system. This layer never writes them; scoping and period
//! filtering are pushed into each backend so both return the same visible
//! row set for a given [`CaseScope`] and [`PeriodRange`].

pub mod memory;

#[cfg(feature = "postgres")]
pub mod postgres;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dashboard::period::PeriodRange;
use crate::dashboard::scope::CaseScope;
use crate::error::StoreError;

/// Create a PostgreSQL-backed store from configuration.
///
/// Shared helper for call sites that want a plain `Arc<dyn DashboardStore>`
/// without retaining the backend-specific handle.
#[cfg(feature = "postgres")]
pub async fn connect_from_config(
    config: &crate::config::DatabaseConfig,
) -> Result<Arc<dyn DashboardStore>, StoreError> {
    let backend = postgres::PgBackend::new(config).await?;
    Ok(Arc::new(backend))
}

/// Lifecycle status of a case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseStatus {
    Open,
    Pending,
    Closed,
}

impl CaseStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Pending => "pending",
            Self::Closed => "closed",
        }
    }

    pub fn from_db_value(value: &str) -> Option<Self> {
        match value {
            "open" => Some(Self::Open),
            "pending" => Some(Self::Pending),
            "closed" => Some(Self::Closed),
            _ => None,
        }
    }
}

/// Kind of calendar event. Only `Deadline` events feed the deadline metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Hearing,
    Meeting,
    Filing,
    Deadline,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hearing => "hearing",
            Self::Meeting => "meeting",
            Self::Filing => "filing",
            Self::Deadline => "deadline",
        }
    }

    pub fn from_db_value(value: &str) -> Option<Self> {
        match value {
            "hearing" => Some(Self::Hearing),
            "meeting" => Some(Self::Meeting),
            "filing" => Some(Self::Filing),
            "deadline" => Some(Self::Deadline),
            _ => None,
        }
    }

    pub fn is_deadline(self) -> bool {
        matches!(self, Self::Deadline)
    }
}

/// Event priority with its stable calendar color classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventPriority {
    Low,
    Medium,
    High,
    Urgent,
}

impl EventPriority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }

    pub fn from_db_value(value: &str) -> Option<Self> {
        match value {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            "urgent" => Some(Self::Urgent),
            _ => None,
        }
    }

    /// Hex color the calendar surfaces render this priority with.
    pub fn calendar_color(self) -> &'static str {
        match self {
            Self::Low => "#28a745",
            Self::Medium => "#ffc107",
            Self::High => "#fd7e14",
            Self::Urgent => "#dc3545",
        }
    }
}

/// Document classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    Contract,
    Brief,
    Evidence,
    Correspondence,
    CourtFiling,
    Report,
    Other,
}

impl DocumentType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Contract => "contract",
            Self::Brief => "brief",
            Self::Evidence => "evidence",
            Self::Correspondence => "correspondence",
            Self::CourtFiling => "court_filing",
            Self::Report => "report",
            Self::Other => "other",
        }
    }

    pub fn from_db_value(value: &str) -> Option<Self> {
        match value {
            "contract" => Some(Self::Contract),
            "brief" => Some(Self::Brief),
            "evidence" => Some(Self::Evidence),
            "correspondence" => Some(Self::Correspondence),
            "court_filing" => Some(Self::CourtFiling),
            "report" => Some(Self::Report),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

/// Review status of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    Draft,
    Review,
    Approved,
    Final,
    Archived,
}

impl DocumentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Review => "review",
            Self::Approved => "approved",
            Self::Final => "final",
            Self::Archived => "archived",
        }
    }

    pub fn from_db_value(value: &str) -> Option<Self> {
        match value {
            "draft" => Some(Self::Draft),
            "review" => Some(Self::Review),
            "approved" => Some(Self::Approved),
            "final" => Some(Self::Final),
            "archived" => Some(Self::Archived),
            _ => None,
        }
    }
}

/// A case as the metrics layer sees it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseRecord {
    pub id: Uuid,
    pub title: String,
    pub status: CaseStatus,
    /// Assigned lawyer; intake cases may not have one yet.
    pub lawyer_id: Option<Uuid>,
    /// Paralegals staffed on the case.
    pub staff: Vec<Uuid>,
    pub client_id: Uuid,
    pub opened_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
}

/// An invoice. `paid` is a flag, not an aggregable amount: paid/pending
/// revenue is always derived by filtering on it and summing `total`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceRecord {
    pub id: Uuid,
    pub case_id: Uuid,
    pub client_id: Uuid,
    pub total: Decimal,
    pub paid: bool,
    pub issued_at: DateTime<Utc>,
}

/// A logged unit of billable work.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeEntryRecord {
    pub id: Uuid,
    pub case_id: Uuid,
    pub lawyer_id: Uuid,
    pub hours: Decimal,
    pub entry_date: NaiveDate,
}

/// A calendar event attached to a case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarEventRecord {
    pub id: Uuid,
    pub case_id: Uuid,
    pub title: String,
    pub kind: EventKind,
    pub due_at: DateTime<Utc>,
    pub priority: EventPriority,
}

/// A document attached to a case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub id: Uuid,
    pub case_id: Uuid,
    pub title: String,
    pub doc_type: DocumentType,
    pub status: DocumentStatus,
    pub uploaded_at: DateTime<Utc>,
}

#[async_trait]
pub trait CaseStore: Send + Sync {
    /// Cases visible to the scope whose `opened_at` date falls in the range.
    async fn list_cases(
        &self,
        scope: &CaseScope,
        range: &PeriodRange,
    ) -> Result<Vec<CaseRecord>, StoreError>;

    /// Lawyer assignment for every case visible to the scope, irrespective
    /// of date. Backs revenue attribution in the team summary, where an
    /// invoice may belong to a case opened before the reporting period.
    async fn case_lawyers(&self, scope: &CaseScope) -> Result<HashMap<Uuid, Uuid>, StoreError>;
}

#[async_trait]
pub trait InvoiceStore: Send + Sync {
    /// Invoices on visible cases whose `issued_at` date falls in the range.
    async fn list_invoices(
        &self,
        scope: &CaseScope,
        range: &PeriodRange,
    ) -> Result<Vec<InvoiceRecord>, StoreError>;
}

#[async_trait]
pub trait TimeEntryStore: Send + Sync {
    /// Time entries on visible cases with `entry_date` in the range.
    async fn list_time_entries(
        &self,
        scope: &CaseScope,
        range: &PeriodRange,
    ) -> Result<Vec<TimeEntryRecord>, StoreError>;
}

#[async_trait]
pub trait EventStore: Send + Sync {
    /// Events of every kind on visible cases with `due_at` date in the
    /// range. The aggregator widens the range past the reporting period to
    /// cover the upcoming-deadline horizon before calling this.
    async fn list_events(
        &self,
        scope: &CaseScope,
        range: &PeriodRange,
    ) -> Result<Vec<CalendarEventRecord>, StoreError>;
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Documents on visible cases with `uploaded_at` date in the range.
    async fn list_documents(
        &self,
        scope: &CaseScope,
        range: &PeriodRange,
    ) -> Result<Vec<DocumentRecord>, StoreError>;
}

/// Unified read-only store the aggregator consumes.
pub trait DashboardStore:
    CaseStore + InvoiceStore + TimeEntryStore + EventStore + DocumentStore + Send + Sync
{
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_values_round_trip_through_db_strings() {
        for status in [CaseStatus::Open, CaseStatus::Pending, CaseStatus::Closed] {
            assert_eq!(CaseStatus::from_db_value(status.as_str()), Some(status));
        }
        assert_eq!(CaseStatus::from_db_value("in_court"), None);
    }

    #[test]
    fn event_kind_deadline_classification() {
        assert!(EventKind::Deadline.is_deadline());
        assert!(!EventKind::Hearing.is_deadline());
        assert_eq!(EventKind::from_db_value("filing"), Some(EventKind::Filing));
        assert_eq!(EventKind::from_db_value("lunch"), None);
    }

    #[test]
    fn priority_colors_are_stable() {
        assert_eq!(EventPriority::Urgent.calendar_color(), "#dc3545");
        assert_eq!(
            EventPriority::from_db_value("medium"),
            Some(EventPriority::Medium)
        );
    }
}
