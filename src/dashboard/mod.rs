//! Role-scoped KPI dashboards.
//!
//! The aggregator consumes the read-only store, reduces visible rows with
//! predicate-filtered folds, and returns a [`DashboardSnapshot`] that is
//! JSON-safe by construction. Role visibility, period resolution, and the
//! serialization boundary each live in their own submodule.

pub mod aggregator;
pub mod period;
pub mod scope;
pub mod snapshot;

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use aggregator::MetricsAggregator;
pub use period::Period;
pub use scope::Role;
pub use snapshot::DashboardSnapshot;

use snapshot::{
    CaseStatsSummary, DeadlineSummary, DocumentSummary, FinancialSummary, ProductivitySummary,
    TeamSummary,
};

/// What a caller asks for: who they are and which window to report over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardRequest {
    pub role: Role,
    pub actor_id: Uuid,
    pub period: Period,
}

/// A single dashboard section, addressable on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DashboardSection {
    CaseStats,
    Financial,
    Productivity,
    Deadlines,
    Documents,
    Team,
}

impl DashboardSection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CaseStats => "case_stats",
            Self::Financial => "financial",
            Self::Productivity => "productivity",
            Self::Deadlines => "deadlines",
            Self::Documents => "documents",
            Self::Team => "team",
        }
    }
}

impl fmt::Display for DashboardSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload of a single-section request. Serializes as the bare summary, the
/// same shape the full snapshot embeds.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SectionData {
    CaseStats(CaseStatsSummary),
    Financial(FinancialSummary),
    Productivity(ProductivitySummary),
    Deadlines(DeadlineSummary),
    Documents(DocumentSummary),
    Team(TeamSummary),
}
