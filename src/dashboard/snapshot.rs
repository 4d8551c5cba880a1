//! Dashboard output types: the serialization boundary.
//!
//! Every conversion out of domain values happens here, once, as the
//! summaries are constructed: currency and hours are rounded to two decimals
//! (banker's rounding, `Decimal::round_dp`), timestamps become RFC 3339 `Z`
//! strings, and bucket keys arrive pre-rendered from the period module. A
//! serialized snapshot therefore contains only strings, numbers, booleans,
//! arrays, and objects; decimals travel as strings and survive a JSON round
//! trip without type loss.

use chrono::{NaiveDate, SecondsFormat};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::{CalendarEventRecord, DocumentRecord, DocumentStatus, DocumentType, EventPriority};

const MONEY_DP: u32 = 2;

/// Ratio in [0, 1]; zero denominator yields `default`.
fn ratio_or(numerator: Decimal, denominator: Decimal, default: f64) -> f64 {
    if denominator.is_zero() {
        return default;
    }
    (numerator / denominator).to_f64().unwrap_or(default)
}

fn count_ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 / whole as f64
}

/// The full role-scoped dashboard result.
///
/// `team` is present only for administrators and is omitted from the
/// serialized form entirely for every other role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub case_stats: CaseStatsSummary,
    pub financial: FinancialSummary,
    pub productivity: ProductivitySummary,
    pub deadlines: DeadlineSummary,
    pub documents: DocumentSummary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<TeamSummary>,
}

/// Case counters and the sparse monthly opening trend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseStatsSummary {
    pub total: usize,
    pub open: usize,
    pub pending: usize,
    pub closed: usize,
    pub by_month: Vec<MonthlyCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyCount {
    pub period: String,
    pub count: usize,
}

/// Revenue totals split by the paid flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialSummary {
    pub total_revenue: Decimal,
    pub paid_revenue: Decimal,
    pub pending_revenue: Decimal,
    pub collection_rate: f64,
    pub invoice_count: usize,
    pub paid_count: usize,
    pub unpaid_count: usize,
    pub revenue_by_month: Vec<MonthlyRevenue>,
    pub top_clients: Vec<ClientRevenue>,
}

impl FinancialSummary {
    /// `total_revenue` is derived from the two filtered sums, so
    /// `paid + pending == total` holds by construction.
    pub(crate) fn from_totals(
        paid: Decimal,
        pending: Decimal,
        paid_count: usize,
        unpaid_count: usize,
        revenue_by_month: Vec<MonthlyRevenue>,
        top_clients: Vec<ClientRevenue>,
    ) -> Self {
        let paid_revenue = paid.round_dp(MONEY_DP);
        let pending_revenue = pending.round_dp(MONEY_DP);
        let total_revenue = paid_revenue + pending_revenue;
        Self {
            total_revenue,
            paid_revenue,
            pending_revenue,
            collection_rate: ratio_or(paid_revenue, total_revenue, 0.0),
            invoice_count: paid_count + unpaid_count,
            paid_count,
            unpaid_count,
            revenue_by_month,
            top_clients,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyRevenue {
    pub period: String,
    pub paid: Decimal,
    pub pending: Decimal,
}

impl MonthlyRevenue {
    pub(crate) fn new(period: String, paid: Decimal, pending: Decimal) -> Self {
        Self {
            period,
            paid: paid.round_dp(MONEY_DP),
            pending: pending.round_dp(MONEY_DP),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientRevenue {
    pub client_id: Uuid,
    pub revenue: Decimal,
}

impl ClientRevenue {
    pub(crate) fn new(client_id: Uuid, revenue: Decimal) -> Self {
        Self {
            client_id,
            revenue: revenue.round_dp(MONEY_DP),
        }
    }
}

/// Logged hours and the efficiency of the period's case load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductivitySummary {
    pub total_hours: Decimal,
    pub avg_hours_per_case: Decimal,
    pub weekly_hours: Vec<WeeklyHours>,
    pub efficiency_rate: f64,
}

impl ProductivitySummary {
    pub(crate) fn from_totals(
        total_hours: Decimal,
        cases_with_entries: usize,
        weekly_hours: Vec<WeeklyHours>,
        cases_closed: usize,
        cases_total: usize,
    ) -> Self {
        let total_hours = total_hours.round_dp(MONEY_DP);
        let avg_hours_per_case = if cases_with_entries == 0 {
            Decimal::ZERO
        } else {
            (total_hours / Decimal::from(cases_with_entries as u64)).round_dp(MONEY_DP)
        };
        Self {
            total_hours,
            avg_hours_per_case,
            weekly_hours,
            efficiency_rate: count_ratio(cases_closed, cases_total),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyHours {
    pub week: String,
    pub hours: Decimal,
}

impl WeeklyHours {
    pub(crate) fn new(week: String, hours: Decimal) -> Self {
        Self {
            week,
            hours: hours.round_dp(MONEY_DP),
        }
    }
}

/// Deadline pressure: what is late, what is close, and how compliant the
/// scoped case load has been.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeadlineSummary {
    pub upcoming: Vec<UpcomingDeadline>,
    pub overdue_count: usize,
    pub next_7_days: usize,
    pub compliance_rate: f64,
}

impl DeadlineSummary {
    /// `upcoming_total` is the uncapped upcoming count; `upcoming` itself may
    /// be truncated to the configured list limit.
    pub(crate) fn from_counts(
        upcoming: Vec<UpcomingDeadline>,
        overdue_count: usize,
        upcoming_total: usize,
        next_7_days: usize,
    ) -> Self {
        let tracked = overdue_count + upcoming_total;
        let compliance_rate = if tracked == 0 {
            1.0
        } else {
            1.0 - overdue_count as f64 / tracked as f64
        };
        Self {
            upcoming,
            overdue_count,
            next_7_days,
            compliance_rate,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpcomingDeadline {
    pub event_id: Uuid,
    pub case_id: Uuid,
    pub title: String,
    /// RFC 3339 `Z` timestamp.
    pub due: String,
    pub days_remaining: i64,
    pub priority: EventPriority,
}

impl UpcomingDeadline {
    pub(crate) fn from_event(event: &CalendarEventRecord, today: NaiveDate) -> Self {
        Self {
            event_id: event.id,
            case_id: event.case_id,
            title: event.title.clone(),
            due: event.due_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            days_remaining: (event.due_at.date_naive() - today).num_days(),
            priority: event.priority,
        }
    }
}

/// Document volume and review state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub total: usize,
    pub by_type: Vec<TypeCount>,
    pub by_status: Vec<StatusCount>,
    pub recent: Vec<RecentDocument>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeCount {
    pub doc_type: DocumentType,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusCount {
    pub status: DocumentStatus,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentDocument {
    pub document_id: Uuid,
    pub case_id: Uuid,
    pub title: String,
    /// RFC 3339 `Z` timestamp.
    pub uploaded: String,
}

impl RecentDocument {
    pub(crate) fn from_record(document: &DocumentRecord) -> Self {
        Self {
            document_id: document.id,
            case_id: document.case_id,
            title: document.title.clone(),
            uploaded: document.uploaded_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}

/// Per-lawyer workload, admin only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamSummary {
    pub per_lawyer: Vec<LawyerPerformance>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LawyerPerformance {
    pub lawyer_id: Uuid,
    pub cases: usize,
    pub cases_closed: usize,
    pub hours: Decimal,
    pub revenue: Decimal,
    pub efficiency: f64,
}

impl LawyerPerformance {
    pub(crate) fn from_counts(
        lawyer_id: Uuid,
        cases: usize,
        cases_closed: usize,
        hours: Decimal,
        revenue: Decimal,
    ) -> Self {
        Self {
            lawyer_id,
            cases,
            cases_closed,
            hours: hours.round_dp(MONEY_DP),
            revenue: revenue.round_dp(MONEY_DP),
            efficiency: count_ratio(cases_closed, cases),
        }
    }
}
