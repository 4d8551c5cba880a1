//! Role-scoped KPI aggregation.
//!
//! One invocation resolves the caller's scope and period exactly once, pulls
//! the visible rows per entity, and reduces them in process. Conditional
//! aggregates (paid vs. pending revenue) are predicate-filtered folds over
//! `Decimal`; bucketing goes through `BTreeMap`, so every list in the result
//! has a deterministic order and repeated calls against an unchanged store
//! return identical snapshots.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use tracing::debug;
use uuid::Uuid;

use crate::config::DashboardConfig;
use crate::dashboard::period::{PeriodRange, month_key, week_key};
use crate::dashboard::scope::CaseScope;
use crate::dashboard::snapshot::{
    CaseStatsSummary, ClientRevenue, DashboardSnapshot, DeadlineSummary, DocumentSummary,
    FinancialSummary, LawyerPerformance, MonthlyCount, MonthlyRevenue, ProductivitySummary,
    RecentDocument, StatusCount, TeamSummary, TypeCount, UpcomingDeadline, WeeklyHours,
};
use crate::dashboard::{DashboardRequest, DashboardSection, SectionData};
use crate::db::{
    CalendarEventRecord, CaseRecord, CaseStatus, DashboardStore, DocumentRecord, DocumentStatus,
    DocumentType, InvoiceRecord, TimeEntryRecord,
};
use crate::error::DashboardError;

/// Computes role-scoped dashboard metrics from a read-only store.
///
/// Holds no mutable state; clones of the `Arc` may be shared freely across
/// tasks.
pub struct MetricsAggregator {
    store: Arc<dyn DashboardStore>,
    config: DashboardConfig,
}

impl MetricsAggregator {
    pub fn new(store: Arc<dyn DashboardStore>, config: DashboardConfig) -> Self {
        Self { store, config }
    }

    /// Full dashboard for the caller, reported as of the current date.
    pub async fn snapshot(
        &self,
        request: &DashboardRequest,
    ) -> Result<DashboardSnapshot, DashboardError> {
        self.snapshot_as_of(request, Utc::now().date_naive()).await
    }

    /// Full dashboard with an explicit reference date. Preset periods end at
    /// `today`, and deadline classification splits there.
    pub async fn snapshot_as_of(
        &self,
        request: &DashboardRequest,
        today: NaiveDate,
    ) -> Result<DashboardSnapshot, DashboardError> {
        let range = request.period.resolve(today)?;
        let scope = CaseScope::for_role(request.role, request.actor_id);
        debug!(
            role = %request.role,
            start = %range.start,
            end = %range.end,
            "building dashboard snapshot"
        );

        let cases = self.store.list_cases(&scope, &range).await?;
        let invoices = self.store.list_invoices(&scope, &range).await?;
        let entries = self.store.list_time_entries(&scope, &range).await?;
        let events = self.store.list_events(&scope, &self.event_window(&range, today)).await?;
        let documents = self.store.list_documents(&scope, &range).await?;

        let team = if request.role.can_view_team() {
            let assignments = self.store.case_lawyers(&scope).await?;
            Some(team_summary(&cases, &entries, &invoices, &assignments))
        } else {
            None
        };

        Ok(DashboardSnapshot {
            case_stats: case_stats(&cases),
            financial: financial(&invoices, self.config.top_client_limit),
            productivity: productivity(&entries, &cases),
            deadlines: deadlines(&events, today, &range, &self.config),
            documents: document_summary(&documents, self.config.recent_document_limit),
            team,
        })
    }

    /// Compute a single section, reported as of the current date.
    pub async fn section(
        &self,
        request: &DashboardRequest,
        section: DashboardSection,
    ) -> Result<SectionData, DashboardError> {
        self.section_as_of(request, section, Utc::now().date_naive())
            .await
    }

    /// Compute a single section with an explicit reference date.
    ///
    /// The permission check runs before the period is even resolved, so a
    /// non-admin asking for the team section gets `Forbidden` without a
    /// single query being issued.
    pub async fn section_as_of(
        &self,
        request: &DashboardRequest,
        section: DashboardSection,
        today: NaiveDate,
    ) -> Result<SectionData, DashboardError> {
        if section == DashboardSection::Team && !request.role.can_view_team() {
            return Err(DashboardError::Forbidden {
                role: request.role,
                section,
            });
        }

        let range = request.period.resolve(today)?;
        let scope = CaseScope::for_role(request.role, request.actor_id);
        debug!(role = %request.role, %section, "building dashboard section");

        match section {
            DashboardSection::CaseStats => {
                let cases = self.store.list_cases(&scope, &range).await?;
                Ok(SectionData::CaseStats(case_stats(&cases)))
            }
            DashboardSection::Financial => {
                let invoices = self.store.list_invoices(&scope, &range).await?;
                Ok(SectionData::Financial(financial(
                    &invoices,
                    self.config.top_client_limit,
                )))
            }
            DashboardSection::Productivity => {
                let entries = self.store.list_time_entries(&scope, &range).await?;
                let cases = self.store.list_cases(&scope, &range).await?;
                Ok(SectionData::Productivity(productivity(&entries, &cases)))
            }
            DashboardSection::Deadlines => {
                let events = self
                    .store
                    .list_events(&scope, &self.event_window(&range, today))
                    .await?;
                Ok(SectionData::Deadlines(deadlines(
                    &events,
                    today,
                    &range,
                    &self.config,
                )))
            }
            DashboardSection::Documents => {
                let documents = self.store.list_documents(&scope, &range).await?;
                Ok(SectionData::Documents(document_summary(
                    &documents,
                    self.config.recent_document_limit,
                )))
            }
            DashboardSection::Team => {
                let cases = self.store.list_cases(&scope, &range).await?;
                let entries = self.store.list_time_entries(&scope, &range).await?;
                let invoices = self.store.list_invoices(&scope, &range).await?;
                let assignments = self.store.case_lawyers(&scope).await?;
                Ok(SectionData::Team(team_summary(
                    &cases,
                    &entries,
                    &invoices,
                    &assignments,
                )))
            }
        }
    }

    /// Event query window: the reporting period stretched to cover the
    /// upcoming-deadline horizon, which is anchored at `today` even when the
    /// period lies entirely in the future or the past.
    fn event_window(&self, range: &PeriodRange, today: NaiveDate) -> PeriodRange {
        let horizon = PeriodRange {
            start: today,
            end: today + Duration::days(self.config.upcoming_horizon_days),
        };
        range.union(&horizon)
    }
}

fn case_stats(cases: &[CaseRecord]) -> CaseStatsSummary {
    let open = cases
        .iter()
        .filter(|case| case.status == CaseStatus::Open)
        .count();
    let pending = cases
        .iter()
        .filter(|case| case.status == CaseStatus::Pending)
        .count();
    let closed = cases
        .iter()
        .filter(|case| case.status == CaseStatus::Closed)
        .count();

    let mut by_month: BTreeMap<String, usize> = BTreeMap::new();
    for case in cases {
        *by_month
            .entry(month_key(case.opened_at.date_naive()))
            .or_default() += 1;
    }

    CaseStatsSummary {
        total: cases.len(),
        open,
        pending,
        closed,
        by_month: by_month
            .into_iter()
            .map(|(period, count)| MonthlyCount { period, count })
            .collect(),
    }
}

fn financial(invoices: &[InvoiceRecord], top_client_limit: usize) -> FinancialSummary {
    let paid_total = invoices
        .iter()
        .filter(|invoice| invoice.paid)
        .fold(Decimal::ZERO, |acc, invoice| acc + invoice.total);
    let pending_total = invoices
        .iter()
        .filter(|invoice| !invoice.paid)
        .fold(Decimal::ZERO, |acc, invoice| acc + invoice.total);
    let paid_count = invoices.iter().filter(|invoice| invoice.paid).count();
    let unpaid_count = invoices.len() - paid_count;

    let mut monthly: BTreeMap<String, (Decimal, Decimal)> = BTreeMap::new();
    for invoice in invoices {
        let bucket = monthly
            .entry(month_key(invoice.issued_at.date_naive()))
            .or_default();
        if invoice.paid {
            bucket.0 += invoice.total;
        } else {
            bucket.1 += invoice.total;
        }
    }
    let revenue_by_month = monthly
        .into_iter()
        .map(|(period, (paid, pending))| MonthlyRevenue::new(period, paid, pending))
        .collect();

    let mut by_client: BTreeMap<Uuid, Decimal> = BTreeMap::new();
    for invoice in invoices.iter().filter(|invoice| invoice.paid) {
        *by_client.entry(invoice.client_id).or_default() += invoice.total;
    }
    let mut top_clients: Vec<ClientRevenue> = by_client
        .into_iter()
        .map(|(client_id, revenue)| ClientRevenue::new(client_id, revenue))
        .collect();
    top_clients.sort_by(|a, b| {
        b.revenue
            .cmp(&a.revenue)
            .then_with(|| a.client_id.cmp(&b.client_id))
    });
    top_clients.truncate(top_client_limit);

    FinancialSummary::from_totals(
        paid_total,
        pending_total,
        paid_count,
        unpaid_count,
        revenue_by_month,
        top_clients,
    )
}

fn productivity(entries: &[TimeEntryRecord], cases: &[CaseRecord]) -> ProductivitySummary {
    let total_hours = entries
        .iter()
        .fold(Decimal::ZERO, |acc, entry| acc + entry.hours);

    let mut weekly: BTreeMap<String, Decimal> = BTreeMap::new();
    for entry in entries {
        *weekly.entry(week_key(entry.entry_date)).or_default() += entry.hours;
    }
    let weekly_hours = weekly
        .into_iter()
        .map(|(week, hours)| WeeklyHours::new(week, hours))
        .collect();

    let cases_with_entries: BTreeSet<Uuid> = entries.iter().map(|entry| entry.case_id).collect();
    let cases_closed = cases
        .iter()
        .filter(|case| case.status == CaseStatus::Closed)
        .count();

    ProductivitySummary::from_totals(
        total_hours,
        cases_with_entries.len(),
        weekly_hours,
        cases_closed,
        cases.len(),
    )
}

fn deadlines(
    events: &[CalendarEventRecord],
    today: NaiveDate,
    range: &PeriodRange,
    config: &DashboardConfig,
) -> DeadlineSummary {
    let mut overdue_count = 0usize;
    let mut upcoming: Vec<&CalendarEventRecord> = Vec::new();

    for event in events.iter().filter(|event| event.kind.is_deadline()) {
        let due = event.due_at.date_naive();
        if due < today {
            // The period bounds how far back missed deadlines still count.
            if due >= range.start {
                overdue_count += 1;
            }
        } else if (due - today).num_days() <= config.upcoming_horizon_days {
            upcoming.push(event);
        }
    }

    let upcoming_total = upcoming.len();
    let next_7_days = upcoming
        .iter()
        .filter(|event| (event.due_at.date_naive() - today).num_days() <= 7)
        .count();

    upcoming.sort_by(|a, b| a.due_at.cmp(&b.due_at).then_with(|| a.id.cmp(&b.id)));
    upcoming.truncate(config.deadline_list_limit);
    let upcoming = upcoming
        .into_iter()
        .map(|event| UpcomingDeadline::from_event(event, today))
        .collect();

    DeadlineSummary::from_counts(upcoming, overdue_count, upcoming_total, next_7_days)
}

fn document_summary(documents: &[DocumentRecord], recent_limit: usize) -> DocumentSummary {
    let mut by_type: BTreeMap<DocumentType, usize> = BTreeMap::new();
    let mut by_status: BTreeMap<DocumentStatus, usize> = BTreeMap::new();
    for document in documents {
        *by_type.entry(document.doc_type).or_default() += 1;
        *by_status.entry(document.status).or_default() += 1;
    }

    let mut recent: Vec<&DocumentRecord> = documents.iter().collect();
    recent.sort_by(|a, b| {
        b.uploaded_at
            .cmp(&a.uploaded_at)
            .then_with(|| a.id.cmp(&b.id))
    });
    recent.truncate(recent_limit);

    DocumentSummary {
        total: documents.len(),
        by_type: by_type
            .into_iter()
            .map(|(doc_type, count)| TypeCount { doc_type, count })
            .collect(),
        by_status: by_status
            .into_iter()
            .map(|(status, count)| StatusCount { status, count })
            .collect(),
        recent: recent
            .into_iter()
            .map(RecentDocument::from_record)
            .collect(),
    }
}

#[derive(Default)]
struct LawyerAcc {
    cases: usize,
    closed: usize,
    hours: Decimal,
    revenue: Decimal,
}

fn team_summary(
    cases: &[CaseRecord],
    entries: &[TimeEntryRecord],
    invoices: &[InvoiceRecord],
    assignments: &HashMap<Uuid, Uuid>,
) -> TeamSummary {
    let mut by_lawyer: BTreeMap<Uuid, LawyerAcc> = BTreeMap::new();

    for case in cases {
        if let Some(lawyer_id) = case.lawyer_id {
            let acc = by_lawyer.entry(lawyer_id).or_default();
            acc.cases += 1;
            if case.status == CaseStatus::Closed {
                acc.closed += 1;
            }
        }
    }

    for entry in entries {
        by_lawyer.entry(entry.lawyer_id).or_default().hours += entry.hours;
    }

    // Paid revenue lands on the lawyer assigned to the invoice's case, which
    // may have been opened before the reporting period.
    for invoice in invoices.iter().filter(|invoice| invoice.paid) {
        if let Some(lawyer_id) = assignments.get(&invoice.case_id) {
            by_lawyer.entry(*lawyer_id).or_default().revenue += invoice.total;
        }
    }

    let mut per_lawyer: Vec<LawyerPerformance> = by_lawyer
        .into_iter()
        .map(|(lawyer_id, acc)| {
            LawyerPerformance::from_counts(lawyer_id, acc.cases, acc.closed, acc.hours, acc.revenue)
        })
        .collect();
    per_lawyer.sort_by(|a, b| {
        b.efficiency
            .total_cmp(&a.efficiency)
            .then_with(|| a.lawyer_id.cmp(&b.lawyer_id))
    });

    TeamSummary { per_lawyer }
}
