//! In-process store backend.
//!
//! Keeps all five entity tables as plain vectors behind one `RwLock`. Used by
//! the test suite and by embedded deployments that load their rows at startup.
//! Scoping rules are identical to the PostgreSQL backend: a row is visible
//! when its case is visible, and the period filter applies to the entity's
//! own date column.

use std::collections::{HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard};

use async_trait::async_trait;
use uuid::Uuid;

use crate::dashboard::period::PeriodRange;
use crate::dashboard::scope::CaseScope;
use crate::db::{
    CalendarEventRecord, CaseRecord, CaseStore, DashboardStore, DocumentRecord, DocumentStore,
    EventStore, InvoiceRecord, InvoiceStore, TimeEntryRecord, TimeEntryStore,
};
use crate::error::StoreError;

#[derive(Default)]
struct Tables {
    cases: Vec<CaseRecord>,
    invoices: Vec<InvoiceRecord>,
    time_entries: Vec<TimeEntryRecord>,
    events: Vec<CalendarEventRecord>,
    documents: Vec<DocumentRecord>,
}

/// Vector-backed [`DashboardStore`].
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn update<F>(&self, apply: F)
    where
        F: FnOnce(&mut Tables),
    {
        match self.inner.write() {
            Ok(mut tables) => apply(&mut tables),
            Err(e) => tracing::warn!("Memory store write lock poisoned: {}", e),
        }
    }

    pub fn add_case(&self, case: CaseRecord) {
        self.update(|tables| tables.cases.push(case));
    }

    pub fn add_invoice(&self, invoice: InvoiceRecord) {
        self.update(|tables| tables.invoices.push(invoice));
    }

    pub fn add_time_entry(&self, entry: TimeEntryRecord) {
        self.update(|tables| tables.time_entries.push(entry));
    }

    pub fn add_event(&self, event: CalendarEventRecord) {
        self.update(|tables| tables.events.push(event));
    }

    pub fn add_document(&self, document: DocumentRecord) {
        self.update(|tables| tables.documents.push(document));
    }

    fn tables(&self) -> Result<RwLockReadGuard<'_, Tables>, StoreError> {
        self.inner
            .read()
            .map_err(|_| StoreError::Pool("memory store lock poisoned".to_string()))
    }
}

/// Identifiers of the cases the scope may see, ignoring any period filter.
fn visible_case_ids(tables: &Tables, scope: &CaseScope) -> HashSet<Uuid> {
    tables
        .cases
        .iter()
        .filter(|case| scope.permits(case))
        .map(|case| case.id)
        .collect()
}

#[async_trait]
impl CaseStore for MemoryStore {
    async fn list_cases(
        &self,
        scope: &CaseScope,
        range: &PeriodRange,
    ) -> Result<Vec<CaseRecord>, StoreError> {
        let tables = self.tables()?;
        Ok(tables
            .cases
            .iter()
            .filter(|case| scope.permits(case) && range.contains(case.opened_at.date_naive()))
            .cloned()
            .collect())
    }

    async fn case_lawyers(&self, scope: &CaseScope) -> Result<HashMap<Uuid, Uuid>, StoreError> {
        let tables = self.tables()?;
        Ok(tables
            .cases
            .iter()
            .filter(|case| scope.permits(case))
            .filter_map(|case| case.lawyer_id.map(|lawyer_id| (case.id, lawyer_id)))
            .collect())
    }
}

#[async_trait]
impl InvoiceStore for MemoryStore {
    async fn list_invoices(
        &self,
        scope: &CaseScope,
        range: &PeriodRange,
    ) -> Result<Vec<InvoiceRecord>, StoreError> {
        let tables = self.tables()?;
        let visible = visible_case_ids(&tables, scope);
        Ok(tables
            .invoices
            .iter()
            .filter(|invoice| {
                visible.contains(&invoice.case_id)
                    && range.contains(invoice.issued_at.date_naive())
            })
            .cloned()
            .collect())
    }
}

#[async_trait]
impl TimeEntryStore for MemoryStore {
    async fn list_time_entries(
        &self,
        scope: &CaseScope,
        range: &PeriodRange,
    ) -> Result<Vec<TimeEntryRecord>, StoreError> {
        let tables = self.tables()?;
        let visible = visible_case_ids(&tables, scope);
        Ok(tables
            .time_entries
            .iter()
            .filter(|entry| visible.contains(&entry.case_id) && range.contains(entry.entry_date))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn list_events(
        &self,
        scope: &CaseScope,
        range: &PeriodRange,
    ) -> Result<Vec<CalendarEventRecord>, StoreError> {
        let tables = self.tables()?;
        let visible = visible_case_ids(&tables, scope);
        Ok(tables
            .events
            .iter()
            .filter(|event| {
                visible.contains(&event.case_id) && range.contains(event.due_at.date_naive())
            })
            .cloned()
            .collect())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn list_documents(
        &self,
        scope: &CaseScope,
        range: &PeriodRange,
    ) -> Result<Vec<DocumentRecord>, StoreError> {
        let tables = self.tables()?;
        let visible = visible_case_ids(&tables, scope);
        Ok(tables
            .documents
            .iter()
            .filter(|document| {
                visible.contains(&document.case_id)
                    && range.contains(document.uploaded_at.date_naive())
            })
            .cloned()
            .collect())
    }
}

impl DashboardStore for MemoryStore {}
