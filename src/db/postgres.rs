//! PostgreSQL store backend.
//!
//! One query per entity per call, pooled through `deadpool-postgres`. Scope
//! filtering is pushed into SQL: linked entities join through `cases` and
//! apply the scope predicate on the case row, so the visible set matches the
//! in-memory backend exactly. Period filters compare the entity's own date
//! column against inclusive `DATE` bounds.

use std::collections::HashMap;

use async_trait::async_trait;
use deadpool_postgres::{Config, ManagerConfig, Object, Pool, PoolConfig, RecyclingMethod, Runtime};
use secrecy::ExposeSecret;
use tokio_postgres::{NoTls, Row};
use uuid::Uuid;

use crate::config::DatabaseConfig;
use crate::dashboard::period::PeriodRange;
use crate::dashboard::scope::CaseScope;
use crate::db::{
    CalendarEventRecord, CaseRecord, CaseStatus, CaseStore, DashboardStore, DocumentRecord,
    DocumentStatus, DocumentStore, DocumentType, EventKind, EventPriority, EventStore,
    InvoiceRecord, InvoiceStore, TimeEntryRecord, TimeEntryStore,
};
use crate::error::StoreError;

/// PostgreSQL-backed [`DashboardStore`].
pub struct PgBackend {
    pool: Pool,
}

impl PgBackend {
    /// Build the pool and verify it can hand out a connection.
    pub async fn new(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let mut cfg = Config::new();
        cfg.host = Some(config.host.clone());
        cfg.port = Some(config.port);
        cfg.user = Some(config.user.clone());
        cfg.password = config
            .password
            .as_ref()
            .map(|secret| secret.expose_secret().to_string());
        cfg.dbname = Some(config.dbname.clone());
        cfg.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        });
        cfg.pool = Some(PoolConfig::new(config.pool_size));

        let pool = cfg
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| StoreError::Pool(e.to_string()))?;

        let backend = Self { pool };
        backend.conn().await?;
        tracing::info!(
            "Connected to PostgreSQL at {}:{}/{}",
            config.host,
            config.port,
            config.dbname
        );
        Ok(backend)
    }

    /// Clone of the connection pool, for callers that need raw access.
    pub fn pool(&self) -> Pool {
        self.pool.clone()
    }

    async fn conn(&self) -> Result<Object, StoreError> {
        Ok(self.pool.get().await?)
    }
}

/// Scope condition appended to a query's `WHERE` clause.
///
/// `alias` names the `cases` relation in the surrounding query and `idx` is
/// the placeholder position for the actor parameter. The firm scope needs no
/// condition and no parameter.
fn scope_predicate(scope: &CaseScope, alias: &str, idx: usize) -> (String, Option<Uuid>) {
    match scope {
        CaseScope::Firm => (String::new(), None),
        CaseScope::AssignedLawyer(lawyer_id) => {
            (format!(" AND {alias}.lawyer_id = ${idx}"), Some(*lawyer_id))
        }
        CaseScope::StaffMember(staff_id) => {
            (format!(" AND ${idx} = ANY({alias}.staff)"), Some(*staff_id))
        }
        CaseScope::Client(client_id) => {
            (format!(" AND {alias}.client_id = ${idx}"), Some(*client_id))
        }
    }
}

fn row_to_case_record(row: &Row) -> Result<CaseRecord, StoreError> {
    let status_raw: String = row.get("status");
    let status = CaseStatus::from_db_value(&status_raw)
        .ok_or_else(|| StoreError::Serialization(format!("invalid case status '{status_raw}'")))?;
    Ok(CaseRecord {
        id: row.get("id"),
        title: row.get("title"),
        status,
        lawyer_id: row.get("lawyer_id"),
        staff: row.get("staff"),
        client_id: row.get("client_id"),
        opened_at: row.get("opened_at"),
        closed_at: row.get("closed_at"),
    })
}

fn row_to_invoice_record(row: &Row) -> Result<InvoiceRecord, StoreError> {
    Ok(InvoiceRecord {
        id: row.get("id"),
        case_id: row.get("case_id"),
        client_id: row.get("client_id"),
        total: row.get("total"),
        paid: row.get("paid"),
        issued_at: row.get("issued_at"),
    })
}

fn row_to_time_entry_record(row: &Row) -> Result<TimeEntryRecord, StoreError> {
    Ok(TimeEntryRecord {
        id: row.get("id"),
        case_id: row.get("case_id"),
        lawyer_id: row.get("lawyer_id"),
        hours: row.get("hours"),
        entry_date: row.get("entry_date"),
    })
}

fn row_to_event_record(row: &Row) -> Result<CalendarEventRecord, StoreError> {
    let kind_raw: String = row.get("kind");
    let kind = EventKind::from_db_value(&kind_raw)
        .ok_or_else(|| StoreError::Serialization(format!("invalid event kind '{kind_raw}'")))?;
    let priority_raw: String = row.get("priority");
    let priority = EventPriority::from_db_value(&priority_raw).ok_or_else(|| {
        StoreError::Serialization(format!("invalid event priority '{priority_raw}'"))
    })?;
    Ok(CalendarEventRecord {
        id: row.get("id"),
        case_id: row.get("case_id"),
        title: row.get("title"),
        kind,
        due_at: row.get("due_at"),
        priority,
    })
}

fn row_to_document_record(row: &Row) -> Result<DocumentRecord, StoreError> {
    let type_raw: String = row.get("doc_type");
    let doc_type = DocumentType::from_db_value(&type_raw)
        .ok_or_else(|| StoreError::Serialization(format!("invalid document type '{type_raw}'")))?;
    let status_raw: String = row.get("status");
    let status = DocumentStatus::from_db_value(&status_raw).ok_or_else(|| {
        StoreError::Serialization(format!("invalid document status '{status_raw}'"))
    })?;
    Ok(DocumentRecord {
        id: row.get("id"),
        case_id: row.get("case_id"),
        title: row.get("title"),
        doc_type,
        status,
        uploaded_at: row.get("uploaded_at"),
    })
}

#[async_trait]
impl CaseStore for PgBackend {
    async fn list_cases(
        &self,
        scope: &CaseScope,
        range: &PeriodRange,
    ) -> Result<Vec<CaseRecord>, StoreError> {
        let (predicate, actor) = scope_predicate(scope, "cases", 3);
        let query = format!(
            "SELECT id, title, status, lawyer_id, staff, client_id, opened_at, closed_at \
             FROM cases \
             WHERE opened_at::date >= $1 AND opened_at::date <= $2{predicate} \
             ORDER BY opened_at, id"
        );
        let conn = self.conn().await?;
        let rows = match actor {
            Some(actor) => {
                conn.query(&query, &[&range.start, &range.end, &actor])
                    .await?
            }
            None => conn.query(&query, &[&range.start, &range.end]).await?,
        };
        rows.iter().map(row_to_case_record).collect()
    }

    async fn case_lawyers(&self, scope: &CaseScope) -> Result<HashMap<Uuid, Uuid>, StoreError> {
        let (predicate, actor) = scope_predicate(scope, "cases", 1);
        let query = format!(
            "SELECT id, lawyer_id FROM cases WHERE lawyer_id IS NOT NULL{predicate}"
        );
        let conn = self.conn().await?;
        let rows = match actor {
            Some(actor) => conn.query(&query, &[&actor]).await?,
            None => conn.query(&query, &[]).await?,
        };
        Ok(rows
            .iter()
            .map(|row| (row.get("id"), row.get("lawyer_id")))
            .collect())
    }
}

#[async_trait]
impl InvoiceStore for PgBackend {
    async fn list_invoices(
        &self,
        scope: &CaseScope,
        range: &PeriodRange,
    ) -> Result<Vec<InvoiceRecord>, StoreError> {
        let (predicate, actor) = scope_predicate(scope, "c", 3);
        let query = format!(
            "SELECT i.id, i.case_id, i.client_id, i.total, i.paid, i.issued_at \
             FROM invoices i \
             JOIN cases c ON c.id = i.case_id \
             WHERE i.issued_at::date >= $1 AND i.issued_at::date <= $2{predicate} \
             ORDER BY i.issued_at, i.id"
        );
        let conn = self.conn().await?;
        let rows = match actor {
            Some(actor) => {
                conn.query(&query, &[&range.start, &range.end, &actor])
                    .await?
            }
            None => conn.query(&query, &[&range.start, &range.end]).await?,
        };
        rows.iter().map(row_to_invoice_record).collect()
    }
}

#[async_trait]
impl TimeEntryStore for PgBackend {
    async fn list_time_entries(
        &self,
        scope: &CaseScope,
        range: &PeriodRange,
    ) -> Result<Vec<TimeEntryRecord>, StoreError> {
        let (predicate, actor) = scope_predicate(scope, "c", 3);
        let query = format!(
            "SELECT t.id, t.case_id, t.lawyer_id, t.hours, t.entry_date \
             FROM time_entries t \
             JOIN cases c ON c.id = t.case_id \
             WHERE t.entry_date >= $1 AND t.entry_date <= $2{predicate} \
             ORDER BY t.entry_date, t.id"
        );
        let conn = self.conn().await?;
        let rows = match actor {
            Some(actor) => {
                conn.query(&query, &[&range.start, &range.end, &actor])
                    .await?
            }
            None => conn.query(&query, &[&range.start, &range.end]).await?,
        };
        rows.iter().map(row_to_time_entry_record).collect()
    }
}

#[async_trait]
impl EventStore for PgBackend {
    async fn list_events(
        &self,
        scope: &CaseScope,
        range: &PeriodRange,
    ) -> Result<Vec<CalendarEventRecord>, StoreError> {
        let (predicate, actor) = scope_predicate(scope, "c", 3);
        let query = format!(
            "SELECT e.id, e.case_id, e.title, e.kind, e.due_at, e.priority \
             FROM calendar_events e \
             JOIN cases c ON c.id = e.case_id \
             WHERE e.due_at::date >= $1 AND e.due_at::date <= $2{predicate} \
             ORDER BY e.due_at, e.id"
        );
        let conn = self.conn().await?;
        let rows = match actor {
            Some(actor) => {
                conn.query(&query, &[&range.start, &range.end, &actor])
                    .await?
            }
            None => conn.query(&query, &[&range.start, &range.end]).await?,
        };
        rows.iter().map(row_to_event_record).collect()
    }
}

#[async_trait]
impl DocumentStore for PgBackend {
    async fn list_documents(
        &self,
        scope: &CaseScope,
        range: &PeriodRange,
    ) -> Result<Vec<DocumentRecord>, StoreError> {
        let (predicate, actor) = scope_predicate(scope, "c", 3);
        let query = format!(
            "SELECT d.id, d.case_id, d.title, d.doc_type, d.status, d.uploaded_at \
             FROM documents d \
             JOIN cases c ON c.id = d.case_id \
             WHERE d.uploaded_at::date >= $1 AND d.uploaded_at::date <= $2{predicate} \
             ORDER BY d.uploaded_at DESC, d.id"
        );
        let conn = self.conn().await?;
        let rows = match actor {
            Some(actor) => {
                conn.query(&query, &[&range.start, &range.end, &actor])
                    .await?
            }
            None => conn.query(&query, &[&range.start, &range.end]).await?,
        };
        rows.iter().map(row_to_document_record).collect()
    }
}

impl DashboardStore for PgBackend {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn firm_scope_adds_no_predicate() {
        let (predicate, actor) = scope_predicate(&CaseScope::Firm, "c", 3);
        assert!(predicate.is_empty());
        assert!(actor.is_none());
    }

    #[test]
    fn lawyer_scope_filters_on_assignment() {
        let lawyer = Uuid::new_v4();
        let (predicate, actor) = scope_predicate(&CaseScope::AssignedLawyer(lawyer), "c", 3);
        assert_eq!(predicate, " AND c.lawyer_id = $3");
        assert_eq!(actor, Some(lawyer));
    }

    #[test]
    fn staff_scope_uses_array_membership() {
        let staff = Uuid::new_v4();
        let (predicate, actor) = scope_predicate(&CaseScope::StaffMember(staff), "cases", 1);
        assert_eq!(predicate, " AND $1 = ANY(cases.staff)");
        assert_eq!(actor, Some(staff));
    }

    #[test]
    fn client_scope_filters_on_case_client() {
        let client = Uuid::new_v4();
        let (predicate, actor) = scope_predicate(&CaseScope::Client(client), "c", 3);
        assert_eq!(predicate, " AND c.client_id = $3");
        assert_eq!(actor, Some(client));
    }
}
