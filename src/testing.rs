//! Test fixtures shared by unit and integration tests.
//!
//! Constructors here take only the fields a scenario cares about and fill the
//! rest with neutral defaults. They panic on out-of-range calendar input,
//! which is acceptable in test code only.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::db::{
    CalendarEventRecord, CaseRecord, CaseStatus, DocumentRecord, DocumentStatus, DocumentType,
    EventKind, EventPriority, InvoiceRecord, TimeEntryRecord,
};

/// Install a fmt subscriber for test runs. Safe to call from every test;
/// only the first call wins.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid fixture date")
}

pub fn utc(year: i32, month: u32, day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, 0, 0)
        .single()
        .expect("valid fixture timestamp")
}

pub fn new_case(
    client_id: Uuid,
    lawyer_id: Option<Uuid>,
    status: CaseStatus,
    opened_at: DateTime<Utc>,
) -> CaseRecord {
    CaseRecord {
        id: Uuid::new_v4(),
        title: "Test matter".to_string(),
        status,
        lawyer_id,
        staff: Vec::new(),
        client_id,
        opened_at,
        closed_at: None,
    }
}

pub fn new_invoice(
    case_id: Uuid,
    client_id: Uuid,
    total: Decimal,
    paid: bool,
    issued_at: DateTime<Utc>,
) -> InvoiceRecord {
    InvoiceRecord {
        id: Uuid::new_v4(),
        case_id,
        client_id,
        total,
        paid,
        issued_at,
    }
}

pub fn new_time_entry(
    case_id: Uuid,
    lawyer_id: Uuid,
    hours: Decimal,
    entry_date: NaiveDate,
) -> TimeEntryRecord {
    TimeEntryRecord {
        id: Uuid::new_v4(),
        case_id,
        lawyer_id,
        hours,
        entry_date,
    }
}

pub fn new_deadline(
    case_id: Uuid,
    title: &str,
    due_at: DateTime<Utc>,
    priority: EventPriority,
) -> CalendarEventRecord {
    CalendarEventRecord {
        id: Uuid::new_v4(),
        case_id,
        title: title.to_string(),
        kind: EventKind::Deadline,
        due_at,
        priority,
    }
}

pub fn new_event(case_id: Uuid, kind: EventKind, due_at: DateTime<Utc>) -> CalendarEventRecord {
    CalendarEventRecord {
        id: Uuid::new_v4(),
        case_id,
        title: "Test event".to_string(),
        kind,
        due_at,
        priority: EventPriority::Medium,
    }
}

pub fn new_document(
    case_id: Uuid,
    doc_type: DocumentType,
    status: DocumentStatus,
    uploaded_at: DateTime<Utc>,
) -> DocumentRecord {
    DocumentRecord {
        id: Uuid::new_v4(),
        case_id,
        title: "Test document".to_string(),
        doc_type,
        status,
        uploaded_at,
    }
}
