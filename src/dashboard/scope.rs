//! Role-based visibility.
//!
//! A role never reaches a metric function directly: it is resolved exactly
//! once into a [`CaseScope`], and every query and reduction consumes the
//! scope. Visibility is case-centric, so invoices, time entries, events,
//! and documents inherit the visibility of the case they belong to.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::CaseRecord;

/// Caller role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Lawyer,
    Paralegal,
    Client,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Lawyer => "lawyer",
            Self::Paralegal => "paralegal",
            Self::Client => "client",
        }
    }

    pub fn from_db_value(value: &str) -> Option<Self> {
        match value {
            "admin" => Some(Self::Admin),
            "lawyer" => Some(Self::Lawyer),
            "paralegal" => Some(Self::Paralegal),
            "client" => Some(Self::Client),
            _ => None,
        }
    }

    /// Only administrators see the team section.
    pub fn can_view_team(self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Query scope derived from a role and actor identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseScope {
    /// Unrestricted firm-wide visibility.
    Firm,
    /// Cases assigned to the given lawyer.
    AssignedLawyer(Uuid),
    /// Cases the given paralegal is staffed on.
    StaffMember(Uuid),
    /// Cases belonging to the given client.
    Client(Uuid),
}

impl CaseScope {
    /// The one place role visibility rules live.
    pub fn for_role(role: Role, actor_id: Uuid) -> Self {
        match role {
            Role::Admin => Self::Firm,
            Role::Lawyer => Self::AssignedLawyer(actor_id),
            Role::Paralegal => Self::StaffMember(actor_id),
            Role::Client => Self::Client(actor_id),
        }
    }

    /// Whether a case is visible under this scope. The in-process backend
    /// filters with this predicate; the PostgreSQL backend translates the
    /// same rules into WHERE clauses.
    pub fn permits(&self, case: &CaseRecord) -> bool {
        match self {
            Self::Firm => true,
            Self::AssignedLawyer(lawyer_id) => case.lawyer_id == Some(*lawyer_id),
            Self::StaffMember(member_id) => case.staff.contains(member_id),
            Self::Client(client_id) => case.client_id == *client_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::db::CaseStatus;

    fn case(lawyer_id: Option<Uuid>, staff: Vec<Uuid>, client_id: Uuid) -> CaseRecord {
        CaseRecord {
            id: Uuid::new_v4(),
            title: "Estate of Byrne".to_string(),
            status: CaseStatus::Open,
            lawyer_id,
            staff,
            client_id,
            opened_at: Utc::now(),
            closed_at: None,
        }
    }

    #[test]
    fn each_role_maps_to_its_scope() {
        let actor = Uuid::new_v4();
        assert_eq!(CaseScope::for_role(Role::Admin, actor), CaseScope::Firm);
        assert_eq!(
            CaseScope::for_role(Role::Lawyer, actor),
            CaseScope::AssignedLawyer(actor)
        );
        assert_eq!(
            CaseScope::for_role(Role::Paralegal, actor),
            CaseScope::StaffMember(actor)
        );
        assert_eq!(
            CaseScope::for_role(Role::Client, actor),
            CaseScope::Client(actor)
        );
    }

    #[test]
    fn assigned_lawyer_scope_requires_exact_assignment() {
        let lawyer = Uuid::new_v4();
        let other = Uuid::new_v4();
        let client = Uuid::new_v4();
        let scope = CaseScope::AssignedLawyer(lawyer);

        assert!(scope.permits(&case(Some(lawyer), Vec::new(), client)));
        assert!(!scope.permits(&case(Some(other), Vec::new(), client)));
        assert!(!scope.permits(&case(None, Vec::new(), client)));
    }

    #[test]
    fn staff_scope_matches_staffing_list_membership() {
        let paralegal = Uuid::new_v4();
        let client = Uuid::new_v4();
        let scope = CaseScope::StaffMember(paralegal);

        assert!(scope.permits(&case(None, vec![Uuid::new_v4(), paralegal], client)));
        assert!(!scope.permits(&case(Some(paralegal), Vec::new(), client)));
    }

    #[test]
    fn client_scope_matches_owning_client_only() {
        let client = Uuid::new_v4();
        let scope = CaseScope::Client(client);

        assert!(scope.permits(&case(None, Vec::new(), client)));
        assert!(!scope.permits(&case(None, Vec::new(), Uuid::new_v4())));
    }

    #[test]
    fn firm_scope_permits_everything() {
        assert!(CaseScope::Firm.permits(&case(None, Vec::new(), Uuid::new_v4())));
    }
}
