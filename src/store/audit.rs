use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::sku::FieldName;

/// The user actions the audit log records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    FieldLock,
    FieldUnlock,
    ConflictResolve,
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AuditAction::FieldLock => "field_lock",
            AuditAction::FieldUnlock => "field_unlock",
            AuditAction::ConflictResolve => "conflict_resolve",
        };
        f.write_str(s)
    }
}

/// Immutable record of one user action. Appended to the audit log in
/// call order, never rewritten.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: String,
    pub action: AuditAction,
    pub field: FieldName,
    pub before: String,
    pub after: String,
    pub user: String,
    pub job_id: String,
    pub at: DateTime<Utc>,
}

impl AuditEntry {
    pub fn new(
        action: AuditAction,
        field: FieldName,
        before: impl Into<String>,
        after: impl Into<String>,
        user: impl Into<String>,
        job_id: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            action,
            field,
            before: before.into(),
            after: after.into(),
            user: user.into(),
            job_id: job_id.into(),
            at: Utc::now(),
        }
    }
}
