//! Audit trail models.

use serde::Serialize;

/// Mutation kinds recorded in the student audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditOp {
    Insert,
    Update,
    Delete,
}

impl AuditOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditOp::Insert => "INSERT",
            AuditOp::Update => "UPDATE",
            AuditOp::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for AuditOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One append-only audit entry, joined with the acting user's identity.
/// `changed_by_email`/`changed_by_name` are null when the user no longer resolves.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogEntry {
    pub log_id: i64,
    pub student_id: String,
    pub operation_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub changed_by_user_id: i64,
    pub changed_at: String,
    pub changed_by_email: Option<String>,
    pub changed_by_name: Option<String>,
}
