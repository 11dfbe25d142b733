//! Append-only audit trail for student-record mutations.
//!
//! Entries are created exclusively as a side effect of student mutations and
//! are never updated or deleted.

use chrono::Utc;
use sqlx::Row;

use super::Repository;
use crate::errors::AppError;
use crate::models::{AuditLogEntry, AuditOp};

/// Fallback actor identity for audited operations when the caller supplies no
/// valid acting-user id. Matches the seeded bootstrap admin's row id.
pub const SENTINEL_USER_ID: i64 = 1;

async fn insert_entry<'e, E>(
    executor: E,
    student_id: &str,
    op: AuditOp,
    description: &str,
    user_id: Option<i64>,
) -> Result<(), sqlx::Error>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    // Anything that is not a positive integer falls back to the sentinel admin.
    let actor = user_id.filter(|id| *id > 0).unwrap_or(SENTINEL_USER_ID);

    sqlx::query(
        "INSERT INTO student_audit_log \
         (student_id, operation_type, description, changed_by_user_id, changed_at) \
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(student_id)
    .bind(op.as_str())
    .bind(description)
    .bind(actor)
    .bind(Utc::now().to_rfc3339())
    .execute(executor)
    .await?;

    Ok(())
}

impl Repository {
    /// Best-effort audit append: a failure to record the entry is logged for
    /// operator visibility but never propagates to the calling mutation.
    pub(crate) async fn append_audit(
        &self,
        student_id: &str,
        op: AuditOp,
        description: &str,
        user_id: Option<i64>,
    ) {
        if let Err(err) = insert_entry(&self.pool, student_id, op, description, user_id).await {
            tracing::error!(
                "Audit entry not recorded (op {}, student {}): {}",
                op,
                student_id,
                err
            );
        }
    }

    /// Transactional audit append for mutations that pair the entry and the
    /// row change atomically (the delete path).
    pub(crate) async fn append_audit_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        student_id: &str,
        op: AuditOp,
        description: &str,
        user_id: Option<i64>,
    ) -> Result<(), AppError> {
        insert_entry(&mut **tx, student_id, op, description, user_id).await?;
        Ok(())
    }

    /// List all audit entries, newest first, joined with the acting user's
    /// identity. An entry whose user no longer resolves still appears with
    /// null email/name.
    pub async fn list_audit_logs(&self) -> Result<Vec<AuditLogEntry>, AppError> {
        let rows = sqlx::query(
            r#"SELECT sal.log_id, sal.student_id, sal.operation_type, sal.description,
                      sal.changed_by_user_id, sal.changed_at,
                      u.email AS changed_by_email, u.full_name AS changed_by_name
               FROM student_audit_log sal
               LEFT JOIN users u ON sal.changed_by_user_id = u.id
               ORDER BY sal.changed_at DESC, sal.log_id DESC"#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| AuditLogEntry {
                log_id: row.get("log_id"),
                student_id: row.get("student_id"),
                operation_type: row.get("operation_type"),
                description: row.get("description"),
                changed_by_user_id: row.get("changed_by_user_id"),
                changed_at: row.get("changed_at"),
                changed_by_email: row.get("changed_by_email"),
                changed_by_name: row.get("changed_by_name"),
            })
            .collect())
    }
}
