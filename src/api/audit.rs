//! Audit log API endpoints.

use axum::extract::State;

use super::{success, ApiResult};
use crate::models::AuditLogEntry;
use crate::AppState;

/// GET /api/audit/logs - All student audit entries, newest first, joined with
/// the acting user's identity.
pub async fn list_audit_logs(State(state): State<AppState>) -> ApiResult<Vec<AuditLogEntry>> {
    let logs = state.repo.list_audit_logs().await?;
    success(logs)
}
