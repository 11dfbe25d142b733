//! Backup API endpoints: snapshot trigger and listing.

use axum::extract::State;

use super::{success, ApiResult};
use crate::backup::BackupSnapshot;
use crate::AppState;

/// POST /api/backups - Trigger a snapshot of the current database.
///
/// Returns the new snapshot's file name, or null when there is no database
/// file to snapshot yet.
pub async fn create_backup(State(state): State<AppState>) -> ApiResult<Option<String>> {
    let created = state.backup.create_snapshot(state.repo.pool()).await?;
    success(created.and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned())))
}

/// GET /api/backups - List snapshots, newest first.
pub async fn list_backups(State(state): State<AppState>) -> ApiResult<Vec<BackupSnapshot>> {
    let snapshots = state.backup.list_snapshots()?;
    success(snapshots)
}
