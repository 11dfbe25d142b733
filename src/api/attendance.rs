//! Attendance API endpoints.

use axum::{extract::State, Json};
use serde::Serialize;

use super::{success, ApiResult};
use crate::models::{AttendanceDay, RecordAttendanceRequest};
use crate::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordAttendanceResponse {
    pub recorded: usize,
}

/// POST /api/attendance - Record a day's attendance as one atomic batch.
pub async fn record_attendance(
    State(state): State<AppState>,
    Json(request): Json<RecordAttendanceRequest>,
) -> ApiResult<RecordAttendanceResponse> {
    let recorded = state.repo.record_attendance(&request).await?;
    success(RecordAttendanceResponse { recorded })
}

/// GET /api/attendance/history - Attendance grouped by date, newest first.
pub async fn attendance_history(State(state): State<AppState>) -> ApiResult<Vec<AttendanceDay>> {
    let history = state.repo.list_attendance_history().await?;
    success(history)
}
