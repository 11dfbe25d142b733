//! Attendance models: batch recording input and the grouped history view.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One student's mark inside a batch. `full_name` and `code` are denormalized
/// into the attendance row so history rendering needs no join.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceEntry {
    pub student_id: String,
    /// presente | ausente | tardanza (normalized to lowercase before storage).
    pub status: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
}

/// Request body for recording a day's attendance as one all-or-nothing batch.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordAttendanceRequest {
    /// YYYY-MM-DD
    pub date: String,
    #[serde(default)]
    pub students: Vec<AttendanceEntry>,
    #[serde(default)]
    pub user_id: Option<i64>,
}

/// A single stored attendance record as rendered in the history view.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentAttendance {
    pub student_id: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub created_at: String,
}

/// All attendance for one date, with per-status totals and records indexed by
/// student id.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceDay {
    /// The date doubles as the history row id.
    pub id: String,
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_of_week: Option<String>,
    pub records: BTreeMap<String, StudentAttendance>,
    pub total_present: i64,
    pub total_absent: i64,
    pub total_late: i64,
    pub created_at: String,
}
