//! Student record model.

use serde::{Deserialize, Serialize};

/// A student on the roster. `email` and `number` are plaintext here; they are
/// encrypted on the way into storage and decrypted on the way out.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    /// Derived from the code as `stu-<code>`; stable for the record's lifetime.
    pub id: String,
    pub code: String,
    pub full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub faculty: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub school: Option<String>,
    /// Weekday indices 0-6 the student is expected to attend.
    pub selected_days: Vec<u8>,
    pub status: String,
    pub created_at: String,
}

/// Request body for adding a student.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStudentRequest {
    pub code: String,
    pub full_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub faculty: Option<String>,
    #[serde(default)]
    pub school: Option<String>,
    #[serde(default)]
    pub selected_days: Vec<u8>,
    /// Acting user for the audit trail; the sentinel admin id is used when absent.
    #[serde(default)]
    pub user_id: Option<i64>,
}

/// Request body for updating a student. All mutable columns are overwritten.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStudentRequest {
    pub code: String,
    pub full_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub faculty: Option<String>,
    #[serde(default)]
    pub school: Option<String>,
    #[serde(default)]
    pub selected_days: Vec<u8>,
    #[serde(default)]
    pub user_id: Option<i64>,
}
