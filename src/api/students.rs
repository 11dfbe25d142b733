//! Student API endpoints.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::models::{CreateStudentRequest, Student, UpdateStudentRequest};
use crate::AppState;

/// Query parameters for audited operations without a request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActingUser {
    #[serde(default)]
    pub user_id: Option<i64>,
}

/// GET /api/students - List all students (sensitive fields decrypted).
pub async fn list_students(State(state): State<AppState>) -> ApiResult<Vec<Student>> {
    let students = state.repo.list_students().await?;
    success(students)
}

/// GET /api/students/code/:code - Look up a student by external code.
pub async fn get_student_by_code(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> ApiResult<Student> {
    match state.repo.get_student_by_code(&code).await? {
        Some(student) => success(student),
        None => Err(AppError::NotFound(format!(
            "Student with code {} not found",
            code
        ))),
    }
}

/// POST /api/students - Add a student.
pub async fn create_student(
    State(state): State<AppState>,
    Json(request): Json<CreateStudentRequest>,
) -> ApiResult<Student> {
    let student = state.repo.add_student(&request).await?;
    success(student)
}

/// PUT /api/students/:id - Overwrite a student's mutable fields.
pub async fn update_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateStudentRequest>,
) -> ApiResult<()> {
    state.repo.update_student(&id, &request).await?;
    success(())
}

/// DELETE /api/students/:id - Delete a student.
pub async fn delete_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(acting): Query<ActingUser>,
) -> ApiResult<()> {
    state.repo.delete_student(&id, acting.user_id).await?;
    success(())
}
