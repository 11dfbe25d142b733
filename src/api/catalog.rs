//! Catalog API endpoints.

use axum::extract::State;

use super::{success, ApiResult};
use crate::models::{Faculty, School};
use crate::AppState;

/// GET /api/faculties
pub async fn list_faculties(State(state): State<AppState>) -> ApiResult<Vec<Faculty>> {
    let faculties = state.repo.list_faculties().await?;
    success(faculties)
}

/// GET /api/schools
pub async fn list_schools(State(state): State<AppState>) -> ApiResult<Vec<School>> {
    let schools = state.repo.list_schools().await?;
    success(schools)
}
