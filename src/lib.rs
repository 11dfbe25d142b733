//! Asistencia Backend
//!
//! REST backend for a student attendance roster with SQLite persistence.
//! Sensitive student fields are encrypted at rest, every record mutation is
//! traced in an append-only audit log, and timestamped snapshots of the
//! database file guard against loss of the store.

pub mod api;
pub mod backup;
pub mod config;
pub mod crypto;
pub mod db;
pub mod errors;
pub mod models;

use std::sync::Arc;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use backup::BackupManager;
use config::Config;
use db::Repository;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub backup: Arc<BackupManager>,
    pub config: Arc<Config>,
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Students
        .route("/students", get(api::list_students))
        .route("/students", post(api::create_student))
        .route("/students/{id}", put(api::update_student))
        .route("/students/{id}", delete(api::delete_student))
        .route("/students/code/{code}", get(api::get_student_by_code))
        // Attendance
        .route("/attendance", post(api::record_attendance))
        .route("/attendance/history", get(api::attendance_history))
        // Audit trail
        .route("/audit/logs", get(api::list_audit_logs))
        // Catalogs
        .route("/faculties", get(api::list_faculties))
        .route("/schools", get(api::list_schools))
        // Backups
        .route("/backups", get(api::list_backups))
        .route("/backups", post(api::create_backup));

    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
