//! Database module for SQLite persistence.
//!
//! SQLite is the source of truth for roster, attendance and audit data. The
//! schema is created with "if not exists" semantics on every open, so a brand
//! new or freshly restored file self-heals into a usable shape.

mod attendance;
mod audit;
mod catalog;
mod students;

pub use audit::SENTINEL_USER_ID;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

use crate::crypto::FieldCodec;

/// Email identifying the seeded bootstrap administrator.
pub const SEED_ADMIN_EMAIL: &str = "admin@correo.com";

// Placeholder bcrypt hash; credential verification lives outside this service.
const SEED_ADMIN_PASSWORD_HASH: &str = "$2a$10$i.P/t.Q0wZ8Y.M0hJ8Vp8O";

/// Initialize the database connection pool and ensure the schema exists.
pub async fn init_database(db_path: &Path) -> Result<SqlitePool, sqlx::Error> {
    // Ensure the parent directory exists
    if let Some(parent) = db_path.parent() {
        tokio::fs::create_dir_all(parent).await.ok();
    }

    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

    let options = SqliteConnectOptions::from_str(&db_url)?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    ensure_schema(&pool).await?;

    Ok(pool)
}

/// Create the schema and seed the bootstrap admin. Idempotent; safe to call on
/// every open and never destructive against existing data.
pub async fn ensure_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            email TEXT UNIQUE NOT NULL,
            password_hash TEXT NOT NULL,
            full_name TEXT,
            role TEXT NOT NULL CHECK(role IN ('admin', 'student')),
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Seed exactly one bootstrap admin, guarded by an existence check rather
    // than a blind insert.
    sqlx::query(
        "INSERT INTO users (email, password_hash, full_name, role) \
         SELECT ?, ?, 'Administrador', 'admin' \
         WHERE NOT EXISTS (SELECT 1 FROM users WHERE email = ?)",
    )
    .bind(SEED_ADMIN_EMAIL)
    .bind(SEED_ADMIN_PASSWORD_HASH)
    .bind(SEED_ADMIN_EMAIL)
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS faculties (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS schools (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            faculty_id TEXT NOT NULL REFERENCES faculties(id)
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS students (
            id TEXT PRIMARY KEY,
            code TEXT UNIQUE NOT NULL,
            full_name TEXT NOT NULL,
            email TEXT UNIQUE,
            number TEXT,
            faculty TEXT,
            school TEXT,
            selected_days TEXT NOT NULL DEFAULT '[]',
            status TEXT NOT NULL DEFAULT 'active' CHECK(status IN ('active', 'inactive')),
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS attendances (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            student_id TEXT NOT NULL,
            date TEXT NOT NULL,
            day_of_week TEXT,
            status TEXT NOT NULL CHECK(status IN ('presente', 'ausente', 'tardanza')),
            full_name TEXT,
            code TEXT,
            recorded_by_user_id INTEGER,
            recorded_at TEXT NOT NULL,
            UNIQUE (student_id, date)
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS student_audit_log (
            log_id INTEGER PRIMARY KEY AUTOINCREMENT,
            student_id TEXT NOT NULL,
            operation_type TEXT NOT NULL CHECK(operation_type IN ('INSERT', 'UPDATE', 'DELETE')),
            description TEXT,
            changed_by_user_id INTEGER,
            changed_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Indexes for common queries
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_attendances_date ON attendances(date);
        CREATE INDEX IF NOT EXISTS idx_audit_changed_at ON student_audit_log(changed_at);
        CREATE INDEX IF NOT EXISTS idx_students_full_name ON students(full_name);
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
    codec: FieldCodec,
}

impl Repository {
    pub fn new(pool: SqlitePool, codec: FieldCodec) -> Self {
        Self { pool, codec }
    }

    /// The underlying pool, for components that need direct store access
    /// (snapshot creation, startup checks).
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

pub(crate) fn parse_selected_days(s: &str) -> Vec<u8> {
    serde_json::from_str(s).unwrap_or_default()
}
