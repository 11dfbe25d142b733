//! Student roster CRUD. Every mutation routes its sensitive fields through the
//! field codec and leaves a trace in the audit log.

use chrono::Utc;
use sqlx::Row;

use super::{parse_selected_days, Repository};
use crate::errors::AppError;
use crate::models::{AuditOp, CreateStudentRequest, Student, UpdateStudentRequest};

impl Repository {
    /// List all students with `email`/`number` decrypted and `selected_days`
    /// parsed back into weekday indices.
    pub async fn list_students(&self) -> Result<Vec<Student>, AppError> {
        let rows = sqlx::query(
            "SELECT id, code, full_name, email, number, faculty, school, selected_days, \
             status, created_at FROM students ORDER BY full_name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(|row| self.student_from_row(row)).collect())
    }

    /// Look up a single student by external code (used by the QR capture flow).
    pub async fn get_student_by_code(&self, code: &str) -> Result<Option<Student>, AppError> {
        let row = sqlx::query(
            "SELECT id, code, full_name, email, number, faculty, school, selected_days, \
             status, created_at FROM students WHERE code = ?",
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(|row| self.student_from_row(row)))
    }

    /// Add a student. The id is derived from the code; `email` and `number`
    /// are encrypted at rest. On success an INSERT audit entry is appended
    /// best-effort; a failed insert writes no audit entry.
    pub async fn add_student(
        &self,
        request: &CreateStudentRequest,
    ) -> Result<Student, AppError> {
        if request.code.trim().is_empty() {
            return Err(AppError::Validation("Student code is required".to_string()));
        }
        if request.full_name.trim().is_empty() {
            return Err(AppError::Validation("Full name is required".to_string()));
        }

        let id = format!("stu-{}", request.code);
        let now = Utc::now().to_rfc3339();
        let selected_days_json = serde_json::to_string(&request.selected_days)?;
        let email = self.codec.encrypt_opt(request.email.as_deref());
        let number = self.codec.encrypt_opt(request.number.as_deref());

        sqlx::query(
            "INSERT INTO students \
             (id, code, full_name, email, number, faculty, school, selected_days, status, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, 'active', ?)",
        )
        .bind(&id)
        .bind(&request.code)
        .bind(&request.full_name)
        .bind(&email)
        .bind(&number)
        .bind(&request.faculty)
        .bind(&request.school)
        .bind(&selected_days_json)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        self.append_audit(
            &id,
            AuditOp::Insert,
            &format!(
                "Student {} added (code {}).",
                request.full_name, request.code
            ),
            request.user_id,
        )
        .await;

        Ok(Student {
            id,
            code: request.code.clone(),
            full_name: request.full_name.clone(),
            email: request.email.clone(),
            number: request.number.clone(),
            faculty: request.faculty.clone(),
            school: request.school.clone(),
            selected_days: request.selected_days.clone(),
            status: "active".to_string(),
            created_at: now,
        })
    }

    /// Overwrite all mutable columns for the row identified by `id`,
    /// re-encrypting the sensitive fields. Updating a non-existent id succeeds
    /// silently at the storage layer (no rows affected).
    pub async fn update_student(
        &self,
        id: &str,
        request: &UpdateStudentRequest,
    ) -> Result<(), AppError> {
        if request.full_name.trim().is_empty() {
            return Err(AppError::Validation("Full name is required".to_string()));
        }

        let selected_days_json = serde_json::to_string(&request.selected_days)?;
        let email = self.codec.encrypt_opt(request.email.as_deref());
        let number = self.codec.encrypt_opt(request.number.as_deref());

        sqlx::query(
            "UPDATE students SET code = ?, full_name = ?, email = ?, number = ?, \
             faculty = ?, school = ?, selected_days = ? WHERE id = ?",
        )
        .bind(&request.code)
        .bind(&request.full_name)
        .bind(&email)
        .bind(&number)
        .bind(&request.faculty)
        .bind(&request.school)
        .bind(&selected_days_json)
        .bind(id)
        .execute(&self.pool)
        .await?;

        self.append_audit(
            id,
            AuditOp::Update,
            &format!("Student updated: {}", id),
            request.user_id,
        )
        .await;

        Ok(())
    }

    /// Delete a student. The DELETE audit entry and the row removal commit as
    /// one transaction, so a deletion can never lose its trail mid-operation.
    pub async fn delete_student(&self, id: &str, user_id: Option<i64>) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        self.append_audit_tx(
            &mut tx,
            id,
            AuditOp::Delete,
            &format!("Student deleted: {}", id),
            user_id,
        )
        .await?;

        let result = sqlx::query("DELETE FROM students WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            // Dropping the transaction also discards the audit entry.
            return Err(AppError::NotFound(format!("Student {} not found", id)));
        }

        tx.commit().await?;
        Ok(())
    }

    fn student_from_row(&self, row: &sqlx::sqlite::SqliteRow) -> Student {
        let selected_days_str: String = row.get("selected_days");
        let email: Option<String> = row.get("email");
        let number: Option<String> = row.get("number");
        Student {
            id: row.get("id"),
            code: row.get("code"),
            full_name: row.get("full_name"),
            email: self.codec.decrypt_opt(email),
            number: self.codec.decrypt_opt(number),
            faculty: row.get("faculty"),
            school: row.get("school"),
            selected_days: parse_selected_days(&selected_days_str),
            status: row.get("status"),
            created_at: row.get("created_at"),
        }
    }
}
