//! Attendance ledger: batched per-day upserts and the grouped history view.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, Utc};
use sqlx::Row;

use super::Repository;
use crate::errors::AppError;
use crate::models::{AttendanceDay, RecordAttendanceRequest, StudentAttendance};

/// Weekday name as rendered in the history UI.
fn spanish_weekday(date: NaiveDate) -> &'static str {
    match date.weekday() {
        chrono::Weekday::Mon => "lunes",
        chrono::Weekday::Tue => "martes",
        chrono::Weekday::Wed => "miércoles",
        chrono::Weekday::Thu => "jueves",
        chrono::Weekday::Fri => "viernes",
        chrono::Weekday::Sat => "sábado",
        chrono::Weekday::Sun => "domingo",
    }
}

impl Repository {
    /// Record a day's attendance as a single all-or-nothing batch.
    ///
    /// Each entry is upserted on `(student_id, date)`: a second write for the
    /// same key replaces the prior one rather than creating a duplicate. If any
    /// upsert fails the whole transaction rolls back, so partial attendance for
    /// a date is never visible. Returns the number of records written.
    pub async fn record_attendance(
        &self,
        request: &RecordAttendanceRequest,
    ) -> Result<usize, AppError> {
        let date = NaiveDate::parse_from_str(&request.date, "%Y-%m-%d").map_err(|_| {
            AppError::Validation(format!("Invalid attendance date: {}", request.date))
        })?;
        let day_of_week = spanish_weekday(date);
        let recorded_at = Utc::now().to_rfc3339();

        let mut tx = self.pool.begin().await?;

        for entry in &request.students {
            sqlx::query(
                "INSERT INTO attendances \
                 (student_id, date, day_of_week, status, full_name, code, recorded_by_user_id, recorded_at) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?) \
                 ON CONFLICT(student_id, date) DO UPDATE SET \
                 status = excluded.status, full_name = excluded.full_name, code = excluded.code, \
                 recorded_by_user_id = excluded.recorded_by_user_id, \
                 recorded_at = excluded.recorded_at, day_of_week = excluded.day_of_week",
            )
            .bind(&entry.student_id)
            .bind(&request.date)
            .bind(day_of_week)
            .bind(entry.status.to_lowercase())
            .bind(&entry.full_name)
            .bind(&entry.code)
            .bind(request.user_id)
            .bind(&recorded_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(request.students.len())
    }

    /// All attendance grouped by date, newest date first, with per-date totals
    /// and records indexed by student id.
    pub async fn list_attendance_history(&self) -> Result<Vec<AttendanceDay>, AppError> {
        let rows = sqlx::query(
            "SELECT student_id, date, day_of_week, status, full_name, code, recorded_at \
             FROM attendances ORDER BY date, student_id",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut by_date: BTreeMap<String, AttendanceDay> = BTreeMap::new();

        for row in rows {
            let date: String = row.get("date");
            let status: String = row.get("status");
            let student_id: String = row.get("student_id");
            let recorded_at: String = row.get("recorded_at");

            let day = by_date.entry(date.clone()).or_insert_with(|| AttendanceDay {
                id: date.clone(),
                date: date.clone(),
                day_of_week: row.get("day_of_week"),
                records: BTreeMap::new(),
                total_present: 0,
                total_absent: 0,
                total_late: 0,
                created_at: recorded_at.clone(),
            });

            match status.as_str() {
                "presente" => day.total_present += 1,
                "ausente" => day.total_absent += 1,
                "tardanza" => day.total_late += 1,
                _ => {}
            }

            day.records.insert(
                student_id.clone(),
                StudentAttendance {
                    student_id,
                    status,
                    full_name: row.get("full_name"),
                    code: row.get("code"),
                    created_at: recorded_at,
                },
            );
        }

        // BTreeMap iterates dates ascending; the history view wants newest first.
        Ok(by_date.into_values().rev().collect())
    }
}
