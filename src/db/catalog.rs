//! Catalog reads: faculties and schools.

use sqlx::Row;

use super::Repository;
use crate::errors::AppError;
use crate::models::{Faculty, School};

impl Repository {
    pub async fn list_faculties(&self) -> Result<Vec<Faculty>, AppError> {
        let rows = sqlx::query("SELECT id, name FROM faculties ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| Faculty {
                id: row.get("id"),
                name: row.get("name"),
            })
            .collect())
    }

    pub async fn list_schools(&self) -> Result<Vec<School>, AppError> {
        let rows = sqlx::query("SELECT id, name, faculty_id FROM schools ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| School {
                id: row.get("id"),
                name: row.get("name"),
                faculty_id: row.get("faculty_id"),
            })
            .collect())
    }
}
