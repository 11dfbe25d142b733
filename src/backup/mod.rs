//! Snapshot and recovery subsystem for the database file.
//!
//! Snapshots are whole-file copies named `asistencia_backup_<timestamp>.db` in
//! a sibling backups directory. Live snapshots go through SQLite's `VACUUM
//! INTO` so a copy taken while writers are active is still consistent. Restore
//! ordering is established by file modification time, not by the timestamp
//! embedded in the name — the two can disagree when files are moved or touched.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::errors::AppError;

/// Prefix for scheduled/triggered snapshots.
pub const SNAPSHOT_PREFIX: &str = "asistencia_backup_";
/// Prefix for the preventive copy taken right before a manual restore.
pub const PRE_RESTORE_PREFIX: &str = "asistencia_pre_restore_";
const SNAPSHOT_SUFFIX: &str = ".db";

/// Metadata for one snapshot file.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupSnapshot {
    pub name: String,
    pub size: u64,
    pub modified: DateTime<Utc>,
}

/// Creates, lists and restores snapshots of the primary database file.
#[derive(Debug, Clone)]
pub struct BackupManager {
    db_path: PathBuf,
    backup_dir: PathBuf,
}

impl BackupManager {
    pub fn new(db_path: impl Into<PathBuf>, backup_dir: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            backup_dir: backup_dir.into(),
        }
    }

    /// Take a consistent snapshot of the current database.
    ///
    /// Returns `None` when there is nothing to snapshot (no primary file yet).
    /// The copy is produced by `VACUUM INTO`, which serializes against writers
    /// inside the engine instead of risking a torn raw file copy.
    pub async fn create_snapshot(&self, pool: &SqlitePool) -> Result<Option<PathBuf>, AppError> {
        if !self.db_path.exists() {
            tracing::warn!("No database file at {:?}, skipping snapshot", self.db_path);
            return Ok(None);
        }

        fs::create_dir_all(&self.backup_dir)?;
        let name = format!("{}{}{}", SNAPSHOT_PREFIX, timestamp(), SNAPSHOT_SUFFIX);
        let dest = self.backup_dir.join(&name);

        sqlx::query("VACUUM INTO ?")
            .bind(dest.display().to_string())
            .execute(pool)
            .await?;

        tracing::info!("Snapshot created: {}", name);
        Ok(Some(dest))
    }

    /// List snapshot files, newest first by modification time.
    pub fn list_snapshots(&self) -> io::Result<Vec<BackupSnapshot>> {
        let mut snapshots = Vec::new();
        let entries = match fs::read_dir(&self.backup_dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(snapshots),
            Err(err) => return Err(err),
        };

        for entry in entries {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            let is_snapshot = (name.starts_with(SNAPSHOT_PREFIX)
                || name.starts_with(PRE_RESTORE_PREFIX))
                && name.ends_with(SNAPSHOT_SUFFIX);
            if !is_snapshot {
                continue;
            }
            let meta = entry.metadata()?;
            snapshots.push(BackupSnapshot {
                name,
                size: meta.len(),
                modified: meta.modified()?.into(),
            });
        }

        snapshots.sort_by(|a, b| b.modified.cmp(&a.modified));
        Ok(snapshots)
    }

    /// Startup hook: if the primary database file is missing, restore the
    /// newest matching snapshot over it. Must run to completion before the
    /// store is opened for any other operation.
    ///
    /// Returns the restored snapshot's name, or `None` when the primary file
    /// already exists or no snapshot is available (the schema-open step then
    /// creates an empty store from nothing).
    pub fn restore_latest_if_missing(&self) -> io::Result<Option<String>> {
        if self.db_path.exists() {
            return Ok(None);
        }

        tracing::warn!(
            "Database file missing at {:?}, looking for a snapshot to restore",
            self.db_path
        );

        let latest = self.latest_backup_snapshot()?;
        let Some(latest) = latest else {
            tracing::warn!("No snapshots available, starting with an empty database");
            return Ok(None);
        };

        if let Some(parent) = self.db_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(self.backup_dir.join(&latest), &self.db_path)?;
        tracing::info!("Database auto-restored from snapshot {}", latest);
        Ok(Some(latest))
    }

    /// Operator-invoked restore. Picks the named snapshot, or the newest one
    /// by modification time when no name is given. Whatever currently sits at
    /// the primary path is first copied aside as a preventive snapshot.
    pub fn restore_snapshot(&self, name: Option<&str>) -> io::Result<PathBuf> {
        let name = match name {
            Some(name) => name.to_string(),
            None => self.latest_backup_snapshot()?.ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("No snapshots found in {:?}", self.backup_dir),
                )
            })?,
        };

        let source = self.backup_dir.join(&name);
        if !source.exists() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("Snapshot file does not exist: {:?}", source),
            ));
        }

        if self.db_path.exists() {
            let safety_name = format!("{}{}{}", PRE_RESTORE_PREFIX, timestamp(), SNAPSHOT_SUFFIX);
            let safety_path = self.backup_dir.join(&safety_name);
            fs::copy(&self.db_path, &safety_path)?;
            tracing::info!("Current database preserved as {}", safety_name);
        }

        if let Some(parent) = self.db_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(&source, &self.db_path)?;
        Ok(source)
    }

    /// Newest `asistencia_backup_*.db` by modification time. Preventive
    /// pre-restore copies never qualify for automatic restore.
    fn latest_backup_snapshot(&self) -> io::Result<Option<String>> {
        Ok(self
            .list_snapshots()?
            .into_iter()
            .find(|s| s.name.starts_with(SNAPSHOT_PREFIX))
            .map(|s| s.name))
    }
}

/// Current time as an ISO-8601 string with filesystem-unsafe characters
/// (`:` and `.`) replaced by `-`.
fn timestamp() -> String {
    Utc::now()
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::time::{Duration, SystemTime};

    fn touch(path: &Path, content: &str, modified: SystemTime) {
        fs::write(path, content).unwrap();
        let file = File::options().append(true).open(path).unwrap();
        file.set_modified(modified).unwrap();
    }

    #[test]
    fn test_timestamp_is_filename_safe() {
        let ts = timestamp();
        assert!(!ts.contains(':'));
        assert!(!ts.contains('.'));
    }

    #[test]
    fn test_restore_latest_picks_newest_mtime_not_name() {
        let dir = tempfile::tempdir().unwrap();
        let backups = dir.path().join("backups");
        fs::create_dir_all(&backups).unwrap();
        let db_path = dir.path().join("asistencia.db");

        let base = SystemTime::now() - Duration::from_secs(3600);
        // Lexically greatest name gets the oldest mtime; the winner by mtime
        // carries the lexically smallest name.
        touch(
            &backups.join("asistencia_backup_2025-01-03T00-00-00-000Z.db"),
            "oldest",
            base,
        );
        touch(
            &backups.join("asistencia_backup_2025-01-02T00-00-00-000Z.db"),
            "middle",
            base + Duration::from_secs(60),
        );
        touch(
            &backups.join("asistencia_backup_2025-01-01T00-00-00-000Z.db"),
            "newest",
            base + Duration::from_secs(120),
        );

        let manager = BackupManager::new(&db_path, &backups);
        let restored = manager.restore_latest_if_missing().unwrap();

        assert_eq!(
            restored.as_deref(),
            Some("asistencia_backup_2025-01-01T00-00-00-000Z.db")
        );
        assert_eq!(fs::read_to_string(&db_path).unwrap(), "newest");
    }

    #[test]
    fn test_restore_noop_when_primary_exists() {
        let dir = tempfile::tempdir().unwrap();
        let backups = dir.path().join("backups");
        fs::create_dir_all(&backups).unwrap();
        let db_path = dir.path().join("asistencia.db");
        fs::write(&db_path, "live").unwrap();
        fs::write(
            backups.join("asistencia_backup_2025-01-01T00-00-00-000Z.db"),
            "snap",
        )
        .unwrap();

        let manager = BackupManager::new(&db_path, &backups);
        assert_eq!(manager.restore_latest_if_missing().unwrap(), None);
        assert_eq!(fs::read_to_string(&db_path).unwrap(), "live");
    }

    #[test]
    fn test_restore_missing_backup_dir_leaves_store_absent() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("asistencia.db");
        let manager = BackupManager::new(&db_path, dir.path().join("backups"));

        assert_eq!(manager.restore_latest_if_missing().unwrap(), None);
        assert!(!db_path.exists());
    }

    #[test]
    fn test_pre_restore_copies_ignored_for_auto_restore() {
        let dir = tempfile::tempdir().unwrap();
        let backups = dir.path().join("backups");
        fs::create_dir_all(&backups).unwrap();
        let db_path = dir.path().join("asistencia.db");

        let base = SystemTime::now() - Duration::from_secs(600);
        touch(
            &backups.join("asistencia_backup_2025-01-01T00-00-00-000Z.db"),
            "real",
            base,
        );
        touch(
            &backups.join("asistencia_pre_restore_2025-06-01T00-00-00-000Z.db"),
            "safety",
            base + Duration::from_secs(60),
        );

        let manager = BackupManager::new(&db_path, &backups);
        manager.restore_latest_if_missing().unwrap();
        assert_eq!(fs::read_to_string(&db_path).unwrap(), "real");
    }

    #[test]
    fn test_manual_restore_takes_preventive_copy() {
        let dir = tempfile::tempdir().unwrap();
        let backups = dir.path().join("backups");
        fs::create_dir_all(&backups).unwrap();
        let db_path = dir.path().join("asistencia.db");
        fs::write(&db_path, "current").unwrap();

        let snapshot_name = "asistencia_backup_2025-01-01T00-00-00-000Z.db";
        fs::write(backups.join(snapshot_name), "snapshot").unwrap();

        let manager = BackupManager::new(&db_path, &backups);
        let restored = manager.restore_snapshot(Some(snapshot_name)).unwrap();

        assert_eq!(restored, backups.join(snapshot_name));
        assert_eq!(fs::read_to_string(&db_path).unwrap(), "snapshot");

        let safety: Vec<_> = fs::read_dir(&backups)
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|n| n.starts_with(PRE_RESTORE_PREFIX))
            .collect();
        assert_eq!(safety.len(), 1);
        assert_eq!(
            fs::read_to_string(backups.join(&safety[0])).unwrap(),
            "current"
        );
    }

    #[test]
    fn test_manual_restore_unknown_name_fails() {
        let dir = tempfile::tempdir().unwrap();
        let backups = dir.path().join("backups");
        fs::create_dir_all(&backups).unwrap();
        let manager = BackupManager::new(dir.path().join("asistencia.db"), &backups);

        let err = manager.restore_snapshot(Some("no-such-file.db")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_manual_restore_empty_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let manager = BackupManager::new(
            dir.path().join("asistencia.db"),
            dir.path().join("backups"),
        );

        let err = manager.restore_snapshot(None).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
