//! Configuration module for the attendance backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Default AES-256 key for field encryption. Must stay in sync with the key used
/// by existing deployments so that previously stored tokens remain decryptable.
pub const DEFAULT_ENCRYPTION_KEY: &str = "auditoria-seguridad-2025-clave!!";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the SQLite database file
    pub db_path: PathBuf,
    /// Directory holding timestamped database snapshots
    pub backup_dir: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// 32-byte key for encrypting sensitive student fields
    pub encryption_key: String,
    /// Seconds between automatic snapshots; 0 disables the periodic task
    pub backup_interval_secs: u64,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let db_path: PathBuf = env::var("ASISTENCIA_DB_PATH")
            .unwrap_or_else(|_| "./data/asistencia.db".to_string())
            .into();

        // Snapshots live in a `backups` directory next to the database file
        // unless overridden.
        let backup_dir = env::var("ASISTENCIA_BACKUP_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                db_path
                    .parent()
                    .unwrap_or_else(|| std::path::Path::new("."))
                    .join("backups")
            });

        let bind_addr = env::var("ASISTENCIA_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()
            .expect("Invalid ASISTENCIA_BIND_ADDR format");

        let log_level = env::var("ASISTENCIA_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let encryption_key = env::var("ASISTENCIA_ENCRYPTION_KEY")
            .unwrap_or_else(|_| DEFAULT_ENCRYPTION_KEY.to_string());

        let backup_interval_secs = env::var("ASISTENCIA_BACKUP_INTERVAL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(86_400);

        Self {
            db_path,
            backup_dir,
            bind_addr,
            log_level,
            encryption_key,
            backup_interval_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        // Clear any existing env vars
        env::remove_var("ASISTENCIA_DB_PATH");
        env::remove_var("ASISTENCIA_BACKUP_DIR");
        env::remove_var("ASISTENCIA_BIND_ADDR");
        env::remove_var("ASISTENCIA_LOG_LEVEL");
        env::remove_var("ASISTENCIA_ENCRYPTION_KEY");
        env::remove_var("ASISTENCIA_BACKUP_INTERVAL_SECS");

        let config = Config::from_env();

        assert_eq!(config.db_path, PathBuf::from("./data/asistencia.db"));
        assert_eq!(config.backup_dir, PathBuf::from("./data/backups"));
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.encryption_key.len(), 32);
        assert_eq!(config.backup_interval_secs, 86_400);
    }
}
