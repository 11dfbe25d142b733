//! Service entry point: auto-restore check, database init, periodic backups
//! and the HTTP server.

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use asistencia_backend::backup::BackupManager;
use asistencia_backend::config::Config;
use asistencia_backend::crypto::FieldCodec;
use asistencia_backend::db::{self, Repository};
use asistencia_backend::{create_router, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env();

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Asistencia Backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Backup directory: {:?}", config.backup_dir);
    tracing::info!("Bind address: {}", config.bind_addr);

    let backup = BackupManager::new(&config.db_path, &config.backup_dir);

    // Disaster-recovery check. Must complete before the store is opened: it
    // replaces the database file out from under any cached handle.
    match backup.restore_latest_if_missing() {
        Ok(Some(name)) => tracing::info!("Recovered database from snapshot {}", name),
        Ok(None) => {}
        Err(err) => tracing::error!("Auto-restore check failed: {}", err),
    }

    // Initialize database (creates the schema on a fresh or restored file)
    let pool = db::init_database(&config.db_path).await?;
    let codec = FieldCodec::new(&config.encryption_key)?;
    let repo = Arc::new(Repository::new(pool, codec));
    let backup = Arc::new(backup);

    // Periodic snapshot task
    if config.backup_interval_secs > 0 {
        let task_backup = Arc::clone(&backup);
        let task_repo = Arc::clone(&repo);
        let secs = config.backup_interval_secs;
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(secs));
            // The immediate first tick would snapshot an empty store on day one.
            interval.tick().await;
            loop {
                interval.tick().await;
                if let Err(err) = task_backup.create_snapshot(task_repo.pool()).await {
                    tracing::error!("Scheduled snapshot failed: {}", err);
                }
            }
        });
        tracing::info!("Automatic backups every {}s", secs);
    } else {
        tracing::info!("Automatic backups disabled");
    }

    // Create application state
    let state = AppState {
        repo,
        backup,
        config: Arc::new(config.clone()),
    };

    // Build router and start server
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
