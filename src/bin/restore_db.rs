//! Operator tool to restore the database from a snapshot.
//!
//! With no argument the newest snapshot by modification time is used. A
//! preventive copy of the current database is taken before anything is
//! overwritten. Exits non-zero on any failure.

use clap::Parser;

use asistencia_backend::backup::BackupManager;
use asistencia_backend::config::Config;

#[derive(Parser)]
#[command(name = "restore-db", about = "Restore the attendance database from a snapshot")]
struct Args {
    /// Snapshot file name inside the backups directory (defaults to the newest)
    snapshot: Option<String>,
}

fn main() {
    let args = Args::parse();
    let config = Config::from_env();
    let backup = BackupManager::new(&config.db_path, &config.backup_dir);

    println!("=== Database restore ===");
    if args.snapshot.is_none() {
        println!("No snapshot named; using the most recent one.");
    }

    match backup.restore_snapshot(args.snapshot.as_deref()) {
        Ok(source) => {
            println!("Database restored from: {}", source.display());
            println!("Destination: {}", config.db_path.display());
            println!();
            println!("Restart the server so it picks up the restored database.");
            println!("Restore complete.");
        }
        Err(err) => {
            eprintln!("Restore failed: {}", err);
            std::process::exit(1);
        }
    }
}
