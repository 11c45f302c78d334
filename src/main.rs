//! # Report Scheduler Main Entry Point
//!
//! Wires the engine together and owns the process lifecycle: store →
//! secrets → queue → scheduler → workers → HTTP listener on the way up,
//! and the reverse on shutdown.

use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use migration::{Migrator, MigratorTrait};
use sea_orm::DatabaseConnection;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use report_scheduler::config::ConfigLoader;
use report_scheduler::db;
use report_scheduler::generators::GeneratorFactory;
use report_scheduler::logging;
use report_scheduler::queue::TaskQueue;
use report_scheduler::scheduler::ReportScheduler;
use report_scheduler::secrets::{MockSecretsManager, SecretsManager};
use report_scheduler::server::{run_server, AppState};
use report_scheduler::worker::{TaskExecutor, WorkerPool};

/// In-flight HTTP requests are abandoned after this drain window.
const HTTP_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Parser)]
#[command(name = "report-scheduler")]
#[command(about = "Scheduled report execution engine")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate {
        #[command(subcommand)]
        action: MigrateAction,
    },
}

#[derive(Subcommand)]
enum MigrateAction {
    /// Apply all pending migrations
    Up,
    /// Rollback the last migration
    Down,
    /// Show migration status
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = ConfigLoader::new().load()?;
    logging::init_subscriber(&config);

    let db = db::init_store(&config).await?;

    if let Some(command) = cli.command {
        match command {
            Commands::Migrate { action } => {
                handle_migrate_command(&db, action).await?;
                return Ok(());
            }
        }
    }

    Migrator::up(&db, None).await?;
    info!("Migrations applied");

    let secrets: Arc<dyn SecretsManager> = Arc::new(MockSecretsManager::new());
    let queue = Arc::new(TaskQueue::new(config.queue.capacity));
    let generators = GeneratorFactory::new(secrets);

    let scheduler = ReportScheduler::new(db.clone(), queue.clone());
    let registered = scheduler.start().await?;
    info!(registered, "Scheduler running");

    let executor = Arc::new(TaskExecutor::new(db.clone(), generators));
    let workers = WorkerPool::new(queue.clone(), executor, config.worker.concurrency);
    workers.start();

    let addr = config.bind_addr()?;
    let state = AppState::new(db.clone(), queue.clone());
    let server_shutdown = CancellationToken::new();
    let server = tokio::spawn(run_server(addr, state, server_shutdown.clone()));

    shutdown_signal().await;
    info!("Shutdown signal received; stopping services");

    // Drain the HTTP listener first, capped at the drain window.
    server_shutdown.cancel();
    match tokio::time::timeout(HTTP_DRAIN_TIMEOUT, server).await {
        Ok(Ok(Ok(()))) => {}
        Ok(Ok(Err(err))) => error!(error = %err, "Server exited with error"),
        Ok(Err(err)) => error!(error = %err, "Server task panicked"),
        Err(_) => warn!("HTTP drain window elapsed; abandoning in-flight requests"),
    }

    // Stop firing; in-flight fires complete their enqueues.
    scheduler.stop().await;
    // Interrupt idle workers; an in-flight task runs to completion.
    workers.stop().await;
    // No producers or consumers remain.
    queue.close();

    db.close().await?;
    info!("Shutdown complete");
    Ok(())
}

async fn handle_migrate_command(
    db: &DatabaseConnection,
    action: MigrateAction,
) -> anyhow::Result<()> {
    match action {
        MigrateAction::Up => {
            println!("Applying migrations...");
            Migrator::up(db, None).await?;
            println!("All migrations applied successfully");
        }
        MigrateAction::Down => {
            println!("Rolling back last migration...");
            Migrator::down(db, Some(1)).await?;
            println!("Migration rolled back successfully");
        }
        MigrateAction::Status => {
            println!("Checking migration status...");
            let applied = Migrator::get_applied_migrations(db).await?;
            let pending = Migrator::get_pending_migrations(db).await?;

            if applied.is_empty() {
                println!("No migrations have been applied");
            } else {
                println!("Applied migrations: {} migration(s)", applied.len());
            }

            if pending.is_empty() {
                println!("No pending migrations");
            } else {
                println!("Pending migrations: {} migration(s)", pending.len());
            }
        }
    }
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
