//! Database connection management for the report scheduler.
//!
//! This module initializes a SeaORM connection for the configured store
//! backend. The configuration contract names the backend by type; only
//! SQLite is implemented, and unknown types fail initialization.

use anyhow::{Context, Result};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::time::Duration;

use crate::config::AppConfig;

/// Errors that can occur during store initialization.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("failed to connect to database: {source}")]
    ConnectionFailed {
        #[from]
        source: sea_orm::DbErr,
    },
    #[error("unsupported database type: {0}")]
    UnsupportedType(String),
    #[error("invalid database configuration: {message}")]
    InvalidConfiguration { message: String },
}

/// Initializes the store connection for the configured backend.
pub async fn init_store(cfg: &AppConfig) -> Result<DatabaseConnection> {
    let url = match cfg.database.kind.as_str() {
        "sqlite" => {
            if cfg.database.path.is_empty() {
                return Err(DatabaseError::InvalidConfiguration {
                    message: "database path cannot be empty".to_string(),
                }
                .into());
            }
            format!("sqlite://{}?mode=rwc", cfg.database.path)
        }
        other => return Err(DatabaseError::UnsupportedType(other.to_string()).into()),
    };

    let mut opt = ConnectOptions::new(url);
    opt.max_connections(5)
        .acquire_timeout(Duration::from_secs(5))
        .sqlx_logging(false);

    let db = Database::connect(opt)
        .await
        .map_err(|source| DatabaseError::ConnectionFailed { source })?;

    health_check(&db).await?;

    Ok(db)
}

/// Health check for the database connection.
pub async fn health_check(db: &DatabaseConnection) -> Result<()> {
    let stmt = Statement::from_string(db.get_database_backend(), "SELECT 1".to_string());

    db.query_one(stmt)
        .await
        .context("Database health check failed")?;

    Ok(())
}
