//! # History Repository
//!
//! This module contains the repository implementation for HistoryLog
//! entities. Logs are append-only: there is a create and two reads, no
//! update or delete.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::RepositoryError;
use crate::models::history_log::{
    ActiveModel as HistoryLogActiveModel, Column as HistoryLogColumn, Entity as HistoryLog,
    LogStatus, Model as HistoryLogModel,
};
use crate::models::schedule::Recipients;

/// Data for one appended history log entry
#[derive(Debug, Clone)]
pub struct NewHistoryLog {
    pub schedule_id: Uuid,
    pub schedule_name: String,
    pub trigger_time: DateTime<Utc>,
    pub execution_duration_ms: i64,
    pub status: LogStatus,
    pub error_message: Option<String>,
    pub recipients: Recipients,
    pub report_url: String,
}

/// Repository for HistoryLog database operations
pub struct HistoryRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> HistoryRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Append one history log entry.
    pub async fn create(&self, entry: NewHistoryLog) -> Result<HistoryLogModel, RepositoryError> {
        let log = HistoryLogActiveModel {
            id: Set(Uuid::new_v4()),
            schedule_id: Set(entry.schedule_id),
            schedule_name: Set(entry.schedule_name),
            trigger_time: Set(entry.trigger_time.into()),
            execution_duration_ms: Set(entry.execution_duration_ms),
            status: Set(entry.status.as_str().to_string()),
            error_message: Set(entry.error_message),
            recipients: Set(entry.recipients.to_value()),
            report_url: Set(entry.report_url),
        };

        log.insert(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// All logs for a schedule, newest trigger time first.
    pub async fn get_by_schedule_id(
        &self,
        schedule_id: Uuid,
    ) -> Result<Vec<HistoryLogModel>, RepositoryError> {
        HistoryLog::find()
            .filter(HistoryLogColumn::ScheduleId.eq(schedule_id))
            .order_by_desc(HistoryLogColumn::TriggerTime)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<HistoryLogModel>, RepositoryError> {
        HistoryLog::find_by_id(id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }
}
