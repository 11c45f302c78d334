//! HistoryLog entity model
//!
//! This module contains the SeaORM entity model for the history_logs
//! table: append-only records of one task execution each. Rows are never
//! updated after insert.

use std::fmt;

use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use super::schedule::Entity as Schedule;

/// HistoryLog entity recording one task execution outcome
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "history_logs")]
pub struct Model {
    /// Unique identifier for the log entry (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Schedule that produced the task
    pub schedule_id: Uuid,

    /// Schedule name at execution time (denormalized for display)
    pub schedule_name: String,

    /// Task creation time, not the worker's processing time
    pub trigger_time: DateTimeWithTimeZone,

    /// Wall-clock duration of the full report fan-out, in milliseconds
    pub execution_duration_ms: i64,

    /// Outcome ("success", "failed"; "retrying" is reserved)
    pub status: String,

    /// Message of the last per-report error, if any report failed
    pub error_message: Option<String>,

    /// Recipients snapshot taken from the schedule, stored as JSON
    #[sea_orm(column_type = "JsonBinary")]
    pub recipients: JsonValue,

    /// Rendered file paths joined by ", "; empty when nothing rendered
    pub report_url: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "Schedule",
        from = "Column::ScheduleId",
        to = "super::schedule::Column::Id"
    )]
    Schedule,
}

impl Related<Schedule> for Entity {
    fn to() -> RelationDef {
        Relation::Schedule.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Outcome vocabulary for history logs.
///
/// `Retrying` exists for forward compatibility with a retry subsystem and
/// is never written by the current engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogStatus {
    Success,
    Failed,
    Retrying,
}

impl LogStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogStatus::Success => "success",
            LogStatus::Failed => "failed",
            LogStatus::Retrying => "retrying",
        }
    }
}

impl fmt::Display for LogStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
