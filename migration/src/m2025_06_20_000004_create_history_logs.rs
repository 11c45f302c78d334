//! Migration to create the history_logs table.
//!
//! History logs are append-only execution records, one per processed task.
//! Queries filter by schedule and order by trigger time, so both get an
//! index.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(HistoryLogs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(HistoryLogs::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(HistoryLogs::ScheduleId).uuid().not_null())
                    .col(ColumnDef::new(HistoryLogs::ScheduleName).text().not_null())
                    .col(
                        ColumnDef::new(HistoryLogs::TriggerTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(HistoryLogs::ExecutionDurationMs)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(HistoryLogs::Status).text().not_null())
                    .col(ColumnDef::new(HistoryLogs::ErrorMessage).text().null())
                    .col(
                        ColumnDef::new(HistoryLogs::Recipients)
                            .json_binary()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(HistoryLogs::ReportUrl)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_history_logs_schedule_trigger_time")
                    .table(HistoryLogs::Table)
                    .col(HistoryLogs::ScheduleId)
                    .col(HistoryLogs::TriggerTime)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(HistoryLogs::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum HistoryLogs {
    Table,
    Id,
    ScheduleId,
    ScheduleName,
    TriggerTime,
    ExecutionDurationMs,
    Status,
    ErrorMessage,
    Recipients,
    ReportUrl,
}
