//! Migration to create the schedules table.
//!
//! A schedule binds a cron specification to an ordered list of report
//! definition ids plus delivery metadata. Recipients and the report id
//! list are JSON columns.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Schedules::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Schedules::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Schedules::Name).text().not_null())
                    .col(ColumnDef::new(Schedules::CronSpec).text().not_null())
                    .col(
                        ColumnDef::new(Schedules::Timezone)
                            .text()
                            .not_null()
                            .default("UTC"),
                    )
                    .col(ColumnDef::new(Schedules::Recipients).json_binary().not_null())
                    .col(
                        ColumnDef::new(Schedules::EmailSubject)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Schedules::EmailBody)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(Schedules::ReportIds).json_binary().not_null())
                    .col(
                        ColumnDef::new(Schedules::IsEnabled)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Schedules::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Schedules::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Schedules::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Schedules {
    Table,
    Id,
    Name,
    CronSpec,
    Timezone,
    Recipients,
    EmailSubject,
    EmailBody,
    ReportIds,
    IsEnabled,
    CreatedAt,
    UpdatedAt,
}
