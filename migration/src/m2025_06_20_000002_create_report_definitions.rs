//! Migration to create the report_definitions table.
//!
//! A report definition bundles an ordered list of renderable elements
//! (dashboards, visualizations, saved searches) against one datasource.
//! The elements list is stored as a JSON column; (de)serialization is the
//! repository layer's concern.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ReportDefinitions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ReportDefinitions::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ReportDefinitions::Name).text().not_null())
                    .col(ColumnDef::new(ReportDefinitions::Description).text().null())
                    .col(
                        ColumnDef::new(ReportDefinitions::DatasourceId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ReportDefinitions::TimeRange)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(ReportDefinitions::Space).text().null())
                    .col(
                        ColumnDef::new(ReportDefinitions::Elements)
                            .json_binary()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ReportDefinitions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(ReportDefinitions::UpdatedAt)
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
            .drop_table(Table::drop().table(ReportDefinitions::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum ReportDefinitions {
    Table,
    Id,
    Name,
    Description,
    DatasourceId,
    TimeRange,
    Space,
    Elements,
    CreatedAt,
    UpdatedAt,
}
