//! Migration to create the datasources table.
//!
//! A datasource is a named, addressable BI endpoint (Kibana or Grafana)
//! together with its auth mode and a reference into the secrets manager.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Datasources::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Datasources::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Datasources::Name).text().not_null())
                    .col(ColumnDef::new(Datasources::Kind).text().not_null())
                    .col(ColumnDef::new(Datasources::Url).text().not_null())
                    .col(ColumnDef::new(Datasources::ApiUrl).text().null())
                    .col(
                        ColumnDef::new(Datasources::AuthKind)
                            .text()
                            .not_null()
                            .default("none"),
                    )
                    .col(ColumnDef::new(Datasources::CredentialsRef).text().null())
                    .col(ColumnDef::new(Datasources::Version).text().null())
                    .col(
                        ColumnDef::new(Datasources::Status)
                            .text()
                            .not_null()
                            .default("unverified"),
                    )
                    .col(
                        ColumnDef::new(Datasources::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Datasources::UpdatedAt)
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
            .drop_table(Table::drop().table(Datasources::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Datasources {
    Table,
    Id,
    Name,
    Kind,
    Url,
    ApiUrl,
    AuthKind,
    CredentialsRef,
    Version,
    Status,
    CreatedAt,
    UpdatedAt,
}
