//! Database migrations for the report scheduler.
//!
//! This module contains all database migrations using SeaORM Migration.

pub use sea_orm_migration::prelude::*;

mod m2025_06_20_000001_create_datasources;
mod m2025_06_20_000002_create_report_definitions;
mod m2025_06_20_000003_create_schedules;
mod m2025_06_20_000004_create_history_logs;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m2025_06_20_000001_create_datasources::Migration),
            Box::new(m2025_06_20_000002_create_report_definitions::Migration),
            Box::new(m2025_06_20_000003_create_schedules::Migration),
            Box::new(m2025_06_20_000004_create_history_logs::Migration),
        ]
    }
}
