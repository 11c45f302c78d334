//! # Repositories
//!
//! This module contains the data access layer: one repository per
//! aggregate. Repositories own id and timestamp assignment on create and
//! the JSON (de)serialization of list-valued columns.

pub mod datasource;
pub mod history;
pub mod report_definition;
pub mod schedule;

pub use datasource::{CreateDataSource, DataSourceRepository, UpdateDataSource};
pub use history::{HistoryRepository, NewHistoryLog};
pub use report_definition::{
    CreateReportDefinition, ReportDefinitionRepository, UpdateReportDefinition,
};
pub use schedule::{CreateSchedule, ScheduleRepository, UpdateSchedule};
