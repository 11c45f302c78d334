//! # Data Models
//!
//! This module contains all the data models used throughout the report
//! scheduler: SeaORM entities plus the domain enums and JSON payload
//! types they carry.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod datasource;
pub mod history_log;
pub mod report_definition;
pub mod schedule;

pub use datasource::{AuthKind, ConnectionStatus, DataSourceKind, Entity as DataSource};
pub use history_log::{Entity as HistoryLog, LogStatus};
pub use report_definition::{Entity as ReportDefinition, ReportElement, ReportElementKind};
pub use schedule::{Entity as Schedule, Recipients};

/// Basic service information response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ServiceInfo {
    /// The name of the service
    pub service: String,
    /// The version of the service
    pub version: String,
}

impl Default for ServiceInfo {
    fn default() -> Self {
        Self {
            service: "report-scheduler".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
