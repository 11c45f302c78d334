//! # API Handlers
//!
//! This module contains all the HTTP endpoint handlers for the report
//! scheduler's admin API.

use axum::response::Json;

use crate::models::ServiceInfo;

pub mod datasources;
pub mod history;
pub mod reports;
pub mod schedules;
pub mod types;

/// Root handler that returns basic service information
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service information", body = ServiceInfo)
    ),
    tag = "root"
)]
pub async fn root() -> Json<ServiceInfo> {
    Json(ServiceInfo::default())
}

#[cfg(test)]
mod tests;
