//! # Report Definition API Handlers
//!
//! This module contains handlers for report definition CRUD.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use uuid::Uuid;

use crate::error::ApiError;
use crate::handlers::types::{MessageResponseDto, ReportDefinitionDto, ReportDefinitionRequestDto};
use crate::repositories::{
    CreateReportDefinition, ReportDefinitionRepository, UpdateReportDefinition,
};
use crate::server::AppState;

/// List all report definitions
#[utoipa::path(
    get,
    path = "/api/v1/reports",
    responses(
        (status = 200, description = "All report definitions", body = Vec<ReportDefinitionDto>)
    ),
    tag = "reports"
)]
pub async fn list_reports(
    State(state): State<AppState>,
) -> Result<Json<Vec<ReportDefinitionDto>>, ApiError> {
    let reports = ReportDefinitionRepository::new(&state.db).list().await?;
    Ok(Json(reports.into_iter().map(Into::into).collect()))
}

/// Create a new report definition
#[utoipa::path(
    post,
    path = "/api/v1/reports",
    request_body = ReportDefinitionRequestDto,
    responses(
        (status = 201, description = "Report definition created", body = ReportDefinitionDto),
        (status = 400, description = "Validation failed", body = ApiError)
    ),
    tag = "reports"
)]
pub async fn create_report(
    State(state): State<AppState>,
    Json(request): Json<ReportDefinitionRequestDto>,
) -> Result<(StatusCode, Json<ReportDefinitionDto>), ApiError> {
    let created = ReportDefinitionRepository::new(&state.db)
        .create(CreateReportDefinition {
            name: request.name,
            description: request.description,
            datasource_id: request.datasource_id,
            time_range: request.time_range,
            space: request.space,
            elements: request.elements,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(created.into())))
}

/// Get a report definition by id
#[utoipa::path(
    get,
    path = "/api/v1/reports/{id}",
    params(("id" = Uuid, Path, description = "Report definition id")),
    responses(
        (status = 200, description = "The report definition", body = ReportDefinitionDto),
        (status = 404, description = "Report definition not found", body = ApiError)
    ),
    tag = "reports"
)]
pub async fn get_report(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ReportDefinitionDto>, ApiError> {
    let report = ReportDefinitionRepository::new(&state.db)
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Report definition not found"))?;

    Ok(Json(report.into()))
}

/// Update a report definition
#[utoipa::path(
    put,
    path = "/api/v1/reports/{id}",
    params(("id" = Uuid, Path, description = "Report definition id")),
    request_body = ReportDefinitionRequestDto,
    responses(
        (status = 200, description = "Report definition updated", body = ReportDefinitionDto),
        (status = 404, description = "Report definition not found", body = ApiError)
    ),
    tag = "reports"
)]
pub async fn update_report(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ReportDefinitionRequestDto>,
) -> Result<Json<ReportDefinitionDto>, ApiError> {
    let updated = ReportDefinitionRepository::new(&state.db)
        .update(
            id,
            UpdateReportDefinition {
                name: request.name,
                description: request.description,
                datasource_id: request.datasource_id,
                time_range: request.time_range,
                space: request.space,
                elements: request.elements,
            },
        )
        .await?;

    Ok(Json(updated.into()))
}

/// Delete a report definition
#[utoipa::path(
    delete,
    path = "/api/v1/reports/{id}",
    params(("id" = Uuid, Path, description = "Report definition id")),
    responses(
        (status = 200, description = "Report definition deleted", body = MessageResponseDto),
        (status = 404, description = "Report definition not found", body = ApiError)
    ),
    tag = "reports"
)]
pub async fn delete_report(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponseDto>, ApiError> {
    ReportDefinitionRepository::new(&state.db).delete(id).await?;

    Ok(Json(MessageResponseDto {
        message: format!("report definition {id} deleted"),
    }))
}
