//! # DataSource API Handlers
//!
//! This module contains handlers for datasource CRUD and the connectivity
//! validation endpoint.

use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use tracing::warn;
use uuid::Uuid;

use crate::error::ApiError;
use crate::handlers::types::{DataSourceDto, DataSourceRequestDto, MessageResponseDto};
use crate::models::datasource::ConnectionStatus;
use crate::repositories::{CreateDataSource, DataSourceRepository, UpdateDataSource};
use crate::server::AppState;

/// Probe deadline for the validation endpoint.
const VALIDATE_TIMEOUT: Duration = Duration::from_secs(10);

/// List all datasources
#[utoipa::path(
    get,
    path = "/api/v1/datasources",
    responses(
        (status = 200, description = "All datasources", body = Vec<DataSourceDto>)
    ),
    tag = "datasources"
)]
pub async fn list_datasources(
    State(state): State<AppState>,
) -> Result<Json<Vec<DataSourceDto>>, ApiError> {
    let datasources = DataSourceRepository::new(&state.db).list().await?;
    Ok(Json(datasources.into_iter().map(Into::into).collect()))
}

/// Create a new datasource
#[utoipa::path(
    post,
    path = "/api/v1/datasources",
    request_body = DataSourceRequestDto,
    responses(
        (status = 201, description = "Datasource created", body = DataSourceDto),
        (status = 400, description = "Validation failed", body = ApiError)
    ),
    tag = "datasources"
)]
pub async fn create_datasource(
    State(state): State<AppState>,
    Json(request): Json<DataSourceRequestDto>,
) -> Result<(StatusCode, Json<DataSourceDto>), ApiError> {
    let created = DataSourceRepository::new(&state.db)
        .create(CreateDataSource {
            name: request.name,
            kind: request.kind,
            url: request.url,
            api_url: request.api_url,
            auth_kind: request.auth_kind,
            credentials_ref: request.credentials_ref,
            version: request.version,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(created.into())))
}

/// Get a datasource by id
#[utoipa::path(
    get,
    path = "/api/v1/datasources/{id}",
    params(("id" = Uuid, Path, description = "Datasource id")),
    responses(
        (status = 200, description = "The datasource", body = DataSourceDto),
        (status = 404, description = "Datasource not found", body = ApiError)
    ),
    tag = "datasources"
)]
pub async fn get_datasource(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DataSourceDto>, ApiError> {
    let datasource = DataSourceRepository::new(&state.db)
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Datasource not found"))?;

    Ok(Json(datasource.into()))
}

/// Update a datasource
#[utoipa::path(
    put,
    path = "/api/v1/datasources/{id}",
    params(("id" = Uuid, Path, description = "Datasource id")),
    request_body = DataSourceRequestDto,
    responses(
        (status = 200, description = "Datasource updated", body = DataSourceDto),
        (status = 404, description = "Datasource not found", body = ApiError)
    ),
    tag = "datasources"
)]
pub async fn update_datasource(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<DataSourceRequestDto>,
) -> Result<Json<DataSourceDto>, ApiError> {
    let updated = DataSourceRepository::new(&state.db)
        .update(
            id,
            UpdateDataSource {
                name: request.name,
                kind: request.kind,
                url: request.url,
                api_url: request.api_url,
                auth_kind: request.auth_kind,
                credentials_ref: request.credentials_ref,
                version: request.version,
            },
        )
        .await?;

    Ok(Json(updated.into()))
}

/// Delete a datasource
#[utoipa::path(
    delete,
    path = "/api/v1/datasources/{id}",
    params(("id" = Uuid, Path, description = "Datasource id")),
    responses(
        (status = 200, description = "Datasource deleted", body = MessageResponseDto),
        (status = 404, description = "Datasource not found", body = ApiError)
    ),
    tag = "datasources"
)]
pub async fn delete_datasource(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponseDto>, ApiError> {
    DataSourceRepository::new(&state.db).delete(id).await?;

    Ok(Json(MessageResponseDto {
        message: format!("datasource {id} deleted"),
    }))
}

/// Probe a datasource's URL and record the outcome in its status
#[utoipa::path(
    post,
    path = "/api/v1/datasources/{id}/validate",
    params(("id" = Uuid, Path, description = "Datasource id")),
    responses(
        (status = 200, description = "Datasource reachable; status set to verified", body = DataSourceDto),
        (status = 404, description = "Datasource not found", body = ApiError),
        (status = 502, description = "Datasource unreachable; status set to error", body = ApiError)
    ),
    tag = "datasources"
)]
pub async fn validate_datasource(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DataSourceDto>, ApiError> {
    let repo = DataSourceRepository::new(&state.db);
    let datasource = repo
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Datasource not found"))?;

    let reachable = match state
        .http
        .get(&datasource.url)
        .timeout(VALIDATE_TIMEOUT)
        .send()
        .await
    {
        Ok(response) => response.status() == reqwest::StatusCode::OK,
        Err(err) => {
            warn!(datasource_id = %id, error = %err, "Datasource probe failed");
            false
        }
    };

    if !reachable {
        repo.set_status(id, ConnectionStatus::Error).await?;
        return Err(ApiError::new(
            StatusCode::BAD_GATEWAY,
            "DATASOURCE_UNREACHABLE",
            "validation failed: datasource did not answer with 200",
        ));
    }

    let verified = repo.set_status(id, ConnectionStatus::Verified).await?;
    Ok(Json(verified.into()))
}
