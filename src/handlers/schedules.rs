//! # Schedule API Handlers
//!
//! This module contains handlers for schedule CRUD and the manual trigger
//! endpoint. Triggering synthesizes a task from the schedule's current
//! state and enqueues it exactly like a cron fire would.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use tokio_util::sync::CancellationToken;
use tracing::info;
use uuid::Uuid;

use crate::error::ApiError;
use crate::handlers::types::{
    MessageResponseDto, ScheduleDto, ScheduleRequestDto, TriggerResponseDto,
};
use crate::queue::Task;
use crate::repositories::{CreateSchedule, ScheduleRepository, UpdateSchedule};
use crate::server::AppState;

/// List all schedules
#[utoipa::path(
    get,
    path = "/api/v1/schedules",
    responses(
        (status = 200, description = "All schedules", body = Vec<ScheduleDto>)
    ),
    tag = "schedules"
)]
pub async fn list_schedules(
    State(state): State<AppState>,
) -> Result<Json<Vec<ScheduleDto>>, ApiError> {
    let schedules = ScheduleRepository::new(&state.db).list().await?;
    Ok(Json(schedules.into_iter().map(Into::into).collect()))
}

/// Create a new schedule
///
/// A running scheduler is not reconfigured by this; new schedules start
/// firing after the next process start.
#[utoipa::path(
    post,
    path = "/api/v1/schedules",
    request_body = ScheduleRequestDto,
    responses(
        (status = 201, description = "Schedule created", body = ScheduleDto),
        (status = 400, description = "Validation failed", body = ApiError)
    ),
    tag = "schedules"
)]
pub async fn create_schedule(
    State(state): State<AppState>,
    Json(request): Json<ScheduleRequestDto>,
) -> Result<(StatusCode, Json<ScheduleDto>), ApiError> {
    let created = ScheduleRepository::new(&state.db)
        .create(CreateSchedule {
            name: request.name,
            cron_spec: request.cron_spec,
            timezone: request.timezone,
            recipients: request.recipients,
            email_subject: request.email_subject,
            email_body: request.email_body,
            report_ids: request.report_ids,
            is_enabled: request.is_enabled,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(created.into())))
}

/// Get a schedule by id
#[utoipa::path(
    get,
    path = "/api/v1/schedules/{id}",
    params(("id" = Uuid, Path, description = "Schedule id")),
    responses(
        (status = 200, description = "The schedule", body = ScheduleDto),
        (status = 404, description = "Schedule not found", body = ApiError)
    ),
    tag = "schedules"
)]
pub async fn get_schedule(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ScheduleDto>, ApiError> {
    let schedule = ScheduleRepository::new(&state.db)
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Schedule not found"))?;

    Ok(Json(schedule.into()))
}

/// Update a schedule
#[utoipa::path(
    put,
    path = "/api/v1/schedules/{id}",
    params(("id" = Uuid, Path, description = "Schedule id")),
    request_body = ScheduleRequestDto,
    responses(
        (status = 200, description = "Schedule updated", body = ScheduleDto),
        (status = 404, description = "Schedule not found", body = ApiError)
    ),
    tag = "schedules"
)]
pub async fn update_schedule(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ScheduleRequestDto>,
) -> Result<Json<ScheduleDto>, ApiError> {
    let updated = ScheduleRepository::new(&state.db)
        .update(
            id,
            UpdateSchedule {
                name: request.name,
                cron_spec: request.cron_spec,
                timezone: request.timezone,
                recipients: request.recipients,
                email_subject: request.email_subject,
                email_body: request.email_body,
                report_ids: request.report_ids,
                is_enabled: request.is_enabled,
            },
        )
        .await?;

    Ok(Json(updated.into()))
}

/// Delete a schedule
#[utoipa::path(
    delete,
    path = "/api/v1/schedules/{id}",
    params(("id" = Uuid, Path, description = "Schedule id")),
    responses(
        (status = 200, description = "Schedule deleted", body = MessageResponseDto),
        (status = 404, description = "Schedule not found", body = ApiError)
    ),
    tag = "schedules"
)]
pub async fn delete_schedule(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponseDto>, ApiError> {
    ScheduleRepository::new(&state.db).delete(id).await?;

    Ok(Json(MessageResponseDto {
        message: format!("schedule {id} deleted"),
    }))
}

/// Trigger a schedule on demand
#[utoipa::path(
    post,
    path = "/api/v1/schedules/{id}/trigger",
    params(("id" = Uuid, Path, description = "Schedule id")),
    responses(
        (status = 202, description = "Task enqueued", body = TriggerResponseDto),
        (status = 404, description = "Schedule not found", body = ApiError),
        (status = 500, description = "Queue rejected the task", body = ApiError)
    ),
    tag = "schedules"
)]
pub async fn trigger_schedule(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<TriggerResponseDto>), ApiError> {
    let schedule = ScheduleRepository::new(&state.db)
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Schedule not found"))?;

    let task = Task::dispatch(schedule.id, schedule.report_id_list());
    let task_id = task.id.clone();
    info!(schedule_id = %id, task_id = %task_id, "Manual trigger; enqueuing task");

    let cancel = CancellationToken::new();
    state
        .queue
        .enqueue(&cancel, task)
        .await
        .map_err(|err| ApiError::internal(format!("failed to enqueue task: {err}")))?;

    Ok((
        StatusCode::ACCEPTED,
        Json(TriggerResponseDto {
            message: "schedule triggered".to_string(),
            task_id,
        }),
    ))
}
