//! # History API Handlers
//!
//! This module contains handlers for listing execution history and
//! resending from a past log entry.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::Utc;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::info;
use uuid::Uuid;

use crate::error::ApiError;
use crate::handlers::types::{HistoryLogDto, TriggerResponseDto};
use crate::queue::Task;
use crate::repositories::{HistoryRepository, ScheduleRepository};
use crate::server::AppState;

/// Query parameters for the history listing
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    schedule_id: Option<String>,
}

/// List history logs for one schedule, newest trigger time first
#[utoipa::path(
    get,
    path = "/api/v1/history",
    params(("schedule_id" = Uuid, Query, description = "Schedule to list history for")),
    responses(
        (status = 200, description = "History logs, trigger time descending", body = Vec<HistoryLogDto>),
        (status = 400, description = "Missing or invalid schedule_id", body = ApiError)
    ),
    tag = "history"
)]
pub async fn list_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<HistoryLogDto>>, ApiError> {
    let raw = query
        .schedule_id
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::validation("missing 'schedule_id' query parameter"))?;

    let schedule_id: Uuid = raw
        .parse()
        .map_err(|_| ApiError::validation(format!("'{raw}' is not a valid schedule id")))?;

    let logs = HistoryRepository::new(&state.db)
        .get_by_schedule_id(schedule_id)
        .await?;

    // an empty list serializes as [], never null
    Ok(Json(logs.into_iter().map(Into::into).collect()))
}

/// Re-enqueue the schedule behind a past history log
///
/// The synthesized task uses the schedule's *current* report id list, not
/// the list that was active when the original task ran.
#[utoipa::path(
    post,
    path = "/api/v1/history/{log_id}/resend",
    params(("log_id" = Uuid, Path, description = "History log id")),
    responses(
        (status = 202, description = "Resend task enqueued", body = TriggerResponseDto),
        (status = 404, description = "Log or originating schedule not found", body = ApiError)
    ),
    tag = "history"
)]
pub async fn resend_history_log(
    State(state): State<AppState>,
    Path(log_id): Path<Uuid>,
) -> Result<(StatusCode, Json<TriggerResponseDto>), ApiError> {
    let log = HistoryRepository::new(&state.db)
        .get_by_id(log_id)
        .await?
        .ok_or_else(|| ApiError::not_found("History log not found"))?;

    let schedule = ScheduleRepository::new(&state.db)
        .get_by_id(log.schedule_id)
        .await?
        .ok_or_else(|| {
            ApiError::not_found("Originating schedule not found; it may have been deleted")
        })?;

    let task = Task {
        id: format!("resend-{}-{}", log.id, Utc::now().timestamp()),
        schedule_id: schedule.id,
        report_ids: schedule.report_id_list(),
        created_at: Utc::now(),
    };
    let task_id = task.id.clone();
    info!(log_id = %log_id, task_id = %task_id, "Resending from history log");

    let cancel = CancellationToken::new();
    state
        .queue
        .enqueue(&cancel, task)
        .await
        .map_err(|err| ApiError::internal(format!("failed to enqueue resend task: {err}")))?;

    Ok((
        StatusCode::ACCEPTED,
        Json(TriggerResponseDto {
            message: "resend task enqueued".to_string(),
            task_id,
        }),
    ))
}
