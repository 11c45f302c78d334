//! Router-level tests for the admin API.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use migration::{Migrator, MigratorTrait};
use sea_orm::Database;
use serde_json::{json, Value as JsonValue};
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;
use uuid::Uuid;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::handlers::types::{
    DataSourceDto, HistoryLogDto, ReportDefinitionDto, ScheduleDto, TriggerResponseDto,
};
use crate::models::history_log::LogStatus;
use crate::models::report_definition::{ReportElement, ReportElementKind};
use crate::models::schedule::Recipients;
use crate::queue::TaskQueue;
use crate::repositories::{CreateSchedule, HistoryRepository, NewHistoryLog, ScheduleRepository};
use crate::server::{create_app, AppState};

async fn setup_test_app() -> (AppState, Router) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    Migrator::up(&db, None).await.unwrap();

    let state = AppState::new(db, Arc::new(TaskQueue::new(10)));
    let app = create_app(state.clone());
    (state, app)
}

async fn send_json(app: &Router, method: &str, uri: &str, body: Option<JsonValue>) -> (StatusCode, JsonValue) {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json");

    let request = match body {
        Some(value) => builder.body(Body::from(value.to_string())).unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        JsonValue::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn seed_schedule(state: &AppState, report_ids: Vec<Uuid>) -> Uuid {
    ScheduleRepository::new(&state.db)
        .create(CreateSchedule {
            name: "Weekly digest".to_string(),
            cron_spec: "0 0 8 * * Mon".to_string(),
            timezone: "UTC".to_string(),
            recipients: Recipients {
                to: vec!["ops@example.com".to_string()],
                cc: Vec::new(),
                bcc: Vec::new(),
            },
            email_subject: String::new(),
            email_body: String::new(),
            report_ids,
            is_enabled: true,
        })
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn root_returns_service_info() {
    let (_state, app) = setup_test_app().await;
    let (status, body) = send_json(&app, "GET", "/", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["service"], "report-scheduler");
}

#[tokio::test]
async fn datasource_crud_roundtrip() {
    let (_state, app) = setup_test_app().await;

    let (status, created) = send_json(
        &app,
        "POST",
        "/api/v1/datasources",
        Some(json!({
            "name": "Kibana Prod",
            "kind": "kibana",
            "url": "https://kibana.example.com",
            "auth_kind": "api_token",
            "credentials_ref": "kv/report-scheduler/kibana-prod"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let created: DataSourceDto = serde_json::from_value(created.clone()).unwrap();
    assert_eq!(created.status, "unverified");

    // the credentials reference never appears in responses
    let (_, raw) = send_json(
        &app,
        "GET",
        &format!("/api/v1/datasources/{}", created.id),
        None,
    )
    .await;
    assert!(raw.get("credentials_ref").is_none());
    assert_eq!(raw["name"], "Kibana Prod");

    let (status, list) = send_json(&app, "GET", "/api/v1/datasources", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);

    let (status, updated) = send_json(
        &app,
        "PUT",
        &format!("/api/v1/datasources/{}", created.id),
        Some(json!({
            "name": "Kibana Staging",
            "kind": "kibana",
            "url": "https://staging.example.com",
            "auth_kind": "none"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Kibana Staging");

    let (status, _) = send_json(
        &app,
        "DELETE",
        &format!("/api/v1/datasources/{}", created.id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send_json(
        &app,
        "GET",
        &format!("/api/v1/datasources/{}", created.id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn datasource_with_unknown_kind_is_rejected() {
    let (_state, app) = setup_test_app().await;

    let (status, body) = send_json(
        &app,
        "POST",
        "/api/v1/datasources",
        Some(json!({
            "name": "PowerBI",
            "kind": "powerbi",
            "url": "https://powerbi.example.com"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_FAILED");
}

#[tokio::test]
async fn validate_marks_reachable_datasource_verified() {
    let (_state, app) = setup_test_app().await;
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let (_, created) = send_json(
        &app,
        "POST",
        "/api/v1/datasources",
        Some(json!({
            "name": "Kibana",
            "kind": "kibana",
            "url": server.uri()
        })),
    )
    .await;

    let (status, validated) = send_json(
        &app,
        "POST",
        &format!("/api/v1/datasources/{}/validate", created["id"].as_str().unwrap()),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(validated["status"], "verified");
}

#[tokio::test]
async fn validate_marks_failing_datasource_errored() {
    let (_state, app) = setup_test_app().await;
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let (_, created) = send_json(
        &app,
        "POST",
        "/api/v1/datasources",
        Some(json!({
            "name": "Kibana",
            "kind": "kibana",
            "url": server.uri()
        })),
    )
    .await;
    let id = created["id"].as_str().unwrap().to_string();

    let (status, body) = send_json(
        &app,
        "POST",
        &format!("/api/v1/datasources/{id}/validate"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["code"], "DATASOURCE_UNREACHABLE");

    let (_, fetched) = send_json(&app, "GET", &format!("/api/v1/datasources/{id}"), None).await;
    assert_eq!(fetched["status"], "error");
}

#[tokio::test]
async fn report_definition_crud_roundtrip() {
    let (_state, app) = setup_test_app().await;
    let datasource_id = Uuid::new_v4();

    let (status, created) = send_json(
        &app,
        "POST",
        "/api/v1/reports",
        Some(json!({
            "name": "Weekly Overview",
            "datasource_id": datasource_id,
            "time_range": "now-7d",
            "elements": [
                {"id": "dash-1", "kind": "dashboard", "title": "Overview"},
                {"id": "viz-1", "kind": "visualization", "title": ""}
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let created: ReportDefinitionDto = serde_json::from_value(created).unwrap();
    assert_eq!(created.elements.len(), 2);
    assert_eq!(
        created.elements[0],
        ReportElement {
            id: "dash-1".to_string(),
            kind: ReportElementKind::Dashboard,
            title: "Overview".to_string(),
        }
    );

    let (status, fetched) = send_json(
        &app,
        "GET",
        &format!("/api/v1/reports/{}", created.id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let fetched: ReportDefinitionDto = serde_json::from_value(fetched).unwrap();
    assert_eq!(fetched.time_range, "now-7d");

    let (status, _) = send_json(
        &app,
        "DELETE",
        &format!("/api/v1/reports/{}", created.id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn schedule_create_and_fetch() {
    let (_state, app) = setup_test_app().await;
    let report_id = Uuid::new_v4();

    let (status, created) = send_json(
        &app,
        "POST",
        "/api/v1/schedules",
        Some(json!({
            "name": "Nightly",
            "cron_spec": "0 0 2 * * *",
            "recipients": {"to": ["ops@example.com"]},
            "report_ids": [report_id]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let created: ScheduleDto = serde_json::from_value(created).unwrap();
    assert!(created.is_enabled);
    assert_eq!(created.timezone, "UTC");
    assert_eq!(created.report_ids, vec![report_id]);

    let (status, _) = send_json(
        &app,
        "GET",
        &format!("/api/v1/schedules/{}", created.id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send_json(
        &app,
        "GET",
        &format!("/api/v1/schedules/{}", Uuid::new_v4()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn trigger_enqueues_one_task_with_current_report_ids() {
    let (state, app) = setup_test_app().await;
    let report_ids = vec![Uuid::new_v4(), Uuid::new_v4()];
    let schedule_id = seed_schedule(&state, report_ids.clone()).await;

    let (status, body) = send_json(
        &app,
        "POST",
        &format!("/api/v1/schedules/{schedule_id}/trigger"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);

    let response: TriggerResponseDto = serde_json::from_value(body).unwrap();
    assert!(!response.task_id.is_empty());

    let cancel = CancellationToken::new();
    let task = state.queue.dequeue(&cancel).await.unwrap();
    assert_eq!(task.id, response.task_id);
    assert_eq!(task.schedule_id, schedule_id);
    assert_eq!(task.report_ids, report_ids);

    // exactly one task was enqueued
    state.queue.close();
    assert!(state.queue.dequeue(&cancel).await.is_err());
}

#[tokio::test]
async fn trigger_unknown_schedule_is_not_found() {
    let (_state, app) = setup_test_app().await;

    let (status, body) = send_json(
        &app,
        "POST",
        &format!("/api/v1/schedules/{}/trigger", Uuid::new_v4()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn history_requires_a_schedule_id() {
    let (_state, app) = setup_test_app().await;

    let (status, body) = send_json(&app, "GET", "/api/v1/history", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_FAILED");

    let (status, _) = send_json(&app, "GET", "/api/v1/history?schedule_id=oops", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn history_returns_empty_array_not_null() {
    let (_state, app) = setup_test_app().await;

    let (status, body) = send_json(
        &app,
        "GET",
        &format!("/api/v1/history?schedule_id={}", Uuid::new_v4()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn history_is_ordered_by_trigger_time_descending() {
    let (state, app) = setup_test_app().await;
    let schedule_id = seed_schedule(&state, Vec::new()).await;
    let repo = HistoryRepository::new(&state.db);
    let t = Utc::now();

    for offset in [1i64, 0, 2] {
        repo.create(NewHistoryLog {
            schedule_id,
            schedule_name: "Weekly digest".to_string(),
            trigger_time: t + Duration::seconds(offset),
            execution_duration_ms: 10,
            status: LogStatus::Success,
            error_message: None,
            recipients: Recipients::default(),
            report_url: String::new(),
        })
        .await
        .unwrap();
    }

    let (status, body) = send_json(
        &app,
        "GET",
        &format!("/api/v1/history?schedule_id={schedule_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let logs: Vec<HistoryLogDto> = serde_json::from_value(body).unwrap();
    let times: Vec<i64> = logs.iter().map(|l| l.trigger_time.timestamp()).collect();
    assert_eq!(
        times,
        vec![
            (t + Duration::seconds(2)).timestamp(),
            (t + Duration::seconds(1)).timestamp(),
            t.timestamp(),
        ]
    );
}

#[tokio::test]
async fn resend_enqueues_a_task_with_the_resend_id_pattern() {
    let (state, app) = setup_test_app().await;
    let report_ids = vec![Uuid::new_v4()];
    let schedule_id = seed_schedule(&state, report_ids.clone()).await;

    let log = HistoryRepository::new(&state.db)
        .create(NewHistoryLog {
            schedule_id,
            schedule_name: "Weekly digest".to_string(),
            trigger_time: Utc::now(),
            execution_duration_ms: 10,
            status: LogStatus::Success,
            error_message: None,
            recipients: Recipients::default(),
            report_url: String::new(),
        })
        .await
        .unwrap();

    let (status, body) = send_json(
        &app,
        "POST",
        &format!("/api/v1/history/{}/resend", log.id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);

    let response: TriggerResponseDto = serde_json::from_value(body).unwrap();
    assert!(response.task_id.starts_with(&format!("resend-{}-", log.id)));

    let cancel = CancellationToken::new();
    let task = state.queue.dequeue(&cancel).await.unwrap();
    assert_eq!(task.id, response.task_id);
    // resend uses the schedule's current report list
    assert_eq!(task.report_ids, report_ids);
}

#[tokio::test]
async fn resend_without_log_or_schedule_is_not_found() {
    let (state, app) = setup_test_app().await;

    let (status, _) = send_json(
        &app,
        "POST",
        &format!("/api/v1/history/{}/resend", Uuid::new_v4()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // a log whose schedule has been deleted cannot be resent
    let schedule_id = seed_schedule(&state, Vec::new()).await;
    let log = HistoryRepository::new(&state.db)
        .create(NewHistoryLog {
            schedule_id,
            schedule_name: "Weekly digest".to_string(),
            trigger_time: Utc::now(),
            execution_duration_ms: 10,
            status: LogStatus::Success,
            error_message: None,
            recipients: Recipients::default(),
            report_url: String::new(),
        })
        .await
        .unwrap();
    ScheduleRepository::new(&state.db)
        .delete(schedule_id)
        .await
        .unwrap();

    let (status, _) = send_json(
        &app,
        "POST",
        &format!("/api/v1/history/{}/resend", log.id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
