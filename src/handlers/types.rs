//! Request and response DTOs for the admin API.
//!
//! Entities never cross the HTTP boundary directly: DTOs decode the JSON
//! columns into typed lists and keep `credentials_ref` out of responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::datasource::Model as DataSourceModel;
use crate::models::history_log::Model as HistoryLogModel;
use crate::models::report_definition::{Model as ReportDefinitionModel, ReportElement};
use crate::models::schedule::{Model as ScheduleModel, Recipients};

/// Datasource response payload; the credentials reference is write-only
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DataSourceDto {
    pub id: Uuid,
    pub name: String,
    pub kind: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    pub auth_kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DataSourceModel> for DataSourceDto {
    fn from(model: DataSourceModel) -> Self {
        Self {
            id: model.id,
            name: model.name,
            kind: model.kind,
            url: model.url,
            api_url: model.api_url,
            auth_kind: model.auth_kind,
            version: model.version,
            status: model.status,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

/// Datasource create/update request payload
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DataSourceRequestDto {
    pub name: String,
    pub kind: String,
    pub url: String,
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default = "default_auth_kind")]
    pub auth_kind: String,
    #[serde(default)]
    pub credentials_ref: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

fn default_auth_kind() -> String {
    "none".to_string()
}

/// Report definition response payload
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReportDefinitionDto {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub datasource_id: Uuid,
    pub time_range: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub space: Option<String>,
    pub elements: Vec<ReportElement>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ReportDefinitionModel> for ReportDefinitionDto {
    fn from(model: ReportDefinitionModel) -> Self {
        let elements = model.element_list();
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            datasource_id: model.datasource_id,
            time_range: model.time_range,
            space: model.space,
            elements,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

/// Report definition create/update request payload
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReportDefinitionRequestDto {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub datasource_id: Uuid,
    #[serde(default)]
    pub time_range: String,
    #[serde(default)]
    pub space: Option<String>,
    #[serde(default)]
    pub elements: Vec<ReportElement>,
}

/// Schedule response payload
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ScheduleDto {
    pub id: Uuid,
    pub name: String,
    pub cron_spec: String,
    pub timezone: String,
    pub recipients: Recipients,
    pub email_subject: String,
    pub email_body: String,
    pub report_ids: Vec<Uuid>,
    pub is_enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ScheduleModel> for ScheduleDto {
    fn from(model: ScheduleModel) -> Self {
        let recipients = model.recipient_lists();
        let report_ids = model.report_id_list();
        Self {
            id: model.id,
            name: model.name,
            cron_spec: model.cron_spec,
            timezone: model.timezone,
            recipients,
            email_subject: model.email_subject,
            email_body: model.email_body,
            report_ids,
            is_enabled: model.is_enabled,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

/// Schedule create/update request payload
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ScheduleRequestDto {
    pub name: String,
    pub cron_spec: String,
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default)]
    pub recipients: Recipients,
    #[serde(default)]
    pub email_subject: String,
    #[serde(default)]
    pub email_body: String,
    #[serde(default)]
    pub report_ids: Vec<Uuid>,
    #[serde(default = "default_enabled")]
    pub is_enabled: bool,
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_enabled() -> bool {
    true
}

/// History log response payload
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HistoryLogDto {
    pub id: Uuid,
    pub schedule_id: Uuid,
    pub schedule_name: String,
    pub trigger_time: DateTime<Utc>,
    pub execution_duration_ms: i64,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub recipients: Recipients,
    pub report_url: String,
}

impl From<HistoryLogModel> for HistoryLogDto {
    fn from(model: HistoryLogModel) -> Self {
        let recipients = Recipients::from_value(&model.recipients);
        Self {
            id: model.id,
            schedule_id: model.schedule_id,
            schedule_name: model.schedule_name,
            trigger_time: model.trigger_time.with_timezone(&Utc),
            execution_duration_ms: model.execution_duration_ms,
            status: model.status,
            error_message: model.error_message,
            recipients,
            report_url: model.report_url,
        }
    }
}

/// Response to a manual trigger or resend: the enqueued task's id
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TriggerResponseDto {
    pub message: String,
    pub task_id: String,
}

/// Plain confirmation message
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponseDto {
    pub message: String,
}
