//! Schedule entity model
//!
//! This module contains the SeaORM entity model for the schedules table.
//! A schedule binds a cron specification to an ordered report id list and
//! delivery metadata. Recipients and report ids are JSON columns; the
//! timezone field is stored for operators but the cron engine evaluates
//! in UTC.

use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::warn;
use utoipa::ToSchema;
use uuid::Uuid;

/// Schedule entity binding a cron spec to reports and recipients
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "schedules")]
pub struct Model {
    /// Unique identifier for the schedule (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Six-field seconds-resolution cron spec, or "@every <duration>"
    pub cron_spec: String,

    /// Advisory timezone label
    pub timezone: String,

    /// Email recipients, stored as JSON
    #[sea_orm(column_type = "JsonBinary")]
    pub recipients: JsonValue,

    /// Subject template for the (not yet implemented) email dispatch
    pub email_subject: String,

    /// Body template for the (not yet implemented) email dispatch
    pub email_body: String,

    /// Ordered report definition ids, stored as JSON
    #[sea_orm(column_type = "JsonBinary")]
    pub report_ids: JsonValue,

    /// Disabled schedules are never registered with the cron engine
    pub is_enabled: bool,

    /// Timestamp when the schedule was created
    pub created_at: DateTimeWithTimeZone,

    /// Timestamp when the schedule was last updated
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Decoded recipients, defaulting to empty lists on malformed JSON.
    pub fn recipient_lists(&self) -> Recipients {
        Recipients::from_value(&self.recipients)
    }

    /// Decoded report id list, empty on malformed JSON.
    pub fn report_id_list(&self) -> Vec<Uuid> {
        report_ids_from_value(&self.report_ids)
    }
}

/// Email recipients of a schedule's rendered reports
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Recipients {
    #[serde(default)]
    pub to: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cc: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bcc: Vec<String>,
}

impl Recipients {
    /// Parse a recipients JSON column, falling back to defaults on errors.
    pub fn from_value(value: &JsonValue) -> Self {
        serde_json::from_value(value.clone()).unwrap_or_else(|err| {
            warn!(error = %err, "Failed to parse recipients column; using empty recipients");
            Self::default()
        })
    }

    /// Serialize into the JSON column representation.
    pub fn to_value(&self) -> JsonValue {
        serde_json::to_value(self)
            .unwrap_or_else(|_| JsonValue::Object(serde_json::Map::new()))
    }
}

/// Parse a report id JSON column, dropping entries that are not UUIDs.
pub fn report_ids_from_value(value: &JsonValue) -> Vec<Uuid> {
    serde_json::from_value(value.clone()).unwrap_or_else(|err| {
        warn!(error = %err, "Failed to parse report id column; treating as empty");
        Vec::new()
    })
}

/// Serialize a report id list into its JSON column representation.
pub fn report_ids_to_value(ids: &[Uuid]) -> JsonValue {
    serde_json::to_value(ids).unwrap_or_else(|_| JsonValue::Array(Vec::new()))
}
