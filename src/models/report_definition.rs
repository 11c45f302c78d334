//! ReportDefinition entity model
//!
//! This module contains the SeaORM entity model for the report_definitions
//! table. A report definition names an ordered list of renderable elements
//! against a single datasource; the list lives in a JSON column and is
//! decoded through [`elements_from_value`].

use std::fmt;

use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::warn;
use utoipa::ToSchema;
use uuid::Uuid;

use super::datasource::Entity as DataSource;

/// ReportDefinition entity representing a renderable report bundle
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "report_definitions")]
pub struct Model {
    /// Unique identifier for the report definition (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Optional free-form description
    pub description: Option<String>,

    /// Datasource this report is rendered against
    pub datasource_id: Uuid,

    /// Relative time range specifier (e.g. "now-7d"); empty for none
    pub time_range: String,

    /// Optional Kibana space identifier
    pub space: Option<String>,

    /// Ordered list of report elements, stored as JSON
    #[sea_orm(column_type = "JsonBinary")]
    pub elements: JsonValue,

    /// Timestamp when the report definition was created
    pub created_at: DateTimeWithTimeZone,

    /// Timestamp when the report definition was last updated
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "DataSource",
        from = "Column::DatasourceId",
        to = "super::datasource::Column::Id"
    )]
    DataSource,
}

impl Related<DataSource> for Entity {
    fn to() -> RelationDef {
        Relation::DataSource.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Decoded elements list, empty on malformed JSON.
    pub fn element_list(&self) -> Vec<ReportElement> {
        elements_from_value(&self.elements)
    }
}

/// One renderable unit inside a report definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ReportElement {
    /// Identifier of the element inside the BI system
    pub id: String,
    /// Element kind
    pub kind: ReportElementKind,
    /// Display title
    #[serde(default)]
    pub title: String,
}

/// Kind of a report element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReportElementKind {
    Dashboard,
    Visualization,
    SavedSearch,
}

impl ReportElementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportElementKind::Dashboard => "dashboard",
            ReportElementKind::Visualization => "visualization",
            ReportElementKind::SavedSearch => "saved_search",
        }
    }
}

impl fmt::Display for ReportElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse an elements JSON column, falling back to an empty list on errors.
pub fn elements_from_value(value: &JsonValue) -> Vec<ReportElement> {
    serde_json::from_value(value.clone()).unwrap_or_else(|err| {
        warn!(error = %err, "Failed to parse report elements column; treating as empty");
        Vec::new()
    })
}

/// Serialize an elements list into its JSON column representation.
pub fn elements_to_value(elements: &[ReportElement]) -> JsonValue {
    serde_json::to_value(elements).unwrap_or_else(|_| JsonValue::Array(Vec::new()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn elements_round_trip() {
        let elements = vec![
            ReportElement {
                id: "dash-1".to_string(),
                kind: ReportElementKind::Dashboard,
                title: "Overview".to_string(),
            },
            ReportElement {
                id: "viz-2".to_string(),
                kind: ReportElementKind::Visualization,
                title: String::new(),
            },
        ];

        let value = elements_to_value(&elements);
        assert_eq!(elements_from_value(&value), elements);
    }

    #[test]
    fn malformed_elements_decode_to_empty() {
        assert!(elements_from_value(&json!({"not": "a list"})).is_empty());
        assert!(elements_from_value(&json!([{"kind": "dashboard"}])).is_empty());
    }

    #[test]
    fn element_kind_uses_snake_case() {
        let value = serde_json::to_value(ReportElementKind::SavedSearch).unwrap();
        assert_eq!(value, json!("saved_search"));
    }
}
