//! DataSource entity model
//!
//! This module contains the SeaORM entity model for the datasources table,
//! which represents an external BI endpoint (Kibana or Grafana) the engine
//! renders reports against.

use std::fmt;

use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// DataSource entity representing a configured BI endpoint
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "datasources")]
pub struct Model {
    /// Unique identifier for the datasource (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Kind of BI system ("kibana" or "grafana")
    pub kind: String,

    /// Base URL of the BI system
    pub url: String,

    /// Optional dedicated API URL
    pub api_url: Option<String>,

    /// Auth mode ("none", "basic_auth", "api_token")
    pub auth_kind: String,

    /// Opaque reference handed to the secrets manager; never serialized
    /// on the API surface
    pub credentials_ref: Option<String>,

    /// Upstream version string, if known
    pub version: Option<String>,

    /// Connection status ("verified", "unverified", "error")
    pub status: String,

    /// Timestamp when the datasource was created
    pub created_at: DateTimeWithTimeZone,

    /// Timestamp when the datasource was last updated
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Parsed auth kind, defaulting to no authentication on unknown values.
    pub fn parsed_auth_kind(&self) -> AuthKind {
        AuthKind::parse(&self.auth_kind).unwrap_or(AuthKind::None)
    }
}

/// Kind of BI system a datasource points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSourceKind {
    Kibana,
    Grafana,
}

impl DataSourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataSourceKind::Kibana => "kibana",
            DataSourceKind::Grafana => "grafana",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "kibana" => Some(DataSourceKind::Kibana),
            "grafana" => Some(DataSourceKind::Grafana),
            _ => None,
        }
    }
}

impl fmt::Display for DataSourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the engine authenticates against a datasource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthKind {
    None,
    BasicAuth,
    ApiToken,
}

impl AuthKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthKind::None => "none",
            AuthKind::BasicAuth => "basic_auth",
            AuthKind::ApiToken => "api_token",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "none" => Some(AuthKind::None),
            "basic_auth" => Some(AuthKind::BasicAuth),
            "api_token" => Some(AuthKind::ApiToken),
            _ => None,
        }
    }
}

impl fmt::Display for AuthKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Last known connection state of a datasource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    Verified,
    Unverified,
    Error,
}

impl ConnectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionStatus::Verified => "verified",
            ConnectionStatus::Unverified => "unverified",
            ConnectionStatus::Error => "error",
        }
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
