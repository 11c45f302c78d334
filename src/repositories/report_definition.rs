//! # ReportDefinition Repository
//!
//! This module contains the repository implementation for ReportDefinition
//! entities. The elements list crosses this boundary as typed values and
//! is stored as JSON.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, IntoActiveModel, ModelTrait, Set,
};
use uuid::Uuid;

use crate::error::RepositoryError;
use crate::models::report_definition::{
    elements_to_value, ActiveModel as ReportDefinitionActiveModel, Entity as ReportDefinition,
    Model as ReportDefinitionModel, ReportElement,
};

/// Request data for creating a new report definition
#[derive(Debug, Clone)]
pub struct CreateReportDefinition {
    pub name: String,
    pub description: Option<String>,
    pub datasource_id: Uuid,
    pub time_range: String,
    pub space: Option<String>,
    pub elements: Vec<ReportElement>,
}

/// Request data for updating an existing report definition
#[derive(Debug, Clone)]
pub struct UpdateReportDefinition {
    pub name: String,
    pub description: Option<String>,
    pub datasource_id: Uuid,
    pub time_range: String,
    pub space: Option<String>,
    pub elements: Vec<ReportElement>,
}

/// Repository for ReportDefinition database operations
pub struct ReportDefinitionRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> ReportDefinitionRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(
        &self,
        request: CreateReportDefinition,
    ) -> Result<ReportDefinitionModel, RepositoryError> {
        validate_name(&request.name)?;

        let now = Utc::now();
        let report = ReportDefinitionActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name),
            description: Set(request.description),
            datasource_id: Set(request.datasource_id),
            time_range: Set(request.time_range),
            space: Set(request.space),
            elements: Set(elements_to_value(&request.elements)),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        report
            .insert(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn get_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<ReportDefinitionModel>, RepositoryError> {
        ReportDefinition::find_by_id(id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn list(&self) -> Result<Vec<ReportDefinitionModel>, RepositoryError> {
        ReportDefinition::find()
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateReportDefinition,
    ) -> Result<ReportDefinitionModel, RepositoryError> {
        validate_name(&request.name)?;

        let existing = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound("report definition".to_string()))?;

        let mut active = existing.into_active_model();
        active.name = Set(request.name);
        active.description = Set(request.description);
        active.datasource_id = Set(request.datasource_id);
        active.time_range = Set(request.time_range);
        active.space = Set(request.space);
        active.elements = Set(elements_to_value(&request.elements));
        active.updated_at = Set(Utc::now().into());

        active
            .update(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let existing = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound("report definition".to_string()))?;

        existing
            .delete(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(())
    }
}

fn validate_name(name: &str) -> Result<(), RepositoryError> {
    if name.trim().is_empty() {
        return Err(RepositoryError::validation_error(
            "report definition name cannot be empty",
        ));
    }
    Ok(())
}
