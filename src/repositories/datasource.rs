//! # DataSource Repository
//!
//! This module contains the repository implementation for DataSource
//! entities, providing CRUD operations plus the status transition used by
//! the validation endpoint.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, IntoActiveModel, ModelTrait, Set,
};
use uuid::Uuid;

use crate::error::RepositoryError;
use crate::models::datasource::{
    ActiveModel as DataSourceActiveModel, AuthKind, ConnectionStatus, DataSourceKind,
    Entity as DataSource, Model as DataSourceModel,
};

/// Request data for creating a new datasource
#[derive(Debug, Clone)]
pub struct CreateDataSource {
    pub name: String,
    pub kind: String,
    pub url: String,
    pub api_url: Option<String>,
    pub auth_kind: String,
    pub credentials_ref: Option<String>,
    pub version: Option<String>,
}

/// Request data for updating an existing datasource
#[derive(Debug, Clone)]
pub struct UpdateDataSource {
    pub name: String,
    pub kind: String,
    pub url: String,
    pub api_url: Option<String>,
    pub auth_kind: String,
    pub credentials_ref: Option<String>,
    pub version: Option<String>,
}

/// Repository for DataSource database operations
pub struct DataSourceRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> DataSourceRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a new datasource. Ids and timestamps are assigned here;
    /// status starts as `unverified`.
    pub async fn create(
        &self,
        request: CreateDataSource,
    ) -> Result<DataSourceModel, RepositoryError> {
        validate_fields(&request.name, &request.kind, &request.url, &request.auth_kind)?;

        let now = Utc::now();
        let datasource = DataSourceActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name),
            kind: Set(request.kind),
            url: Set(request.url),
            api_url: Set(request.api_url),
            auth_kind: Set(request.auth_kind),
            credentials_ref: Set(request.credentials_ref),
            version: Set(request.version),
            status: Set(ConnectionStatus::Unverified.as_str().to_string()),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        datasource
            .insert(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<DataSourceModel>, RepositoryError> {
        DataSource::find_by_id(id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn list(&self) -> Result<Vec<DataSourceModel>, RepositoryError> {
        DataSource::find()
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateDataSource,
    ) -> Result<DataSourceModel, RepositoryError> {
        validate_fields(&request.name, &request.kind, &request.url, &request.auth_kind)?;

        let existing = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound("datasource".to_string()))?;

        let mut active = existing.into_active_model();
        active.name = Set(request.name);
        active.kind = Set(request.kind);
        active.url = Set(request.url);
        active.api_url = Set(request.api_url);
        active.auth_kind = Set(request.auth_kind);
        active.credentials_ref = Set(request.credentials_ref);
        active.version = Set(request.version);
        active.updated_at = Set(Utc::now().into());

        active
            .update(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Record the outcome of a connectivity probe.
    pub async fn set_status(
        &self,
        id: Uuid,
        status: ConnectionStatus,
    ) -> Result<DataSourceModel, RepositoryError> {
        let existing = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound("datasource".to_string()))?;

        let mut active = existing.into_active_model();
        active.status = Set(status.as_str().to_string());
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
            .ok_or_else(|| RepositoryError::NotFound("datasource".to_string()))?;

        existing
            .delete(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(())
    }
}

fn validate_fields(
    name: &str,
    kind: &str,
    url: &str,
    auth_kind: &str,
) -> Result<(), RepositoryError> {
    if name.trim().is_empty() {
        return Err(RepositoryError::validation_error(
            "datasource name cannot be empty",
        ));
    }
    if DataSourceKind::parse(kind).is_none() {
        return Err(RepositoryError::validation_error(format!(
            "unknown datasource kind '{kind}'"
        )));
    }
    if url.trim().is_empty() {
        return Err(RepositoryError::validation_error(
            "datasource url cannot be empty",
        ));
    }
    if AuthKind::parse(auth_kind).is_none() {
        return Err(RepositoryError::validation_error(format!(
            "unknown auth kind '{auth_kind}'"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::Database;

    async fn setup_test_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        db
    }

    fn create_request() -> CreateDataSource {
        CreateDataSource {
            name: "Kibana Prod".to_string(),
            kind: "kibana".to_string(),
            url: "https://kibana.example.com".to_string(),
            api_url: None,
            auth_kind: "api_token".to_string(),
            credentials_ref: Some("kv/report-scheduler/kibana-prod".to_string()),
            version: Some("8.14.0".to_string()),
        }
    }

    #[tokio::test]
    async fn create_assigns_id_and_unverified_status() {
        let db = setup_test_db().await;
        let repo = DataSourceRepository::new(&db);

        let created = repo.create(create_request()).await.unwrap();
        assert_eq!(created.status, "unverified");
        assert_eq!(created.name, "Kibana Prod");
        assert!(created.created_at.timestamp() > 0);

        let found = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(found, created);
    }

    #[tokio::test]
    async fn create_rejects_unknown_kind_and_auth() {
        let db = setup_test_db().await;
        let repo = DataSourceRepository::new(&db);

        let mut request = create_request();
        request.kind = "powerbi".to_string();
        assert!(matches!(
            repo.create(request).await,
            Err(RepositoryError::Validation(_))
        ));

        let mut request = create_request();
        request.auth_kind = "kerberos".to_string();
        assert!(matches!(
            repo.create(request).await,
            Err(RepositoryError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn update_replaces_fields_and_bumps_updated_at() {
        let db = setup_test_db().await;
        let repo = DataSourceRepository::new(&db);

        let created = repo.create(create_request()).await.unwrap();
        let updated = repo
            .update(
                created.id,
                UpdateDataSource {
                    name: "Kibana Staging".to_string(),
                    kind: "kibana".to_string(),
                    url: "https://staging.example.com".to_string(),
                    api_url: None,
                    auth_kind: "none".to_string(),
                    credentials_ref: None,
                    version: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.name, "Kibana Staging");
        assert_eq!(updated.auth_kind, "none");
    }

    #[tokio::test]
    async fn set_status_records_probe_outcome() {
        let db = setup_test_db().await;
        let repo = DataSourceRepository::new(&db);

        let created = repo.create(create_request()).await.unwrap();
        let verified = repo
            .set_status(created.id, ConnectionStatus::Verified)
            .await
            .unwrap();
        assert_eq!(verified.status, "verified");
    }

    #[tokio::test]
    async fn delete_removes_the_row() {
        let db = setup_test_db().await;
        let repo = DataSourceRepository::new(&db);

        let created = repo.create(create_request()).await.unwrap();
        repo.delete(created.id).await.unwrap();
        assert!(repo.get_by_id(created.id).await.unwrap().is_none());

        assert!(matches!(
            repo.delete(created.id).await,
            Err(RepositoryError::NotFound(_))
        ));
    }
}
