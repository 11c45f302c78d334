//! # Schedule Repository
//!
//! This module contains the repository implementation for Schedule
//! entities. Cron specs are stored as given; validation happens when the
//! scheduler registers them, so a schedule with a bad spec can exist and
//! simply never fires.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, IntoActiveModel, ModelTrait, Set,
};
use uuid::Uuid;

use crate::error::RepositoryError;
use crate::models::schedule::{
    report_ids_to_value, ActiveModel as ScheduleActiveModel, Entity as Schedule,
    Model as ScheduleModel, Recipients,
};

/// Request data for creating a new schedule
#[derive(Debug, Clone)]
pub struct CreateSchedule {
    pub name: String,
    pub cron_spec: String,
    pub timezone: String,
    pub recipients: Recipients,
    pub email_subject: String,
    pub email_body: String,
    pub report_ids: Vec<Uuid>,
    pub is_enabled: bool,
}

/// Request data for updating an existing schedule
#[derive(Debug, Clone)]
pub struct UpdateSchedule {
    pub name: String,
    pub cron_spec: String,
    pub timezone: String,
    pub recipients: Recipients,
    pub email_subject: String,
    pub email_body: String,
    pub report_ids: Vec<Uuid>,
    pub is_enabled: bool,
}

/// Repository for Schedule database operations
pub struct ScheduleRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> ScheduleRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(&self, request: CreateSchedule) -> Result<ScheduleModel, RepositoryError> {
        validate_fields(&request.name, &request.cron_spec)?;

        let now = Utc::now();
        let schedule = ScheduleActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name),
            cron_spec: Set(request.cron_spec),
            timezone: Set(request.timezone),
            recipients: Set(request.recipients.to_value()),
            email_subject: Set(request.email_subject),
            email_body: Set(request.email_body),
            report_ids: Set(report_ids_to_value(&request.report_ids)),
            is_enabled: Set(request.is_enabled),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        schedule
            .insert(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<ScheduleModel>, RepositoryError> {
        Schedule::find_by_id(id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn list(&self) -> Result<Vec<ScheduleModel>, RepositoryError> {
        Schedule::find()
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateSchedule,
    ) -> Result<ScheduleModel, RepositoryError> {
        validate_fields(&request.name, &request.cron_spec)?;

        let existing = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound("schedule".to_string()))?;

        let mut active = existing.into_active_model();
        active.name = Set(request.name);
        active.cron_spec = Set(request.cron_spec);
        active.timezone = Set(request.timezone);
        active.recipients = Set(request.recipients.to_value());
        active.email_subject = Set(request.email_subject);
        active.email_body = Set(request.email_body);
        active.report_ids = Set(report_ids_to_value(&request.report_ids));
        active.is_enabled = Set(request.is_enabled);
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
            .ok_or_else(|| RepositoryError::NotFound("schedule".to_string()))?;

        existing
            .delete(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(())
    }
}

fn validate_fields(name: &str, cron_spec: &str) -> Result<(), RepositoryError> {
    if name.trim().is_empty() {
        return Err(RepositoryError::validation_error(
            "schedule name cannot be empty",
        ));
    }
    if cron_spec.trim().is_empty() {
        return Err(RepositoryError::validation_error(
            "schedule cron spec cannot be empty",
        ));
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

    fn create_request(report_ids: Vec<Uuid>) -> CreateSchedule {
        CreateSchedule {
            name: "Weekly digest".to_string(),
            cron_spec: "0 0 8 * * Mon".to_string(),
            timezone: "UTC".to_string(),
            recipients: Recipients {
                to: vec!["ops@example.com".to_string()],
                cc: Vec::new(),
                bcc: Vec::new(),
            },
            email_subject: "Weekly report".to_string(),
            email_body: "See attached.".to_string(),
            report_ids,
            is_enabled: true,
        }
    }

    #[tokio::test]
    async fn create_round_trips_recipients_and_report_ids() {
        let db = setup_test_db().await;
        let repo = ScheduleRepository::new(&db);

        let report_ids = vec![Uuid::new_v4(), Uuid::new_v4()];
        let created = repo.create(create_request(report_ids.clone())).await.unwrap();

        let found = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(found.report_id_list(), report_ids);
        assert_eq!(found.recipient_lists().to, vec!["ops@example.com"]);
        assert!(found.is_enabled);
    }

    #[tokio::test]
    async fn update_can_disable_a_schedule() {
        let db = setup_test_db().await;
        let repo = ScheduleRepository::new(&db);

        let created = repo.create(create_request(vec![Uuid::new_v4()])).await.unwrap();
        let updated = repo
            .update(
                created.id,
                UpdateSchedule {
                    name: created.name.clone(),
                    cron_spec: created.cron_spec.clone(),
                    timezone: created.timezone.clone(),
                    recipients: created.recipient_lists(),
                    email_subject: created.email_subject.clone(),
                    email_body: created.email_body.clone(),
                    report_ids: created.report_id_list(),
                    is_enabled: false,
                },
            )
            .await
            .unwrap();

        assert!(!updated.is_enabled);
    }

    #[tokio::test]
    async fn blank_fields_are_rejected() {
        let db = setup_test_db().await;
        let repo = ScheduleRepository::new(&db);

        let mut request = create_request(Vec::new());
        request.name = "  ".to_string();
        assert!(matches!(
            repo.create(request).await,
            Err(RepositoryError::Validation(_))
        ));

        let mut request = create_request(Vec::new());
        request.cron_spec = String::new();
        assert!(matches!(
            repo.create(request).await,
            Err(RepositoryError::Validation(_))
        ));
    }
}
