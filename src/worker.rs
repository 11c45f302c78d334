//! # Worker Pool
//!
//! Background workers that drain the task queue and execute report
//! generation. Each dequeued task fans out sequentially across its report
//! list, then commits exactly one history log. Stopping the pool
//! interrupts a blocked dequeue but never an in-flight task.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use metrics::{counter, histogram};
use sea_orm::DatabaseConnection;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::error::RepositoryError;
use crate::generators::{GeneratorError, GeneratorFactory};
use crate::models::history_log::LogStatus;
use crate::queue::{QueueError, Task, TaskQueue};
use crate::repositories::{
    DataSourceRepository, HistoryRepository, NewHistoryLog, ReportDefinitionRepository,
    ScheduleRepository,
};

/// Task-level failures. These abort the task without a history log.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("schedule {0} not found for task")]
    ScheduleNotFound(Uuid),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Per-report failures captured during fan-out. These skip the failing
/// report and surface in the history log, never aborting the task.
#[derive(Debug, Error)]
enum RenderError {
    #[error("report definition {0} not found")]
    ReportNotFound(Uuid),
    #[error("datasource {0} not found")]
    DataSourceNotFound(Uuid),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Generator(#[from] GeneratorError),
}

/// Seam between the worker loop and task execution.
#[async_trait]
pub trait ProcessTask: Send + Sync {
    async fn process(&self, task: &Task) -> Result<(), TaskError>;
}

/// Executes one task: look up the schedule, render each referenced
/// report, record one history log.
pub struct TaskExecutor {
    db: DatabaseConnection,
    generators: GeneratorFactory,
}

impl TaskExecutor {
    pub fn new(db: DatabaseConnection, generators: GeneratorFactory) -> Self {
        Self { db, generators }
    }

    async fn render_report(&self, task: &Task, report_id: Uuid) -> Result<String, RenderError> {
        let report = ReportDefinitionRepository::new(&self.db)
            .get_by_id(report_id)
            .await?
            .ok_or(RenderError::ReportNotFound(report_id))?;

        let datasource = DataSourceRepository::new(&self.db)
            .get_by_id(report.datasource_id)
            .await?
            .ok_or(RenderError::DataSourceNotFound(report.datasource_id))?;

        let generator = self.generators.for_kind(&datasource.kind)?;
        let rendered = generator.generate(task, &datasource, &report).await?;

        debug!(
            report = %report.name,
            path = %rendered.file_path.display(),
            "Report rendered"
        );
        Ok(rendered.file_path.display().to_string())
    }
}

#[async_trait]
impl ProcessTask for TaskExecutor {
    #[instrument(skip_all, fields(task_id = %task.id, schedule_id = %task.schedule_id))]
    async fn process(&self, task: &Task) -> Result<(), TaskError> {
        let started = Instant::now();

        let schedule = ScheduleRepository::new(&self.db)
            .get_by_id(task.schedule_id)
            .await?
            .ok_or(TaskError::ScheduleNotFound(task.schedule_id))?;

        let mut last_error: Option<String> = None;
        let mut report_paths: Vec<String> = Vec::new();

        for report_id in &task.report_ids {
            match self.render_report(task, *report_id).await {
                Ok(path) => report_paths.push(path),
                Err(err) => {
                    warn!(
                        report_id = %report_id,
                        error = %err,
                        "Report failed; continuing with remaining reports"
                    );
                    last_error = Some(err.to_string());
                }
            }
        }

        let duration_ms = started.elapsed().as_millis() as i64;
        let status = if last_error.is_some() {
            LogStatus::Failed
        } else {
            LogStatus::Success
        };

        let labels = vec![("status", status.as_str().to_string())];
        counter!("report_tasks_processed_total", &labels).increment(1);
        histogram!("report_task_duration_ms").record(duration_ms as f64);

        let entry = NewHistoryLog {
            schedule_id: task.schedule_id,
            schedule_name: schedule.name.clone(),
            trigger_time: task.created_at,
            execution_duration_ms: duration_ms,
            status,
            error_message: last_error,
            recipients: schedule.recipient_lists(),
            report_url: report_paths.join(", "),
        };

        // The task is already done; a failed insert is logged, not retried.
        if let Err(err) = HistoryRepository::new(&self.db).create(entry).await {
            error!(error = %err, "Failed to record history log for processed task");
        }

        info!(status = %status, duration_ms, "Task processed");
        Ok(())
    }
}

/// Pool of worker loops sharing one queue.
pub struct WorkerPool {
    queue: Arc<TaskQueue>,
    processor: Arc<dyn ProcessTask>,
    concurrency: usize,
    shutdown: CancellationToken,
    tracker: TaskTracker,
    started: AtomicBool,
}

impl WorkerPool {
    pub fn new(queue: Arc<TaskQueue>, processor: Arc<dyn ProcessTask>, concurrency: usize) -> Self {
        Self {
            queue,
            processor,
            concurrency: concurrency.max(1),
            shutdown: CancellationToken::new(),
            tracker: TaskTracker::new(),
            started: AtomicBool::new(false),
        }
    }

    /// Spawn the worker loops. Calling again on the same instance is a
    /// no-op.
    pub fn start(&self) {
        if self.started.swap(true, Ordering::SeqCst) {
            return;
        }

        info!(workers = self.concurrency, "Starting worker pool");
        for worker_id in 0..self.concurrency {
            self.tracker.spawn(run_worker(
                worker_id,
                self.queue.clone(),
                self.processor.clone(),
                self.shutdown.clone(),
            ));
        }
        self.tracker.close();
    }

    /// Graceful stop: interrupt blocked dequeues, wait for in-flight
    /// tasks to finish. Idempotent.
    pub async fn stop(&self) {
        info!("Stopping worker pool");
        self.shutdown.cancel();
        self.tracker.close();
        self.tracker.wait().await;
        info!("Worker pool stopped");
    }
}

async fn run_worker(
    worker_id: usize,
    queue: Arc<TaskQueue>,
    processor: Arc<dyn ProcessTask>,
    shutdown: CancellationToken,
) {
    debug!(worker_id, "Worker loop started");
    loop {
        if shutdown.is_cancelled() {
            break;
        }

        match queue.dequeue(&shutdown).await {
            Ok(task) => {
                info!(
                    worker_id,
                    task_id = %task.id,
                    schedule_id = %task.schedule_id,
                    "Worker picked up task"
                );
                if let Err(err) = processor.process(&task).await {
                    error!(worker_id, task_id = %task.id, error = %err, "Task failed");
                }
            }
            Err(QueueError::Cancelled) => {
                debug!(worker_id, "Dequeue cancelled; worker stopping");
                break;
            }
            Err(QueueError::Closed) => {
                debug!(worker_id, "Queue closed; worker stopping");
                break;
            }
        }
    }
    debug!(worker_id, "Worker loop exited");
}
