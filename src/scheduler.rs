//! # Report Scheduler
//!
//! Reads the schedule table once at start, registers every enabled
//! schedule with a parseable cron spec, and runs one firing loop per
//! registration. A fire snapshots the schedule's report id list (as
//! captured at start) into a task and enqueues it. Edits made through the
//! API after start do not reconfigure a running scheduler.

use std::str::FromStr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use cron::Schedule as CronSchedule;
use metrics::counter;
use sea_orm::DatabaseConnection;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::error::RepositoryError;
use crate::models::schedule::Model as ScheduleModel;
use crate::queue::{Task, TaskQueue};
use crate::repositories::ScheduleRepository;

/// Errors that fail scheduler startup. Invalid cron specs are not among
/// them: those schedules are logged and skipped.
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("failed to read schedules: {0}")]
    Store(#[from] RepositoryError),
}

/// Errors from parsing a single schedule's firing spec
#[derive(Debug, Error)]
pub enum SpecError {
    #[error("invalid @every duration '{0}'")]
    InvalidEvery(String),
    #[error("invalid cron spec '{spec}': {source}")]
    InvalidCron {
        spec: String,
        #[source]
        source: cron::error::Error,
    },
}

/// A parsed firing specification: a six-field seconds-resolution cron
/// expression, or the `@every <duration>` shorthand.
pub(crate) enum FireSpec {
    Cron(Box<CronSchedule>),
    Every(Duration),
}

impl FireSpec {
    /// Time until the next fire; `None` when the spec has no future
    /// occurrences.
    fn next_delay(&self) -> Option<Duration> {
        match self {
            FireSpec::Every(interval) => Some(*interval),
            FireSpec::Cron(schedule) => {
                let next = schedule.upcoming(Utc).next()?;
                Some((next - Utc::now()).to_std().unwrap_or(Duration::ZERO))
            }
        }
    }
}

/// Parse a schedule's cron spec field.
pub(crate) fn parse_fire_spec(raw: &str) -> Result<FireSpec, SpecError> {
    if let Some(rest) = raw.strip_prefix("@every ") {
        let rest = rest.trim();
        return parse_every_duration(rest)
            .map(FireSpec::Every)
            .ok_or_else(|| SpecError::InvalidEvery(rest.to_string()));
    }

    CronSchedule::from_str(raw)
        .map(|schedule| FireSpec::Cron(Box::new(schedule)))
        .map_err(|source| SpecError::InvalidCron {
            spec: raw.to_string(),
            source,
        })
}

/// Parse concatenated `<n><unit>` segments (`1h30m`, `90s`, `500ms`).
/// Returns `None` for empty, malformed, or zero durations.
fn parse_every_duration(raw: &str) -> Option<Duration> {
    let mut total = Duration::ZERO;
    let mut digits = String::new();
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }
        if digits.is_empty() {
            return None;
        }
        let value: u64 = digits.parse().ok()?;
        digits.clear();

        let step = match c {
            'h' => Duration::from_secs(value * 3_600),
            's' => Duration::from_secs(value),
            'm' => {
                if chars.peek() == Some(&'s') {
                    chars.next();
                    Duration::from_millis(value)
                } else {
                    Duration::from_secs(value * 60)
                }
            }
            _ => return None,
        };
        total += step;
    }

    if !digits.is_empty() || total.is_zero() {
        return None;
    }
    Some(total)
}

/// Cron-driven dispatcher turning schedule definitions into queued tasks.
pub struct ReportScheduler {
    db: DatabaseConnection,
    queue: Arc<TaskQueue>,
    shutdown: CancellationToken,
    tracker: TaskTracker,
    started: AtomicBool,
    registered: AtomicUsize,
}

impl ReportScheduler {
    pub fn new(db: DatabaseConnection, queue: Arc<TaskQueue>) -> Self {
        Self {
            db,
            queue,
            shutdown: CancellationToken::new(),
            tracker: TaskTracker::new(),
            started: AtomicBool::new(false),
            registered: AtomicUsize::new(0),
        }
    }

    /// Register all enabled schedules and start their firing loops.
    ///
    /// Fails only when the schedule table cannot be read. Returns the
    /// number of registered entries; disabled schedules and unparseable
    /// specs are skipped.
    pub async fn start(&self) -> Result<usize, SchedulerError> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Ok(self.registered.load(Ordering::SeqCst));
        }

        info!("Starting report scheduler");
        let schedules = ScheduleRepository::new(&self.db).list().await?;
        info!(count = schedules.len(), "Loaded schedules");

        let mut registered = 0usize;
        for schedule in schedules {
            if !schedule.is_enabled {
                debug!(schedule_id = %schedule.id, "Skipping disabled schedule");
                continue;
            }

            let spec = match parse_fire_spec(&schedule.cron_spec) {
                Ok(spec) => spec,
                Err(err) => {
                    warn!(
                        schedule_id = %schedule.id,
                        name = %schedule.name,
                        error = %err,
                        "Skipping schedule with invalid cron spec"
                    );
                    continue;
                }
            };

            // Snapshot the report id list now; later edits do not reach
            // an already-registered schedule.
            let report_ids = schedule.report_id_list();
            info!(
                schedule_id = %schedule.id,
                name = %schedule.name,
                cron = %schedule.cron_spec,
                "Registered schedule"
            );
            self.tracker.spawn(run_schedule(
                schedule,
                spec,
                report_ids,
                self.queue.clone(),
                self.shutdown.clone(),
            ));
            registered += 1;
        }

        self.tracker.close();
        self.registered.store(registered, Ordering::SeqCst);
        info!(registered, "Report scheduler started");
        Ok(registered)
    }

    /// Number of schedules registered at start.
    pub fn registered_count(&self) -> usize {
        self.registered.load(Ordering::SeqCst)
    }

    /// Stop firing and wait for in-flight fires to complete enqueueing.
    /// Idempotent.
    pub async fn stop(&self) {
        info!("Stopping report scheduler");
        self.shutdown.cancel();
        self.tracker.close();
        self.tracker.wait().await;
        info!("Report scheduler stopped");
    }
}

async fn run_schedule(
    schedule: ScheduleModel,
    spec: FireSpec,
    report_ids: Vec<Uuid>,
    queue: Arc<TaskQueue>,
    shutdown: CancellationToken,
) {
    loop {
        let Some(delay) = spec.next_delay() else {
            debug!(schedule_id = %schedule.id, "No future fire times; loop exiting");
            break;
        };

        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = tokio::time::sleep(delay) => {
                // The fire runs to completion even when shutdown begins
                // mid-enqueue; only the next iteration observes it.
                fire(&schedule, &report_ids, &queue).await;
            }
        }
    }
}

async fn fire(schedule: &ScheduleModel, report_ids: &[Uuid], queue: &TaskQueue) {
    let task = Task::dispatch(schedule.id, report_ids.to_vec());
    info!(
        schedule_id = %schedule.id,
        name = %schedule.name,
        task_id = %task.id,
        "Schedule fired; enqueuing task"
    );
    counter!("report_schedule_fires_total").increment(1);

    let never = CancellationToken::new();
    if let Err(err) = queue.enqueue(&never, task).await {
        error!(schedule_id = %schedule.id, error = %err, "Failed to enqueue task");
    }
}
