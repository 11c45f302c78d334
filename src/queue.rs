//! # Task Queue
//!
//! Bounded in-memory handoff between the scheduler / API (producers) and
//! the worker pool (consumers). Enqueue blocks while the queue is full,
//! dequeue blocks while it is empty, and both respect a caller-supplied
//! cancellation token. Closing is idempotent: producers fail immediately
//! afterwards, while consumers drain the remaining items FIFO before
//! seeing [`QueueError::Closed`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// One dispatched execution request.
///
/// The report id list is snapshotted from the schedule at dispatch time so
/// a task stands on its own once it is in the queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Task identifier: a UUID string, or `resend-{logId}-{unixSeconds}`
    /// for history resends
    pub id: String,
    /// Schedule this task was dispatched from
    pub schedule_id: Uuid,
    /// Snapshot of the schedule's report id list
    pub report_ids: Vec<Uuid>,
    /// Dispatch time; becomes the history log's trigger time
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Build a task for the given schedule with a fresh UUID id.
    pub fn dispatch(schedule_id: Uuid, report_ids: Vec<Uuid>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            schedule_id,
            report_ids,
            created_at: Utc::now(),
        }
    }
}

/// Errors returned by queue operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QueueError {
    #[error("queue is closed")]
    Closed,
    #[error("operation cancelled")]
    Cancelled,
}

/// Bounded multi-producer / multi-consumer task queue.
pub struct TaskQueue {
    tx: mpsc::Sender<Task>,
    rx: tokio::sync::Mutex<mpsc::Receiver<Task>>,
    closed: CancellationToken,
}

impl TaskQueue {
    /// Create a queue with the given capacity. The bound is fixed for the
    /// lifetime of the queue.
    pub fn new(capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        Self {
            tx,
            rx: tokio::sync::Mutex::new(rx),
            closed: CancellationToken::new(),
        }
    }

    /// Add a task to the queue, blocking while it is full.
    ///
    /// Returns [`QueueError::Closed`] once [`close`](Self::close) has been
    /// called, or [`QueueError::Cancelled`] if the caller's token fires
    /// before space becomes available.
    pub async fn enqueue(&self, cancel: &CancellationToken, task: Task) -> Result<(), QueueError> {
        tokio::select! {
            biased;
            _ = self.closed.cancelled() => Err(QueueError::Closed),
            _ = cancel.cancelled() => Err(QueueError::Cancelled),
            sent = self.tx.send(task) => sent.map_err(|_| QueueError::Closed),
        }
    }

    /// Take the next task, blocking while the queue is empty.
    ///
    /// After [`close`](Self::close), remaining items are drained in FIFO
    /// order before [`QueueError::Closed`] is returned.
    pub async fn dequeue(&self, cancel: &CancellationToken) -> Result<Task, QueueError> {
        let mut rx = self.rx.lock().await;
        tokio::select! {
            biased;
            received = rx.recv() => received.ok_or(QueueError::Closed),
            _ = self.closed.cancelled() => {
                match rx.try_recv() {
                    Ok(task) => Ok(task),
                    Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => {
                        Err(QueueError::Closed)
                    }
                }
            }
            _ = cancel.cancelled() => Err(QueueError::Cancelled),
        }
    }

    /// Stop accepting new tasks. Safe to call any number of times.
    pub fn close(&self) {
        self.closed.cancel();
    }

    /// Whether the queue has been closed.
    pub fn is_closed(&self) -> bool {
        self.closed.is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::timeout;

    fn task(n: u32) -> Task {
        Task {
            id: format!("task-{n}"),
            schedule_id: Uuid::new_v4(),
            report_ids: vec![Uuid::new_v4()],
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn dequeue_preserves_enqueue_order() {
        let queue = TaskQueue::new(10);
        let cancel = CancellationToken::new();

        for n in 0..5 {
            queue.enqueue(&cancel, task(n)).await.unwrap();
        }

        for n in 0..5 {
            let got = queue.dequeue(&cancel).await.unwrap();
            assert_eq!(got.id, format!("task-{n}"));
        }
    }

    #[tokio::test]
    async fn close_drains_remaining_tasks_then_reports_closed() {
        let queue = TaskQueue::new(10);
        let cancel = CancellationToken::new();

        for n in 0..3 {
            queue.enqueue(&cancel, task(n)).await.unwrap();
        }
        queue.close();

        for n in 0..3 {
            let got = queue.dequeue(&cancel).await.unwrap();
            assert_eq!(got.id, format!("task-{n}"));
        }
        assert_eq!(queue.dequeue(&cancel).await, Err(QueueError::Closed));
    }

    #[tokio::test]
    async fn enqueue_after_close_fails() {
        let queue = TaskQueue::new(10);
        let cancel = CancellationToken::new();

        queue.close();
        assert_eq!(
            queue.enqueue(&cancel, task(0)).await,
            Err(QueueError::Closed)
        );
    }

    #[tokio::test]
    async fn close_is_idempotent() {
        let queue = TaskQueue::new(2);
        queue.close();
        queue.close();
        queue.close();
        assert!(queue.is_closed());
    }

    #[tokio::test]
    async fn full_queue_blocks_enqueue_until_dequeue() {
        let queue = Arc::new(TaskQueue::new(1));
        let cancel = CancellationToken::new();

        queue.enqueue(&cancel, task(0)).await.unwrap();

        let blocked = {
            let queue = queue.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move { queue.enqueue(&cancel, task(1)).await })
        };

        // The producer has no space yet.
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!blocked.is_finished());

        let first = queue.dequeue(&cancel).await.unwrap();
        assert_eq!(first.id, "task-0");

        timeout(Duration::from_secs(1), blocked)
            .await
            .expect("enqueue should unblock")
            .unwrap()
            .unwrap();

        let second = queue.dequeue(&cancel).await.unwrap();
        assert_eq!(second.id, "task-1");
    }

    #[tokio::test]
    async fn close_unblocks_a_full_enqueue() {
        let queue = Arc::new(TaskQueue::new(1));
        let cancel = CancellationToken::new();

        queue.enqueue(&cancel, task(0)).await.unwrap();

        let blocked = {
            let queue = queue.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move { queue.enqueue(&cancel, task(1)).await })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        queue.close();

        let result = timeout(Duration::from_secs(1), blocked)
            .await
            .expect("enqueue should unblock")
            .unwrap();
        assert_eq!(result, Err(QueueError::Closed));
    }

    #[tokio::test]
    async fn cancellation_interrupts_a_blocked_dequeue() {
        let queue = Arc::new(TaskQueue::new(1));
        let cancel = CancellationToken::new();

        let blocked = {
            let queue = queue.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move { queue.dequeue(&cancel).await })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        cancel.cancel();

        let result = timeout(Duration::from_secs(1), blocked)
            .await
            .expect("dequeue should unblock")
            .unwrap();
        assert_eq!(result, Err(QueueError::Cancelled));
    }

    #[tokio::test]
    async fn tasks_survive_from_producers_to_a_single_consumer() {
        let queue = Arc::new(TaskQueue::new(100));
        let cancel = CancellationToken::new();

        let mut producers = Vec::new();
        for p in 0..4 {
            let queue = queue.clone();
            let cancel = cancel.clone();
            producers.push(tokio::spawn(async move {
                for n in 0..25 {
                    queue.enqueue(&cancel, task(p * 100 + n)).await.unwrap();
                }
            }));
        }
        for producer in producers {
            producer.await.unwrap();
        }
        queue.close();

        let mut seen = 0;
        while queue.dequeue(&cancel).await.is_ok() {
            seen += 1;
        }
        assert_eq!(seen, 100);
    }
}
