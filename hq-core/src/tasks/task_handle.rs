//! ``src/tasks/task_handle.rs``
//! ============================================================================
//! # Cancellable background tasks
//!
//! A `TaskHandle` owns a spawned tokio task together with its
//! `CancellationToken`. Cancelling or dropping the handle revokes the task:
//! a delayed callback that has not fired yet never runs. `TaskScope` collects
//! the handles started on behalf of one mounted screen and revokes all of
//! them when the screen goes away.

use std::{future::Future, time::Duration};

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

#[derive(Debug)]
pub struct TaskHandle {
    id: String,
    token: CancellationToken,
    join: JoinHandle<()>,
}

impl TaskHandle {
    /// Spawn `fut` so that it is abandoned as soon as the token is cancelled.
    pub fn spawn<F>(label: &'static str, fut: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let id = nanoid::nanoid!(10);
        let token = CancellationToken::new();
        let child = token.clone();
        let task_id = id.clone();

        let join = tokio::spawn(async move {
            tokio::select! {
                () = child.cancelled() => {
                    debug!(
                        marker = "TASK_CANCELLED",
                        operation_type = "task",
                        task = label,
                        task_id = %task_id,
                        "task revoked before completion"
                    );
                }
                () = fut => {
                    trace!(task = label, task_id = %task_id, "task completed");
                }
            }
        });

        Self { id, token, join }
    }

    /// Run `callback` once `delay` has elapsed, unless revoked first.
    pub fn delayed<F, Fut>(label: &'static str, delay: Duration, callback: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self::spawn(label, async move {
            tokio::time::sleep(delay).await;
            callback().await;
        })
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Token the task body may poll for cooperative cancellation.
    #[must_use]
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }
}

impl Drop for TaskHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Handles owned by one mounted screen.
#[derive(Debug, Default)]
pub struct TaskScope {
    handles: Vec<TaskHandle>,
}

impl TaskScope {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, handle: TaskHandle) {
        self.handles.retain(|handle| !handle.is_finished());
        self.handles.push(handle);
    }

    #[must_use]
    pub fn pending(&self) -> usize {
        self.handles
            .iter()
            .filter(|handle| !handle.is_finished())
            .count()
    }

    /// Revoke every task of the scope. Returns the ids of the tasks that
    /// were still running; finished ones have already delivered.
    pub fn cancel_all(&mut self) -> Vec<String> {
        self.handles
            .drain(..)
            .filter_map(|handle| {
                let running = !handle.is_finished();
                handle.cancel();
                running.then(|| handle.id().to_string())
            })
            .collect()
    }
}

impl Drop for TaskScope {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
