//! ``src/controller/event_loop.rs``
//! ============================================================================
//! # Event loop: background results and internal actions
//!
//! Background tasks report through an unbounded `TaskResult` channel; timers
//! and other internal producers post `Action`s directly. `next_action` merges
//! both into a single stream for the main `select!` loop.

use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::{controller::actions::Action, tasks::sync_task::SyncReport};

/// Completion message of a background task.
#[derive(Debug, Clone)]
pub enum TaskResult {
    SyncFinished(SyncReport),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnap {
    pub tasks: u64,
    pub actions: u64,
    pub avg: Duration,
}

pub struct EventLoop {
    task_rx: mpsc::UnboundedReceiver<TaskResult>,
    action_rx: mpsc::UnboundedReceiver<Action>,
    tasks: u64,
    actions: u64,
    started: Instant,
}

impl EventLoop {
    pub fn new(
        task_rx: mpsc::UnboundedReceiver<TaskResult>,
        action_rx: mpsc::UnboundedReceiver<Action>,
    ) -> Self {
        info!(
            marker = "EVENT_LOOP_INIT",
            operation_type = "event_loop",
            "event loop created"
        );
        Self {
            task_rx,
            action_rx,
            tasks: 0,
            actions: 0,
            started: Instant::now(),
        }
    }

    /// Next background-originated action; `None` once every sender is gone.
    pub async fn next_action(&mut self) -> Option<Action> {
        tokio::select! {
            Some(result) = self.task_rx.recv() => {
                self.tasks += 1;
                Some(Self::map_task(result))
            }
            Some(action) = self.action_rx.recv() => {
                self.actions += 1;
                debug!(marker = "INTERNAL_ACTION", operation_type = "event_loop", ?action);
                Some(action)
            }
            else => None,
        }
    }

    fn map_task(result: TaskResult) -> Action {
        match result {
            TaskResult::SyncFinished(report) => {
                debug!(
                    marker = "SYNC_RESULT",
                    operation_type = "event_loop",
                    screen = report.batch.screen.slug(),
                    applied = report.applied(),
                    failed = report.failed.len(),
                    "sync report received"
                );
                Action::SyncFinished(report)
            }
        }
    }

    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn snapshot_metrics(&self) -> MetricsSnap {
        let handled = self.tasks + self.actions;
        let avg = if handled == 0 {
            Duration::ZERO
        } else {
            self.started.elapsed().div_f64(handled as f64)
        };
        MetricsSnap {
            tasks: self.tasks,
            actions: self.actions,
            avg,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        model::screen_spec::ScreenId,
        tasks::sync_task::SyncBatch,
    };

    #[tokio::test]
    async fn test_task_results_become_actions() {
        let (task_tx, task_rx) = mpsc::unbounded_channel();
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let mut event_loop = EventLoop::new(task_rx, action_rx);

        let report = SyncReport {
            batch: SyncBatch {
                screen: ScreenId::ShiftSwap,
                status_code: "REJECTED",
                previous: Vec::new(),
            },
            failed: Vec::new(),
        };
        task_tx.send(TaskResult::SyncFinished(report)).unwrap();
        assert!(matches!(event_loop.next_action().await, Some(Action::SyncFinished(_))));

        action_tx.send(Action::ExpireNotification(3)).unwrap();
        assert!(matches!(
            event_loop.next_action().await,
            Some(Action::ExpireNotification(3))
        ));

        drop(task_tx);
        drop(action_tx);
        assert!(event_loop.next_action().await.is_none());

        let metrics = event_loop.snapshot_metrics();
        assert_eq!((metrics.tasks, metrics.actions), (1, 1));
    }

    #[test]
    fn test_metrics_average_survives_counts_past_u32() {
        let (_task_tx, task_rx) = mpsc::unbounded_channel();
        let (_action_tx, action_rx) = mpsc::unbounded_channel();
        let mut event_loop = EventLoop::new(task_rx, action_rx);

        // low 32 bits are zero
        event_loop.tasks = 1 << 32;
        let metrics = event_loop.snapshot_metrics();
        assert_eq!(metrics.tasks, 1 << 32);
        assert!(metrics.avg < Duration::from_millis(1));
    }
}
