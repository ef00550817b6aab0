//! ``src/tasks/sync_task.rs``
//! ============================================================================
//! # Pushing bulk transitions to a backend
//!
//! Local bulk transitions are applied optimistically. A `SyncBatch` then
//! carries the change to a `StatusBackend` one item at a time, and the
//! `SyncReport` lists the items the backend rejected so the owning screen
//! can revert exactly those.

use std::{sync::Arc, time::Duration};

use ahash::AHashSet;
use async_trait::async_trait;
use futures::future::join_all;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::{
    controller::event_loop::TaskResult,
    error::AppError,
    model::{
        list_item::{ItemId, ItemStatus},
        list_state::BulkReceipt,
        screen_spec::ScreenId,
    },
    tasks::task_handle::TaskHandle,
};

/// Status-type-erased bulk receipt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncBatch {
    pub screen: ScreenId,
    pub status_code: &'static str,
    pub previous: Vec<(ItemId, &'static str)>,
}

impl SyncBatch {
    #[must_use]
    pub fn from_receipt<S: ItemStatus>(screen: ScreenId, receipt: &BulkReceipt<S>) -> Self {
        Self {
            screen,
            status_code: receipt.status.code(),
            previous: receipt
                .previous
                .iter()
                .map(|(id, status)| (id.clone(), status.code()))
                .collect(),
        }
    }

    /// Rebuild the typed receipt; `None` if a code does not belong to `S`.
    #[must_use]
    pub fn to_receipt<S: ItemStatus>(&self) -> Option<BulkReceipt<S>> {
        let status = S::from_code(self.status_code)?;
        let previous = self
            .previous
            .iter()
            .map(|(id, code)| S::from_code(code).map(|status| (id.clone(), status)))
            .collect::<Option<Vec<_>>>()?;
        Some(BulkReceipt { status, previous })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.previous.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.previous.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct SyncReport {
    pub batch: SyncBatch,
    pub failed: Vec<(ItemId, AppError)>,
}

impl SyncReport {
    #[must_use]
    pub fn failed_ids(&self) -> Vec<ItemId> {
        self.failed.iter().map(|(id, _)| id.clone()).collect()
    }

    /// Report for a push revoked before it completed: every item counts as
    /// not saved.
    #[must_use]
    pub fn revoked(batch: SyncBatch) -> Self {
        let failed = batch
            .previous
            .iter()
            .map(|(id, _)| (id.clone(), AppError::backend(id.as_str(), "push revoked before it completed")))
            .collect();
        Self { batch, failed }
    }

    #[must_use]
    pub fn applied(&self) -> usize {
        self.batch.len() - self.failed.len()
    }
}

/// Update-by-id collaborator.
#[async_trait]
pub trait StatusBackend: Send + Sync {
    async fn update_status(&self, screen: ScreenId, id: &str, status_code: &str) -> Result<(), AppError>;
}

/// Backend stand-in: waits `latency`, then accepts every id except the ones
/// listed in `reject`.
#[derive(Debug, Clone, Default)]
pub struct SimulatedBackend {
    latency: Duration,
    reject: AHashSet<ItemId>,
}

impl SimulatedBackend {
    #[must_use]
    pub fn new(latency: Duration) -> Self {
        Self {
            latency,
            reject: AHashSet::new(),
        }
    }

    #[must_use]
    pub fn rejecting<'a, I>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.reject.extend(ids.into_iter().map(ItemId::new));
        self
    }
}

#[async_trait]
impl StatusBackend for SimulatedBackend {
    async fn update_status(&self, _screen: ScreenId, id: &str, status_code: &str) -> Result<(), AppError> {
        tokio::time::sleep(self.latency).await;
        if self.reject.contains(id) {
            Err(AppError::backend(id, format!("transition to {status_code} refused")))
        } else {
            Ok(())
        }
    }
}

/// Push every item of `batch` and collect per-item failures.
pub async fn push_batch(backend: &dyn StatusBackend, batch: SyncBatch) -> SyncReport {
    let results = join_all(
        batch
            .previous
            .iter()
            .map(|(id, _)| backend.update_status(batch.screen, id, batch.status_code)),
    )
    .await;

    let failed: Vec<(ItemId, AppError)> = batch
        .previous
        .iter()
        .zip(results)
        .filter_map(|((id, _), result)| result.err().map(|err| (id.clone(), err)))
        .collect();

    if failed.is_empty() {
        info!(
            marker = "SYNC_COMPLETE",
            operation_type = "sync",
            screen = batch.screen.slug(),
            count = batch.len(),
            "backend accepted bulk transition"
        );
    } else {
        warn!(
            marker = "SYNC_PARTIAL",
            operation_type = "sync",
            screen = batch.screen.slug(),
            failed = failed.len(),
            count = batch.len(),
            "backend rejected part of bulk transition"
        );
    }

    SyncReport { batch, failed }
}

/// Push `batch` in the background and report through `task_tx`. The
/// returned handle revokes the push (and its report) when dropped.
pub fn spawn_sync(
    backend: Arc<dyn StatusBackend>,
    batch: SyncBatch,
    task_tx: mpsc::UnboundedSender<TaskResult>,
) -> TaskHandle {
    TaskHandle::spawn("status_sync", async move {
        let report = push_batch(backend.as_ref(), batch).await;
        if task_tx.send(TaskResult::SyncFinished(report)).is_err() {
            warn!(marker = "SYNC_REPORT_DROPPED", "task channel closed before report");
        }
    })
}
