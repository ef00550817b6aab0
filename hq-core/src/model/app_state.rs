//! ``src/model/app_state.rs``
//! ============================================================================
//! # `AppState`: console-wide state
//!
//! Holds every list screen together with the task scope of each, the menu
//! tree and active module, the modal stack, input mode and status-bar
//! notification. Exactly one screen is mounted at a time; switching away
//! from a screen revokes its background tasks.

use std::{path::PathBuf, sync::Arc, time::Duration, time::Instant};

use compact_str::CompactString;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

use crate::{
    config::Config,
    controller::{actions::Action, event_loop::TaskResult, handlers::HandlerContext},
    data::source::{Seed, typed_items},
    error::AppError,
    export,
    model::{
        list_state::ListController,
        modal::ModalStack,
        screen::Screen,
        screen_spec::{ScreenId, ScreenSpec},
        status::{EmployeeStatus, RequestStatus},
    },
    navigation::menu::{MenuTree, ModuleId},
    tasks::{
        sync_task::{StatusBackend, SyncBatch, SyncReport, spawn_sync},
        task_handle::{TaskHandle, TaskScope},
    },
};

const NOTIFICATION_TTL: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InputMode {
    #[default]
    Normal,

    /// Keystrokes go to the search box.
    Search,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub id: u64,
    pub message: CompactString,
    pub level: NotificationLevel,
    pub timestamp: Instant,
}

/// A backend push not yet folded back into its screen.
#[derive(Debug)]
struct PendingSync {
    task_id: String,
    batch: SyncBatch,
}

/// A screen plus the background work started on its behalf.
pub struct MountedScreen {
    pub screen: Box<dyn Screen>,
    pub tasks: TaskScope,
    pending: Vec<PendingSync>,
}

impl MountedScreen {
    fn new(screen: Box<dyn Screen>) -> Self {
        Self {
            screen,
            tasks: TaskScope::new(),
            pending: Vec::new(),
        }
    }

    /// Take the pending entry for `batch`; `None` if it was already resolved.
    fn resolve(&mut self, batch: &SyncBatch) -> Option<SyncBatch> {
        let idx = self.pending.iter().position(|pending| pending.batch == *batch)?;
        Some(self.pending.remove(idx).batch)
    }

    /// Cancel every running push and revert the items it never delivered.
    /// Pushes that already finished keep their entry; their report is still
    /// queued and resolves it. Returns the number of reverted items.
    fn revoke(&mut self) -> usize {
        let revoked = self.tasks.cancel_all();
        let (unsent, delivered): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|pending| revoked.contains(&pending.task_id));
        self.pending = delivered;

        let mut reverted = 0;
        for pending in unsent {
            match self.screen.reconcile(&SyncReport::revoked(pending.batch)) {
                Ok(count) => reverted += count,
                Err(e) => warn!(
                    marker = "REVOKE_RECONCILE_FAILED",
                    operation_type = "app_state",
                    screen = self.screen.id().slug(),
                    error = %e,
                    "could not revert revoked push"
                ),
            }
        }

        if !revoked.is_empty() {
            warn!(
                marker = "SCREEN_TASKS_REVOKED",
                operation_type = "app_state",
                screen = self.screen.id().slug(),
                cancelled = revoked.len(),
                reverted,
                "unmounted screen with work in flight"
            );
        }
        reverted
    }
}

/// Build the three list screens from configuration and seed data.
pub fn build_screens(cfg: &Config, mut seed: Seed) -> Result<Vec<Box<dyn Screen>>, AppError> {
    let regularization = ListController::new(
        ScreenSpec::regularization(&cfg.screens.regularization, cfg.page_size)?,
        typed_items::<RequestStatus>(seed.take(ScreenId::Regularization), ScreenId::Regularization)?,
    )?;
    let shift_swap = ListController::new(
        ScreenSpec::shift_swap(&cfg.screens.shift_swap, cfg.page_size)?,
        typed_items::<RequestStatus>(seed.take(ScreenId::ShiftSwap), ScreenId::ShiftSwap)?,
    )?;
    let employees = ListController::new(
        ScreenSpec::employees(&cfg.screens.employees, cfg.page_size)?,
        typed_items::<EmployeeStatus>(seed.take(ScreenId::Employees), ScreenId::Employees)?,
    )?;

    let screens: Vec<Box<dyn Screen>> = vec![
        Box::new(regularization),
        Box::new(shift_swap),
        Box::new(employees),
    ];
    Ok(screens)
}

pub struct AppState {
    pub config: Arc<Config>,
    pub menu: MenuTree,
    pub modals: ModalStack,
    pub input_mode: InputMode,

    /// Where the seed data came from, for the status bar.
    pub data_origin: String,

    screens: Vec<MountedScreen>,
    active: usize,
    active_module: ModuleId,

    notification: Option<Notification>,
    notification_timer: Option<TaskHandle>,
    next_notification_id: u64,

    backend: Arc<dyn StatusBackend>,
    task_tx: UnboundedSender<TaskResult>,
    action_tx: UnboundedSender<Action>,
}

impl AppState {
    pub fn new(
        config: Arc<Config>,
        screens: Vec<Box<dyn Screen>>,
        data_origin: String,
        backend: Arc<dyn StatusBackend>,
        task_tx: UnboundedSender<TaskResult>,
        action_tx: UnboundedSender<Action>,
    ) -> Result<Self, AppError> {
        let menu = MenuTree::standard().with_icon_overrides(&config.menu_icons)?;

        let screens: Vec<MountedScreen> = screens
            .into_iter()
            .map(MountedScreen::new)
            .collect();

        let active_module = config.active_module;
        let start = menu
            .entries_for(active_module)
            .first()
            .and_then(|entry| screens.iter().position(|m| m.screen.id() == entry.screen))
            .or_else(|| (!screens.is_empty()).then_some(0))
            .ok_or_else(|| AppError::InvalidConfig("no list screens to show".into()))?;

        info!(
            marker = "APP_STATE_INIT",
            operation_type = "app_state",
            screens = screens.len(),
            module = active_module.title(),
            "application state created"
        );

        Ok(Self {
            config,
            menu,
            modals: ModalStack::new(),
            input_mode: InputMode::Normal,
            data_origin,
            screens,
            active: start,
            active_module,
            notification: None,
            notification_timer: None,
            next_notification_id: 0,
            backend,
            task_tx,
            action_tx,
        })
    }

    /* ------------------------------- screens ------------------------------- */

    #[must_use]
    pub fn active_screen(&self) -> &dyn Screen {
        self.screens[self.active].screen.as_ref()
    }

    pub fn active_screen_mut(&mut self) -> &mut dyn Screen {
        self.screens[self.active].screen.as_mut()
    }

    #[must_use]
    pub fn active_id(&self) -> ScreenId {
        self.active_screen().id()
    }

    #[must_use]
    pub const fn active_module(&self) -> ModuleId {
        self.active_module
    }

    fn mounted_mut(&mut self, id: ScreenId) -> Option<&mut MountedScreen> {
        self.screens.iter_mut().find(|mounted| mounted.screen.id() == id)
    }

    /// Unmount the active screen and mount `id`. Pushes of the old screen
    /// still in flight are revoked; the items they never delivered go back to
    /// their previous status and the user is told how many.
    pub fn switch_to(&mut self, id: ScreenId) -> bool {
        let Some(next) = self.screens.iter().position(|m| m.screen.id() == id) else {
            return false;
        };
        if next == self.active {
            return false;
        }

        let old = &mut self.screens[self.active];
        let left = old.screen.title();
        let reverted = old.revoke();

        self.active = next;
        self.modals.close_all();
        self.input_mode = InputMode::Normal;
        if let Some(module) = self.menu.module_of(id) {
            self.active_module = module;
        }

        info!(
            marker = "SCREEN_SWITCHED",
            operation_type = "app_state",
            screen = id.slug(),
            "screen mounted"
        );

        if reverted > 0 {
            self.notify(
                NotificationLevel::Warning,
                format!("{reverted} unsaved change(s) on {left} reverted"),
            );
        }
        true
    }

    /// Move to the next or previous entry of the active module's menu.
    pub fn cycle_screen(&mut self, forward: bool) -> bool {
        let entries = self.menu.entries_for(self.active_module);
        if entries.is_empty() {
            return false;
        }

        let current = self.active_id();
        let idx = entries.iter().position(|entry| entry.screen == current).unwrap_or(0);
        let next = if forward {
            (idx + 1) % entries.len()
        } else {
            (idx + entries.len() - 1) % entries.len()
        };
        let target = entries[next].screen;
        self.switch_to(target)
    }

    /// Show the other module in the sidebar and mount its first screen.
    pub fn switch_module(&mut self) -> ModuleId {
        let module = self.active_module.next();
        self.active_module = module;
        if let Some(entry) = self.menu.entries_for(module).first() {
            let target = entry.screen;
            self.switch_to(target);
        }
        module
    }

    /// Snapshot handed to key handlers.
    #[must_use]
    pub fn handler_context(&self) -> HandlerContext {
        HandlerContext {
            selection_len: self.active_screen().selection_len(),
            top_modal: self.modals.top_most(),
            search_mode: self.input_mode == InputMode::Search,
        }
    }

    /* ------------------------------- syncing ------------------------------- */

    /// Push a local transition to the backend under the owning screen's scope.
    pub fn start_sync(&mut self, batch: SyncBatch) {
        let backend = Arc::clone(&self.backend);
        let task_tx = self.task_tx.clone();
        let screen = batch.screen;

        if let Some(mounted) = self.mounted_mut(screen) {
            let handle = spawn_sync(backend, batch.clone(), task_tx);
            mounted.pending.push(PendingSync {
                task_id: handle.id().to_string(),
                batch,
            });
            mounted.tasks.push(handle);
        }
    }

    /// Apply a backend report; returns how many rows were reverted. Reports
    /// for a push that was already revoked and reverted are ignored.
    pub fn apply_report(&mut self, report: &SyncReport) -> Result<usize, AppError> {
        let mounted = self
            .mounted_mut(report.batch.screen)
            .ok_or_else(|| AppError::Other(format!("no screen {}", report.batch.screen.slug())))?;

        if mounted.resolve(&report.batch).is_none() {
            debug!(
                marker = "SYNC_REPORT_STALE",
                operation_type = "app_state",
                screen = report.batch.screen.slug(),
                "report for a revoked push ignored"
            );
            return Ok(0);
        }
        mounted.screen.reconcile(report)
    }

    /* ---------------------------- notifications ---------------------------- */

    /// Show `message` in the status bar; it expires on its own.
    pub fn notify(&mut self, level: NotificationLevel, message: impl Into<CompactString>) {
        self.next_notification_id += 1;
        let id = self.next_notification_id;

        self.notification = Some(Notification {
            id,
            message: message.into(),
            level,
            timestamp: Instant::now(),
        });

        let tx = self.action_tx.clone();
        // Replacing the handle revokes the previous timer.
        self.notification_timer = Some(TaskHandle::delayed(
            "notification_expiry",
            NOTIFICATION_TTL,
            move || async move {
                let _ = tx.send(Action::ExpireNotification(id));
            },
        ));
    }

    pub fn expire_notification(&mut self, id: u64) -> bool {
        if self.notification.as_ref().is_some_and(|n| n.id == id) {
            self.notification = None;
            self.notification_timer = None;
            true
        } else {
            false
        }
    }

    #[must_use]
    pub const fn notification(&self) -> Option<&Notification> {
        self.notification.as_ref()
    }

    /* -------------------------------- export ------------------------------- */

    /// Export the filtered rows of the active screen to the export directory.
    pub fn export_active(&self) -> Result<(PathBuf, usize), AppError> {
        let screen = self.active_screen();
        export::export_to_dir(&self.config.export_dir, screen.id(), |writer| {
            screen.export_csv(writer)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        data::source::{DataSource, EmbeddedSeed},
        model::{
            list_state::BulkPhase,
            modal::Modal,
            screen::{ListCommand, ListOutcome},
        },
        tasks::sync_task::SimulatedBackend,
    };
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use tokio::sync::mpsc;

    async fn state_with(
        config: Config,
        backend: impl StatusBackend + 'static,
    ) -> (
        AppState,
        mpsc::UnboundedReceiver<TaskResult>,
        mpsc::UnboundedReceiver<Action>,
    ) {
        let (task_tx, task_rx) = mpsc::unbounded_channel();
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let seed = EmbeddedSeed.load().await.unwrap();
        let screens = build_screens(&config, seed).unwrap();
        let state = AppState::new(
            Arc::new(config),
            screens,
            "test".into(),
            Arc::new(backend),
            task_tx,
            action_tx,
        )
        .unwrap();
        (state, task_rx, action_rx)
    }

    #[tokio::test]
    async fn test_starts_on_first_entry_of_configured_module() {
        let mut config = Config::default();
        config.active_module = ModuleId::FlexiHq;
        let (state, _t, _a) = state_with(config, SimulatedBackend::default()).await;
        assert_eq!(state.active_id(), ScreenId::Employees);
    }

    #[tokio::test]
    async fn test_cycle_and_module_switch() {
        let (mut state, _t, _a) = state_with(Config::default(), SimulatedBackend::default()).await;
        assert_eq!(state.active_id(), ScreenId::Regularization);

        assert!(state.cycle_screen(true));
        assert_eq!(state.active_id(), ScreenId::ShiftSwap);
        assert!(state.cycle_screen(true));
        assert_eq!(state.active_id(), ScreenId::Regularization);

        state.modals.open(Modal::Help);
        assert_eq!(state.switch_module(), ModuleId::FlexiHq);
        assert_eq!(state.active_id(), ScreenId::Employees);
        assert!(!state.modals.any_open());
    }

    #[tokio::test]
    async fn test_sync_round_trip_reverts_rejected_row() {
        let (mut state, mut task_rx, _a) = state_with(
            Config::default(),
            SimulatedBackend::new(Duration::from_millis(5)).rejecting(["REG-2401"]),
        )
        .await;

        let screen = state.active_screen_mut();
        screen.apply(ListCommand::SetSearch("REG-2401".into())).unwrap();
        screen.apply(ListCommand::ToggleCursor).unwrap();
        let ListOutcome::Transitioned(batch) = screen.apply(ListCommand::Shortcut('A')).unwrap() else {
            panic!("shortcut should transition the selection");
        };
        state.start_sync(batch);
        assert_eq!(state.active_screen().phase(), BulkPhase::Committing);

        let Some(TaskResult::SyncFinished(report)) = task_rx.recv().await else {
            panic!("sync should report");
        };
        assert_eq!(report.failed_ids(), vec![CompactString::new("REG-2401")]);
        assert_eq!(state.apply_report(&report).unwrap(), 1);
        assert_eq!(state.active_screen().page_rows()[0].status_code, "PENDING");
        assert_eq!(state.active_screen().phase(), BulkPhase::Idle);
    }

    /// Accepts everything after `latency` and remembers what it was sent.
    struct RecordingBackend {
        latency: Duration,
        received: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl StatusBackend for RecordingBackend {
        async fn update_status(&self, _screen: ScreenId, id: &str, status_code: &str) -> Result<(), AppError> {
            tokio::time::sleep(self.latency).await;
            self.received.lock().push(format!("{id}:{status_code}"));
            Ok(())
        }
    }

    fn approve_first_request(state: &mut AppState) {
        let screen = state.active_screen_mut();
        screen.apply(ListCommand::SetSearch("REG-2401".into())).unwrap();
        screen.apply(ListCommand::ToggleCursor).unwrap();
        let ListOutcome::Transitioned(batch) = screen.apply(ListCommand::Shortcut('A')).unwrap() else {
            panic!("expected a transition");
        };
        state.start_sync(batch);
    }

    #[tokio::test(start_paused = true)]
    async fn test_switching_screens_reverts_unsent_push() {
        let received = Arc::new(Mutex::new(Vec::new()));
        let backend = RecordingBackend {
            latency: Duration::from_millis(600),
            received: Arc::clone(&received),
        };
        let (mut state, mut task_rx, _a) = state_with(Config::default(), backend).await;

        approve_first_request(&mut state);
        assert_eq!(state.active_screen().page_rows()[0].status_code, "APPROVED");

        assert!(state.switch_to(ScreenId::Employees));
        let notice = state.notification().unwrap();
        assert_eq!(notice.level, NotificationLevel::Warning);
        assert!(notice.message.contains("1 unsaved change(s)"));

        // the revoked push neither reaches the backend nor reports
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(received.lock().is_empty());
        assert!(matches!(task_rx.try_recv(), Err(mpsc::error::TryRecvError::Empty)));

        assert!(state.switch_to(ScreenId::Regularization));
        let row = &state.active_screen().page_rows()[0];
        assert_eq!(row.id, "REG-2401");
        assert_eq!(row.status_code, "PENDING");
        assert_eq!(state.active_screen().phase(), BulkPhase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_finished_push_still_reconciles_after_switch() {
        let received = Arc::new(Mutex::new(Vec::new()));
        let backend = RecordingBackend {
            latency: Duration::from_millis(5),
            received: Arc::clone(&received),
        };
        let (mut state, mut task_rx, _a) = state_with(Config::default(), backend).await;

        approve_first_request(&mut state);
        let Some(TaskResult::SyncFinished(report)) = task_rx.recv().await else {
            panic!("sync should report");
        };

        // the push already delivered, so leaving the screen reverts nothing
        assert!(state.switch_to(ScreenId::Employees));
        assert!(state.notification().is_none());
        assert_eq!(*received.lock(), vec!["REG-2401:APPROVED".to_string()]);

        assert_eq!(state.apply_report(&report).unwrap(), 0);
        // a second delivery of the same report is stale
        assert_eq!(state.apply_report(&report).unwrap(), 0);

        assert!(state.switch_to(ScreenId::Regularization));
        assert_eq!(state.active_screen().page_rows()[0].status_code, "APPROVED");
        assert_eq!(state.active_screen().phase(), BulkPhase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_notification_expires_by_id() {
        let (mut state, _t, mut action_rx) =
            state_with(Config::default(), SimulatedBackend::default()).await;

        state.notify(NotificationLevel::Info, "first");
        state.notify(NotificationLevel::Success, "second");

        tokio::time::advance(NOTIFICATION_TTL + Duration::from_millis(10)).await;
        let Some(Action::ExpireNotification(id)) = action_rx.recv().await else {
            panic!("timer should fire");
        };
        assert_eq!(id, 2);
        assert!(state.expire_notification(id));
        assert!(state.notification().is_none());
        assert!(!state.expire_notification(1));
    }

    #[tokio::test]
    async fn test_export_writes_filtered_rows() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.export_dir = dir.path().to_path_buf();
        let (mut state, _t, _a) = state_with(config, SimulatedBackend::default()).await;

        state
            .active_screen_mut()
            .apply(ListCommand::SetSearch("sarah".into()))
            .unwrap();
        let (path, rows) = state.export_active().unwrap();
        assert!(path.starts_with(dir.path()));
        assert_eq!(rows, state.active_screen().page_info().visible);
        assert!(rows > 0);
    }
}
