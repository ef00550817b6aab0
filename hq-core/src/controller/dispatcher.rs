//! ``src/controller/dispatcher.rs``
//! ============================================================================
//! # Dispatcher: keys in, state changes out
//!
//! Owns the `KeyRouter` and the mount guards. The global handlers are
//! mounted once; the shortcut handler is re-mounted on every screen switch,
//! which drops the previous screen's guard and with it that screen's
//! letters. `dispatch` applies one `Action` to `AppState`.

use crossterm::event::{Event as TerminalEvent, KeyEventKind};
use tracing::{debug, info, warn};

use crate::{
    controller::{
        actions::Action,
        handlers::{
            Event, keyboard_handler::KeyboardHandler, navigation_handler::NavigationHandler,
            search_handler::SearchHandler, shortcut_handler::ShortcutHandler,
        },
        key_router::{KeyRouter, Mounted},
    },
    error::AppError,
    model::{
        app_state::{AppState, InputMode, NotificationLevel},
        modal::Modal,
        screen::{ListCommand, ListOutcome},
        screen_spec::ScreenId,
    },
};

pub struct Dispatcher {
    router: KeyRouter,
    _globals: Vec<Mounted>,
    screen_keys: Option<(ScreenId, Mounted)>,
}

impl Dispatcher {
    pub fn new(state: &AppState) -> Self {
        let router = KeyRouter::new();
        let globals = vec![
            router.mount(Box::new(SearchHandler)),
            router.mount(Box::new(KeyboardHandler::new())),
            router.mount(Box::new(NavigationHandler::new())),
        ];

        let mut dispatcher = Self {
            router,
            _globals: globals,
            screen_keys: None,
        };
        dispatcher.mount_screen_keys(state);
        dispatcher
    }

    /// Swap the shortcut handler for the active screen's one.
    fn mount_screen_keys(&mut self, state: &AppState) {
        let screen = state.active_screen();
        if matches!(&self.screen_keys, Some((id, _)) if *id == screen.id()) {
            return;
        }

        // unmount first so two screens' letters never coexist
        self.screen_keys = None;
        let letters = screen.shortcuts().into_iter().map(|(key, _)| key);
        let guard = self
            .router
            .mount(Box::new(ShortcutHandler::new(screen.id(), letters)));
        self.screen_keys = Some((screen.id(), guard));
    }

    #[must_use]
    pub fn router(&self) -> &KeyRouter {
        &self.router
    }

    /// Translate a terminal event into actions through the router.
    pub fn on_terminal_event(
        &self,
        state: &AppState,
        event: TerminalEvent,
    ) -> Result<Vec<Action>, AppError> {
        match event {
            TerminalEvent::Key(key) if key.kind == KeyEventKind::Press => self.router.route(Event::Key {
                event: key,
                ctx: state.handler_context(),
            }),
            TerminalEvent::Resize(width, height) => self.router.route(Event::Resize { width, height }),
            _ => Ok(Vec::new()),
        }
    }

    /// Apply `action`. Returns `false` when the console should exit.
    pub fn dispatch(&mut self, state: &mut AppState, action: Action) -> bool {
        debug!(marker = "DISPATCH", operation_type = "dispatcher", ?action);

        match action {
            Action::Quit => return false,
            Action::NoOp | Action::Resize(..) => {}

            Action::List(command) => self.apply_list(state, command),

            Action::EnterSearch => state.input_mode = InputMode::Search,
            Action::ExitSearch { clear } => {
                state.input_mode = InputMode::Normal;
                if clear {
                    self.apply_list(state, ListCommand::ClearSearch);
                }
            }

            Action::Escape => match state.modals.close_top_most() {
                Some(Modal::Detail) => self.apply_list(state, ListCommand::CloseDetail),
                Some(_) => {}
                None => self.apply_list(state, ListCommand::ClearSearch),
            },

            Action::ToggleHelp => state.modals.toggle(Modal::Help),

            Action::OpenDetail => {
                if let Ok(ListOutcome::Changed) = state.active_screen_mut().apply(ListCommand::OpenDetail) {
                    state.modals.open(Modal::Detail);
                }
            }

            Action::RequestDelete => {
                if state.active_screen().selection_len() > 0 {
                    state.modals.open(Modal::ConfirmDelete);
                }
            }
            Action::ConfirmDelete => {
                state.modals.close(Modal::ConfirmDelete);
                self.apply_list(state, ListCommand::DeleteSelected);
            }
            Action::CancelDelete => state.modals.close(Modal::ConfirmDelete),

            Action::Export => match state.export_active() {
                Ok((path, rows)) => state.notify(
                    NotificationLevel::Success,
                    format!("Exported {rows} row(s) to {}", path.display()),
                ),
                Err(e) => Self::report_error(state, "export", &e),
            },

            Action::NextScreen | Action::PrevScreen => {
                if state.cycle_screen(matches!(action, Action::NextScreen)) {
                    self.mount_screen_keys(state);
                }
            }
            Action::SwitchModule => {
                let module = state.switch_module();
                self.mount_screen_keys(state);
                info!(
                    marker = "MODULE_SWITCHED",
                    operation_type = "dispatcher",
                    module = module.title(),
                    "module switched"
                );
            }

            Action::SyncFinished(report) => match state.apply_report(&report) {
                Ok(0) => state.notify(
                    NotificationLevel::Success,
                    format!("Saved {} change(s)", report.applied()),
                ),
                Ok(reverted) => state.notify(
                    NotificationLevel::Warning,
                    format!("{reverted} change(s) rejected by the server and reverted"),
                ),
                Err(e) => Self::report_error(state, "sync", &e),
            },

            Action::ExpireNotification(id) => {
                state.expire_notification(id);
            }
        }

        // a refresh or a revert can prune the row the overlay was showing
        if state.modals.is_open(Modal::Detail) && state.active_screen().detail().is_none() {
            state.modals.close(Modal::Detail);
            debug!(marker = "DETAIL_PRUNED", operation_type = "dispatcher", "detail overlay closed");
        }

        true
    }

    fn apply_list(&self, state: &mut AppState, command: ListCommand) {
        match state.active_screen_mut().apply(command) {
            Ok(ListOutcome::Transitioned(batch)) => {
                let count = batch.len();
                let status = batch.status_code;
                state.start_sync(batch);
                state.notify(
                    NotificationLevel::Info,
                    format!("Marked {count} item(s) {status}, saving..."),
                );
            }
            Ok(ListOutcome::Removed(count)) => {
                state.notify(NotificationLevel::Info, format!("Deleted {count} item(s)"));
            }
            Ok(ListOutcome::Changed | ListOutcome::Unchanged) => {}
            Err(e) => Self::report_error(state, "list", &e),
        }
    }

    fn report_error(state: &mut AppState, operation: &'static str, err: &AppError) {
        warn!(
            marker = "ACTION_FAILED",
            operation_type = "dispatcher",
            operation,
            error = %err,
            "action failed"
        );
        state.notify(NotificationLevel::Error, err.to_string());
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use tokio::sync::mpsc;

    use super::*;
    use crate::{
        config::Config,
        controller::{
            event_loop::TaskResult,
            handlers::{enter_key, escape_key, key, tab_key},
        },
        data::source::{DataSource, EmbeddedSeed},
        model::app_state::build_screens,
        tasks::sync_task::SimulatedBackend,
    };

    async fn setup() -> (AppState, Dispatcher) {
        let (state, dispatcher, _task_rx) = setup_with(SimulatedBackend::default()).await;
        (state, dispatcher)
    }

    async fn setup_with(
        backend: SimulatedBackend,
    ) -> (AppState, Dispatcher, mpsc::UnboundedReceiver<TaskResult>) {
        let (task_tx, task_rx) = mpsc::unbounded_channel();
        let (action_tx, _action_rx) = mpsc::unbounded_channel();
        let config = Config::default();
        let screens = build_screens(&config, EmbeddedSeed.load().await.unwrap()).unwrap();
        let state = AppState::new(
            Arc::new(config),
            screens,
            "test".into(),
            Arc::new(backend),
            task_tx,
            action_tx,
        )
        .unwrap();
        let dispatcher = Dispatcher::new(&state);
        (state, dispatcher, task_rx)
    }

    fn press(dispatcher: &mut Dispatcher, state: &mut AppState, event: KeyEvent) {
        let actions = dispatcher
            .on_terminal_event(state, TerminalEvent::Key(event))
            .unwrap();
        for action in actions {
            dispatcher.dispatch(state, action);
        }
    }

    #[tokio::test]
    async fn test_escape_closes_modals_in_priority_order() {
        let (mut state, mut dispatcher) = setup().await;

        press(&mut dispatcher, &mut state, key('?'));
        press(&mut dispatcher, &mut state, key('o'));
        // 'o' is a list key and is blocked while help is up
        assert_eq!(state.modals.top_most(), Some(Modal::Help));

        press(&mut dispatcher, &mut state, escape_key());
        press(&mut dispatcher, &mut state, key('o'));
        press(&mut dispatcher, &mut state, key('?'));
        assert!(state.modals.is_open(Modal::Detail) && state.modals.is_open(Modal::Help));

        press(&mut dispatcher, &mut state, escape_key());
        assert_eq!(state.modals.top_most(), Some(Modal::Help));
        assert!(state.active_screen().detail().is_none());

        press(&mut dispatcher, &mut state, escape_key());
        assert!(!state.modals.any_open());
    }

    #[tokio::test]
    async fn test_escape_without_modal_clears_search() {
        let (mut state, mut dispatcher) = setup().await;

        press(&mut dispatcher, &mut state, key('/'));
        for c in "sarah".chars() {
            press(&mut dispatcher, &mut state, key(c));
        }
        press(&mut dispatcher, &mut state, KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));
        assert_eq!(state.active_screen().search(), "sarah");
        assert_eq!(state.input_mode, InputMode::Normal);

        press(&mut dispatcher, &mut state, escape_key());
        assert_eq!(state.active_screen().search(), "");
    }

    #[tokio::test]
    async fn test_shortcut_needs_selection_and_no_modal() {
        let (mut state, mut dispatcher) = setup().await;
        let first_status = state.active_screen().page_rows()[0].status_code;

        press(&mut dispatcher, &mut state, key('a'));
        assert_eq!(state.active_screen().page_rows()[0].status_code, first_status);

        press(&mut dispatcher, &mut state, key(' '));
        press(&mut dispatcher, &mut state, key('?'));
        press(&mut dispatcher, &mut state, key('a'));
        assert_eq!(state.active_screen().selection_len(), 1);

        press(&mut dispatcher, &mut state, escape_key());
        press(&mut dispatcher, &mut state, key('a'));
        assert_eq!(state.active_screen().selection_len(), 0);
        assert!(state.notification().is_some());
    }

    #[tokio::test]
    async fn test_screen_switch_remounts_shortcuts() {
        let (mut state, mut dispatcher) = setup().await;
        assert_eq!(state.active_id(), ScreenId::Regularization);

        press(&mut dispatcher, &mut state, key('m'));
        assert_eq!(state.active_id(), ScreenId::Employees);
        assert_eq!(dispatcher.router().len(), 4);

        // 'L' (on leave) exists only on the employee screen
        press(&mut dispatcher, &mut state, key(' '));
        press(&mut dispatcher, &mut state, key('l'));
        assert_eq!(state.active_screen().selection_len(), 0);

        press(&mut dispatcher, &mut state, key('m'));
        press(&mut dispatcher, &mut state, key(' '));
        press(&mut dispatcher, &mut state, key('l'));
        assert_eq!(state.active_screen().selection_len(), 1);
        assert_eq!(dispatcher.router().len(), 4);
    }

    #[tokio::test]
    async fn test_confirmed_delete_removes_selection() {
        let (mut state, mut dispatcher) = setup().await;
        let total = state.active_screen().page_info().total;

        press(&mut dispatcher, &mut state, key('x'));
        assert!(!state.modals.any_open());

        press(&mut dispatcher, &mut state, key('v'));
        let selected = state.active_screen().selection_len();
        press(&mut dispatcher, &mut state, key('x'));
        assert!(state.modals.is_open(Modal::ConfirmDelete));

        press(&mut dispatcher, &mut state, key('n'));
        assert_eq!(state.active_screen().page_info().total, total);

        press(&mut dispatcher, &mut state, key('x'));
        press(&mut dispatcher, &mut state, key('y'));
        assert!(!state.modals.any_open());
        assert_eq!(state.active_screen().page_info().total, total - selected);
        assert_eq!(state.active_screen().selection_len(), 0);
    }

    #[tokio::test]
    async fn test_reverted_row_closes_its_detail_overlay() {
        let (mut state, mut dispatcher, mut task_rx) =
            setup_with(SimulatedBackend::default().rejecting(["REG-2401"])).await;

        press(&mut dispatcher, &mut state, key('/'));
        for c in "REG-2401".chars() {
            press(&mut dispatcher, &mut state, key(c));
        }
        press(&mut dispatcher, &mut state, enter_key());
        press(&mut dispatcher, &mut state, key(' '));
        press(&mut dispatcher, &mut state, key('a'));

        // All -> Pending -> Approved
        press(&mut dispatcher, &mut state, tab_key());
        press(&mut dispatcher, &mut state, tab_key());
        press(&mut dispatcher, &mut state, key('o'));
        assert!(state.modals.is_open(Modal::Detail));

        let Some(TaskResult::SyncFinished(report)) = task_rx.recv().await else {
            panic!("sync should report");
        };
        dispatcher.dispatch(&mut state, Action::SyncFinished(report));

        assert!(state.active_screen().detail().is_none());
        assert!(!state.modals.any_open());
        let actions = dispatcher
            .on_terminal_event(&state, TerminalEvent::Key(key('j')))
            .unwrap();
        assert!(!actions.is_empty());
    }
}
