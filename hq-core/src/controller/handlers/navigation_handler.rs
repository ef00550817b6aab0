// hq-core/src/controller/handlers/navigation_handler.rs
// Cursor, paging, tabs, selection and expansion keys of the active list

use std::collections::HashMap;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::trace;

use super::*;
use crate::{controller::actions::Action, error::AppError, model::screen::ListCommand};

pub struct NavigationHandler {
    bindings: HashMap<KeyEvent, Action>,
}

impl Default for NavigationHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl NavigationHandler {
    pub fn new() -> Self {
        let mut bindings = HashMap::with_capacity(24);
        let list = |cmd: ListCommand| Action::List(cmd);

        // Cursor
        bindings.insert(arrow_key(KeyCode::Up), list(ListCommand::CursorUp));
        bindings.insert(arrow_key(KeyCode::Down), list(ListCommand::CursorDown));
        bindings.insert(key('k'), list(ListCommand::CursorUp));
        bindings.insert(key('j'), list(ListCommand::CursorDown));

        // Pages
        bindings.insert(arrow_key(KeyCode::PageUp), list(ListCommand::PrevPage));
        bindings.insert(arrow_key(KeyCode::PageDown), list(ListCommand::NextPage));
        bindings.insert(arrow_key(KeyCode::Left), list(ListCommand::PrevPage));
        bindings.insert(arrow_key(KeyCode::Right), list(ListCommand::NextPage));
        bindings.insert(key('p'), list(ListCommand::PrevPage));
        bindings.insert(key('n'), list(ListCommand::NextPage));

        // Status tabs
        bindings.insert(tab_key(), list(ListCommand::NextTab));
        bindings.insert(
            KeyEvent::new(KeyCode::BackTab, KeyModifiers::SHIFT),
            list(ListCommand::PrevTab),
        );

        // Selection
        bindings.insert(key(' '), list(ListCommand::ToggleCursor));
        bindings.insert(key('v'), list(ListCommand::TogglePage));
        bindings.insert(key('c'), list(ListCommand::ClearSelection));

        // Rows
        bindings.insert(enter_key(), list(ListCommand::ToggleExpand));
        bindings.insert(key('o'), Action::OpenDetail);

        // Dropdown filters: 1..9 advance, 0 clears them all
        for (idx, digit) in ('1'..='9').enumerate() {
            bindings.insert(key(digit), list(ListCommand::CycleDropdown(idx)));
        }
        bindings.insert(key('0'), list(ListCommand::ClearDropdowns));

        Self { bindings }
    }

    fn lookup(&self, event: &KeyEvent) -> Option<&Action> {
        // BackTab arrives with or without SHIFT depending on the terminal
        if event.code == KeyCode::BackTab {
            return self
                .bindings
                .get(&KeyEvent::new(KeyCode::BackTab, KeyModifiers::SHIFT));
        }
        self.bindings.get(event)
    }
}

impl EventHandler for NavigationHandler {
    fn can_handle(&self, event: &Event) -> bool {
        match event {
            Event::Key { event, ctx } => !ctx.search_mode && !ctx.modal_open() && self.lookup(event).is_some(),
            Event::Resize { .. } => false,
        }
    }

    fn handle(&mut self, event: Event) -> Result<Vec<Action>, AppError> {
        let Event::Key { event, .. } = event else {
            return Ok(vec![]);
        };

        trace!(
            marker = "NAVIGATION_HANDLER_KEY_EVENT",
            operation_type = "input_handling",
            "NavigationHandler: key {:?}",
            event
        );

        Ok(self.lookup(&event).cloned().into_iter().collect())
    }

    fn priority(&self) -> u8 {
        20
    }

    fn name(&self) -> &'static str {
        "NavigationHandler"
    }
}
