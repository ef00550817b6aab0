// hq-core/src/controller/handlers/keyboard_handler.rs
// Global keys: quit, help, escape, screen/module switching, export, delete

use std::collections::HashMap;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::trace;

use super::*;
use crate::{controller::actions::Action, error::AppError, model::modal::Modal};

pub struct KeyboardHandler {
    /// Keys that work regardless of modals.
    always: HashMap<KeyEvent, Action>,

    /// Keys that only work on the bare list.
    list_only: HashMap<KeyEvent, Action>,
}

impl Default for KeyboardHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyboardHandler {
    pub fn new() -> Self {
        let mut always = HashMap::with_capacity(4);
        always.insert(key('q'), Action::Quit);
        always.insert(ctrl('c'), Action::Quit);
        always.insert(key('?'), Action::ToggleHelp);
        always.insert(escape_key(), Action::Escape);

        let mut list_only = HashMap::with_capacity(8);
        list_only.insert(key('/'), Action::EnterSearch);
        list_only.insert(key('['), Action::PrevScreen);
        list_only.insert(key(']'), Action::NextScreen);
        list_only.insert(key('m'), Action::SwitchModule);
        list_only.insert(key('e'), Action::Export);
        list_only.insert(key('x'), Action::RequestDelete);
        list_only.insert(arrow_key(KeyCode::Delete), Action::RequestDelete);

        Self { always, list_only }
    }

    fn confirm_key(event: &KeyEvent) -> Option<Action> {
        match event.code {
            KeyCode::Char('y' | 'Y') | KeyCode::Enter => Some(Action::ConfirmDelete),
            KeyCode::Char('n' | 'N') => Some(Action::CancelDelete),
            _ => None,
        }
    }

    /// Lookup key: Shift is implied by the character itself ('?' arrives
    /// with SHIFT on most terminals), and kind/state flags are dropped.
    fn lookup_key(event: &KeyEvent) -> KeyEvent {
        let modifiers = match event.code {
            KeyCode::Char(_) => event.modifiers.difference(KeyModifiers::SHIFT),
            _ => event.modifiers,
        };
        KeyEvent::new(event.code, modifiers)
    }

    fn resolve(&self, event: &KeyEvent, ctx: HandlerContext) -> Option<Action> {
        let event = &Self::lookup_key(event);
        if ctx.top_modal == Some(Modal::ConfirmDelete)
            && let Some(action) = Self::confirm_key(event)
        {
            return Some(action);
        }

        if let Some(action) = self.always.get(event) {
            return Some(action.clone());
        }

        if ctx.modal_open() {
            return None;
        }

        match self.list_only.get(event) {
            Some(Action::RequestDelete) if ctx.selection_len == 0 => Some(Action::NoOp),
            other => other.cloned(),
        }
    }
}

impl EventHandler for KeyboardHandler {
    fn can_handle(&self, event: &Event) -> bool {
        match event {
            Event::Key { event, ctx } => !ctx.search_mode && self.resolve(event, *ctx).is_some(),
            Event::Resize { .. } => true,
        }
    }

    fn handle(&mut self, event: Event) -> Result<Vec<Action>, AppError> {
        match event {
            Event::Key { event, ctx } => {
                trace!(
                    marker = "KEYBOARD_HANDLER_KEY_EVENT",
                    operation_type = "input_handling",
                    "KeyboardHandler: key {:?}",
                    event
                );
                Ok(self.resolve(&event, ctx).into_iter().collect())
            }
            Event::Resize { width, height } => Ok(vec![Action::Resize(width, height)]),
        }
    }

    fn priority(&self) -> u8 {
        5
    }

    fn name(&self) -> &'static str {
        "KeyboardHandler"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_modal(modal: Modal, selection_len: usize) -> HandlerContext {
        HandlerContext {
            selection_len,
            top_modal: Some(modal),
            search_mode: false,
        }
    }

    #[test]
    fn test_confirm_modal_takes_y_and_n() {
        let mut h = KeyboardHandler::new();
        let ctx = with_modal(Modal::ConfirmDelete, 2);

        let yes = h.handle(key_event(key('y'), ctx)).unwrap();
        assert!(matches!(yes.as_slice(), [Action::ConfirmDelete]));

        let no = h.handle(key_event(key('n'), ctx)).unwrap();
        assert!(matches!(no.as_slice(), [Action::CancelDelete]));
    }

    #[test]
    fn test_escape_and_quit_work_under_modal() {
        let mut h = KeyboardHandler::new();
        let ctx = with_modal(Modal::Detail, 0);

        let esc = h.handle(key_event(escape_key(), ctx)).unwrap();
        assert!(matches!(esc.as_slice(), [Action::Escape]));
        assert!(h.can_handle(&key_event(key('q'), ctx)));

        // list keys are blocked
        assert!(!h.can_handle(&key_event(key(']'), ctx)));
    }

    #[test]
    fn test_delete_needs_selection() {
        let mut h = KeyboardHandler::new();
        let none = h.handle(key_event(key('x'), HandlerContext::default())).unwrap();
        assert!(matches!(none.as_slice(), [Action::NoOp]));

        let ctx = HandlerContext {
            selection_len: 1,
            ..HandlerContext::default()
        };
        let some = h.handle(key_event(key('x'), ctx)).unwrap();
        assert!(matches!(some.as_slice(), [Action::RequestDelete]));
    }

    #[test]
    fn test_shifted_punctuation_still_matches() {
        let mut h = KeyboardHandler::new();
        let help = KeyEvent::new(KeyCode::Char('?'), KeyModifiers::SHIFT);
        let actions = h.handle(key_event(help, HandlerContext::default())).unwrap();
        assert!(matches!(actions.as_slice(), [Action::ToggleHelp]));
    }

    #[test]
    fn test_search_mode_defers_to_search_handler() {
        let h = KeyboardHandler::new();
        let ctx = HandlerContext {
            search_mode: true,
            ..HandlerContext::default()
        };
        assert!(!h.can_handle(&key_event(key('q'), ctx)));
    }
}
