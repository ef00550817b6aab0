// hq-core/src/controller/handlers/search_handler.rs
// Free-text search input; claims every key while the search box is active

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::trace;

use super::*;
use crate::{controller::actions::Action, error::AppError, model::screen::ListCommand};

#[derive(Debug, Default)]
pub struct SearchHandler;

impl SearchHandler {
    fn handle_input(event: KeyEvent) -> Vec<Action> {
        trace!(
            marker = "SEARCH_INPUT",
            operation_type = "input_handling",
            "SearchHandler: key {:?}",
            event
        );

        match event.code {
            KeyCode::Enter => vec![Action::ExitSearch { clear: false }],
            KeyCode::Esc => vec![Action::ExitSearch { clear: true }],
            KeyCode::Backspace => vec![Action::List(ListCommand::PopSearch)],
            KeyCode::Char('u') if event.modifiers.contains(KeyModifiers::CONTROL) => {
                vec![Action::List(ListCommand::ClearSearch)]
            }
            KeyCode::Char('c') if event.modifiers.contains(KeyModifiers::CONTROL) => vec![Action::Quit],
            _ => plain_char(&event)
                .map(|c| Action::List(ListCommand::PushSearch(c)))
                .into_iter()
                .collect(),
        }
    }
}

impl EventHandler for SearchHandler {
    fn can_handle(&self, event: &Event) -> bool {
        matches!(event, Event::Key { ctx, .. } if ctx.search_mode && !ctx.modal_open())
    }

    fn handle(&mut self, event: Event) -> Result<Vec<Action>, AppError> {
        match event {
            Event::Key { event, .. } => Ok(Self::handle_input(event)),
            Event::Resize { .. } => Ok(vec![]),
        }
    }

    fn priority(&self) -> u8 {
        1
    }

    fn name(&self) -> &'static str {
        "SearchHandler"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typing() -> HandlerContext {
        HandlerContext {
            search_mode: true,
            ..HandlerContext::default()
        }
    }

    #[test]
    fn test_letters_become_query_text() {
        let mut h = SearchHandler;
        // 'q' quits in normal mode but is plain text here
        let actions = h.handle(key_event(key('q'), typing())).unwrap();
        assert!(matches!(actions.as_slice(), [Action::List(ListCommand::PushSearch('q'))]));

        let actions = h.handle(key_event(backspace_key(), typing())).unwrap();
        assert!(matches!(actions.as_slice(), [Action::List(ListCommand::PopSearch)]));
    }

    #[test]
    fn test_enter_keeps_query_escape_clears() {
        let mut h = SearchHandler;
        let enter = h.handle(key_event(enter_key(), typing())).unwrap();
        assert!(matches!(enter.as_slice(), [Action::ExitSearch { clear: false }]));

        let esc = h.handle(key_event(escape_key(), typing())).unwrap();
        assert!(matches!(esc.as_slice(), [Action::ExitSearch { clear: true }]));
    }

    #[test]
    fn test_only_active_in_search_mode() {
        let h = SearchHandler;
        assert!(!h.can_handle(&key_event(key('a'), HandlerContext::default())));
        assert!(h.can_handle(&key_event(ctrl('u'), typing())));
    }
}
