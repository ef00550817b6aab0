//! Bulk-transition letters of one screen.
//!
//! Mounted while its screen is active. A letter only fires when something is
//! selected, no modal is open and the search box is not capturing input;
//! otherwise the key is swallowed.

use crossterm::event::KeyEvent;
use smallvec::SmallVec;
use tracing::{debug, trace};

use super::{Event, EventHandler, HandlerContext, plain_char};
use crate::{
    controller::actions::Action,
    error::AppError,
    model::{screen::ListCommand, screen_spec::ScreenId},
};

pub struct ShortcutHandler {
    screen: ScreenId,

    /// Upper-case letters bound on the screen.
    keys: SmallVec<[char; 4]>,
}

impl ShortcutHandler {
    pub fn new<I>(screen: ScreenId, keys: I) -> Self
    where
        I: IntoIterator<Item = char>,
    {
        Self {
            screen,
            keys: keys.into_iter().map(|c| c.to_ascii_uppercase()).collect(),
        }
    }

    fn bound(&self, event: &KeyEvent) -> Option<char> {
        plain_char(event)
            .map(|c| c.to_ascii_uppercase())
            .filter(|c| self.keys.contains(c))
    }

    fn handle_key(&self, event: &KeyEvent, ctx: HandlerContext) -> Vec<Action> {
        let Some(letter) = self.bound(event) else {
            return Vec::new();
        };

        if ctx.search_mode || ctx.modal_open() || ctx.selection_len == 0 {
            trace!(
                marker = "SHORTCUT_SUPPRESSED",
                operation_type = "input_handling",
                screen = self.screen.slug(),
                letter = %letter,
                selection = ctx.selection_len,
                modal = ?ctx.top_modal,
                "shortcut ignored"
            );
            return Vec::new();
        }

        debug!(
            marker = "SHORTCUT_FIRED",
            operation_type = "input_handling",
            screen = self.screen.slug(),
            letter = %letter,
            selection = ctx.selection_len,
            "bulk shortcut"
        );
        vec![Action::List(ListCommand::Shortcut(letter))]
    }
}

impl EventHandler for ShortcutHandler {
    fn can_handle(&self, event: &Event) -> bool {
        matches!(event, Event::Key { event, .. } if self.bound(event).is_some())
    }

    fn handle(&mut self, event: Event) -> Result<Vec<Action>, AppError> {
        match event {
            Event::Key { event, ctx } => Ok(self.handle_key(&event, ctx)),
            Event::Resize { .. } => Ok(Vec::new()),
        }
    }

    fn priority(&self) -> u8 {
        10
    }

    fn name(&self) -> &'static str {
        "ShortcutHandler"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        controller::handlers::{ctrl, key, key_event, shift},
        model::modal::Modal,
    };

    fn handler() -> ShortcutHandler {
        ShortcutHandler::new(ScreenId::Regularization, ['A', 'r'])
    }

    fn selected(n: usize) -> HandlerContext {
        HandlerContext {
            selection_len: n,
            ..HandlerContext::default()
        }
    }

    fn fired(actions: &[Action]) -> Option<char> {
        match actions {
            [Action::List(ListCommand::Shortcut(c))] => Some(*c),
            _ => None,
        }
    }

    #[test]
    fn test_fires_with_selection_either_case() {
        let mut h = handler();
        assert_eq!(fired(&h.handle(key_event(key('a'), selected(2))).unwrap()), Some('A'));
        assert_eq!(fired(&h.handle(key_event(shift('r'), selected(1))).unwrap()), Some('R'));
    }

    #[test]
    fn test_empty_selection_does_nothing() {
        let mut h = handler();
        assert!(h.can_handle(&key_event(key('a'), selected(0))));
        assert!(h.handle(key_event(key('a'), selected(0))).unwrap().is_empty());
    }

    #[test]
    fn test_open_modal_blocks_shortcut() {
        let mut h = handler();
        let ctx = HandlerContext {
            selection_len: 3,
            top_modal: Some(Modal::Detail),
            search_mode: false,
        };
        assert!(h.handle(key_event(key('a'), ctx)).unwrap().is_empty());

        let typing = HandlerContext {
            search_mode: true,
            ..selected(3)
        };
        assert!(h.handle(key_event(key('a'), typing)).unwrap().is_empty());
    }

    #[test]
    fn test_unbound_and_modified_keys_not_claimed() {
        let h = handler();
        assert!(!h.can_handle(&key_event(key('z'), selected(1))));
        assert!(!h.can_handle(&key_event(ctrl('a'), selected(1))));
    }
}
