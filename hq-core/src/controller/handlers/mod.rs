//! Key handlers and the shared plumbing they are written against.
//!
//! Each handler claims a set of keys through `can_handle` and turns them into
//! `Action`s. Handlers never read application state directly; the router
//! passes a `HandlerContext` snapshot along with every key.

pub mod keyboard_handler;
pub mod navigation_handler;
pub mod search_handler;
pub mod shortcut_handler;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::{controller::actions::Action, error::AppError, model::modal::Modal};

/// State the handlers may consult, captured right before routing a key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HandlerContext {
    pub selection_len: usize,
    pub top_modal: Option<Modal>,
    pub search_mode: bool,
}

impl HandlerContext {
    #[must_use]
    pub const fn modal_open(&self) -> bool {
        self.top_modal.is_some()
    }
}

#[derive(Debug, Clone)]
pub enum Event {
    Key { event: KeyEvent, ctx: HandlerContext },
    Resize { width: u16, height: u16 },
}

/// Event handler trait for modular processing.
pub trait EventHandler: Send + Sync {
    /// Check if this handler can process the event.
    fn can_handle(&self, event: &Event) -> bool;

    /// Process event and return actions.
    fn handle(&mut self, event: Event) -> Result<Vec<Action>, AppError>;

    /// Handler priority for ordering (lower numbers run first).
    fn priority(&self) -> u8 {
        100
    }

    /// Handler name for debugging.
    fn name(&self) -> &'static str;
}

/// Letter typed without Control or Alt; Shift is allowed.
#[must_use]
pub fn plain_char(event: &KeyEvent) -> Option<char> {
    match event.code {
        KeyCode::Char(c) if !event.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => Some(c),
        _ => None,
    }
}

pub fn key(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
}

pub fn shift(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c.to_ascii_uppercase()), KeyModifiers::SHIFT)
}

pub fn ctrl(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
}

pub fn arrow_key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

pub fn tab_key() -> KeyEvent {
    KeyEvent::new(KeyCode::Tab, KeyModifiers::NONE)
}

pub fn enter_key() -> KeyEvent {
    KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)
}

pub fn backspace_key() -> KeyEvent {
    KeyEvent::new(KeyCode::Backspace, KeyModifiers::NONE)
}

pub fn escape_key() -> KeyEvent {
    KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)
}

#[cfg(test)]
pub(crate) fn key_event(event: KeyEvent, ctx: HandlerContext) -> Event {
    Event::Key { event, ctx }
}
