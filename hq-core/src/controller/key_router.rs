//! ``src/controller/key_router.rs``
//! ============================================================================
//! # `KeyRouter`: scoped handler registration
//!
//! Handlers are mounted into the router and stay registered exactly as long
//! as the returned [`Mounted`] guard lives. Dropping the guard deregisters
//! the handler, whichever path the owner takes out of scope, so a screen's
//! shortcut letters can never outlive the screen.
//!
//! Routing walks handlers in priority order (lower first); the first one
//! whose `can_handle` accepts the event produces the actions.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::{
    controller::{
        actions::Action,
        handlers::{Event, EventHandler},
    },
    error::AppError,
};

struct RouteEntry {
    id: u64,
    priority: u8,
    name: &'static str,
    handler: Box<dyn EventHandler>,
}

#[derive(Default)]
struct RouterInner {
    entries: Vec<RouteEntry>,
    next_id: u64,
}

#[derive(Clone, Default)]
pub struct KeyRouter {
    inner: Arc<Mutex<RouterInner>>,
}

/// Registration guard; the handler is removed when this drops.
#[must_use = "dropping the guard unmounts the handler immediately"]
pub struct Mounted {
    id: u64,
    name: &'static str,
    router: Weak<Mutex<RouterInner>>,
}

impl Mounted {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl Drop for Mounted {
    fn drop(&mut self) {
        if let Some(inner) = self.router.upgrade() {
            inner.lock().entries.retain(|entry| entry.id != self.id);
            debug!(
                marker = "HANDLER_UNMOUNTED",
                operation_type = "key_router",
                handler = self.name,
                "handler unmounted"
            );
        }
    }
}

impl KeyRouter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mount(&self, handler: Box<dyn EventHandler>) -> Mounted {
        let mut inner = self.inner.lock();
        let id = inner.next_id;
        inner.next_id += 1;

        let priority = handler.priority();
        let name = handler.name();
        let at = inner
            .entries
            .partition_point(|entry| entry.priority <= priority);
        inner.entries.insert(
            at,
            RouteEntry {
                id,
                priority,
                name,
                handler,
            },
        );

        debug!(
            marker = "HANDLER_MOUNTED",
            operation_type = "key_router",
            handler = name,
            priority,
            "handler mounted"
        );

        Mounted {
            id,
            name,
            router: Arc::downgrade(&self.inner),
        }
    }

    /// Route one event to the first handler that accepts it.
    pub fn route(&self, event: Event) -> Result<Vec<Action>, AppError> {
        let mut inner = self.inner.lock();
        let Some(entry) = inner
            .entries
            .iter_mut()
            .find(|entry| entry.handler.can_handle(&event))
        else {
            trace!(marker = "EVENT_UNHANDLED", operation_type = "key_router", ?event);
            return Ok(Vec::new());
        };

        trace!(
            marker = "EVENT_ROUTED",
            operation_type = "key_router",
            handler = entry.name,
            "event routed"
        );
        entry.handler.handle(event)
    }

    /// Mounted handler names in routing order.
    #[must_use]
    pub fn handler_names(&self) -> Vec<&'static str> {
        self.inner.lock().entries.iter().map(|entry| entry.name).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
