//! src/controller/actions.rs
//! ============================================================================
//! # Actions: Centralized Console Commands
//!
//! Every key press and every background completion is turned into an
//! `Action` before it touches state. List-level work is wrapped in
//! [`ListCommand`] and forwarded to the active screen untouched.

use crate::{model::screen::ListCommand, tasks::sync_task::SyncReport};

#[derive(Debug, Clone)]
pub enum Action {
    /// Forward to the active list screen.
    List(ListCommand),

    /// Start capturing keystrokes into the search box.
    EnterSearch,

    /// Leave search input; `clear` also empties the query.
    ExitSearch {
        clear: bool,
    },

    /// Close the top-most modal, or clear the search when none is open.
    Escape,

    ToggleHelp,

    /// Open the detail panel for the cursor row.
    OpenDetail,

    /// Ask for confirmation before deleting the selection.
    RequestDelete,

    ConfirmDelete,

    CancelDelete,

    /// Write the filtered rows of the active screen to the export directory.
    Export,

    NextScreen,

    PrevScreen,

    /// Cycle the sidebar to the other product module.
    SwitchModule,

    /// A background status push finished.
    SyncFinished(SyncReport),

    /// Drop the status-bar message if it is still the one with this id.
    ExpireNotification(u64),

    Resize(u16, u16),

    Quit,

    NoOp,
}

impl Action {
    /// Whether the action can change what is on screen.
    #[must_use]
    pub const fn needs_redraw(&self) -> bool {
        !matches!(self, Self::NoOp)
    }
}
