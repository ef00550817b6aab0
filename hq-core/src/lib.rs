pub mod error;

pub mod config;

pub mod controller {
    pub mod actions;
    pub use actions::Action;

    pub mod dispatcher;
    pub use dispatcher::Dispatcher;

    pub mod event_loop;
    pub use event_loop::{EventLoop, TaskResult};

    pub mod handlers;

    pub mod key_router;
    pub use key_router::{KeyRouter, Mounted};
}

pub mod model {
    pub mod app_state;
    pub use app_state::{AppState, InputMode, Notification, NotificationLevel};

    pub mod expansion;
    pub mod filter;
    pub mod list_item;
    pub use list_item::{ItemId, ItemStatus, ListItem};

    pub mod list_state;
    pub use list_state::{BulkPhase, BulkReceipt, ListController};

    pub mod modal;
    pub use modal::{Modal, ModalStack};

    pub mod screen;
    pub use screen::{ListCommand, ListOutcome, Screen};

    pub mod screen_spec;
    pub use screen_spec::{ScreenId, ScreenSpec};

    pub mod selection;
    pub mod shortcuts;
    pub mod status;
    pub use status::{EmployeeStatus, RequestStatus};
}

pub mod view {
    pub mod theme;

    pub mod ui;

    pub mod components {
        pub mod confirm_overlay;
        pub mod detail_overlay;
        pub mod filter_bar;
        pub mod help_overlay;
        pub mod list_table;
        pub mod sidebar;
        pub mod status_bar;
        pub mod tab_bar;
    }
}

pub mod tasks {
    pub mod sync_task;
    pub use sync_task::{SimulatedBackend, StatusBackend, SyncBatch, SyncReport};

    pub mod task_handle;
    pub use task_handle::{TaskHandle, TaskScope};
}

pub mod data;

pub mod navigation;

pub mod export;

pub mod logging;
pub use logging::Logger;

pub use config::Config;
pub use error::AppError;
