//! src/error.rs
//! ============================================================================
//! # `AppError`: Unified Error Type for the Workforce Console
//!
//! Every fallible operation in the crate returns `Result<T, AppError>`. Each
//! variant carries enough context (item id, screen, field) to be shown in the
//! status bar or written to the log without further decoration.

use std::{io, path::PathBuf};
use thiserror::Error;

/// Unified error type for list controllers, configuration and the terminal UI.
#[derive(Debug, Error)]
pub enum AppError {
    /// Standard IO error, auto-converted from `io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// TOML config parsing error.
    #[error("Config parse error: {0}")]
    Config(#[from] toml::de::Error),

    /// TOML config serialization error.
    #[error("Config write error: {0}")]
    ConfigWrite(#[from] toml::ser::Error),

    /// Config or data file I/O error with path.
    #[error("Failed to access {path:?}: {source}")]
    FileIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Config contents are well-formed but semantically invalid.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// JSON seed data (de)serialization error.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// CSV export error.
    #[error("CSV export error: {0}")]
    Csv(#[from] csv::Error),

    /// Two records in one collection share an id.
    #[error("Duplicate item id '{id}' in {screen}")]
    DuplicateId { screen: String, id: String },

    /// Operation referenced an id not present in the collection.
    #[error("Item '{0}' not found")]
    UnknownItem(String),

    /// Status code outside the closed set of a screen.
    #[error("Unknown status '{value}' for {screen}")]
    UnknownStatus { screen: String, value: String },

    /// Icon name not present in the icon table.
    #[error("Unknown icon '{0}'")]
    UnknownIcon(String),

    /// Keyboard shortcut rejected at configuration time.
    #[error("Invalid shortcut '{key}': {reason}")]
    InvalidShortcut { key: String, reason: String },

    /// Input validation errors
    #[error("Invalid input: {field} - {message}")]
    InvalidInput { field: String, message: String },

    /// A backend refused or failed a status update for one item.
    #[error("Backend rejected update of '{id}': {reason}")]
    Backend { id: String, reason: String },

    /// Any other error, with description.
    #[error("Unexpected error: {0}")]
    Other(String),
}

impl AppError {
    #[must_use]
    /// Attach extra context to an error.
    pub fn with_context<S: Into<String>>(self, ctx: S) -> Self {
        Self::Other(format!("{}: {}", ctx.into(), self))
    }

    /// Create a file access error
    pub fn file_io<P: Into<PathBuf>>(path: P, source: io::Error) -> Self {
        Self::FileIo {
            path: path.into(),
            source,
        }
    }

    /// Create a duplicate id error
    pub fn duplicate_id<S1: Into<String>, S2: Into<String>>(screen: S1, id: S2) -> Self {
        Self::DuplicateId {
            screen: screen.into(),
            id: id.into(),
        }
    }

    /// Create an unknown status error
    pub fn unknown_status<S1: Into<String>, S2: Into<String>>(screen: S1, value: S2) -> Self {
        Self::UnknownStatus {
            screen: screen.into(),
            value: value.into(),
        }
    }

    /// Create a shortcut validation error
    pub fn invalid_shortcut<S1: Into<String>, S2: Into<String>>(key: S1, reason: S2) -> Self {
        Self::InvalidShortcut {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Create an input validation error
    pub fn invalid_input<S1: Into<String>, S2: Into<String>>(field: S1, message: S2) -> Self {
        Self::InvalidInput {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a backend failure error
    pub fn backend<S1: Into<String>, S2: Into<String>>(id: S1, reason: S2) -> Self {
        Self::Backend {
            id: id.into(),
            reason: reason.into(),
        }
    }
}

// Manual Clone implementation to handle non-Clone fields
impl Clone for AppError {
    fn clone(&self) -> Self {
        match self {
            Self::Io(e) => Self::Io(io::Error::new(e.kind(), e.to_string())),
            Self::Config(e) => Self::InvalidConfig(e.to_string()),
            Self::ConfigWrite(e) => Self::InvalidConfig(e.to_string()),
            Self::FileIo { path, source } => Self::FileIo {
                path: path.clone(),
                source: io::Error::new(source.kind(), source.to_string()),
            },
            Self::InvalidConfig(msg) => Self::InvalidConfig(msg.clone()),
            Self::Serde(e) => Self::Other(format!("Serde error: {e}")),
            Self::Csv(e) => Self::Other(format!("CSV error: {e}")),
            Self::DuplicateId { screen, id } => Self::DuplicateId {
                screen: screen.clone(),
                id: id.clone(),
            },
            Self::UnknownItem(id) => Self::UnknownItem(id.clone()),
            Self::UnknownStatus { screen, value } => Self::UnknownStatus {
                screen: screen.clone(),
                value: value.clone(),
            },
            Self::UnknownIcon(name) => Self::UnknownIcon(name.clone()),
            Self::InvalidShortcut { key, reason } => Self::InvalidShortcut {
                key: key.clone(),
                reason: reason.clone(),
            },
            Self::InvalidInput { field, message } => Self::InvalidInput {
                field: field.clone(),
                message: message.clone(),
            },
            Self::Backend { id, reason } => Self::Backend {
                id: id.clone(),
                reason: reason.clone(),
            },
            Self::Other(msg) => Self::Other(msg.clone()),
        }
    }
}

// Allow conversion from `anyhow::Error` as fallback.
impl From<anyhow::Error> for AppError {
    fn from(e: anyhow::Error) -> Self {
        Self::Other(e.to_string())
    }
}
