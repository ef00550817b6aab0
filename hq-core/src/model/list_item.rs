//! ``src/model/list_item.rs``
//! ============================================================================
//! # `ListItem`: the record shown in every list screen
//!
//! A list item is an opaque id, a status drawn from a closed per-screen
//! enumeration, and an ordered bag of display fields. The controllers never
//! look inside the bag except through the field names a screen declares.

use std::{fmt, hash::Hash};

use compact_str::CompactString;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Opaque, stable item identifier.
pub type ItemId = CompactString;

/// Display-field bag, insertion ordered.
pub type Fields = IndexMap<CompactString, String>;

/// Closed status enumeration of one screen.
///
/// `ALL` is ordered the way the tab bar shows it; `priority` drives the
/// optional status-first sort (lower sorts earlier).
pub trait ItemStatus: Copy + Eq + Hash + fmt::Debug + Send + Sync + 'static {
    const ALL: &'static [Self];

    /// Canonical upper-case code (`PENDING`, `ON_LEAVE`, ...).
    fn code(self) -> &'static str;

    /// Human label for tabs and cells.
    fn label(self) -> &'static str;

    fn priority(self) -> u8;

    /// Case-insensitive lookup by code.
    fn from_code(code: &str) -> Option<Self> {
        let code = code.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|status| status.code().eq_ignore_ascii_case(code))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem<S> {
    pub id: ItemId,
    pub status: S,
    pub fields: Fields,
}

impl<S: ItemStatus> ListItem<S> {
    #[must_use]
    pub fn new(id: impl Into<ItemId>, status: S) -> Self {
        Self {
            id: id.into(),
            status,
            fields: Fields::new(),
        }
    }

    #[must_use]
    pub fn with_field(mut self, name: &str, value: impl Into<String>) -> Self {
        self.fields.insert(CompactString::new(name), value.into());
        self
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Insert or replace a display field, returning the previous value.
    pub fn set_field(&mut self, name: &str, value: impl Into<String>) -> Option<String> {
        self.fields.insert(CompactString::new(name), value.into())
    }

    #[must_use]
    pub fn to_raw(&self) -> RawItem {
        RawItem {
            id: self.id.to_string(),
            status: self.status.code().to_string(),
            fields: self
                .fields
                .iter()
                .map(|(name, value)| (name.to_string(), value.clone()))
                .collect(),
        }
    }
}

/// Untyped record as it arrives from a data source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawItem {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub fields: IndexMap<String, String>,
}

impl RawItem {
    /// Validate the status against `S` and convert.
    pub fn into_item<S: ItemStatus>(self, screen: &str) -> Result<ListItem<S>, AppError> {
        if self.id.trim().is_empty() {
            return Err(AppError::invalid_input(
                format!("{screen}.id"),
                "item id must not be blank",
            ));
        }

        let status: S =
            S::from_code(&self.status).ok_or_else(|| AppError::unknown_status(screen, &self.status))?;

        Ok(ListItem {
            id: ItemId::from(self.id),
            status,
            fields: self
                .fields
                .into_iter()
                .map(|(name, value)| (CompactString::from(name), value))
                .collect(),
        })
    }
}
