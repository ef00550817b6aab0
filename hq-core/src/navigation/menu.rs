//! ``src/navigation/menu.rs``
//! ============================================================================
//! # Declarative menu tree
//!
//! The sidebar is a pure lookup: given the tree and the active module id
//! (injected by the caller), it lists that module's entries. Nothing here
//! reads global state.

use std::{collections::BTreeMap, str::FromStr};

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::{error::AppError, model::screen_spec::ScreenId, navigation::icons::Icon};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleId {
    FlexiHq,
    TimeSync,
}

impl ModuleId {
    pub const ALL: [Self; 2] = [Self::FlexiHq, Self::TimeSync];

    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::FlexiHq => "Flexi HQ",
            Self::TimeSync => "TimeSync",
        }
    }

    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::FlexiHq => Self::TimeSync,
            Self::TimeSync => Self::FlexiHq,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuEntry {
    pub route: &'static str,
    pub group: &'static str,
    pub label: &'static str,
    pub icon: Icon,
    pub screen: ScreenId,
}

impl MenuEntry {
    const fn for_screen(screen: ScreenId, group: &'static str, label: &'static str, icon: Icon) -> Self {
        Self {
            route: screen.route(),
            group,
            label,
            icon,
            screen,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuModule {
    pub id: ModuleId,
    pub entries: SmallVec<[MenuEntry; 4]>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuTree {
    modules: Vec<MenuModule>,
}

impl MenuTree {
    /// The product's two modules and their list screens.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            modules: vec![
                MenuModule {
                    id: ModuleId::FlexiHq,
                    entries: SmallVec::from_iter([MenuEntry::for_screen(
                        ScreenId::Employees,
                        "People",
                        "Employees",
                        Icon::Users,
                    )]),
                },
                MenuModule {
                    id: ModuleId::TimeSync,
                    entries: SmallVec::from_iter([
                        MenuEntry::for_screen(
                            ScreenId::Regularization,
                            "Attendance",
                            "Regularization",
                            Icon::Clock,
                        ),
                        MenuEntry::for_screen(
                            ScreenId::ShiftSwap,
                            "Roster",
                            "Shift Swaps",
                            Icon::Swap,
                        ),
                    ]),
                },
            ],
        }
    }

    /// Apply route -> icon-name overrides. Unknown icons and unknown routes
    /// are both errors.
    pub fn with_icon_overrides(mut self, overrides: &BTreeMap<String, String>) -> Result<Self, AppError> {
        for (route, name) in overrides {
            let icon = Icon::from_str(name)?;
            let entry = self
                .modules
                .iter_mut()
                .flat_map(|module| module.entries.iter_mut())
                .find(|entry| entry.route == route.as_str())
                .ok_or_else(|| AppError::InvalidConfig(format!("menu_icons: no menu entry for route '{route}'")))?;
            entry.icon = icon;
        }
        Ok(self)
    }

    pub fn modules(&self) -> &[MenuModule] {
        &self.modules
    }

    /// Entries shown in the sidebar while `active` is selected.
    #[must_use]
    pub fn entries_for(&self, active: ModuleId) -> &[MenuEntry] {
        self.modules
            .iter()
            .find(|module| module.id == active)
            .map(|module| module.entries.as_slice())
            .unwrap_or(&[])
    }

    #[must_use]
    pub fn entry_by_route(&self, route: &str) -> Option<&MenuEntry> {
        self.modules
            .iter()
            .flat_map(|module| module.entries.iter())
            .find(|entry| entry.route == route)
    }

    /// Module owning the entry for `screen`.
    #[must_use]
    pub fn module_of(&self, screen: ScreenId) -> Option<ModuleId> {
        self.modules
            .iter()
            .find(|module| module.entries.iter().any(|entry| entry.screen == screen))
            .map(|module| module.id)
    }
}
