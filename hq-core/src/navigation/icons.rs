//! Closed icon table for the sidebar.
//!
//! Icon names coming from configuration are parsed strictly; a typo is an
//! `UnknownIcon` error at load time instead of a blank glyph at render time.

use std::{fmt, str::FromStr};

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Icon {
    Dashboard,
    Users,
    Building,
    Clock,
    Calendar,
    Swap,
    Clipboard,
    Chart,
    Settings,
}

impl Icon {
    pub const ALL: [Self; 9] = [
        Self::Dashboard,
        Self::Users,
        Self::Building,
        Self::Clock,
        Self::Calendar,
        Self::Swap,
        Self::Clipboard,
        Self::Chart,
        Self::Settings,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Dashboard => "dashboard",
            Self::Users => "users",
            Self::Building => "building",
            Self::Clock => "clock",
            Self::Calendar => "calendar",
            Self::Swap => "swap",
            Self::Clipboard => "clipboard",
            Self::Chart => "chart",
            Self::Settings => "settings",
        }
    }

    /// Single-cell glyph drawn in the sidebar.
    #[must_use]
    pub const fn glyph(self) -> &'static str {
        match self {
            Self::Dashboard => "▦",
            Self::Users => "☺",
            Self::Building => "▣",
            Self::Clock => "◷",
            Self::Calendar => "▤",
            Self::Swap => "⇄",
            Self::Clipboard => "✎",
            Self::Chart => "▲",
            Self::Settings => "⚙",
        }
    }
}

impl FromStr for Icon {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|icon| icon.name() == s)
            .ok_or_else(|| AppError::UnknownIcon(s.to_string()))
    }
}

impl fmt::Display for Icon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_name_parses_back() {
        for icon in Icon::ALL {
            assert_eq!(icon.name().parse::<Icon>().unwrap(), icon);
        }
    }

    #[test]
    fn test_lookup_is_strict() {
        assert!(matches!("Users".parse::<Icon>(), Err(AppError::UnknownIcon(name)) if name == "Users"));
        assert!("user".parse::<Icon>().is_err());
        assert!("".parse::<Icon>().is_err());
    }
}
