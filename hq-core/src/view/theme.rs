//! src/view/theme.rs
//! ============================================================================
//! # Console colour palettes
//!
//! `Theme::Default` and `Theme::Dark` use Catppuccin Mocha (Dark swaps in a
//! pure black base), `Theme::Light` uses Catppuccin Latte.
//! https://github.com/catppuccin/catppuccin

use ratatui::style::{Color, Modifier, Style};
use tracing::debug;

use crate::{config::Theme, model::app_state::NotificationLevel};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: Color,
    pub surface: Color,
    pub foreground: Color,
    pub muted: Color,
    pub accent: Color,
    pub border: Color,
    pub heading: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub info: Color,
}

pub const MOCHA: Palette = Palette {
    background: Color::Rgb(30, 30, 46),  // Base
    surface: Color::Rgb(69, 71, 90),     // Surface1
    foreground: Color::Rgb(205, 214, 244), // Text
    muted: Color::Rgb(127, 132, 156),    // Overlay1
    accent: Color::Rgb(203, 166, 247),   // Mauve
    border: Color::Rgb(88, 91, 112),     // Surface2
    heading: Color::Rgb(249, 226, 175),  // Yellow
    success: Color::Rgb(166, 227, 161),  // Green
    warning: Color::Rgb(250, 179, 135),  // Peach
    error: Color::Rgb(243, 139, 168),    // Red
    info: Color::Rgb(137, 220, 235),     // Sky
};

pub const MIDNIGHT: Palette = Palette {
    background: Color::Black,
    surface: Color::Rgb(49, 50, 68), // Surface0
    ..MOCHA
};

pub const LATTE: Palette = Palette {
    background: Color::Rgb(239, 241, 245), // Base
    surface: Color::Rgb(204, 208, 218),    // Surface0
    foreground: Color::Rgb(76, 79, 105),   // Text
    muted: Color::Rgb(140, 143, 161),      // Overlay1
    accent: Color::Rgb(136, 57, 239),      // Mauve
    border: Color::Rgb(172, 176, 190),     // Surface2
    heading: Color::Rgb(223, 142, 29),     // Yellow
    success: Color::Rgb(64, 160, 43),      // Green
    warning: Color::Rgb(254, 100, 11),     // Peach
    error: Color::Rgb(210, 15, 57),        // Red
    info: Color::Rgb(4, 165, 229),         // Sky
};

impl Default for Palette {
    fn default() -> Self {
        MOCHA
    }
}

impl Palette {
    #[must_use]
    pub fn for_theme(theme: Theme) -> Self {
        let palette = match theme {
            Theme::Default => MOCHA,
            Theme::Dark => MIDNIGHT,
            Theme::Light => LATTE,
        };
        debug!(
            marker = "THEME_SELECTED",
            operation_type = "view",
            ?theme,
            "palette selected"
        );
        palette
    }

    #[must_use]
    pub fn base(&self) -> Style {
        Style::default().bg(self.background).fg(self.foreground)
    }

    #[must_use]
    pub fn border(&self) -> Style {
        Style::default().fg(self.border)
    }

    #[must_use]
    pub fn focused_border(&self) -> Style {
        Style::default().fg(self.accent)
    }

    #[must_use]
    pub fn title(&self) -> Style {
        Style::default().fg(self.accent).add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn header(&self) -> Style {
        Style::default().fg(self.heading).add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn highlight(&self) -> Style {
        Style::default().bg(self.surface).add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn muted(&self) -> Style {
        Style::default().fg(self.muted)
    }

    /// Colour for a canonical status code.
    #[must_use]
    pub fn status(&self, code: &str) -> Style {
        let fg = match code {
            "APPROVED" | "ACTIVE" => self.success,
            "PENDING" | "ON_LEAVE" => self.warning,
            "REJECTED" | "INACTIVE" => self.error,
            _ => self.foreground,
        };
        Style::default().fg(fg)
    }

    #[must_use]
    pub fn notification(&self, level: NotificationLevel) -> Style {
        let fg = match level {
            NotificationLevel::Info => self.info,
            NotificationLevel::Success => self.success,
            NotificationLevel::Warning => self.warning,
            NotificationLevel::Error => self.error,
        };
        Style::default().fg(fg).add_modifier(Modifier::BOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_colours_follow_outcome() {
        let palette = Palette::for_theme(Theme::Default);
        assert_eq!(palette.status("APPROVED").fg, Some(MOCHA.success));
        assert_eq!(palette.status("ON_LEAVE").fg, Some(MOCHA.warning));
        assert_eq!(palette.status("unknown").fg, Some(MOCHA.foreground));
    }

    #[test]
    fn test_dark_keeps_mocha_accents() {
        let dark = Palette::for_theme(Theme::Dark);
        assert_eq!(dark.background, Color::Black);
        assert_eq!(dark.accent, MOCHA.accent);
        assert_ne!(Palette::for_theme(Theme::Light), MOCHA);
    }
}
