//! src/view/components/help_overlay.rs
//!
//! Key reference. The bulk-status section is built from the active screen's
//! shortcut map, so rebinding a letter in the config shows up here.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use crate::view::theme::Palette;

const SECTIONS: &[(&str, &[(&str, &str)])] = &[
    (
        "Navigation",
        &[
            ("j/k ↑/↓", "Move cursor"),
            ("n/p ←/→", "Next / previous page"),
            ("Tab/S-Tab", "Next / previous status tab"),
            ("[ / ]", "Previous / next screen"),
            ("m", "Switch module"),
        ],
    ),
    (
        "Selection",
        &[
            ("Space", "Toggle row"),
            ("v", "Toggle every row on the page"),
            ("c", "Clear selection"),
        ],
    ),
    (
        "Rows",
        &[
            ("Enter", "Expand / collapse row"),
            ("o", "Open details"),
            ("x/Del", "Delete selection"),
            ("e", "Export filtered rows to CSV"),
        ],
    ),
    (
        "Filters",
        &[
            ("/", "Search (Enter keep, Esc clear)"),
            ("1-9", "Cycle dropdown filter"),
            ("0", "Clear dropdown filters"),
        ],
    ),
    (
        "Console",
        &[("?", "Toggle help"), ("Esc", "Close modal / clear search"), ("q", "Quit")],
    ),
];

pub struct HelpOverlay;

impl HelpOverlay {
    pub fn render(frame: &mut Frame<'_>, shortcuts: &[(char, &str)], palette: &Palette, area: Rect) {
        let mut lines = Vec::new();

        let bulk: Vec<(String, String)> = shortcuts
            .iter()
            .map(|(key, label)| (key.to_string(), format!("Mark selection {label}")))
            .collect();
        Self::section(
            &mut lines,
            "Bulk status",
            bulk.iter().map(|(key, label)| (key.as_str(), label.as_str())),
            palette,
        );

        for (title, keys) in SECTIONS {
            Self::section(&mut lines, title, keys.iter().copied(), palette);
        }

        let widget = Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Help ")
                    .title_alignment(Alignment::Center)
                    .title_style(palette.title())
                    .border_style(Style::default().fg(palette.info))
                    .style(palette.base()),
            )
            .wrap(Wrap { trim: false });

        frame.render_widget(Clear, area);
        frame.render_widget(widget, area);
    }

    fn section<'k>(
        lines: &mut Vec<Line<'static>>,
        title: &str,
        keys: impl Iterator<Item = (&'k str, &'k str)>,
        palette: &Palette,
    ) {
        lines.push(Line::styled(title.to_string(), palette.header()));
        for (key, what) in keys {
            lines.push(Line::from(vec![
                Span::styled(format!("  {key:<12}"), Style::default().fg(palette.info)),
                Span::raw(what.to_string()),
            ]));
        }
        lines.push(Line::from(""));
    }
}
