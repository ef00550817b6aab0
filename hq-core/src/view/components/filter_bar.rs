//! src/view/components/filter_bar.rs

use ratatui::{prelude::*, widgets::Paragraph};

use crate::{
    model::{app_state::InputMode, list_state::BulkPhase, screen::DropdownView},
    view::theme::Palette,
};

/// One-line summary of search text, dropdown filters and bulk phase.
pub struct FilterBar;

impl FilterBar {
    pub fn render(
        frame: &mut Frame<'_>,
        search: &str,
        mode: InputMode,
        dropdowns: &[DropdownView],
        phase: BulkPhase,
        palette: &Palette,
        area: Rect,
    ) {
        let mut spans = vec![Span::styled(" / ", palette.header())];
        match (mode, search.is_empty()) {
            (InputMode::Search, _) => {
                spans.push(Span::raw(search.to_string()));
                spans.push(Span::styled("▏", palette.title()));
            }
            (InputMode::Normal, true) => spans.push(Span::styled("search", palette.muted())),
            (InputMode::Normal, false) => spans.push(Span::raw(search.to_string())),
        }

        for (index, dropdown) in dropdowns.iter().enumerate() {
            spans.push(Span::styled(format!("  {}:", index + 1), palette.header()));
            let value = dropdown.value.as_deref().unwrap_or("all");
            spans.push(Span::raw(format!("{} = {value}", dropdown.field)));
        }

        let (label, style) = match phase {
            BulkPhase::Idle => ("", palette.muted()),
            BulkPhase::Selecting => ("  ● selecting", Style::default().fg(palette.accent)),
            BulkPhase::Committing => ("  ◌ saving…", Style::default().fg(palette.warning)),
        };
        spans.push(Span::styled(label, style));

        frame.render_widget(Paragraph::new(Line::from(spans)).style(palette.base()), area);
    }
}
