//! src/view/components/status_bar.rs
//!
//! Left: mode, screen route and data origin. Right: the current
//! notification, or the key hint when there is none.

use ratatui::{prelude::*, widgets::Paragraph};

use crate::{
    model::app_state::{AppState, InputMode},
    view::theme::Palette,
};

pub struct StatusBar;

impl StatusBar {
    pub fn render(frame: &mut Frame<'_>, state: &AppState, palette: &Palette, area: Rect) {
        let mode = match state.input_mode {
            InputMode::Normal => "NORMAL",
            InputMode::Search => "SEARCH",
        };
        let screen = state.active_screen();

        let left = Line::from(vec![
            Span::styled(format!(" {mode} "), Style::default().bg(palette.accent).fg(palette.background)),
            Span::raw(format!(" {} ", screen.id().route())),
            Span::styled(format!("· {}", state.data_origin), palette.muted()),
        ]);

        let right = match state.notification() {
            Some(notification) => Line::styled(
                format!("{} ", notification.message),
                palette.notification(notification.level),
            ),
            None => Line::styled("? help · q quit ", palette.muted()),
        };

        let [left_area, right_area] =
            Layout::horizontal([Constraint::Percentage(45), Constraint::Percentage(55)]).areas(area);

        frame.render_widget(Paragraph::new(left).style(palette.base()), left_area);
        frame.render_widget(
            Paragraph::new(right).style(palette.base()).alignment(Alignment::Right),
            right_area,
        );
    }
}
