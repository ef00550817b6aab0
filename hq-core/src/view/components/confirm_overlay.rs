//! src/view/components/confirm_overlay.rs

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph},
};

use crate::view::theme::Palette;

pub struct ConfirmOverlay;

impl ConfirmOverlay {
    pub fn render(frame: &mut Frame<'_>, selected: usize, palette: &Palette, area: Rect) {
        let lines = vec![
            Line::from(format!("Delete {selected} selected item(s)?")),
            Line::from(""),
            Line::from(vec![
                Span::styled("y", palette.header()),
                Span::raw(" / Enter confirm   "),
                Span::styled("n", palette.header()),
                Span::raw(" / Esc cancel"),
            ]),
        ];

        let widget = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Confirm Delete ")
                    .title_style(Style::default().fg(palette.error).add_modifier(Modifier::BOLD))
                    .border_style(Style::default().fg(palette.error))
                    .style(palette.base()),
            );

        frame.render_widget(Clear, area);
        frame.render_widget(widget, area);
    }
}
