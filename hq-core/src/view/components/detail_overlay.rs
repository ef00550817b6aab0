//! src/view/components/detail_overlay.rs

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use crate::{model::screen::DetailView, view::theme::Palette};

pub struct DetailOverlay;

impl DetailOverlay {
    pub fn render(frame: &mut Frame<'_>, detail: &DetailView, palette: &Palette, area: Rect) {
        let label_width = detail
            .fields
            .iter()
            .map(|(name, _)| name.len())
            .max()
            .unwrap_or(0);

        let mut lines = vec![
            Line::from(vec![
                Span::styled(format!("{:label_width$}  ", "status"), palette.header()),
                Span::styled(detail.status_label, palette.status(detail.status_code)),
            ]),
            Line::from(""),
        ];
        lines.extend(detail.fields.iter().map(|(name, value)| {
            Line::from(vec![
                Span::styled(format!("{name:label_width$}  "), palette.header()),
                Span::raw(value.as_str()),
            ])
        }));
        lines.push(Line::from(""));
        lines.push(Line::styled("Esc close", palette.muted()));

        let widget = Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!(" {} ", detail.id))
                    .title_style(palette.title())
                    .border_style(palette.focused_border())
                    .style(palette.base()),
            )
            .wrap(Wrap { trim: false });

        frame.render_widget(Clear, area);
        frame.render_widget(widget, area);
    }
}
