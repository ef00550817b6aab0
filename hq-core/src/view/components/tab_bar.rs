//! src/view/components/tab_bar.rs

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Tabs},
};

use crate::{model::screen::TabView, view::theme::Palette};

/// Status tabs with their live counts, titled by the screen.
pub struct TabBar;

impl TabBar {
    pub fn render(frame: &mut Frame<'_>, title: &str, tabs: &[TabView], palette: &Palette, area: Rect) {
        let titles: Vec<Line> = tabs
            .iter()
            .map(|tab| Line::from(format!("{} ({})", tab.label, tab.count)))
            .collect();
        let active = tabs.iter().position(|tab| tab.active).unwrap_or(0);

        let widget = Tabs::new(titles)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!(" {title} "))
                    .title_style(palette.title())
                    .border_style(palette.border())
                    .style(palette.base()),
            )
            .style(palette.muted())
            .highlight_style(palette.header())
            .select(active)
            .divider("│");

        frame.render_widget(widget, area);
    }
}
