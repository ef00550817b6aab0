//! src/view/components/sidebar.rs

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, ListState},
};

use crate::{
    model::screen_spec::ScreenId,
    navigation::menu::{MenuTree, ModuleId},
    view::theme::Palette,
};

/// Module switcher plus the menu entries of the active module.
pub struct Sidebar;

impl Sidebar {
    pub fn render(
        frame: &mut Frame<'_>,
        menu: &MenuTree,
        module: ModuleId,
        active: ScreenId,
        palette: &Palette,
        area: Rect,
    ) {
        let mut items = Vec::new();
        let mut selected = None;

        for candidate in ModuleId::ALL {
            let style = if candidate == module {
                palette.title()
            } else {
                palette.muted()
            };
            items.push(ListItem::new(Line::styled(candidate.title(), style)));

            if candidate != module {
                continue;
            }

            let mut group = "";
            for entry in menu.entries_for(module) {
                if entry.group != group {
                    group = entry.group;
                    items.push(ListItem::new(Line::styled(format!(" {group}"), palette.header())));
                }
                if entry.screen == active {
                    selected = Some(items.len());
                }
                items.push(ListItem::new(format!("  {} {}", entry.icon.glyph(), entry.label)));
            }
        }

        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Menu ")
                    .title_style(palette.title())
                    .border_style(palette.border())
                    .style(palette.base()),
            )
            .highlight_style(palette.highlight());

        let mut state = ListState::default().with_selected(selected);
        frame.render_stateful_widget(list, area, &mut state);
    }
}
