//! src/view/ui.rs
//! ============================================================
//! Frame renderer. Draws the whole console from `&AppState`:
//! sidebar, tab bar, filter line, list table, status bar, then
//! whichever modals are open, bottom-up in reverse Escape order.

use std::time::{Duration, Instant};

use ratatui::prelude::*;
use tracing::{instrument, trace};

use crate::{
    model::{app_state::AppState, modal::Modal},
    view::{
        components::{
            confirm_overlay::ConfirmOverlay, detail_overlay::DetailOverlay,
            filter_bar::FilterBar, help_overlay::HelpOverlay, list_table::ListTable,
            sidebar::Sidebar, status_bar::StatusBar, tab_bar::TabBar,
        },
        theme::Palette,
    },
};

const SIDEBAR_WIDTH: u16 = 26;

#[derive(Default)]
pub struct UIRenderer {
    palette: Palette,
    cache: LayoutCache,
    stats: RenderStats,
}

#[derive(Debug, Clone, Copy, Default)]
struct MainLayout {
    sidebar: Rect,
    tabs: Rect,
    filters: Rect,
    table: Rect,
    status: Rect,
}

#[derive(Default)]
struct LayoutCache {
    screen: Rect,
    main: MainLayout,
    hit: u64,
    miss: u64,
}

#[derive(Debug, Default)]
pub struct RenderStats {
    pub frames: u64,
    pub slow: u64,
    pub total: Duration,
}

impl UIRenderer {
    #[must_use]
    pub fn new(palette: Palette) -> Self {
        Self {
            palette,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn stats(&self) -> &RenderStats {
        &self.stats
    }

    #[instrument(level = "trace", skip_all)]
    pub fn render(&mut self, frame: &mut Frame<'_>, state: &AppState) {
        let start = Instant::now();
        let layout = self.layout(frame.area());
        let palette = self.palette;
        let screen = state.active_screen();

        Sidebar::render(
            frame,
            &state.menu,
            state.active_module(),
            screen.id(),
            &palette,
            layout.sidebar,
        );
        TabBar::render(frame, screen.title(), &screen.tabs(), &palette, layout.tabs);
        FilterBar::render(
            frame,
            screen.search(),
            state.input_mode,
            &screen.dropdowns(),
            screen.phase(),
            &palette,
            layout.filters,
        );
        ListTable::render(
            frame,
            screen.columns(),
            &screen.page_rows(),
            screen.page_info(),
            &palette,
            layout.table,
        );
        StatusBar::render(frame, state, &palette, layout.status);

        self.draw_modals(frame, state);

        let elapsed = start.elapsed();
        self.stats.total += elapsed;
        self.stats.frames += 1;
        if elapsed.as_millis() > 16 {
            self.stats.slow += 1;
            trace!(
                marker = "SLOW_FRAME",
                operation_type = "view",
                elapsed_ms = elapsed.as_millis(),
                "frame exceeded budget"
            );
        }
    }

    fn draw_modals(&self, frame: &mut Frame<'_>, state: &AppState) {
        let area = frame.area();
        let screen = state.active_screen();

        for modal in Modal::PRIORITY.into_iter().rev() {
            if !state.modals.is_open(modal) {
                continue;
            }
            match modal {
                Modal::Help => {
                    HelpOverlay::render(frame, &screen.shortcuts(), &self.palette, centered(area, 70, 85));
                }
                Modal::Detail => {
                    if let Some(detail) = screen.detail() {
                        DetailOverlay::render(frame, &detail, &self.palette, centered(area, 60, 70));
                    }
                }
                Modal::ConfirmDelete => {
                    ConfirmOverlay::render(
                        frame,
                        screen.selection_len(),
                        &self.palette,
                        centered_fixed(area, 48, 6),
                    );
                }
            }
        }
    }

    fn layout(&mut self, screen: Rect) -> MainLayout {
        if self.cache.screen == screen && self.cache.miss > 0 {
            self.cache.hit += 1;
            return self.cache.main;
        }

        let [body, status] = Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).areas(screen);
        let [sidebar, content] =
            Layout::horizontal([Constraint::Length(SIDEBAR_WIDTH), Constraint::Fill(1)]).areas(body);
        let [tabs, filters, table] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Fill(1),
        ])
        .areas(content);

        self.cache.screen = screen;
        self.cache.miss += 1;
        self.cache.main = MainLayout {
            sidebar,
            tabs,
            filters,
            table,
            status,
        };
        self.cache.main
    }
}

fn centered(area: Rect, width_pct: u16, height_pct: u16) -> Rect {
    let width = area.width * width_pct / 100;
    let height = area.height * height_pct / 100;
    centered_fixed(area, width, height)
}

fn centered_fixed(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use ratatui::{Terminal, backend::TestBackend};
    use tokio::sync::mpsc;

    use super::*;
    use crate::{
        config::Config,
        data::source::{DataSource, EmbeddedSeed},
        model::app_state::build_screens,
        tasks::sync_task::SimulatedBackend,
    };

    async fn state() -> AppState {
        let (task_tx, _) = mpsc::unbounded_channel();
        let (action_tx, _) = mpsc::unbounded_channel();
        let config = Config::default();
        let screens = build_screens(&config, EmbeddedSeed.load().await.unwrap()).unwrap();
        AppState::new(
            Arc::new(config),
            screens,
            "embedded seed".into(),
            Arc::new(SimulatedBackend::default()),
            task_tx,
            action_tx,
        )
        .unwrap()
    }

    fn draw(renderer: &mut UIRenderer, state: &AppState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(140, 40)).unwrap();
        terminal.draw(|frame| renderer.render(frame, state)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[tokio::test]
    async fn test_renders_active_screen() {
        let state = state().await;
        let mut renderer = UIRenderer::new(Palette::for_theme(state.config.theme));

        let first = state.active_screen().page_rows()[0].clone();
        let screen = draw(&mut renderer, &state);
        assert!(screen.contains("Regularization Requests"));
        assert!(screen.contains(first.id.as_str()));
        assert!(screen.contains(&first.cells[0]));
        assert!(screen.contains("Pending ("));
        assert_eq!(renderer.stats().frames, 1);
    }

    #[tokio::test]
    async fn test_modals_draw_over_the_list() {
        let mut state = state().await;
        let mut renderer = UIRenderer::new(Palette::for_theme(state.config.theme));

        state.modals.open(Modal::Help);
        let screen = draw(&mut renderer, &state);
        assert!(screen.contains("Bulk status"));
        assert!(screen.contains("Mark selection Approved"));

        state.modals.close(Modal::Help);
        state.modals.open(Modal::ConfirmDelete);
        let screen = draw(&mut renderer, &state);
        assert!(screen.contains("Delete 0 selected item(s)?"));
    }

    #[test]
    fn test_layout_is_cached_per_size() {
        let mut renderer = UIRenderer::new(Palette::for_theme(Default::default()));
        let first = renderer.layout(Rect::new(0, 0, 120, 40));
        let again = renderer.layout(Rect::new(0, 0, 120, 40));
        assert_eq!(first.table, again.table);
        assert_eq!(renderer.cache.hit, 1);

        renderer.layout(Rect::new(0, 0, 80, 24));
        assert_eq!(renderer.cache.miss, 2);
    }

    #[test]
    fn test_centered_rect_stays_inside() {
        let area = Rect::new(0, 0, 40, 10);
        let rect = centered_fixed(area, 48, 6);
        assert_eq!(rect.width, 40);
        assert!(rect.bottom() <= area.bottom());
    }
}
