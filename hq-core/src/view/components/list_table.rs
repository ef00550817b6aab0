//! src/view/components/list_table.rs

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, HighlightSpacing, Row, Table, TableState},
};

use crate::{
    model::{
        screen::{PageInfo, RowView},
        screen_spec::Column,
    },
    view::theme::Palette,
};

const CHECK_WIDTH: u16 = 4;
const ID_WIDTH: u16 = 10;
const STATUS_WIDTH: u16 = 12;

pub struct ListTable;

impl ListTable {
    pub fn render(
        frame: &mut Frame<'_>,
        columns: &[Column],
        rows: &[RowView],
        info: PageInfo,
        palette: &Palette,
        area: Rect,
    ) {
        let check = if info.page_fully_selected { "[x]" } else { "[ ]" };
        let header = Row::new(
            [check, "ID", "Status"]
                .into_iter()
                .chain(columns.iter().map(|column| column.title)),
        )
        .style(palette.header())
        .bottom_margin(1);

        let body: Vec<Row> = rows.iter().map(|row| Self::row(row, palette)).collect();

        let widths: Vec<Constraint> = [
            Constraint::Length(CHECK_WIDTH),
            Constraint::Length(ID_WIDTH),
            Constraint::Length(STATUS_WIDTH),
        ]
            .into_iter()
            .chain(columns.iter().map(|column| Constraint::Percentage(column.width)))
            .collect();

        let title = format!(
            " Page {}/{} · {} of {} rows · {} selected ",
            info.page + 1,
            info.page_count,
            info.visible,
            info.total,
            info.selected
        );

        let cursor = rows.iter().position(|row| row.at_cursor);
        let mut state = TableState::default().with_selected(cursor);

        let table = Table::new(body, widths)
            .header(header)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(title)
                    .title_style(palette.muted())
                    .border_style(palette.focused_border())
                    .style(palette.base()),
            )
            .row_highlight_style(palette.highlight())
            .highlight_symbol("▶ ")
            .highlight_spacing(HighlightSpacing::Always);

        frame.render_stateful_widget(table, area, &mut state);
    }

    fn row<'a>(row: &'a RowView, palette: &Palette) -> Row<'a> {
        let check = if row.selected { "[x]" } else { "[ ]" };

        let mut first = Text::from(row.cells.first().map_or("", String::as_str));
        if row.expanded {
            for (field, value) in &row.extra {
                first.push_line(Line::styled(format!("  {field}: {value}"), palette.muted()));
            }
        }
        let height = u16::try_from(first.height()).unwrap_or(u16::MAX).max(1);

        let cells = [
            Cell::from(check),
            Cell::from(row.id.as_str()),
            Cell::from(row.status_label).style(palette.status(row.status_code)),
            Cell::from(first),
        ]
        .into_iter()
        .chain(row.cells.iter().skip(1).map(|cell| Cell::from(cell.as_str())));

        let style = if row.selected {
            Style::default().fg(palette.accent)
        } else {
            Style::default()
        };
        Row::new(cells).height(height).style(style)
    }
}
