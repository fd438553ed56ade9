use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style, Stylize},
    symbols::border,
    text::{Line, Span},
    widgets::{
        Block, Cell, Clear, Paragraph, Row, Scrollbar, ScrollbarOrientation, ScrollbarState,
        Table,
    },
};

use crate::filter::SortDirection;
use crate::model::{ColumnView, Model, UIData};

pub const CMDLINE_HEIGHT: usize = 2; // Status line and command line
pub const TABLE_HEADER_HEIGHT: usize = 1;
pub const SCROLLBAR_WIDTH: usize = 1;
pub const COLUMN_WIDTH_MARGIN: usize = 2; // Room for the sort and filter markers

#[derive(Debug, Default)]
pub struct TableUI;

impl TableUI {
    pub fn new() -> Self {
        Self
    }

    pub fn draw(&self, model: &Model, frame: &mut Frame) {
        let uidata = model.get_uidata();
        let [table_area, status_area, cmd_area] = Layout::vertical([
            Constraint::Min(TABLE_HEADER_HEIGHT as u16),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(frame.area());
        let [table_area, scrollbar_area] = Layout::horizontal([
            Constraint::Min(0),
            Constraint::Length(SCROLLBAR_WIDTH as u16),
        ])
        .areas(table_area);

        frame.render_widget(Self::table(uidata), table_area);
        Self::render_scrollbar(uidata, frame, scrollbar_area);
        frame.render_widget(Self::status_line(uidata), status_area);
        Self::render_cmdline(uidata, frame, cmd_area);

        if uidata.show_popup {
            Self::render_popup(&uidata.popup_message, frame);
        }
    }

    fn header_text(column: &ColumnView) -> String {
        let marker = match column.sort {
            SortDirection::Ascending => "▲",
            SortDirection::Descending => "▼",
            SortDirection::None => "",
        };
        let filter = if column.filtered { "*" } else { "" };
        format!("{}{}{}", column.name, filter, marker)
    }

    fn table(uidata: &UIData) -> Table<'_> {
        let header = Row::new(uidata.table.iter().map(|c| {
            let style = if c.filtered || c.sort != SortDirection::None {
                Style::new().bold().yellow()
            } else {
                Style::new().bold()
            };
            Cell::from(Self::header_text(c)).style(style)
        }));

        let nrows = uidata.table.first().map(|c| c.data.len()).unwrap_or(0);
        let rows = (0..nrows).map(|ridx| {
            Row::new(uidata.table.iter().enumerate().map(|(cidx, column)| {
                let cell = Cell::from(column.data[ridx].as_str());
                if ridx == uidata.selected_row && cidx == uidata.selected_column {
                    cell.style(Style::new().add_modifier(Modifier::REVERSED))
                } else {
                    cell
                }
            }))
            .style(if ridx == uidata.selected_row {
                Style::new().add_modifier(Modifier::BOLD)
            } else {
                Style::new()
            })
        });

        let widths = uidata
            .table
            .iter()
            .map(|c| Constraint::Length(c.width as u16));
        Table::new(rows, widths).header(header).column_spacing(1)
    }

    fn render_scrollbar(uidata: &UIData, frame: &mut Frame, area: Rect) {
        let mut state = ScrollbarState::new(uidata.nrows).position(uidata.abs_selected_row);
        frame.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight),
            area,
            &mut state,
        );
    }

    fn status_line(uidata: &UIData) -> Paragraph<'_> {
        let mut spans = vec![
            Span::from(format!(" {} ", uidata.name)).reversed(),
            Span::from(format!(" {}/{} rows ", uidata.nrows, uidata.total_rows)),
        ];
        if uidata.has_active_filters {
            spans.push(Span::from("[filtered] ").yellow());
        }
        if !uidata.global_search.trim().is_empty() {
            spans.push(Span::from(format!("/{} ", uidata.global_search)).blue());
        }
        if !uidata.sort_label.is_empty() {
            spans.push(Span::from(format!("sort: {} ", uidata.sort_label)).blue());
        }
        spans.push(Span::from(format!("| {}", uidata.status_message)).dim());
        Paragraph::new(Line::from(spans))
    }

    fn render_cmdline(uidata: &UIData, frame: &mut Frame, area: Rect) {
        let Some(mode) = uidata.cmd_mode.filter(|_| uidata.active_cmdinput) else {
            frame.render_widget(Paragraph::new(" ? for help"), area);
            return;
        };
        let prompt = mode.prompt();
        let line = Line::from(vec![
            Span::from(prompt).bold(),
            Span::from(uidata.cmdinput.input.as_str()),
        ]);
        frame.render_widget(Paragraph::new(line), area);
        let x = area.x + (prompt.chars().count() + uidata.cmdinput.cursor_pos) as u16;
        frame.set_cursor_position((x.min(area.right().saturating_sub(1)), area.y));
    }

    fn render_popup(message: &str, frame: &mut Frame) {
        let area = Self::centered(frame.area(), 60, 16);
        let block = Block::bordered()
            .title(Line::from(" Help ".bold()).centered())
            .title_bottom(Line::from(" <Esc> close ".blue()).centered())
            .border_set(border::THICK);
        frame.render_widget(Clear, area);
        frame.render_widget(Paragraph::new(message).block(block), area);
    }

    fn centered(area: Rect, width: u16, height: u16) -> Rect {
        let width = width.min(area.width);
        let height = height.min(area.height);
        Rect {
            x: area.x + (area.width - width) / 2,
            y: area.y + (area.height - height) / 2,
            width,
            height,
        }
    }
}
