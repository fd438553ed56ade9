use arboard::Clipboard;
use std::path::PathBuf;
use tracing::{error, trace, warn};

use crate::domain::{CMDMode, HELP_TEXT, Message, Result, ViewerConfig};
use crate::filter::{SortDirection, TableFilters};
use crate::inputter::{InputResult, Inputter};
use crate::loader::{RecordSet, load_records};
use crate::record::{FieldAccess, Record, Value};
use crate::ui::{CMDLINE_HEIGHT, COLUMN_WIDTH_MARGIN, SCROLLBAR_WIDTH, TABLE_HEADER_HEIGHT};

#[derive(Debug, PartialEq)]
pub enum Status {
    READY,
    QUITTING,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Modus {
    TABLE,
    RECORD,
    HELP,
    CMDINPUT,
}

#[derive(Clone, Debug, Default)]
pub struct ColumnView {
    pub name: String,
    pub width: usize,
    pub data: Vec<String>,
    pub sort: SortDirection,
    pub filtered: bool,
}

impl ColumnView {
    fn plain(name: &str, width: usize, data: Vec<String>) -> Self {
        ColumnView {
            name: name.to_string(),
            width,
            data,
            ..Default::default()
        }
    }
}

pub struct UIData {
    pub name: String,
    pub table: Vec<ColumnView>,
    pub nrows: usize, // Rows in the current view, after filtering
    pub total_rows: usize,
    pub selected_row: usize,
    pub selected_column: usize,
    pub abs_selected_row: usize,
    pub has_active_filters: bool,
    pub global_search: String,
    pub sort_label: String,
    pub show_popup: bool,
    pub popup_message: String,
    pub layout: UILayout,
    pub cmdinput: InputResult,
    pub cmd_mode: Option<CMDMode>,
    pub active_cmdinput: bool,
    pub status_message: String,
}

impl UIData {
    pub fn empty() -> Self {
        UIData {
            name: String::new(),
            table: Vec::new(),
            nrows: 0,
            total_rows: 0,
            selected_row: 0,
            selected_column: 0,
            abs_selected_row: 0,
            has_active_filters: false,
            global_search: String::new(),
            sort_label: String::new(),
            show_popup: false,
            popup_message: String::new(),
            layout: UILayout::default(),
            cmdinput: InputResult::default(),
            cmd_mode: None,
            active_cmdinput: false,
            status_message: String::new(),
        }
    }
}

#[derive(Default, Clone, Debug)]
pub struct UILayout {
    pub width: usize,
    pub height: usize,
    pub table_width: usize,
    pub table_height: usize,
    pub statusline_width: usize,
    pub statusline_height: usize,
}

impl UILayout {
    pub fn from_values(ui_width: usize, ui_height: usize) -> Self {
        let layout = UILayout {
            width: ui_width,
            height: ui_height,
            table_width: ui_width.saturating_sub(SCROLLBAR_WIDTH),
            table_height: ui_height.saturating_sub(CMDLINE_HEIGHT + TABLE_HEADER_HEIGHT),
            statusline_width: ui_width,
            statusline_height: CMDLINE_HEIGHT,
        };
        trace!("Build UILayout: {:?}", layout);
        layout
    }
}

/// A record together with its position in the loaded set, so the filtered
/// view can be mapped back to source rows.
struct RowRef<'a> {
    idx: usize,
    record: &'a Record,
}

impl FieldAccess for RowRef<'_> {
    fn field(&self, name: &str) -> Option<&Value> {
        self.record.field(name)
    }
}

/// Scroll state of the single-record view.
#[derive(Default)]
struct RecordView {
    cursor_row: usize,
    cursor_offset: usize,
}

pub struct Model {
    config: ViewerConfig,
    pub status: Status,
    modus: Modus,
    previous_modus: Modus,
    data: RecordSet,
    filters: TableFilters,
    rows: Vec<usize>, // Mapping of view row index to record index, recomputed from `filters`
    column_widths: Vec<usize>,
    visible_columns: Vec<usize>,
    visible_width: usize,
    cursor_row: usize,
    cursor_column: usize,
    offset_row: usize,
    offset_column: usize,
    record_view: RecordView,
    uilayout: UILayout,
    uidata: UIData,
    clipboard: Option<Clipboard>,
    input: Inputter,
    cmd_mode: Option<CMDMode>,
    // Term before the command line opened, put back on cancel. None when the
    // column had no filter entry at all.
    cmd_previous: Option<String>,
    last_input: InputResult,
    active_cmdinput: bool,
    status_message: String,
}

impl Model {
    pub fn load(
        config: &ViewerConfig,
        path: PathBuf,
        ui_width: usize,
        ui_height: usize,
    ) -> Result<Self> {
        let data = load_records(path)?;
        Ok(Self::init(config, data, ui_width, ui_height))
    }

    pub fn init(config: &ViewerConfig, data: RecordSet, ui_width: usize, ui_height: usize) -> Self {
        let searchable = if config.searchable_fields.is_empty() {
            data.columns.clone()
        } else {
            config.searchable_fields.clone()
        };
        let column_widths = Self::calculate_column_widths(&data);
        let nrecords = data.len();
        let mut model = Self {
            config: config.clone(),
            status: Status::READY,
            modus: Modus::TABLE,
            previous_modus: Modus::TABLE,
            filters: TableFilters::new(searchable),
            data,
            rows: Vec::new(),
            column_widths,
            visible_columns: Vec::new(),
            visible_width: 0,
            cursor_row: 0,
            cursor_column: 0,
            offset_row: 0,
            offset_column: 0,
            record_view: RecordView::default(),
            uilayout: UILayout::from_values(ui_width, ui_height),
            uidata: UIData::empty(),
            clipboard: None,
            input: Inputter::default(),
            cmd_mode: None,
            cmd_previous: None,
            last_input: InputResult::default(),
            active_cmdinput: false,
            status_message: String::new(),
        };
        model.refresh_rows();
        model.set_status_message(format!("Loaded {nrecords} records"));
        model
    }

    pub fn get_uidata(&self) -> &UIData {
        &self.uidata
    }

    pub fn filters(&self) -> &TableFilters {
        &self.filters
    }

    /// Record indices of the current view, in display order.
    pub fn rows(&self) -> &[usize] {
        &self.rows
    }

    pub fn records(&self) -> &[Record] {
        &self.data.records
    }

    pub fn raw_keyevents(&self) -> bool {
        self.active_cmdinput
    }

    pub fn current_column_name(&self) -> Option<&str> {
        self.data
            .columns
            .get(self.offset_column + self.cursor_column)
            .map(String::as_str)
    }

    fn current_record(&self) -> Option<&Record> {
        self.rows
            .get(self.offset_row + self.cursor_row)
            .and_then(|&idx| self.data.records.get(idx))
    }

    pub fn quit(&mut self) {
        self.status = Status::QUITTING;
    }

    pub fn update(&mut self, message: Option<Message>) -> Result<()> {
        let Some(msg) = message else {
            return Ok(());
        };
        match self.modus {
            Modus::TABLE => match msg {
                Message::Quit => self.quit(),
                Message::MoveDown => self.move_table_selection_down(1),
                Message::MoveUp => self.move_table_selection_up(1),
                Message::MoveLeft => self.move_table_selection_left(),
                Message::MoveRight => self.move_table_selection_right(),
                Message::MovePageUp => self.move_table_selection_up(self.uilayout.table_height),
                Message::MovePageDown => {
                    self.move_table_selection_down(self.uilayout.table_height)
                }
                Message::MoveBeginning => self.move_table_selection_beginning(),
                Message::MoveEnd => self.move_table_selection_end(),
                Message::Search => self.enter_cmd_mode(CMDMode::SearchTable),
                Message::Filter => self.enter_cmd_mode(CMDMode::FilterColumn),
                Message::ToggleSort => self.toggle_sort_current_column(),
                Message::ClearFilters => self.clear_filters(),
                Message::CopyCell => self.copy_table_cell(),
                Message::CopyRow => self.copy_table_row(),
                Message::Enter => self.build_record_view(),
                Message::Help => self.show_help(),
                Message::Resize(width, height) => self.ui_resize(width, height),
                _ => (),
            },
            Modus::RECORD => match msg {
                Message::Quit => self.quit(),
                Message::MoveDown => self.move_record_selection_down(1),
                Message::MoveUp => self.move_record_selection_up(1),
                Message::MovePageDown => self.move_record_selection_down(10),
                Message::MovePageUp => self.move_record_selection_up(10),
                Message::MoveLeft => self.previous_record(),
                Message::MoveRight => self.next_record(),
                Message::CopyCell => self.copy_record_cell(),
                Message::Help => self.show_help(),
                Message::Resize(width, height) => self.ui_resize(width, height),
                Message::Enter | Message::Exit => self.exit(),
                _ => (),
            },
            Modus::HELP => match msg {
                Message::Quit => self.quit(),
                Message::Resize(width, height) => self.ui_resize(width, height),
                Message::Enter | Message::Exit | Message::Help => self.exit(),
                _ => (),
            },
            Modus::CMDINPUT => match msg {
                Message::RawKey(key) => self.raw_input(key),
                Message::Resize(width, height) => self.ui_resize(width, height),
                _ => (),
            },
        }
        Ok(())
    }

    // -------------------- View computation ---------------------- //

    /// Re-reads the filter engine and rebuilds the row mapping.
    fn refresh_rows(&mut self) {
        let refs: Vec<RowRef> = self
            .data
            .records
            .iter()
            .enumerate()
            .map(|(idx, record)| RowRef { idx, record })
            .collect();
        let view = self.filters.view(&refs);
        self.rows = view.filtered_data.iter().map(|r| r.idx).collect();
        self.clamp_cursor();
        self.update_table_data();
    }

    fn clamp_cursor(&mut self) {
        let nrows = self.rows.len();
        if nrows == 0 {
            self.cursor_row = 0;
            self.offset_row = 0;
            return;
        }
        if self.offset_row >= nrows {
            self.offset_row = nrows.saturating_sub(self.uilayout.table_height.max(1));
        }
        if self.offset_row + self.cursor_row >= nrows {
            self.cursor_row = nrows - 1 - self.offset_row;
        }
    }

    fn calculate_column_widths(data: &RecordSet) -> Vec<usize> {
        data.columns
            .iter()
            .map(|name| {
                let max_value = data
                    .records
                    .iter()
                    .map(|r| r.display(name).chars().count())
                    .max()
                    .unwrap_or(0);
                std::cmp::max(name.chars().count(), max_value) + COLUMN_WIDTH_MARGIN
            })
            .collect()
    }

    fn render_width(&self, column_idx: usize) -> usize {
        std::cmp::min(self.column_widths[column_idx], self.config.max_column_width)
    }

    fn update_table_data(&mut self) {
        let table_width = self.uilayout.table_width;
        let table_height = self.uilayout.table_height;
        let rbegin = self.offset_row;
        let rend = std::cmp::min(rbegin + table_height, self.rows.len());

        // Collect the columns that fit, the last one possibly cut off
        self.visible_columns.clear();
        let mut visible_width = 0;
        let mut last_width = None;
        for cidx in self.offset_column..self.data.columns.len() {
            let width = self.render_width(cidx);
            if visible_width + width + 1 <= table_width {
                self.visible_columns.push(cidx);
                visible_width += width + 1;
            } else {
                if visible_width < table_width {
                    self.visible_columns.push(cidx);
                    last_width = Some(table_width - visible_width);
                    visible_width = table_width;
                }
                break;
            }
        }
        self.visible_width = visible_width;
        self.cursor_column = std::cmp::min(
            self.cursor_column,
            self.visible_columns.len().saturating_sub(1),
        );

        let state = self.filters.state();
        let mut table = Vec::with_capacity(self.visible_columns.len());
        for (pos, &cidx) in self.visible_columns.iter().enumerate() {
            let name = &self.data.columns[cidx];
            let width = match last_width {
                Some(w) if pos + 1 == self.visible_columns.len() => w,
                _ => self.render_width(cidx),
            };
            let data = self.rows[rbegin..rend]
                .iter()
                .map(|&ridx| Self::cell_text(&self.data.records[ridx], name))
                .collect();
            table.push(ColumnView {
                name: name.clone(),
                width,
                data,
                sort: state.sort_config.direction_of(name),
                filtered: state
                    .column_filter(name)
                    .is_some_and(|term| !term.trim().is_empty()),
            });
        }

        trace!(
            "Table: Cr {}, Cc {}, Or {}, Oc {}, Rb {}, Re {}, visible cols {:?}",
            self.cursor_row,
            self.cursor_column,
            self.offset_row,
            self.offset_column,
            rbegin,
            rend,
            self.visible_columns
        );

        self.uidata.table = table;
        self.update_uidata_for_table();
    }

    fn cell_text(record: &Record, name: &str) -> String {
        match record.get(name) {
            None | Some(Value::Null) => String::from("∅"),
            Some(value) => value
                .to_string()
                .replace("\r\n", " ↵ ")
                .replace('\n', " ↵ "),
        }
    }

    fn sort_label(&self) -> String {
        let sort = self.filters.sort_config();
        match sort.direction_of(&sort.field) {
            SortDirection::Ascending => format!("{} ▲", sort.field),
            SortDirection::Descending => format!("{} ▼", sort.field),
            SortDirection::None => String::new(),
        }
    }

    fn update_uidata_for_table(&mut self) {
        self.uidata.name = self.data.name.clone();
        self.uidata.nrows = self.rows.len();
        self.uidata.total_rows = self.data.len();
        self.uidata.selected_row = self.cursor_row;
        self.uidata.selected_column = self.cursor_column;
        self.uidata.abs_selected_row = self.offset_row + self.cursor_row;
        self.uidata.has_active_filters = self.filters.has_active_filters();
        self.uidata.global_search = self.filters.global_search().to_string();
        self.uidata.sort_label = self.sort_label();
        self.uidata.show_popup = false;
        self.uidata.layout = self.uilayout.clone();
        self.uidata.cmdinput = self.last_input.clone();
        self.uidata.cmd_mode = self.cmd_mode;
        self.uidata.active_cmdinput = self.active_cmdinput;
        self.uidata.status_message = self.status_message.clone();
    }

    fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
        self.uidata.status_message = self.status_message.clone();
    }

    fn ui_resize(&mut self, width: usize, height: usize) {
        trace!(
            "UI was resized! w:{}->{}, h:{}->{}",
            self.uilayout.width, width, self.uilayout.height, height
        );
        self.uilayout = UILayout::from_values(width, height);
        self.clamp_cursor();
        match self.modus {
            Modus::RECORD => self.update_record_data(),
            Modus::HELP => {
                self.update_table_data();
                self.show_help_popup();
            }
            Modus::TABLE | Modus::CMDINPUT => self.update_table_data(),
        }
    }

    // -------------------- Search, filter and sort ---------------------- //

    fn enter_cmd_mode(&mut self, mode: CMDMode) {
        let previous = match mode {
            CMDMode::SearchTable => Some(self.filters.global_search().to_string()),
            CMDMode::FilterColumn => {
                let Some(column) = self.current_column_name() else {
                    self.set_status_message("No column to filter");
                    return;
                };
                self.filters.state().column_filter(column).map(str::to_string)
            }
        };
        trace!("Entering command mode {:?} with {:?}", mode, previous);
        self.input.set(previous.as_deref().unwrap_or_default());
        self.last_input = self.input.get();
        self.cmd_previous = previous;
        self.cmd_mode = Some(mode);
        self.previous_modus = self.modus;
        self.modus = Modus::CMDINPUT;
        self.active_cmdinput = true;
        self.update_uidata_for_table();
    }

    fn raw_input(&mut self, key: ratatui::crossterm::event::KeyEvent) {
        self.last_input = self.input.read(key);
        if self.last_input.finished {
            self.handle_cmd_input();
        } else {
            // Every keystroke re-evaluates the view with the term typed so far
            let term = self.last_input.input.clone();
            self.apply_cmd_term(term);
        }
    }

    fn apply_cmd_term(&mut self, term: String) {
        match self.cmd_mode {
            Some(CMDMode::SearchTable) => self.filters.set_global_search(term),
            Some(CMDMode::FilterColumn) => {
                if let Some(column) = self.current_column_name().map(str::to_string) {
                    self.filters.update_column_filter(column, term);
                }
            }
            None => warn!("Command input without a command mode"),
        }
        self.reset_row_cursor();
        self.refresh_rows();
    }

    fn handle_cmd_input(&mut self) {
        trace!("Handle cmd input {:?}", self.last_input);
        let previous = self.cmd_previous.take();
        if !self.last_input.canceled {
            let term = self.last_input.input.clone();
            self.apply_cmd_term(term);
        } else if let Some(term) = previous {
            self.apply_cmd_term(term);
        } else {
            self.drop_column_filter();
        }

        self.active_cmdinput = false;
        self.modus = self.previous_modus;
        self.previous_modus = Modus::CMDINPUT;
        self.cmd_mode = None;
        self.input.clear();
        self.last_input = InputResult::default();

        let message = if self.filters.has_active_filters() {
            format!("{} of {} records", self.rows.len(), self.data.len())
        } else {
            format!("{} records", self.data.len())
        };
        self.set_status_message(message);
        self.update_uidata_for_table();
    }

    fn drop_column_filter(&mut self) {
        if let Some(column) = self.current_column_name().map(str::to_string) {
            self.filters.remove_column_filter(&column);
        }
        self.reset_row_cursor();
        self.refresh_rows();
    }

    fn toggle_sort_current_column(&mut self) {
        let Some(column) = self.current_column_name().map(str::to_string) else {
            return;
        };
        self.filters.toggle_sort(&column);
        let label = self.sort_label();
        self.set_status_message(if label.is_empty() {
            "Unsorted".to_string()
        } else {
            format!("Sorted by {label}")
        });
        self.refresh_rows();
    }

    fn clear_filters(&mut self) {
        self.filters.clear_all_filters();
        self.reset_row_cursor();
        self.set_status_message("Cleared search, filters and sort");
        self.refresh_rows();
    }

    fn reset_row_cursor(&mut self) {
        self.cursor_row = 0;
        self.offset_row = 0;
    }

    // -------------------- Popups and record view ---------------------- //

    fn show_help(&mut self) {
        self.previous_modus = self.modus;
        self.modus = Modus::HELP;
        self.show_help_popup();
    }

    fn show_help_popup(&mut self) {
        self.uidata.show_popup = true;
        self.uidata.popup_message = HELP_TEXT.to_string();
    }

    fn exit(&mut self) {
        match self.modus {
            Modus::HELP => {
                self.modus = self.previous_modus;
                self.uidata.show_popup = false;
                if self.modus == Modus::RECORD {
                    self.update_record_data();
                }
            }
            Modus::RECORD => {
                self.modus = Modus::TABLE;
                self.update_table_data();
            }
            Modus::TABLE | Modus::CMDINPUT => {}
        }
    }

    fn build_record_view(&mut self) {
        if self.current_record().is_none() {
            self.set_status_message("No record selected");
            return;
        }
        trace!("Building record view ...");
        self.modus = Modus::RECORD;
        self.record_view = RecordView::default();
        self.update_record_data();
    }

    fn update_record_data(&mut self) {
        let Some(record) = self.current_record() else {
            error!("Record view without a selected record");
            return;
        };
        let height = self.uilayout.table_height;
        let rbegin = self.record_view.cursor_offset;
        let rend = std::cmp::min(rbegin + height, self.data.columns.len());

        let headers: Vec<String> = self.data.columns[rbegin..rend].to_vec();
        let values: Vec<String> = headers
            .iter()
            .map(|name| Self::cell_text(record, name))
            .collect();
        let header_width = self
            .data
            .columns
            .iter()
            .map(|h| h.chars().count())
            .max()
            .unwrap_or(0)
            + COLUMN_WIDTH_MARGIN;
        let value_width = self.uilayout.table_width.saturating_sub(header_width + 1);

        let abs_row = self.offset_row + self.cursor_row;
        self.uidata.name = format!("R[{}] {}/{}", self.data.name, abs_row + 1, self.rows.len());
        self.uidata.table = vec![
            ColumnView::plain("Field", header_width, headers),
            ColumnView::plain("Value", value_width, values),
        ];
        self.uidata.nrows = self.data.columns.len();
        self.uidata.selected_row = self.record_view.cursor_row;
        self.uidata.selected_column = 1;
        self.uidata.abs_selected_row = rbegin + self.record_view.cursor_row;
        self.uidata.layout = self.uilayout.clone();
    }

    fn move_record_selection_up(&mut self, size: usize) {
        let record = &mut self.record_view;
        if record.cursor_row > 0 {
            record.cursor_row = record.cursor_row.saturating_sub(size);
        } else if record.cursor_offset > 0 {
            record.cursor_offset = record.cursor_offset.saturating_sub(size);
        }
        self.update_record_data();
    }

    fn move_record_selection_down(&mut self, size: usize) {
        let nfields = self.data.columns.len();
        let height = self.uilayout.table_height.max(1);
        let record = &mut self.record_view;
        let target = std::cmp::min(
            record.cursor_offset + record.cursor_row + size,
            nfields.saturating_sub(1),
        );
        if target >= record.cursor_offset + height {
            record.cursor_offset = target + 1 - height;
        }
        record.cursor_row = target - record.cursor_offset;
        self.update_record_data();
    }

    fn previous_record(&mut self) {
        if self.offset_row + self.cursor_row > 0 {
            self.move_table_selection_up(1);
        }
        self.update_record_data();
    }

    fn next_record(&mut self) {
        self.move_table_selection_down(1);
        self.update_record_data();
    }

    // -------------------- Clipboard ---------------------- //

    fn clipboard(&mut self) -> Option<&mut Clipboard> {
        if self.clipboard.is_none() {
            match Clipboard::new() {
                Ok(clipboard) => self.clipboard = Some(clipboard),
                Err(e) => warn!("Clipboard not available: {:?}", e),
            }
        }
        self.clipboard.as_mut()
    }

    fn copy_to_clipboard(&mut self, content: String) {
        let copied = match self.clipboard() {
            Some(clipboard) => match clipboard.set_text(content) {
                Ok(_) => true,
                Err(e) => {
                    warn!("Error copying to clipboard: {:?}", e);
                    false
                }
            },
            None => false,
        };
        self.set_status_message(if copied {
            "Copied to clipboard"
        } else {
            "Clipboard not available"
        });
    }

    fn copy_table_cell(&mut self) {
        let (Some(record), Some(column)) = (self.current_record(), self.current_column_name())
        else {
            return;
        };
        let cell = record.display(column);
        trace!("Cell content: {}", cell);
        self.copy_to_clipboard(cell);
    }

    fn copy_record_cell(&mut self) {
        let field = self.record_view.cursor_offset + self.record_view.cursor_row;
        let (Some(record), Some(column)) = (self.current_record(), self.data.columns.get(field))
        else {
            return;
        };
        let cell = record.display(column);
        self.copy_to_clipboard(cell);
    }

    fn copy_table_row(&mut self) {
        let Some(record) = self.current_record() else {
            return;
        };
        let row_content = self
            .data
            .columns
            .iter()
            .map(|c| wrap_cell_content(&record.display(c)))
            .collect::<Vec<String>>()
            .join(",");
        self.copy_to_clipboard(row_content);
    }

    // -------------------- Cursor movement ---------------------- //

    fn move_table_selection_beginning(&mut self) {
        self.reset_row_cursor();
        self.update_table_data();
    }

    fn move_table_selection_end(&mut self) {
        let nrows = self.rows.len();
        let height = self.uilayout.table_height.max(1);
        if nrows <= height {
            self.offset_row = 0;
            self.cursor_row = nrows.saturating_sub(1);
        } else {
            self.offset_row = nrows - height;
            self.cursor_row = height - 1;
        }
        self.update_table_data();
    }

    fn move_table_selection_up(&mut self, size: usize) {
        if self.cursor_row > 0 {
            self.cursor_row = self.cursor_row.saturating_sub(size);
        } else {
            self.offset_row = self.offset_row.saturating_sub(size);
        }
        self.update_table_data();
    }

    fn move_table_selection_down(&mut self, size: usize) {
        let nrows = self.rows.len();
        if nrows == 0 {
            return;
        }
        let height = self.uilayout.table_height.max(1);
        let target = std::cmp::min(self.offset_row + self.cursor_row + size, nrows - 1);
        if target >= self.offset_row + height {
            self.offset_row = target + 1 - height;
        }
        self.cursor_row = target - self.offset_row;
        self.update_table_data();
    }

    fn move_table_selection_left(&mut self) {
        if self.cursor_column > 0 {
            self.cursor_column -= 1;
        } else if self.offset_column > 0 {
            self.offset_column -= 1;
        }
        self.update_table_data();
    }

    fn move_table_selection_right(&mut self) {
        let ncolumns = self.data.columns.len();
        if self.offset_column + self.cursor_column + 1 < ncolumns {
            if self.cursor_column + 1 < self.visible_columns.len() {
                self.cursor_column += 1;
            } else {
                // At the right edge, shift the table
                self.offset_column += 1;
            }
            self.update_table_data();
        } else if self.visible_width >= self.uilayout.table_width
            && self.offset_column + 1 < ncolumns
        {
            // The last column is cut off, scroll it into view
            self.offset_column += 1;
            self.cursor_column = self.cursor_column.saturating_sub(1);
            self.update_table_data();
        }
        trace!(
            "Cursor at column {:?}",
            self.current_column_name().unwrap_or_default()
        );
    }
}

/// Quotes a cell for a CSV line.
fn wrap_cell_content(c: &str) -> String {
    let needs_escaping = c.contains('"');
    let needs_wrapping = c.chars().any(|c| matches!(c, ' ' | '\t' | ',' | '\n' | '"'));
    let mut out = String::from(c);

    if needs_escaping {
        out = out.replace('"', "\"\"");
    }
    if needs_wrapping {
        out = format!("\"{out}\"");
    }
    out
}
