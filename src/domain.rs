use derive_setters::Setters;
use polars::error::PolarsError;
use ratatui::crossterm::event::KeyEvent;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, MtvError>;

#[derive(Debug, Error)]
pub enum MtvError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to read table: {0}")]
    Polars(#[from] PolarsError),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("loading failed: {0}")]
    LoadingFailed(String),
    #[error("file not found")]
    FileNotFound,
    #[error("permission denied")]
    PermissionDenied,
    #[error("unknown file type (expected csv, parquet, arrow or json)")]
    UnknownFileType,
    #[error("no records to show")]
    NoRecords,
    #[error("logging setup failed: {0}")]
    Logging(String),
}

/// Runtime settings of the table viewer.
#[derive(Debug, Clone, Setters)]
#[setters(prefix = "with_")]
pub struct ViewerConfig {
    pub event_poll_time: u64,
    pub max_column_width: usize,
    /// Fields eligible for the global search. Empty means every column.
    pub searchable_fields: Vec<String>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            event_poll_time: 100,
            max_column_width: 40,
            searchable_fields: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CMDMode {
    SearchTable,
    FilterColumn,
}

impl CMDMode {
    pub fn prompt(&self) -> &'static str {
        match self {
            CMDMode::SearchTable => "/",
            CMDMode::FilterColumn => "filter: ",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Quit,
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    MovePageUp,
    MovePageDown,
    MoveBeginning,
    MoveEnd,
    Search,
    Filter,
    ToggleSort,
    ClearFilters,
    CopyCell,
    CopyRow,
    Enter,
    Exit,
    Help,
    Resize(usize, usize),
    RawKey(KeyEvent),
}

pub const HELP_TEXT: &str = "\
 q          quit
 ←↓↑→ hjkl  move the cursor
 PgUp PgDn  move one page
 g / G      first / last row
 /          search all searchable fields
 f          filter the current column
 s          sort current column (asc, desc, off)
 c          clear search, filters and sort
 y / Y      copy cell / row to clipboard
 Enter      show record details
 Esc        back
 ?          this help";
