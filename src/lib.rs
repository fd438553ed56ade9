//! mtv: filterable, sortable views over tables of back-office records.
//!
//! The core is [`filter::TableFilters`]: a per-table global search, per-column
//! filters and a three-phase column sort, evaluated on every read into a
//! [`filter::DerivedView`]. Around it sit a record loader and a terminal
//! viewer that drives the engine from the keyboard.

pub mod cli;
pub mod collate;
pub mod controller;
pub mod domain;
pub mod filter;
pub mod inputter;
pub mod loader;
pub mod logging;
pub mod model;
pub mod record;
pub mod ui;

pub use domain::{MtvError, Result, ViewerConfig};
pub use filter::{
    DerivedView, FilterState, SortConfig, SortDirection, TableFilters, compute_view,
};
pub use loader::{RecordSet, load_records};
pub use record::{FieldAccess, Record, Value};
