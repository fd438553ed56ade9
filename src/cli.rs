use clap::Parser;
use std::path::PathBuf;

use crate::domain::{MtvError, Result, ViewerConfig};

/// Browse, search, filter and sort a table of records in the terminal.
#[derive(Debug, Parser)]
#[command(name = "mtv", version, about)]
pub struct Cli {
    /// Table to open: csv, parquet, arrow/ipc/feather or a JSON array of objects
    pub path: String,

    /// Fields the global search looks at (comma separated, default: all columns)
    #[arg(short = 's', long, value_delimiter = ',')]
    pub search_fields: Vec<String>,

    /// Widest a column is drawn before it is cut off
    #[arg(long, default_value_t = 40)]
    pub max_column_width: usize,

    /// Event poll interval in milliseconds
    #[arg(long, default_value_t = 100)]
    pub poll_ms: u64,

    /// Write logs to this file (filter with RUST_LOG)
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    pub fn config(&self) -> ViewerConfig {
        ViewerConfig::default()
            .with_event_poll_time(self.poll_ms)
            .with_max_column_width(self.max_column_width)
            .with_searchable_fields(
                self.search_fields
                    .iter()
                    .map(|f| f.trim().to_string())
                    .filter(|f| !f.is_empty())
                    .collect(),
            )
    }

    /// Path with `~` and environment variables expanded.
    pub fn expanded_path(&self) -> Result<PathBuf> {
        shellexpand::full(&self.path)
            .map(|p| PathBuf::from(p.as_ref()))
            .map_err(|e| MtvError::LoadingFailed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_defaults() {
        let cli = Cli::try_parse_from(["mtv", "customers.csv"]).unwrap();
        let cfg = cli.config();
        assert_eq!(cfg.event_poll_time, 100);
        assert_eq!(cfg.max_column_width, 40);
        assert!(cfg.searchable_fields.is_empty());
        assert!(cli.log_file.is_none());
    }

    #[test]
    fn parses_search_fields_list() {
        let cli = Cli::try_parse_from([
            "mtv",
            "drivers.json",
            "--search-fields",
            "name, cpf,",
            "--poll-ms",
            "50",
        ])
        .unwrap();
        let cfg = cli.config();
        assert_eq!(cfg.searchable_fields, vec!["name", "cpf"]);
        assert_eq!(cfg.event_poll_time, 50);
    }

    #[test]
    fn missing_path_is_an_error() {
        assert!(Cli::try_parse_from(["mtv"]).is_err());
    }

    #[test]
    fn plain_path_is_unchanged() {
        let cli = Cli::try_parse_from(["mtv", "/tmp/plain.csv"]).unwrap();
        assert_eq!(cli.expanded_path().unwrap(), PathBuf::from("/tmp/plain.csv"));
    }

    #[test]
    fn unknown_variable_fails_expansion() {
        let cli = Cli::try_parse_from(["mtv", "$MTV_SURELY_UNSET_VARIABLE/x.csv"]).unwrap();
        assert!(matches!(
            cli.expanded_path(),
            Err(MtvError::LoadingFailed(_))
        ));
    }
}
