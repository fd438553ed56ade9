use polars::prelude::*;
use rayon::prelude::*;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, instrument};

use crate::domain::{MtvError, Result};
use crate::record::{Record, Value};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FileType {
    Csv,
    Parquet,
    Arrow,
    Json,
}

#[derive(Debug)]
pub struct FileInfo {
    pub path: PathBuf,
    pub file_size: u64,
    pub file_type: FileType,
}

/// Records loaded from one file, with the column order of the source.
#[derive(Debug, Clone, Default)]
pub struct RecordSet {
    pub name: String,
    pub columns: Vec<String>,
    pub records: Vec<Record>,
}

impl RecordSet {
    pub fn new(name: impl Into<String>, columns: Vec<String>, records: Vec<Record>) -> Self {
        Self {
            name: name.into(),
            columns,
            records,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

pub fn detect_file_type(path: &Path) -> Result<FileType> {
    match path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_uppercase())
        .as_deref()
    {
        Some("CSV") => Ok(FileType::Csv),
        Some("PARQUET") | Some("PQ") => Ok(FileType::Parquet),
        Some("ARROW") | Some("IPC") | Some("FEATHER") => Ok(FileType::Arrow),
        Some("JSON") => Ok(FileType::Json),
        _ => Err(MtvError::UnknownFileType),
    }
}

pub fn get_file_info(path: PathBuf) -> Result<FileInfo> {
    let metadata = fs::metadata(&path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => MtvError::FileNotFound,
        ErrorKind::PermissionDenied => MtvError::PermissionDenied,
        _ => MtvError::Io(e),
    })?;
    if !metadata.is_file() {
        return Err(MtvError::LoadingFailed("Not a file!".into()));
    }

    let file_type = detect_file_type(&path)?;

    Ok(FileInfo {
        path,
        file_size: metadata.len(),
        file_type,
    })
}

#[instrument(skip_all, fields(path = %path.display()))]
pub fn load_records(path: PathBuf) -> Result<RecordSet> {
    let file_info = get_file_info(path)?;
    debug!("Loading {:?}", file_info);
    let start_time = Instant::now();

    let (columns, records) = match file_info.file_type {
        FileType::Json => records_from_json(&fs::read_to_string(&file_info.path)?)?,
        FileType::Csv => records_from_frame(load_csv(&file_info.path)?.collect()?)?,
        FileType::Parquet => records_from_frame(load_parquet(&file_info.path)?.collect()?)?,
        FileType::Arrow => records_from_frame(load_arrow(&file_info.path)?.collect()?)?,
    };
    if columns.is_empty() {
        return Err(MtvError::NoRecords);
    }

    info!(
        "Loaded {} records with {} columns in {}ms",
        records.len(),
        columns.len(),
        start_time.elapsed().as_millis()
    );
    debug!("Columns: {:?}", columns);

    let name = file_info
        .path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("???")
        .to_string();
    Ok(RecordSet::new(name, columns, records))
}

/// Parses a JSON array of objects, e.g. a dump of database rows. Column order
/// is the order in which keys are first seen, as written in the file.
pub fn records_from_json(text: &str) -> Result<(Vec<String>, Vec<Record>)> {
    let rows = match serde_json::from_str::<serde_json::Value>(text)? {
        serde_json::Value::Array(rows) => rows,
        _ => {
            return Err(MtvError::LoadingFailed(
                "expected a JSON array of objects".into(),
            ));
        }
    };

    let mut columns: Vec<String> = Vec::new();
    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        let serde_json::Value::Object(map) = row else {
            return Err(MtvError::LoadingFailed(
                "expected a JSON array of objects".into(),
            ));
        };
        let mut record = Record::new();
        for (key, value) in map {
            if !columns.contains(&key) {
                columns.push(key.clone());
            }
            record.insert(key, Value::from(value));
        }
        records.push(record);
    }
    Ok((columns, records))
}

/// Converts a collected frame into records. Each column is converted in its
/// own rayon task, then stitched together row by row.
pub fn records_from_frame(df: DataFrame) -> Result<(Vec<String>, Vec<Record>)> {
    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|n| n.to_string())
        .collect();

    let converted: std::result::Result<Vec<Vec<Value>>, PolarsError> = names
        .par_iter()
        .map(|name| column_values(&df, name))
        .collect();
    let columns = converted?;

    let records = (0..df.height())
        .map(|ridx| {
            names
                .iter()
                .zip(columns.iter())
                .map(|(name, values)| (name.as_str(), values[ridx].clone()))
                .collect::<Record>()
        })
        .collect();
    Ok((names, records))
}

fn is_integer_type(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
    )
}

fn is_float_type(dtype: &DataType) -> bool {
    matches!(dtype, DataType::Float32 | DataType::Float64)
}

fn column_values(df: &DataFrame, col_name: &str) -> std::result::Result<Vec<Value>, PolarsError> {
    let column = df.column(col_name)?;
    let dtype = column.dtype().clone();

    let values = if is_integer_type(&dtype) {
        let col = column.cast(&DataType::Int64)?;
        col.i64()?.into_iter().map(Value::from).collect()
    } else if dtype == DataType::UInt64 {
        column.u64()?.into_iter().map(Value::from).collect()
    } else if is_float_type(&dtype) {
        let col = column.cast(&DataType::Float64)?;
        col.f64()?.into_iter().map(Value::from).collect()
    } else if dtype == DataType::Boolean {
        column.bool()?.into_iter().map(Value::from).collect()
    } else {
        let col = column.cast(&DataType::String)?;
        col.str()?.into_iter().map(Value::from).collect()
    };
    Ok(values)
}

fn load_csv(path: &Path) -> std::result::Result<LazyFrame, PolarsError> {
    LazyCsvReader::new(PlPath::Local(path.into()))
        .with_has_header(true)
        .finish()
}

fn load_parquet(path: &Path) -> std::result::Result<LazyFrame, PolarsError> {
    LazyFrame::scan_parquet(PlPath::Local(path.into()), ScanArgsParquet::default())
}

fn load_arrow(path: &Path) -> std::result::Result<LazyFrame, PolarsError> {
    LazyFrame::scan_ipc(
        PlPath::Local(path.into()),
        polars::io::ipc::IpcScanOptions,
        UnifiedScanArgs::default(),
    )
}
