//! Data loading utilities

use crate::error::{PipelineError, Result};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;
use std::time::Instant;
use tracing::debug;

/// Data loader for the supported table formats
#[derive(Debug, Clone)]
pub struct DataLoader {
    /// Rows sampled for CSV schema inference
    infer_schema_length: usize,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLoader {
    /// Create a new data loader
    pub fn new() -> Self {
        Self {
            infer_schema_length: 1000,
        }
    }

    /// Set the number of rows used for CSV schema inference
    pub fn with_infer_schema_length(mut self, rows: usize) -> Self {
        self.infer_schema_length = rows.max(1);
        self
    }

    /// Load a CSV file
    pub fn load_csv(&self, path: impl AsRef<Path>) -> Result<DataFrame> {
        self.load_csv_with_options(path, b',', true, 0)
    }

    /// Load a delimited file with specific options
    pub fn load_csv_with_options(
        &self,
        path: impl AsRef<Path>,
        delimiter: u8,
        has_header: bool,
        skip_rows: usize,
    ) -> Result<DataFrame> {
        let path = path.as_ref();
        let file = open(path)?;

        // "NA" is how the house price data marks absent values
        let parse_opts = CsvParseOptions::default()
            .with_separator(delimiter)
            .with_null_values(Some(NullValues::AllColumnsSingle("NA".into())));

        CsvReadOptions::default()
            .with_has_header(has_header)
            .with_skip_rows(skip_rows)
            .with_infer_schema_length(Some(self.infer_schema_length))
            .with_parse_options(parse_opts)
            .into_reader_with_file_handle(file)
            .finish()
            .map_err(|e| PipelineError::DataError(format!("{}: {}", path.display(), e)))
    }

    /// Load a Parquet file
    pub fn load_parquet(&self, path: impl AsRef<Path>) -> Result<DataFrame> {
        let path = path.as_ref();
        ParquetReader::new(open(path)?)
            .finish()
            .map_err(|e| PipelineError::DataError(format!("{}: {}", path.display(), e)))
    }

    /// Load a JSON file (line-delimited)
    pub fn load_json(&self, path: impl AsRef<Path>) -> Result<DataFrame> {
        let path = path.as_ref();
        JsonReader::new(open(path)?)
            .with_json_format(JsonFormat::JsonLines)
            .finish()
            .map_err(|e| PipelineError::DataError(format!("{}: {}", path.display(), e)))
    }

    /// Detect file format from extension and load
    pub fn load_auto(&self, path: impl AsRef<Path>) -> Result<DataFrame> {
        let path = path.as_ref();
        let start = Instant::now();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        let df = match ext.as_str() {
            "tsv" => self.load_csv_with_options(path, b'\t', true, 0)?,
            "parquet" | "pq" => self.load_parquet(path)?,
            "json" | "jsonl" | "ndjson" => self.load_json(path)?,
            // Try CSV as default
            _ => self.load_csv(path)?,
        };

        debug!(
            path = %path.display(),
            rows = df.height(),
            cols = df.width(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Loaded table"
        );
        Ok(df)
    }
}

fn open(path: &Path) -> Result<File> {
    File::open(path)
        .map_err(|e| PipelineError::DataError(format!("cannot open {}: {}", path.display(), e)))
}

/// Save to CSV
pub fn save_csv(df: &mut DataFrame, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;

    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(df)
        .map_err(|e| PipelineError::DataError(e.to_string()))
}
