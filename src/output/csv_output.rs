//! CSV record sink
//!
//! One header row followed by one row per listing. Columns follow
//! [`ListingRecord::COLUMNS`] unless the configuration selects a subset.

use crate::config::{ListingKind, OutputConfig};
use crate::extract::ListingRecord;
use crate::output::traits::{OutputError, OutputResult, RecordSink};
use chrono::{DateTime, Local};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Writes listing records as CSV rows
pub struct CsvSink<W: Write> {
    writer: csv::Writer<W>,
    columns: Vec<String>,
}

impl<W: Write + Send> CsvSink<W> {
    /// Wraps a writer and writes the header row
    pub fn from_writer(writer: W, columns: Vec<String>) -> OutputResult<Self> {
        let mut writer = csv::Writer::from_writer(writer);
        writer.write_record(&columns)?;
        Ok(Self { writer, columns })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Flushes and returns the underlying writer
    pub fn into_inner(self) -> OutputResult<W> {
        self.writer
            .into_inner()
            .map_err(|e| OutputError::Write(e.error().to_string()))
    }
}

impl CsvSink<File> {
    /// Creates the file (and its parent directories) and writes the header
    pub fn create(path: &Path, columns: Vec<String>) -> OutputResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        tracing::info!("Writing records to {}", path.display());
        Self::from_writer(File::create(path)?, columns)
    }
}

impl<W: Write + Send> RecordSink for CsvSink<W> {
    fn write_record(&mut self, record: &ListingRecord) -> OutputResult<()> {
        self.writer.write_record(record.row(&self.columns))?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Columns to export: the configured subset, or every column
pub fn columns(config: &OutputConfig) -> Vec<String> {
    if config.fields.is_empty() {
        ListingRecord::COLUMNS.iter().map(|c| c.to_string()).collect()
    } else {
        config.fields.clone()
    }
}

/// Default output file: `{directory}/data_{kind}_{state}_{city}_{timestamp}.csv`
pub fn output_path(
    config: &OutputConfig,
    kind: ListingKind,
    state: &str,
    city: &str,
    started_at: DateTime<Local>,
) -> PathBuf {
    let file_name = format!(
        "data_{}_{}_{}_{}.csv",
        kind.label(),
        state,
        city,
        started_at.format("%Y%m%d_%H%M%S")
    );
    Path::new(&config.directory).join(file_name)
}
