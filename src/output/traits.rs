//! Record sink trait and output errors
//!
//! A sink receives each finished listing record exactly once, from the
//! coordinator loop.

use crate::extract::ListingRecord;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Destination for emitted listing records
///
/// Sinks are driven from a single task, so implementations need no internal
/// locking.
pub trait RecordSink: Send {
    /// Writes one finished record
    ///
    /// # Arguments
    ///
    /// * `record` - The record leaving the pipeline
    fn write_record(&mut self, record: &ListingRecord) -> OutputResult<()>;

    /// Flushes buffered output once the crawl is done
    fn finish(&mut self) -> OutputResult<()> {
        Ok(())
    }
}

/// Sink that keeps every record in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Vec<ListingRecord>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[ListingRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<ListingRecord> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl RecordSink for MemorySink {
    fn write_record(&mut self, record: &ListingRecord) -> OutputResult<()> {
        self.records.push(record.clone());
        Ok(())
    }
}
