//! Output module for emitted records and crawl statistics
//!
//! This module handles:
//! - Writing listing records to CSV
//! - Collecting records in memory for embedding callers
//! - Recording crawl statistics

mod csv_output;
pub mod stats;
mod traits;

pub use csv_output::{columns, output_path, CsvSink};
pub use stats::CrawlStats;
pub use traits::{MemorySink, OutputError, OutputResult, RecordSink};
