//! Crawler module for listing discovery and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with retry logic
//! - Index page pagination and detail link extraction
//! - Request scheduling and rate limiting
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod pagination;
mod scheduler;

pub use coordinator::Coordinator;
pub use fetcher::{build_http_client, FetchedPage, Fetcher};
pub use pagination::{
    compute_page_count, enumerate_index_pages, extract_detail_links, pagination_caption,
    pagination_state, result_count, start_url, PaginationState, RESULTS_PER_PAGE,
};
pub use scheduler::{RequestPermit, RequestScheduler};

use crate::config::Config;
use crate::output::{columns, CrawlStats, CsvSink};
use crate::ScrapeError;
use std::path::Path;

/// Runs a complete crawl and writes the records to a CSV file
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Build the HTTP client and request scheduler
/// 2. Create the CSV file with the configured columns
/// 3. Crawl every index page and listing of the state/city
/// 4. Flush the file and return the crawl statistics
///
/// A crawl that fails fatally removes the file it created.
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `state` - State code as it appears in search URLs, e.g. `CA`
/// * `city` - City as it appears in search URLs, e.g. `San_Francisco`
/// * `output_path` - CSV file to create
///
/// # Returns
///
/// * `Ok(CrawlStats)` - Crawl completed
/// * `Err(ScrapeError)` - Crawl failed
pub async fn crawl(
    config: Config,
    state: &str,
    city: &str,
    output_path: &Path,
) -> Result<CrawlStats, ScrapeError> {
    let coordinator = Coordinator::new(config)?;
    let mut sink = CsvSink::create(output_path, columns(&coordinator.config().output))?;

    let result = coordinator.run(state, city, &mut sink).await;
    if result.is_err() {
        drop(sink);
        if let Err(e) = std::fs::remove_file(output_path) {
            tracing::warn!(
                "Failed to remove incomplete output {}: {}",
                output_path.display(),
                e
            );
        }
    }
    result
}
