//! Crawl statistics
//!
//! Counters are updated from the coordinator loop only, so they are plain
//! integers rather than atomics.

use std::fmt;
use std::time::Duration;

/// Counts of what happened during one crawl
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStats {
    /// Total results reported by the pagination caption
    pub total_results: u64,

    /// Index pages computed from the caption
    pub index_pages: u64,

    /// Index pages fetched and parsed
    pub index_pages_fetched: u64,

    /// Index pages that could not be fetched
    pub index_pages_failed: u64,

    /// Unique detail links found across all index pages
    pub detail_links_discovered: u64,

    /// Detail pages fetched with a usable payload
    pub detail_pages_fetched: u64,

    /// Listings dropped because the detail fetch or payload failed
    pub listings_dropped: u64,

    /// Agent lookups merged into their record
    pub agent_lookups_ok: u64,

    /// Agent lookups that failed; the record kept empty agent fields
    pub agent_lookups_failed: u64,

    /// Listings emitted without an agent lookup
    pub agent_lookups_skipped: u64,

    /// Records emitted with an empty history after a parse failure
    pub history_parse_failures: u64,

    /// Records handed to the sink
    pub records_emitted: u64,

    /// Wall-clock duration of the crawl
    pub elapsed: Duration,
}

impl CrawlStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Share of discovered listings that were emitted, as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.detail_links_discovered == 0 {
            return 0.0;
        }
        (self.records_emitted as f64 / self.detail_links_discovered as f64) * 100.0
    }

    /// Emitted records per second
    pub fn records_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs == 0.0 {
            return 0.0;
        }
        self.records_emitted as f64 / secs
    }

    /// Logs the end-of-crawl summary
    pub fn log_summary(&self) {
        tracing::info!(
            "Crawl complete: {} records emitted from {} listings in {:.1}s ({:.2} records/sec)",
            self.records_emitted,
            self.detail_links_discovered,
            self.elapsed.as_secs_f64(),
            self.records_per_second()
        );
        tracing::info!(
            "Index pages: {}/{} fetched, {} failed",
            self.index_pages_fetched,
            self.index_pages,
            self.index_pages_failed
        );
        tracing::info!(
            "Agent lookups: {} ok, {} failed, {} skipped",
            self.agent_lookups_ok,
            self.agent_lookups_failed,
            self.agent_lookups_skipped
        );
        if self.listings_dropped > 0 {
            tracing::warn!("{} listings dropped", self.listings_dropped);
        }
        if self.history_parse_failures > 0 {
            tracing::warn!(
                "{} records emitted without price history",
                self.history_parse_failures
            );
        }
    }
}

impl fmt::Display for CrawlStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Crawl Statistics ===")?;
        writeln!(f)?;
        writeln!(f, "Results reported:      {}", self.total_results)?;
        writeln!(
            f,
            "Index pages:           {} fetched, {} failed, {} total",
            self.index_pages_fetched, self.index_pages_failed, self.index_pages
        )?;
        writeln!(f, "Listings discovered:   {}", self.detail_links_discovered)?;
        writeln!(f, "Detail pages fetched:  {}", self.detail_pages_fetched)?;
        writeln!(f, "Listings dropped:      {}", self.listings_dropped)?;
        writeln!(
            f,
            "Agent lookups:         {} ok, {} failed, {} skipped",
            self.agent_lookups_ok, self.agent_lookups_failed, self.agent_lookups_skipped
        )?;
        writeln!(f, "History parse errors:  {}", self.history_parse_failures)?;
        writeln!(f, "Records emitted:       {}", self.records_emitted)?;
        write!(
            f,
            "Success Rate: {:.1}% ({:.1}s elapsed)",
            self.success_rate(),
            self.elapsed.as_secs_f64()
        )
    }
}
