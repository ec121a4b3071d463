//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop that ties the pipeline together:
//! - Fetching the first index page and fixing the page count
//! - Fanning out over every index page
//! - De-duplicating detail links across index pages
//! - Running each listing through detail fetch and agent lookup
//! - Emitting finished records and collecting statistics

use crate::agent::{csrf_token, parse_response_body, AgentInfo, AgentLookup};
use crate::config::{Config, ListingKind};
use crate::crawler::fetcher::Fetcher;
use crate::crawler::pagination::{
    enumerate_index_pages, extract_detail_links, pagination_state, start_url,
};
use crate::extract::{detail_payload, extract_listing};
use crate::output::{CrawlStats, RecordSink};
use crate::state::ListingContext;
use crate::{ConfigError, ScrapeError};
use regex::Regex;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;
use url::Url;

/// Records between progress log lines
const PROGRESS_INTERVAL: u64 = 25;

/// Read-only handles shared by every spawned task
#[derive(Clone)]
struct PipelineHandles {
    fetcher: Arc<Fetcher>,
    agent_lookup: Arc<AgentLookup>,
    detail_pattern: Regex,
    listing_kind: ListingKind,
}

/// How the agent stage of one listing resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AgentStatus {
    Merged,
    Failed,
    Skipped,
}

/// Result of one listing task
enum ListingOutcome {
    Ready {
        context: ListingContext,
        agent: AgentStatus,
        history_failed: bool,
    },
    Dropped {
        url: String,
        error: ScrapeError,
    },
}

/// Result of one index page task
type IndexOutcome = (Url, Result<Vec<String>, ScrapeError>);

impl PipelineHandles {
    /// Fetches an index page and returns its detail links
    async fn fetch_index(&self, url: &Url) -> Result<Vec<String>, ScrapeError> {
        let page = self.fetcher.get(url.as_str()).await?;
        Ok(extract_detail_links(
            &page.body,
            &page.final_url,
            &self.detail_pattern,
        ))
    }

    async fn process_listing(&self, url: String) -> ListingOutcome {
        match self.run_listing(&url).await {
            Ok(outcome) => outcome,
            Err(error) => ListingOutcome::Dropped { url, error },
        }
    }

    /// Drives one listing from discovery to a ready context
    async fn run_listing(&self, url: &str) -> Result<ListingOutcome, ScrapeError> {
        let mut context = ListingContext::discovered(url);

        let page = self.fetcher.get(url).await?;
        let final_url = page.final_url.as_str();
        let payload = detail_payload(&page.body, final_url)?;
        let extraction = extract_listing(&payload, &page.body, final_url);
        let history_failed = extraction.history_error.is_some();

        let token = if self.listing_kind.has_agent_lookup() {
            csrf_token(&payload)
        } else {
            None
        };
        context.detail_fetched(extraction.record, token)?;

        let agent = if context.needs_agent_lookup() {
            let token = context.agent_token().unwrap_or_default().to_owned();
            let property_url = context.record().url.clone();
            match self.lookup_agent(&property_url, &token).await {
                Ok(info) => {
                    context.agent_fetched(info)?;
                    AgentStatus::Merged
                }
                Err(e) => {
                    tracing::warn!("Agent lookup failed for {}: {}", context.url(), e);
                    context.agent_failed()?;
                    AgentStatus::Failed
                }
            }
        } else {
            AgentStatus::Skipped
        };

        Ok(ListingOutcome::Ready {
            context,
            agent,
            history_failed,
        })
    }

    async fn lookup_agent(&self, property_url: &str, token: &str) -> Result<AgentInfo, ScrapeError> {
        let request = self
            .agent_lookup
            .build_request(self.fetcher.client(), property_url, token)?;
        let response = self.fetcher.execute(request).await?;
        Ok(parse_response_body(&response.body)?)
    }
}

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Arc<Config>,
    handles: PipelineHandles,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(ScrapeError)` - The HTTP client, agent endpoint or link pattern is invalid
    pub fn new(config: Config) -> Result<Self, ScrapeError> {
        let fetcher = Fetcher::from_config(&config)?;

        let endpoint = Url::parse(&config.site.agent_endpoint).map_err(|e| {
            ConfigError::InvalidUrl(format!("{}: {}", config.site.agent_endpoint, e))
        })?;

        let detail_pattern = Regex::new(&config.site.detail_link_pattern).map_err(|e| {
            ConfigError::InvalidPattern(format!("{}: {}", config.site.detail_link_pattern, e))
        })?;

        let handles = PipelineHandles {
            fetcher: Arc::new(fetcher),
            agent_lookup: Arc::new(AgentLookup::new(endpoint)),
            detail_pattern,
            listing_kind: config.crawler.listing_kind,
        };

        Ok(Self {
            config: Arc::new(config),
            handles,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Crawls every listing of a state/city and emits the records to `sink`
    ///
    /// This is the core crawling logic that:
    /// 1. Fetches the first index page and parses its pagination caption
    /// 2. Spawns one task per index page
    /// 3. De-duplicates detail links and spawns one task per new listing
    /// 4. Emits each finished listing to the sink exactly once
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlStats)` - The crawl finished; dropped listings are counted, not fatal
    /// * `Err(ScrapeError)` - The first page could not be fetched or paginated,
    ///   or the sink failed
    pub async fn run(
        &self,
        state: &str,
        city: &str,
        sink: &mut dyn RecordSink,
    ) -> Result<CrawlStats, ScrapeError> {
        let started = Instant::now();
        let mut stats = CrawlStats::new();
        let kind = self.handles.listing_kind;

        let start = start_url(&self.config.site.base_url, kind, state, city)?;
        tracing::info!("Starting {} crawl at {}", kind.label(), start);

        let first_page = self.handles.fetcher.get(start.as_str()).await?;
        let pagination = pagination_state(&first_page.body)?;
        stats.total_results = pagination.total_results;
        stats.index_pages = pagination.page_count;
        tracing::info!(
            "{} results across {} index pages",
            pagination.total_results,
            pagination.page_count
        );

        let mut index_tasks: JoinSet<IndexOutcome> = JoinSet::new();
        for url in enumerate_index_pages(&start, pagination.page_count)? {
            let handles = self.handles.clone();
            index_tasks.spawn(async move {
                let result = handles.fetch_index(&url).await;
                (url, result)
            });
        }

        self.drain(index_tasks, JoinSet::new(), sink, &mut stats).await?;

        sink.finish()?;
        stats.elapsed = started.elapsed();
        stats.log_summary();

        Ok(stats)
    }

    /// Joins index and listing tasks until both sets are empty
    ///
    /// Index pages spawn listing tasks for links not seen before. A task that
    /// panics is counted as a failed index page or a dropped listing.
    async fn drain(
        &self,
        mut index_tasks: JoinSet<IndexOutcome>,
        mut listing_tasks: JoinSet<ListingOutcome>,
        sink: &mut dyn RecordSink,
        stats: &mut CrawlStats,
    ) -> Result<(), ScrapeError> {
        let max_listings = u64::from(self.config.crawler.max_listings);
        let mut seen: HashSet<String> = HashSet::new();

        loop {
            tokio::select! {
                Some(joined) = index_tasks.join_next(), if !index_tasks.is_empty() => {
                    match joined {
                        Ok((url, Ok(links))) => {
                            stats.index_pages_fetched += 1;
                            let mut new_links = 0;

                            for link in links {
                                if max_listings > 0 && seen.len() as u64 >= max_listings {
                                    break;
                                }
                                if !seen.insert(link.clone()) {
                                    continue;
                                }
                                new_links += 1;

                                let handles = self.handles.clone();
                                listing_tasks.spawn(async move {
                                    handles.process_listing(link).await
                                });
                            }

                            stats.detail_links_discovered += new_links;
                            tracing::debug!("{}: {} new detail links", url, new_links);
                        }
                        Ok((url, Err(e))) => {
                            stats.index_pages_failed += 1;
                            tracing::warn!("Failed to fetch index page {}: {}", url, e);
                        }
                        Err(e) => {
                            stats.index_pages_failed += 1;
                            tracing::error!("Index page task failed: {}", e);
                        }
                    }
                }
                Some(joined) = listing_tasks.join_next(), if !listing_tasks.is_empty() => {
                    match joined {
                        Ok(ListingOutcome::Ready { context, agent, history_failed }) => {
                            let record = context.emit()?;
                            sink.write_record(&record)?;

                            stats.detail_pages_fetched += 1;
                            stats.records_emitted += 1;
                            if history_failed {
                                stats.history_parse_failures += 1;
                            }
                            match agent {
                                AgentStatus::Merged => stats.agent_lookups_ok += 1,
                                AgentStatus::Failed => stats.agent_lookups_failed += 1,
                                AgentStatus::Skipped => stats.agent_lookups_skipped += 1,
                            }

                            if stats.records_emitted % PROGRESS_INTERVAL == 0 {
                                tracing::info!(
                                    "Progress: {} records emitted, {} listings discovered, {} tasks pending",
                                    stats.records_emitted,
                                    stats.detail_links_discovered,
                                    index_tasks.len() + listing_tasks.len()
                                );
                            }
                        }
                        Ok(ListingOutcome::Dropped { url, error }) => {
                            stats.listings_dropped += 1;
                            tracing::warn!("Dropping listing {}: {}", url, error);
                        }
                        Err(e) => {
                            stats.listings_dropped += 1;
                            tracing::error!("Listing task failed: {}", e);
                        }
                    }
                }
                else => break,
            }
        }

        Ok(())
    }
}
