use serde::Deserialize;

/// Main configuration structure for Trulia-Scraper
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub http: HttpConfig,
    pub site: SiteConfig,
    pub output: OutputConfig,
}

/// Which page schema a crawl targets
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ListingKind {
    /// Active listings; detail pages carry features and a CSRF token for the agent lookup
    #[default]
    ForSale,
    /// Recently sold listings; detail pages carry tax assessments and no agent lookup
    Sold,
}

impl ListingKind {
    /// Whether listings of this kind go through the agent lookup stage
    pub fn has_agent_lookup(&self) -> bool {
        matches!(self, Self::ForSale)
    }

    /// Short label used in output file names
    pub fn label(&self) -> &'static str {
        match self {
            Self::ForSale => "for_sale",
            Self::Sold => "sold",
        }
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Page schema to crawl
    #[serde(rename = "listing-kind")]
    pub listing_kind: ListingKind,

    /// Maximum number of requests in flight at once
    #[serde(rename = "max-concurrent-requests")]
    pub max_concurrent_requests: u32,

    /// Fixed delay between the start of two consecutive requests (milliseconds)
    #[serde(rename = "download-delay-ms")]
    pub download_delay_ms: u64,

    /// Stop scheduling detail pages after this many listings (0 = unlimited)
    #[serde(rename = "max-listings")]
    pub max_listings: u32,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            listing_kind: ListingKind::ForSale,
            max_concurrent_requests: 16,
            download_delay_ms: 500,
            max_listings: 0,
        }
    }
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    pub accept: String,

    #[serde(rename = "accept-language")]
    pub accept_language: String,

    /// Upstream proxy every request is routed through
    pub proxy: Option<String>,

    /// Per-request timeout (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Retries for transient failures (5xx, 429, timeouts, connection errors)
    #[serde(rename = "max-retries")]
    pub max_retries: u32,

    /// Delay before each retry (milliseconds)
    #[serde(rename = "retry-delay-ms")]
    pub retry_delay_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:71.0) Gecko/20100101 Firefox/71.0"
                .to_string(),
            accept: "*/*".to_string(),
            accept_language: "en-US,en;q=0.5".to_string(),
            proxy: None,
            timeout_secs: 30,
            max_retries: 2,
            retry_delay_ms: 1000,
        }
    }
}

/// Target site layout
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Site root, e.g. "https://www.trulia.com"
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Regex an absolute link must match to count as a property detail page
    #[serde(rename = "detail-link-pattern")]
    pub detail_link_pattern: String,

    /// GraphQL endpoint for the agent lookup
    #[serde(rename = "agent-endpoint")]
    pub agent_endpoint: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.trulia.com".to_string(),
            detail_link_pattern: r"^https://www\.trulia\.com/(property|p)/".to_string(),
            agent_endpoint: "https://www.trulia.com/graphql".to_string(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory CSV files are written to
    pub directory: String,

    /// Columns to export, in order; empty means every column
    pub fields: Vec<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: "data".to_string(),
            fields: Vec::new(),
        }
    }
}
