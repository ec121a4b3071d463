//! Trulia-Scraper: a listing harvester for one real-estate site
//!
//! This crate crawls the paginated search results for a state/city, follows
//! every property detail page, extracts a flat listing record from the page's
//! embedded JSON payload and, for listings that are for sale, looks up the
//! listing agent and broker before emitting the record.

pub mod agent;
pub mod config;
pub mod crawler;
pub mod extract;
pub mod output;
pub mod state;

use thiserror::Error;

/// Main error type for Trulia-Scraper operations
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("HTTP status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Pagination error: {0}")]
    Pagination(#[from] PaginationParseError),

    #[error("Detail page payload error for {url}: {message}")]
    DetailPayload { url: String, message: String },

    #[error("Invalid listing transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::ListingStage,
        to: state::ListingStage,
    },

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid pattern in config: {0}")]
    InvalidPattern(String),
}

/// The result-count caption could not be turned into a page count
///
/// This is fatal for a crawl: no pagination is guessed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaginationParseError {
    #[error("pagination caption not found on index page")]
    MissingCaption,

    #[error("no result count in pagination caption '{0}'")]
    NoResultCount(String),
}

/// A price history entry could not be parsed
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HistoryParseError {
    #[error("invalid price history date '{0}'")]
    Date(String),

    #[error("invalid price history price '{0}'")]
    Price(String),
}

/// Result type alias for Trulia-Scraper operations
pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::{Config, ListingKind};
pub use extract::{ListingRecord, PriceEvent};
pub use state::{ListingContext, ListingStage};
