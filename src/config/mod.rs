//! Configuration module for Trulia-Scraper
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every section has defaults, so an empty file (or no file at all) is a valid
//! configuration.
//!
//! # Example
//!
//! ```no_run
//! use trulia_scraper::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("trulia.toml")).unwrap();
//! println!("Download delay: {}ms", config.crawler.download_delay_ms);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, HttpConfig, ListingKind, OutputConfig, SiteConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::validate;
