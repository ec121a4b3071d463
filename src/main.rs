//! Trulia-Scraper main entry point
//!
//! This is the command-line interface for the Trulia-Scraper listing harvester.

use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use trulia_scraper::config::{load_config_with_hash, validate, Config, ListingKind};
use trulia_scraper::crawler::{crawl, start_url};
use trulia_scraper::output::{columns, output_path};
use tracing_subscriber::EnvFilter;

/// Trulia-Scraper: a real-estate listing harvester
///
/// Trulia-Scraper walks every search result page of a state/city, extracts a
/// flat record from each property detail page and, for listings that are for
/// sale, looks up the listing agent. Records are written to a CSV file.
#[derive(Parser, Debug)]
#[command(name = "trulia-scraper")]
#[command(version = "1.0.0")]
#[command(about = "A real-estate listing harvester", long_about = None)]
struct Cli {
    /// State code as used in search URLs, e.g. CA
    #[arg(long)]
    state: String,

    /// City as used in search URLs, e.g. San_Francisco
    #[arg(long)]
    city: String,

    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// CSV file to write instead of the generated name
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Crawl recently sold listings instead of listings for sale
    #[arg(long)]
    sold: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = load(&cli)?;
    if cli.sold {
        config.crawler.listing_kind = ListingKind::Sold;
    }

    let output = cli.output.clone().unwrap_or_else(|| {
        output_path(
            &config.output,
            config.crawler.listing_kind,
            &cli.state,
            &cli.city,
            chrono::Local::now(),
        )
    });

    if cli.dry_run {
        handle_dry_run(&config, &cli, &output)
    } else {
        handle_crawl(config, &cli, output).await
    }
}

/// Loads the configuration file, or the defaults when none is given
fn load(cli: &Cli) -> anyhow::Result<Config> {
    let Some(path) = &cli.config else {
        tracing::info!("No configuration file given, using defaults");
        let config = Config::default();
        validate(&config)?;
        return Ok(config);
    };

    tracing::info!("Loading configuration from: {}", path.display());
    let (config, hash) = load_config_with_hash(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);
    Ok(config)
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("trulia_scraper=info,warn"),
            1 => EnvFilter::new("trulia_scraper=debug,info"),
            2 => EnvFilter::new("trulia_scraper=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &Config, cli: &Cli, output: &Path) -> anyhow::Result<()> {
    let kind = config.crawler.listing_kind;
    let start = start_url(&config.site.base_url, kind, &cli.state, &cli.city)?;

    println!("=== Trulia-Scraper Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Listing kind: {}", kind.label());
    println!(
        "  Max concurrent requests: {}",
        config.crawler.max_concurrent_requests
    );
    println!("  Download delay: {}ms", config.crawler.download_delay_ms);
    match config.crawler.max_listings {
        0 => println!("  Max listings: unlimited"),
        n => println!("  Max listings: {}", n),
    }

    println!("\nHTTP:");
    println!("  User agent: {}", config.http.user_agent);
    println!(
        "  Proxy: {}",
        config.http.proxy.as_deref().unwrap_or("(none)")
    );
    println!("  Timeout: {}s", config.http.timeout_secs);
    println!(
        "  Retries: {} ({}ms apart)",
        config.http.max_retries, config.http.retry_delay_ms
    );

    println!("\nSite:");
    println!("  Detail link pattern: {}", config.site.detail_link_pattern);
    if kind.has_agent_lookup() {
        println!("  Agent endpoint: {}", config.site.agent_endpoint);
    } else {
        println!("  Agent lookup: skipped for sold listings");
    }

    println!("\nOutput:");
    println!("  File: {}", output.display());
    println!("  Columns: {}", columns(&config.output).join(", "));

    println!("\n✓ Configuration is valid");
    println!("✓ Would start crawling at {}", start);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, cli: &Cli, output: PathBuf) -> anyhow::Result<()> {
    tracing::info!(
        "Crawling {} listings for {}, {}",
        config.crawler.listing_kind.label(),
        cli.city,
        cli.state
    );

    match crawl(config, &cli.state, &cli.city, &output).await {
        Ok(stats) => {
            tracing::info!("Crawl completed successfully");
            println!("{}", stats);
            println!("\n✓ Records written to: {}", output.display());
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
