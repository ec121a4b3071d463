//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with the configured headers and upstream proxy
//! - Routing every request through the shared request scheduler
//! - Retry logic for transient failures
//! - Error classification

use crate::config::{Config, HttpConfig};
use crate::crawler::scheduler::RequestScheduler;
use crate::{ConfigError, ScrapeError};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::{Client, Proxy, Request, StatusCode};
use std::time::Duration;
use url::Url;

/// A successfully fetched response
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub final_url: Url,
    /// Response body
    pub body: String,
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The HTTP configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(ScrapeError)` - A header or the proxy URL is invalid, or the client failed to build
pub fn build_http_client(config: &HttpConfig) -> Result<Client, ScrapeError> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, header_value("accept", &config.accept)?);
    headers.insert(
        ACCEPT_LANGUAGE,
        header_value("accept-language", &config.accept_language)?,
    );

    let mut builder = Client::builder()
        .user_agent(config.user_agent.as_str())
        .default_headers(headers)
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true);

    if let Some(proxy) = &config.proxy {
        builder = builder.proxy(Proxy::all(proxy.as_str())?);
    }

    Ok(builder.build()?)
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue, ScrapeError> {
    HeaderValue::from_str(value).map_err(|e| {
        ConfigError::Validation(format!("Invalid {} header '{}': {}", name, value, e)).into()
    })
}

/// Fetches pages through the shared scheduler, retrying transient failures
///
/// # Retry Logic
///
/// | Condition | Action |
/// |-----------|--------|
/// | HTTP 5xx | Retry up to `max_retries` times |
/// | HTTP 429 | Retry up to `max_retries` times |
/// | Timeout | Retry up to `max_retries` times |
/// | Connection error | Retry up to `max_retries` times |
/// | Other HTTP 4xx | Immediate failure |
pub struct Fetcher {
    client: Client,
    scheduler: RequestScheduler,
    max_retries: u32,
    retry_delay: Duration,
}

impl Fetcher {
    pub fn new(client: Client, scheduler: RequestScheduler, http: &HttpConfig) -> Self {
        Self {
            client,
            scheduler,
            max_retries: http.max_retries,
            retry_delay: Duration::from_millis(http.retry_delay_ms),
        }
    }

    /// Builds the client and scheduler described by the configuration
    pub fn from_config(config: &Config) -> Result<Self, ScrapeError> {
        let client = build_http_client(&config.http)?;
        let scheduler = RequestScheduler::from_config(&config.crawler);
        Ok(Self::new(client, scheduler, &config.http))
    }

    /// The underlying client, for building requests
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Fetches a URL with GET
    pub async fn get(&self, url: &str) -> Result<FetchedPage, ScrapeError> {
        let request = self
            .client
            .get(url)
            .build()
            .map_err(|source| ScrapeError::Http {
                url: url.to_string(),
                source,
            })?;
        self.execute(request).await
    }

    /// Sends a prepared request, retrying transient failures
    pub async fn execute(&self, request: Request) -> Result<FetchedPage, ScrapeError> {
        let mut attempt = 0;
        let mut pending = request;

        loop {
            let retry = pending.try_clone();
            let url = pending.url().to_string();

            match self.send_once(pending).await {
                Err(e) if attempt < self.max_retries && is_transient(&e) => {
                    let Some(next) = retry else {
                        return Err(e);
                    };
                    attempt += 1;
                    tracing::warn!(
                        "Retrying {} ({}/{}) after error: {}",
                        url,
                        attempt,
                        self.max_retries,
                        e
                    );
                    tokio::time::sleep(self.retry_delay).await;
                    pending = next;
                }
                result => return result,
            }
        }
    }

    async fn send_once(&self, request: Request) -> Result<FetchedPage, ScrapeError> {
        let _permit = self.scheduler.acquire().await;
        let url = request.url().to_string();
        tracing::debug!("{} {}", request.method(), url);

        let response = self
            .client
            .execute(request)
            .await
            .map_err(|e| classify_error(&url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let final_url = response.url().clone();
        let body = response.text().await.map_err(|e| classify_error(&url, e))?;

        tracing::trace!("{} -> {} ({} bytes)", url, status, body.len());

        Ok(FetchedPage { final_url, body })
    }
}

/// Maps a client error onto the crate error type
fn classify_error(url: &str, error: reqwest::Error) -> ScrapeError {
    if error.is_timeout() {
        ScrapeError::Timeout {
            url: url.to_string(),
        }
    } else {
        ScrapeError::Http {
            url: url.to_string(),
            source: error,
        }
    }
}

/// Whether a failed request is worth another attempt
fn is_transient(error: &ScrapeError) -> bool {
    match error {
        ScrapeError::Status { status, .. } => {
            StatusCode::from_u16(*status).is_ok_and(|s| s.is_server_error())
                || *status == StatusCode::TOO_MANY_REQUESTS.as_u16()
                || *status == StatusCode::REQUEST_TIMEOUT.as_u16()
        }
        ScrapeError::Timeout { .. } => true,
        ScrapeError::Http { source, .. } => source.is_connect() || source.is_timeout(),
        _ => false,
    }
}
