//! Index page parsing: result counts, page enumeration and detail links
//!
//! This module handles:
//! - Reading the result-count caption of the first index page
//! - Enumerating every index page URL of a search
//! - Extracting property detail links from an index page

use crate::config::ListingKind;
use crate::{PaginationParseError, ScrapeError};
use regex::Regex;
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Properties listed per index page
pub const RESULTS_PER_PAGE: u64 = 30;

const CAPTION_SELECTOR: &str = "div[data-testid='pagination-caption']";

/// Result count and page count of one search, fixed once computed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationState {
    pub total_results: u64,
    pub page_count: u64,
}

impl PaginationState {
    /// Derives the pagination from a caption such as "Showing 1-30 of 97 homes"
    pub fn from_caption(caption: &str) -> Result<Self, PaginationParseError> {
        let total_results = result_count(caption)?;
        Ok(Self {
            total_results,
            page_count: total_results.div_ceil(RESULTS_PER_PAGE),
        })
    }
}

/// Reads the total number of results from a pagination caption
///
/// The count is the token following "of" ("1-30 of 1,234 Results"). Captions
/// without "of" use their last integer token ("97 results").
pub fn result_count(caption: &str) -> Result<u64, PaginationParseError> {
    let tokens: Vec<&str> = caption.split_whitespace().collect();

    let count = match tokens.iter().position(|t| t.eq_ignore_ascii_case("of")) {
        Some(i) => tokens.get(i + 1).and_then(|t| parse_count(t)),
        None => tokens.iter().rev().find_map(|t| parse_count(t)),
    };

    count.ok_or_else(|| PaginationParseError::NoResultCount(caption.trim().to_string()))
}

fn parse_count(token: &str) -> Option<u64> {
    let digits: String = token.chars().filter(|c| *c != ',').collect();
    digits.parse().ok()
}

/// Number of index pages for a caption: `ceil(results / 30)`
pub fn compute_page_count(caption: &str) -> Result<u64, PaginationParseError> {
    PaginationState::from_caption(caption).map(|state| state.page_count)
}

/// Text of the pagination caption, if the page has one
pub fn pagination_caption(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(CAPTION_SELECTOR).ok()?;

    document
        .select(&selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Parses the pagination of a first index page
pub fn pagination_state(html: &str) -> Result<PaginationState, PaginationParseError> {
    let caption = pagination_caption(html).ok_or(PaginationParseError::MissingCaption)?;
    PaginationState::from_caption(&caption)
}

/// Search URL of a state/city for the given listing kind
///
/// * for sale: `{base}/{state}/{city}/`
/// * sold: `{base}/sold/{city},{state}/`
pub fn start_url(
    base_url: &str,
    kind: ListingKind,
    state: &str,
    city: &str,
) -> Result<Url, ScrapeError> {
    let base = directory_url(&Url::parse(base_url)?);
    let path = match kind {
        ListingKind::ForSale => format!("{}/{}/", state, city),
        ListingKind::Sold => format!("sold/{},{}/", city, state),
    };
    Ok(base.join(&path)?)
}

/// Lists the index pages `{base}/{n}_p/` for n in 1..=page_count
pub fn enumerate_index_pages(base: &Url, page_count: u64) -> Result<Vec<Url>, ScrapeError> {
    let base = directory_url(base);
    (1..=page_count)
        .map(|n| base.join(&format!("{}_p/", n)).map_err(ScrapeError::from))
        .collect()
}

/// The URL with a trailing slash and no query or fragment
fn directory_url(url: &Url) -> Url {
    let mut url = url.clone();
    url.set_query(None);
    url.set_fragment(None);
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

/// Extracts property detail links from an index page
///
/// # Link Extraction Rules
///
/// - `<a href="...">` anchors resolved against the page URL
/// - fragments dropped, non-HTTP(S) schemes skipped
/// - only absolute URLs matching `pattern` are kept
/// - duplicates removed, first occurrence kept
pub fn extract_detail_links(html: &str, base_url: &Url, pattern: &Regex) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            let Some(href) = element.value().attr("href") else {
                continue;
            };
            let Some(absolute_url) = resolve_link(href, base_url) else {
                continue;
            };
            if pattern.is_match(&absolute_url) && seen.insert(absolute_url.clone()) {
                links.push(absolute_url);
            }
        }
    }

    links
}

/// Resolves a link href to an absolute URL
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - fragment-only links
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    let mut absolute_url = base_url.join(href).ok()?;
    if absolute_url.scheme() != "http" && absolute_url.scheme() != "https" {
        return None;
    }
    absolute_url.set_fragment(None);
    Some(absolute_url.to_string())
}
