//! Locating the embedded JSON payload in a detail page

use crate::ScrapeError;
use regex::Regex;
use scraper::{Html, Selector};
use serde_json::Value;
use std::sync::OnceLock;

const PAYLOAD_SELECTOR: &str = "script#__NEXT_DATA__";
const MLS_PATTERN: &str = r"MLS/Source ID: (\d+)";

/// Parses the `__NEXT_DATA__` script blob of a detail page
///
/// # Returns
///
/// * `Ok(Value)` - The parsed payload
/// * `Err(ScrapeError::DetailPayload)` - The script is missing or not valid JSON
pub fn detail_payload(html: &str, url: &str) -> Result<Value, ScrapeError> {
    let payload_error = |message: String| ScrapeError::DetailPayload {
        url: url.to_string(),
        message,
    };

    let document = Html::parse_document(html);
    let selector = Selector::parse(PAYLOAD_SELECTOR)
        .map_err(|e| payload_error(format!("invalid selector: {:?}", e)))?;

    let script = document
        .select(&selector)
        .next()
        .ok_or_else(|| payload_error("no __NEXT_DATA__ script".to_string()))?;

    let text = script.text().collect::<String>();
    serde_json::from_str(&text).map_err(|e| payload_error(format!("invalid JSON: {}", e)))
}

/// Finds the MLS listing id anywhere in the raw page text
pub fn extract_mls(raw_body: &str) -> Option<String> {
    static MLS: OnceLock<Regex> = OnceLock::new();
    let pattern = MLS.get_or_init(|| Regex::new(MLS_PATTERN).expect("MLS pattern is valid"));

    pattern
        .captures(raw_body)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().to_string())
}
