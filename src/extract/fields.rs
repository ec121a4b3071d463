//! Field-by-field extraction of a listing record from a detail payload
//!
//! Every field is looked up on its own; a missing or oddly shaped node only
//! leaves that one field empty.

use crate::extract::history::reconstruct_price_history;
use crate::extract::lookup::{lookup, lookup_array, lookup_text};
use crate::extract::payload::extract_mls;
use crate::extract::record::{ListingRecord, PriceEvent};
use crate::HistoryParseError;
use serde_json::Value;

const HOME_DETAILS: &[&str] = &["props", "homeDetails"];
const ASSESSMENTS: &[&str] = &["taxes", "highlightedAssessments"];

static NULL: Value = Value::Null;

/// Result of extracting one detail page
#[derive(Debug, Clone)]
pub struct Extraction {
    pub record: ListingRecord,
    /// Set when the price history was present but could not be parsed;
    /// the record then carries an empty history
    pub history_error: Option<HistoryParseError>,
}

/// Extracts a listing record from a detail payload and the page's raw text
pub fn extract(payload: &Value, raw_body: &str, url: &str) -> ListingRecord {
    extract_listing(payload, raw_body, url).record
}

/// Like [`extract`], also reporting a dropped price history
pub fn extract_listing(payload: &Value, raw_body: &str, url: &str) -> Extraction {
    let home = lookup(payload, HOME_DETAILS).unwrap_or(&NULL);
    let mut record = ListingRecord::new(url);

    record.address = text(home, &["location", "streetAddress"]);
    record.city = text(home, &["location", "city"]);
    record.state = text(home, &["location", "stateCode"]);
    record.neighborhood = text(home, &["location", "neighborhoodName"]);
    record.latitude = text(home, &["location", "coordinates", "latitude"]);
    record.longitude = text(home, &["location", "coordinates", "longitude"]);
    record.mls = extract_mls(raw_body).unwrap_or_default();

    record.price = text(home, &["price", "price"]);
    record.description = text(home, &["description", "value"]);
    record.area = text(home, &["floorSpace", "formattedDimension"]).replace(',', "");
    record.bedrooms = text(home, &["bedrooms", "formattedValue"]);
    record.bathrooms = text(home, &["bathrooms", "formattedValue"]);

    apply_taxes(&mut record, home);
    apply_features(&mut record, lookup_array(home, &["features", "attributes"]));

    let history_error = match price_history(home) {
        Ok(history) => {
            record.price_history = history;
            None
        }
        Err(e) => {
            tracing::warn!("Dropping price history for {}: {}", url, e);
            Some(e)
        }
    };

    tracing::trace!(
        "Extracted {} ({} empty columns)",
        url,
        ListingRecord::COLUMNS
            .iter()
            .filter(|c| record.field(c).is_some_and(|v| v.is_empty()))
            .count()
    );

    Extraction {
        record,
        history_error,
    }
}

fn text(node: &Value, path: &[&str]) -> String {
    lookup_text(node, path).unwrap_or_default()
}

/// Tax assessment fields; only sold pages carry them
fn apply_taxes(record: &mut ListingRecord, home: &Value) {
    let assessments = lookup(home, ASSESSMENTS).unwrap_or(&NULL);

    record.property_tax_assessment_year = text(assessments, &["year"]);
    record.property_tax = text(assessments, &["taxValue", "formattedPrice"]);
    record.property_tax_assessment_total =
        text(assessments, &["totalAssessment", "formattedPrice"]);

    for assessment in lookup_array(assessments, &["assessments"]) {
        match lookup_text(assessment, &["type"]).as_deref() {
            Some("Land") => {
                record.property_tax_assessment_land =
                    text(assessment, &["amount", "formattedPrice"]);
            }
            Some("Improvements") => {
                record.property_tax_assessment_improvements =
                    text(assessment, &["amount", "formattedPrice"]);
            }
            _ => {}
        }
    }
}

/// Single pass over the feature list; a later match overwrites an earlier one
fn apply_features(record: &mut ListingRecord, features: &[Value]) {
    for feature in features {
        let Some(value) = lookup_text(feature, &["formattedValue"]) else {
            continue;
        };
        let name = lookup_text(feature, &["formattedName"]).unwrap_or_default();

        if name == "Lot Size" {
            record.lot_size = value.clone();
        }
        if value.contains("/sqft") {
            record.price_per_square_foot = value.split('/').next().unwrap_or_default().to_string();
        }
        if value.contains("Built in") {
            record.year_built = value
                .split_whitespace()
                .last()
                .unwrap_or_default()
                .to_string();
        }
        if value.contains("Days on") {
            record.days_on_market = value.clone();
        }
    }
}

/// Collects the formatted history columns and parses them
///
/// Entries without a date or price are skipped.
fn price_history(home: &Value) -> Result<Vec<PriceEvent>, HistoryParseError> {
    let mut dates = Vec::new();
    let mut prices = Vec::new();
    let mut events = Vec::new();

    for entry in lookup_array(home, &["priceHistory"]) {
        let (Some(date), Some(price)) = (
            lookup_text(entry, &["formattedDate"]),
            lookup_text(entry, &["price", "formattedPrice"]),
        ) else {
            continue;
        };
        dates.push(date);
        prices.push(price);
        events.push(text(entry, &["event"]));
    }

    reconstruct_price_history(&dates, &prices, &events)
}
