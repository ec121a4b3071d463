//! The listing record produced for every property

use chrono::NaiveDate;
use std::fmt;

/// One dated entry of a listing's price history
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceEvent {
    pub date: NaiveDate,
    pub price: i64,
    pub event: String,
}

impl fmt::Display for PriceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {} - {}",
            self.date.format("%m/%d/%Y"),
            self.event,
            self.price
        )
    }
}

/// A flat, fully keyed record for one property
///
/// Every scalar field is a string that stays empty when the page did not
/// provide a value, so a record always renders to a complete row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingRecord {
    // Identity
    pub url: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub neighborhood: String,
    pub latitude: String,
    pub longitude: String,
    pub mls: String,

    // Commercial
    pub price: String,
    pub price_per_square_foot: String,
    pub area: String,
    pub lot_size: String,
    pub year_built: String,
    pub days_on_market: String,

    // Physical
    pub bedrooms: String,
    pub bathrooms: String,
    pub description: String,

    // Taxes (sold pages)
    pub property_tax: String,
    pub property_tax_assessment_year: String,
    pub property_tax_assessment_land: String,
    pub property_tax_assessment_improvements: String,
    pub property_tax_assessment_total: String,

    /// Sorted ascending by date
    pub price_history: Vec<PriceEvent>,

    // Agent lookup
    pub agent_name: String,
    pub agent_phone_num: String,
    pub listing_agency: String,
    pub listing_agency_phone: String,
}

impl ListingRecord {
    /// Output columns in their fixed order
    pub const COLUMNS: &'static [&'static str] = &[
        "url",
        "address",
        "city",
        "state",
        "neighborhood",
        "latitude",
        "longitude",
        "mls",
        "price",
        "price_per_square_foot",
        "area",
        "lot_size",
        "year_built",
        "days_on_market",
        "bedrooms",
        "bathrooms",
        "description",
        "property_tax",
        "property_tax_assessment_year",
        "property_tax_assessment_land",
        "property_tax_assessment_improvements",
        "property_tax_assessment_total",
        "price_history",
        "agent_name",
        "agent_phone_num",
        "listing_agency",
        "listing_agency_phone",
    ];

    /// Creates an empty record for a detail page URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Renders a single column, or `None` for an unknown column name
    pub fn field(&self, column: &str) -> Option<String> {
        let value = match column {
            "url" => &self.url,
            "address" => &self.address,
            "city" => &self.city,
            "state" => &self.state,
            "neighborhood" => &self.neighborhood,
            "latitude" => &self.latitude,
            "longitude" => &self.longitude,
            "mls" => &self.mls,
            "price" => &self.price,
            "price_per_square_foot" => &self.price_per_square_foot,
            "area" => &self.area,
            "lot_size" => &self.lot_size,
            "year_built" => &self.year_built,
            "days_on_market" => &self.days_on_market,
            "bedrooms" => &self.bedrooms,
            "bathrooms" => &self.bathrooms,
            "description" => &self.description,
            "property_tax" => &self.property_tax,
            "property_tax_assessment_year" => &self.property_tax_assessment_year,
            "property_tax_assessment_land" => &self.property_tax_assessment_land,
            "property_tax_assessment_improvements" => &self.property_tax_assessment_improvements,
            "property_tax_assessment_total" => &self.property_tax_assessment_total,
            "price_history" => return Some(self.price_history_text()),
            "agent_name" => &self.agent_name,
            "agent_phone_num" => &self.agent_phone_num,
            "listing_agency" => &self.listing_agency,
            "listing_agency_phone" => &self.listing_agency_phone,
            _ => return None,
        };
        Some(value.clone())
    }

    /// Renders the given columns in order; unknown columns render empty
    pub fn row<S: AsRef<str>>(&self, columns: &[S]) -> Vec<String> {
        columns
            .iter()
            .map(|column| self.field(column.as_ref()).unwrap_or_default())
            .collect()
    }

    /// Price history as one cell, one event per line
    pub fn price_history_text(&self) -> String {
        self.price_history
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",\n")
    }
}
