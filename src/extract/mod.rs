//! Field extraction for property detail pages
//!
//! A detail page embeds its listing data as a `__NEXT_DATA__` JSON blob. This
//! module locates that blob, walks it with safe nested lookups and builds a
//! [`ListingRecord`], leaving any field it cannot find empty.

mod fields;
mod history;
mod lookup;
mod payload;
mod record;

pub use fields::{extract, extract_listing, Extraction};
pub use history::{parse_date, parse_price, reconstruct_price_history, sort_price_history};
pub use lookup::{lookup, lookup_array, lookup_text, scalar_text};
pub use payload::{detail_payload, extract_mls};
pub use record::{ListingRecord, PriceEvent};
