//! Price history reconstruction
//!
//! Pages render the history as formatted strings ("05/14/2019", "$1,250,000").
//! These are parsed back into typed events and ordered by date.

use crate::extract::record::PriceEvent;
use crate::HistoryParseError;
use chrono::NaiveDate;

const DATE_FORMAT: &str = "%m/%d/%Y";

/// Parses a formatted price such as "$1,250,000"
pub fn parse_price(raw: &str) -> Result<i64, HistoryParseError> {
    let cleaned: String = raw
        .trim()
        .trim_start_matches('$')
        .chars()
        .filter(|c| *c != ',')
        .collect();

    cleaned
        .parse()
        .map_err(|_| HistoryParseError::Price(raw.to_string()))
}

/// Parses a month/day/year date such as "05/14/2019"
pub fn parse_date(raw: &str) -> Result<NaiveDate, HistoryParseError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|_| HistoryParseError::Date(raw.to_string()))
}

/// Rebuilds typed events from parallel date/price/event columns
///
/// The columns are zipped, so extra trailing entries in a longer column are
/// ignored. A single malformed date or price fails the whole history.
pub fn reconstruct_price_history(
    dates: &[String],
    prices: &[String],
    events: &[String],
) -> Result<Vec<PriceEvent>, HistoryParseError> {
    let mut history = dates
        .iter()
        .zip(prices)
        .zip(events)
        .map(|((date, price), event)| {
            Ok(PriceEvent {
                date: parse_date(date)?,
                price: parse_price(price)?,
                event: event.clone(),
            })
        })
        .collect::<Result<Vec<_>, HistoryParseError>>()?;

    sort_price_history(&mut history);
    Ok(history)
}

/// Orders events ascending by date, keeping page order for equal dates
pub fn sort_price_history(history: &mut [PriceEvent]) {
    history.sort_by_key(|event| event.date);
}
