use chrono::NaiveDate;

use crate::types::AvailabilityStatus;

/// Date format used by the reservation API
pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// Format a date the way the reservation API lists it
pub fn format_ddmmyyyy(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parse a `DD/MM/YYYY` date string
pub fn parse_ddmmyyyy(date_str: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date_str, DATE_FORMAT).ok()
}

/// Classify availability for `today` against the dates returned by the API.
///
/// Membership is an exact string comparison against `today` formatted as `DD/MM/YYYY`.
pub fn classify(today: NaiveDate, dates: Option<&[String]>) -> AvailabilityStatus {
    let Some(dates) = dates.filter(|d| !d.is_empty()) else {
        return AvailabilityStatus::Unknown;
    };

    let today_str = format_ddmmyyyy(today);
    if dates.iter().any(|d| *d == today_str) {
        AvailabilityStatus::Available
    } else {
        AvailabilityStatus::Unavailable
    }
}

/// Earliest listed date on or after `today`. Unparseable entries are ignored.
pub fn next_listed_date(today: NaiveDate, dates: &[String]) -> Option<NaiveDate> {
    dates
        .iter()
        .filter_map(|d| parse_ddmmyyyy(d))
        .filter(|d| *d >= today)
        .min()
}
