// # Timestamp normalization
//
// Carriers report event times in whatever shape their backend prefers:
//
// - USPS:   "01/02/2024" + "03:15 pm", or "January 2, 2024" + "3:15 pm"
// - HKPost: "02-Jan-2024", sometimes with a time of day
// - DPD UK: "2024-03-01T09:00:00.000"
//
// All of them are rendered as `YYYY-MM-DDTHH:mm:ss` with no timezone.
// Wall-clock time is kept as reported; nothing is shifted between zones.

use chrono::{NaiveDate, NaiveDateTime};

/// Output pattern shared by every checkpoint
pub const CANONICAL_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Fixed input pattern of DPD UK event dates (fractional seconds optional)
pub const FRACTIONAL_ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Date-time patterns tried by [`parse_loose`], in order
const DATE_TIME_FORMATS: &[&str] = &[
    "%m/%d/%Y %I:%M %p",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%B %d, %Y %I:%M %p",
    "%B %d, %Y %H:%M",
    "%d-%b-%Y %I:%M %p",
    "%d-%b-%Y %H:%M:%S",
    "%d-%b-%Y %H:%M",
    "%d %B %Y %H:%M",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

/// Date-only patterns; these resolve to midnight
const DATE_FORMATS: &[&str] = &["%m/%d/%Y", "%B %d, %Y", "%d-%b-%Y", "%d %B %Y", "%Y-%m-%d", "%Y/%m/%d"];

/// Render a timestamp in the canonical checkpoint form
pub fn format_canonical(time: &NaiveDateTime) -> String {
    time.format(CANONICAL_FORMAT).to_string()
}

/// Parse a carrier timestamp without knowing its exact shape
///
/// Returns `None` when no known pattern matches.
pub fn parse_loose(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

/// Parse a carrier timestamp against one fixed pattern
pub fn parse_exact(text: &str, format: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text.trim(), format).ok()
}
