//! Cell and header display formatting

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;

use super::date::format_date;
use crate::result::{format_number, CellValue};

static ISO_DATE_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}").expect("valid date prefix pattern"));

/// Whether a string starts with an ISO `yyyy-mm-dd` date
pub fn looks_like_date(s: &str) -> bool {
    ISO_DATE_PREFIX.is_match(s)
}

/// Parse the date-ish strings backends emit for date and timestamp columns
///
/// Offsets are dropped: the local wall-clock fields of an RFC 3339 value are
/// kept as they were written.
pub fn parse_date_like(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if !looks_like_date(s) {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }

    s.get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Format a date-like string, or `None` if it does not parse
pub fn format_date_string(s: &str, pattern: &str) -> Option<String> {
    parse_date_like(s).map(|dt| format_date(&dt, pattern))
}

/// Render a cell for tabular output
///
/// Text that looks like a date is passed through `pattern` when one is given;
/// anything that fails to parse is shown as-is.
pub fn format_cell(value: &CellValue, pattern: Option<&str>) -> String {
    match value {
        CellValue::Null => String::new(),
        CellValue::Bool(b) => b.to_string(),
        CellValue::Number(n) => format_number(*n),
        CellValue::Text(s) => pattern
            .and_then(|p| format_date_string(s, p))
            .unwrap_or_else(|| s.clone()),
    }
}
