//! Utility functions for date formatting/parsing and string manipulation.

use chrono::{DateTime, FixedOffset, Local, NaiveDate};

/// Format a publication timestamp as a short local date, e.g. `5/6/2025`.
pub fn display_date(ts: &DateTime<FixedOffset>) -> String {
    ts.with_timezone(&Local).format("%-m/%-d/%Y").to_string()
}

/// Parse a `YYYY-MM-DD` date as typed into the date filter.
pub fn parse_date_input(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

/// Truncate to at most `max` characters, appending `…` when anything was cut.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_chars("short", 100), "short");
/// assert_eq!(truncate_chars("héllo world", 5), "héllo…");
/// ```
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        None => s.to_string(),
        Some((idx, _)) => format!("{}…", s[..idx].trim_end()),
    }
}

/// Capitalize the first character of a string.
///
/// Used for category labels (e.g., "finance" -> "Finance").
pub fn upcase(s: &str) -> String {
    let mut c = s.chars();
    match c.next() {
        None => String::new(),
        Some(f) => f.to_uppercase().collect::<String>() + c.as_str(),
    }
}
