//! Field transforms applied to submitted form values

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use uuid::Uuid;

/// Entities produced by [`escape`]. An `&` that already starts one of these is kept
/// as is, so escaping escaped text is a no-op.
const ENTITIES: [&str; 8] = [
    "&amp;", "&lt;", "&gt;", "&quot;", "&#x27;", "&#x2F;", "&#x5C;", "&#96;",
];

/// Strip leading and trailing whitespace
pub fn trim(value: &str) -> String {
    value.trim().to_string()
}

/// Rewrite a record identifier to its lower-case hyphenated form. Text that is not
/// an identifier is returned trimmed and otherwise unchanged.
pub fn canonical_id(value: &str) -> String {
    let value = value.trim();
    match Uuid::parse_str(value) {
        Ok(uuid) => uuid.to_string(),
        Err(_) => value.to_string(),
    }
}

/// HTML-escape a value for display
pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for (i, c) in value.char_indices() {
        match c {
            '&' if ENTITIES.iter().any(|e| value[i..].starts_with(e)) => out.push('&'),
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '/' => out.push_str("&#x2F;"),
            '\\' => out.push_str("&#x5C;"),
            '`' => out.push_str("&#96;"),
            c => out.push(c),
        }
    }
    out
}

/// Parse an ISO-8601 calendar date, or the date part of an ISO-8601 timestamp
pub fn parse_iso_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.date_naive());
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M"))
        .map(|ts| ts.date())
        .ok()
}

/// Canonicalize a date to `YYYY-MM-DD`. Text that is not a date is returned
/// unchanged so that a rejected submission still shows what was typed.
pub fn to_date(value: &str) -> String {
    match parse_iso_date(value) {
        Some(date) => date.format("%Y-%m-%d").to_string(),
        None => value.to_string(),
    }
}
