//! Lenient date parsing for the JSON documents produced by the price and forecast APIs.
//!
//! Price history arrives as `2024-01-02`, forecast output as `2024-01-02T00:00:00`,
//! and some exports carry a timezone suffix. Only the calendar date matters here.

use crate::error::CoreError;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};

/// Parses a calendar date, ignoring any time-of-day or offset that follows it.
pub fn parse_date(raw: &str) -> Result<NaiveDate, CoreError> {
    let trimmed = raw.trim();
    let date_part = trimmed
        .get(..10)
        .ok_or_else(|| CoreError::InvalidDate(raw.to_string()))?;

    // Anything after the date must start a time component.
    if let Some(sep) = trimmed[10..].chars().next() {
        if sep != 'T' && sep != ' ' {
            return Err(CoreError::InvalidDate(raw.to_string()));
        }
    }

    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map_err(|_| CoreError::InvalidDate(raw.to_string()))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_date(&raw).map_err(serde::de::Error::custom)
}
