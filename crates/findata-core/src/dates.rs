//! Lenient date parsing for provider payloads.
//!
//! Providers return dates as `2024-01-02`, `2024-01-02T00:00:00`,
//! `2024-01-02 15:00:00` or `20240102`. All of them reduce to the calendar day.
//! Dates always serialize as `%Y-%m-%d`.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serializer};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parses a provider date string into a calendar day.
///
/// Returns `None` for anything that does not start with a valid date.
#[must_use]
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Some(prefix) = s.get(..10) {
        if let Ok(date) = NaiveDate::parse_from_str(prefix, DATE_FORMAT) {
            return Some(date);
        }
    }
    if s.len() == 8 && s.bytes().all(|b| b.is_ascii_digit()) {
        return NaiveDate::parse_from_str(s, "%Y%m%d").ok();
    }
    None
}

/// Serde adapter for required [`NaiveDate`] fields.
pub mod lenient {
    use super::*;

    /// Serializes a date as `%Y-%m-%d`.
    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&date.format(DATE_FORMAT))
    }

    /// Deserializes a date from any of the accepted provider formats.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let s = String::deserialize(deserializer)?;
        parse_date(&s).ok_or_else(|| serde::de::Error::custom(format!("invalid date: {s}")))
    }
}

/// Serde adapter for optional [`NaiveDate`] fields.
///
/// `null`, an empty string, and unparseable strings all become `None`.
pub mod lenient_option {
    use super::*;

    /// Serializes an optional date as `%Y-%m-%d` or `null`.
    pub fn serialize<S: Serializer>(
        date: &Option<NaiveDate>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match date {
            Some(date) => serializer.collect_str(&date.format(DATE_FORMAT)),
            None => serializer.serialize_none(),
        }
    }

    /// Deserializes an optional date from any of the accepted provider formats.
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDate>, D::Error> {
        let s = Option::<String>::deserialize(deserializer)?;
        Ok(s.as_deref().and_then(parse_date))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 2);
        assert_eq!(parse_date("2024-01-02"), expected);
        assert_eq!(parse_date("2024-01-02T00:00:00"), expected);
        assert_eq!(parse_date("2024-01-02 15:30:00+08:00"), expected);
        assert_eq!(parse_date(" 20240102 "), expected);
    }

    #[test]
    fn test_parse_date_rejects_garbage() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("yesterday"), None);
        assert_eq!(parse_date("2024-13-45"), None);
    }
}
