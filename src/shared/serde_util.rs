//! Custom serde helpers for provider wire formats.

use chrono::{DateTime, NaiveDate};

/// Parse a provider date: `YYYY-MM-DD`, RFC 3339, or Unix millis as a string.
pub fn parse_date_str(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    // Some providers send `2024-01-02T00:00:00` without an offset.
    if let Some((day, _)) = raw.split_once('T') {
        if let Ok(d) = NaiveDate::parse_from_str(day, "%Y-%m-%d") {
            return Some(d);
        }
    }
    raw.parse::<i64>().ok().and_then(date_from_millis)
}

/// Unix epoch milliseconds to a UTC calendar date.
pub fn date_from_millis(millis: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp_millis(millis).map(|dt| dt.date_naive())
}

/// Serializes `NaiveDate` as `YYYY-MM-DD`, the format the `/market-data` body uses.
pub mod iso_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&date.format("%Y-%m-%d").to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        super::parse_date_str(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("Invalid date: {}", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        assert_eq!(parse_date_str("2024-01-02"), Some(expected));
        assert_eq!(parse_date_str("2024-01-02T15:30:00Z"), Some(expected));
        assert_eq!(parse_date_str("2024-01-02T15:30:00"), Some(expected));
        assert_eq!(parse_date_str("1704153600000"), Some(expected));
        assert_eq!(parse_date_str("yesterday"), None);
    }
}
