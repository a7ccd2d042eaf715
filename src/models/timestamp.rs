//! Backend timestamps are naive ISO-8601 strings (`2024-05-01T10:00:00.123456`).
//! Anything unreadable becomes `None` rather than failing the whole payload.

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Deserializer};

pub fn parse(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.naive_utc())
        })
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = serde_json::Value::deserialize(deserializer)?;
    Ok(raw.as_str().and_then(parse))
}

pub fn format_date(value: Option<NaiveDateTime>) -> String {
    value
        .map(|dt| dt.format("%b %-d, %Y").to_string())
        .unwrap_or_else(|| "Unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_variants() {
        assert!(parse("2024-05-01T10:00:00").is_some());
        assert!(parse("2024-05-01T10:00:00.5").is_some());
        assert!(parse("2024-05-01 10:00:00").is_some());
        assert!(parse("2024-05-01T10:00:00Z").is_some());
        assert!(parse("2024-05-01T10:00:00+02:00").is_some());
        assert!(parse("yesterday").is_none());
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date(parse("2023-12-25T08:30:00")), "Dec 25, 2023");
        assert_eq!(format_date(None), "Unknown");
    }
}
