use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

/// Parse a stored timestamp, accepting RFC 3339 and SQLite's `datetime()` format.
pub fn parse_datetime(value: &str, field: &str) -> Result<DateTime<Utc>> {
    if value.contains('T') {
        Ok(DateTime::parse_from_rfc3339(value)
            .with_context(|| format!("Failed to parse {} as RFC3339", field))?
            .with_timezone(&Utc))
    } else {
        Ok(
            chrono::NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
                .with_context(|| format!("Failed to parse {} as SQLite format", field))?
                .and_utc(),
        )
    }
}

pub fn parse_optional_datetime(value: Option<&str>, field: &str) -> Result<Option<DateTime<Utc>>> {
    match value {
        Some(v) if !v.is_empty() => parse_datetime(v, field).map(Some),
        _ => Ok(None),
    }
}

/// Group and record id lists are stored as JSON arrays.
pub fn parse_ids(value: &str, field: &str) -> Result<Vec<i64>> {
    if value.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(value).with_context(|| format!("Failed to parse {} as id list", field))
}

pub fn ids_to_json(ids: &[i64]) -> String {
    serde_json::to_string(ids).unwrap_or_else(|_| "[]".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_both_formats() {
        let expected = Utc.with_ymd_and_hms(2025, 3, 1, 12, 30, 0).unwrap();
        assert_eq!(parse_datetime("2025-03-01T12:30:00+00:00", "x").unwrap(), expected);
        assert_eq!(parse_datetime("2025-03-01 12:30:00", "x").unwrap(), expected);
        assert!(parse_datetime("yesterday", "x").is_err());
    }

    #[test]
    fn test_optional() {
        assert_eq!(parse_optional_datetime(None, "x").unwrap(), None);
        assert_eq!(parse_optional_datetime(Some(""), "x").unwrap(), None);
        assert!(parse_optional_datetime(Some("2025-03-01 12:30:00"), "x").unwrap().is_some());
    }

    #[test]
    fn test_ids_round_trip() {
        assert_eq!(parse_ids(&ids_to_json(&[3, -1]), "groups").unwrap(), vec![3, -1]);
        assert_eq!(parse_ids("", "groups").unwrap(), Vec::<i64>::new());
        assert!(parse_ids("nope", "groups").is_err());
    }
}
