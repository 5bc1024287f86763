use crate::analytics::types::DateRange;
use crate::error::{AppError, AppResult};
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static DAYS_AGO_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+daysAgo$").expect("Invalid daysAgo regex"));

pub const DEFAULT_START_DATE: &str = "30daysAgo";
pub const DEFAULT_END_DATE: &str = "today";

/// Normalized GA4 property resource name (`properties/<digits>`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PropertyId(u64);

impl PropertyId {
    pub fn parse(value: &serde_json::Value) -> AppResult<Self> {
        match value {
            serde_json::Value::Number(n) => n.as_u64().map(Self).ok_or_else(|| {
                AppError::InvalidArgument(format!(
                    "property_id must be a positive integer, got {}",
                    n
                ))
            }),
            serde_json::Value::String(s) => Self::parse_str(s),
            other => Err(AppError::InvalidArgument(format!(
                "property_id must be a number or string, got {}",
                other
            ))),
        }
    }

    pub fn parse_str(raw: &str) -> AppResult<Self> {
        let trimmed = raw.trim();
        let digits = trimmed.strip_prefix("properties/").unwrap_or(trimmed);
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(AppError::InvalidArgument(format!(
                "property_id must be numeric (e.g. \"123456789\") or of the form \"properties/123456789\", got \"{}\"",
                raw
            )));
        }
        digits.parse::<u64>().map(Self).map_err(|_| {
            AppError::InvalidArgument(format!("property_id is out of range: \"{}\"", raw))
        })
    }

    pub fn resource_name(&self) -> String {
        format!("properties/{}", self.0)
    }
}

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "properties/{}", self.0)
    }
}

fn is_valid_date_token(value: &str) -> bool {
    matches!(value, "today" | "yesterday")
        || DAYS_AGO_REGEX.is_match(value)
        || chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}

impl DateRange {
    pub fn parse(start: Option<&str>, end: Option<&str>) -> AppResult<Self> {
        let start_date = start
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_START_DATE);
        let end_date = end
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_END_DATE);

        for (field, value) in [("start_date", start_date), ("end_date", end_date)] {
            if !is_valid_date_token(value) {
                return Err(AppError::InvalidArgument(format!(
                    "{} must be YYYY-MM-DD, 'today', 'yesterday' or 'NdaysAgo', got \"{}\"",
                    field, value
                )));
            }
        }

        Ok(Self {
            start_date: start_date.to_string(),
            end_date: end_date.to_string(),
        })
    }
}

impl Default for DateRange {
    fn default() -> Self {
        Self {
            start_date: DEFAULT_START_DATE.to_string(),
            end_date: DEFAULT_END_DATE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn property_id_forms_normalize_to_same_resource() {
        let a = PropertyId::parse(&json!("123")).unwrap();
        let b = PropertyId::parse(&json!(123)).unwrap();
        let c = PropertyId::parse(&json!("properties/123")).unwrap();
        let d = PropertyId::parse(&json!("  properties/123 ")).unwrap();
        assert_eq!(a, b);
        assert_eq!(b, c);
        assert_eq!(c, d);
        assert_eq!(a.resource_name(), "properties/123");
        assert_eq!(a.to_string(), "properties/123");
    }

    #[test]
    fn property_id_rejects_non_numeric_input() {
        for bad in [
            json!("abc"),
            json!("accounts/123"),
            json!("properties/"),
            json!("properties/12a"),
            json!(""),
            json!(-5),
            json!(1.5),
            json!(null),
        ] {
            let err = PropertyId::parse(&bad).unwrap_err();
            assert!(matches!(err, AppError::InvalidArgument(_)), "{:?}", bad);
        }
        let err = PropertyId::parse(&json!("abc")).unwrap_err();
        assert!(err.to_string().contains("properties/123456789"));
    }

    #[test]
    fn date_range_defaults_and_validation() {
        assert_eq!(DateRange::parse(None, None).unwrap(), DateRange::default());
        let range = DateRange::parse(Some("7daysAgo"), Some("2026-01-31")).unwrap();
        assert_eq!(range.start_date, "7daysAgo");
        assert_eq!(range.end_date, "2026-01-31");
        assert!(DateRange::parse(Some("yesterday"), Some(" ")).is_ok());
        assert!(DateRange::parse(Some("last week"), None).is_err());
        assert!(DateRange::parse(None, Some("2026-13-01")).is_err());
    }
}
