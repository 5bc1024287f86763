//! Typed tool arguments. Their JSON Schemas become the advertised input schemas.

use crate::analytics::{DateRange, PropertyId};
use crate::error::{AppError, AppResult};
use crate::models::GtmEventConfig;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Map, Value};

/// `123456789`, `"123456789"` or `"properties/123456789"`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum PropertyIdArg {
    Number(u64),
    Text(String),
}

impl PropertyIdArg {
    pub fn parse(&self) -> AppResult<PropertyId> {
        match self {
            Self::Number(n) => PropertyId::parse(&Value::from(*n)),
            Self::Text(s) => PropertyId::parse_str(s),
        }
    }
}

/// A list of API names, or a single comma-separated string.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum NameList {
    Names(Vec<String>),
    Csv(String),
}

impl NameList {
    pub fn names(&self, field: &str) -> AppResult<Vec<String>> {
        match self {
            Self::Names(items) => items
                .iter()
                .map(|item| {
                    let trimmed = item.trim();
                    if trimmed.is_empty() {
                        Err(AppError::InvalidArgument(format!(
                            "{} must contain non-empty strings",
                            field
                        )))
                    } else {
                        Ok(trimmed.to_string())
                    }
                })
                .collect(),
            Self::Csv(raw) => Ok(raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()),
        }
    }
}

fn names_or_empty(list: Option<&NameList>, field: &str) -> AppResult<Vec<String>> {
    list.map_or_else(|| Ok(Vec::new()), |list| list.names(field))
}

/// GA4 rejects a zero row limit, so `limit` must be at least 1.
pub fn positive_limit(limit: Option<i64>) -> AppResult<Option<i64>> {
    match limit {
        Some(n) if n < 1 => Err(AppError::InvalidArgument(format!(
            "limit must be a positive integer, got {}",
            n
        ))),
        other => Ok(other),
    }
}

pub fn non_negative_offset(offset: Option<i64>) -> AppResult<Option<i64>> {
    match offset {
        Some(n) if n < 0 => Err(AppError::InvalidArgument(format!(
            "offset must be a non-negative integer, got {}",
            n
        ))),
        other => Ok(other),
    }
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct PropertyParams {
    /// GA4 property id: 123456789 or properties/123456789
    pub property_id: PropertyIdArg,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct MetadataParams {
    /// GA4 property id: 123456789 or properties/123456789
    pub property_id: PropertyIdArg,
    /// Only return custom dimensions and metrics
    #[serde(default)]
    pub custom_only: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct RunReportParams {
    /// GA4 property id: 123456789 or properties/123456789
    pub property_id: PropertyIdArg,
    /// Dimension API names, e.g. ["country", "eventName"]
    #[serde(default)]
    pub dimensions: Option<NameList>,
    /// Metric API names, e.g. ["activeUsers"]; at least one is required
    pub metrics: NameList,
    /// YYYY-MM-DD, today, yesterday or NdaysAgo (default 30daysAgo)
    #[serde(default)]
    pub start_date: Option<String>,
    /// YYYY-MM-DD, today, yesterday or NdaysAgo (default today)
    #[serde(default)]
    pub end_date: Option<String>,
    /// Data API FilterExpression applied to dimensions
    #[serde(default)]
    pub dimension_filter: Option<Map<String, Value>>,
    /// Data API FilterExpression applied to metrics
    #[serde(default)]
    pub metric_filter: Option<Map<String, Value>>,
    /// Data API OrderBy list
    #[serde(default)]
    pub order_bys: Option<Vec<Value>>,
    /// Maximum rows to return
    #[serde(default)]
    #[schemars(range(min = 1))]
    pub limit: Option<i64>,
    /// Row offset for paging
    #[serde(default)]
    #[schemars(range(min = 0))]
    pub offset: Option<i64>,
}

impl RunReportParams {
    pub fn dimension_names(&self) -> AppResult<Vec<String>> {
        names_or_empty(self.dimensions.as_ref(), "dimensions")
    }

    pub fn metric_names(&self) -> AppResult<Vec<String>> {
        required_metrics(&self.metrics)
    }

    pub fn date_range(&self) -> AppResult<DateRange> {
        DateRange::parse(self.start_date.as_deref(), self.end_date.as_deref())
    }
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct RealtimeReportParams {
    /// GA4 property id: 123456789 or properties/123456789
    pub property_id: PropertyIdArg,
    /// Realtime dimension API names
    #[serde(default)]
    pub dimensions: Option<NameList>,
    /// Realtime metric API names; at least one is required
    pub metrics: NameList,
    /// Data API FilterExpression applied to dimensions
    #[serde(default)]
    pub dimension_filter: Option<Map<String, Value>>,
    /// Maximum rows to return
    #[serde(default)]
    #[schemars(range(min = 1))]
    pub limit: Option<i64>,
}

impl RealtimeReportParams {
    pub fn dimension_names(&self) -> AppResult<Vec<String>> {
        names_or_empty(self.dimensions.as_ref(), "dimensions")
    }

    pub fn metric_names(&self) -> AppResult<Vec<String>> {
        required_metrics(&self.metrics)
    }
}

fn required_metrics(metrics: &NameList) -> AppResult<Vec<String>> {
    let names = metrics.names("metrics")?;
    if names.is_empty() {
        return Err(AppError::InvalidArgument(
            "metrics must name at least one metric".to_string(),
        ));
    }
    Ok(names)
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ExtractParams {
    /// Container export JSON: the export object, a bare tag array, or the raw file text
    pub gtm_export: Value,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ValidateParams {
    /// GA4 property id: 123456789 or properties/123456789
    pub property_id: PropertyIdArg,
    /// Events to check, each with its parameter names
    #[serde(default)]
    pub events: Option<Vec<GtmEventConfig>>,
    /// Container export to extract events from (object, tag array or raw text)
    #[serde(default)]
    pub gtm_export: Option<Value>,
    /// YYYY-MM-DD, today, yesterday or NdaysAgo (default 30daysAgo)
    #[serde(default)]
    pub start_date: Option<String>,
    /// YYYY-MM-DD, today, yesterday or NdaysAgo (default today)
    #[serde(default)]
    pub end_date: Option<String>,
}

impl ValidateParams {
    pub fn date_range(&self) -> AppResult<DateRange> {
        DateRange::parse(self.start_date.as_deref(), self.end_date.as_deref())
    }
}
