use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimension {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metric {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReportRequest {
    #[serde(default)]
    pub dimensions: Vec<Dimension>,
    #[serde(default)]
    pub metrics: Vec<Metric>,
    #[serde(default)]
    pub date_ranges: Vec<DateRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimension_filter: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric_filter: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_bys: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
}

impl RunReportRequest {
    pub fn new(dimensions: &[&str], metrics: &[&str], date_range: DateRange) -> Self {
        Self {
            dimensions: dimensions
                .iter()
                .map(|name| Dimension {
                    name: name.to_string(),
                })
                .collect(),
            metrics: metrics
                .iter()
                .map(|name| Metric {
                    name: name.to_string(),
                })
                .collect(),
            date_ranges: vec![date_range],
            ..Self::default()
        }
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunRealtimeReportRequest {
    #[serde(default)]
    pub dimensions: Vec<Dimension>,
    #[serde(default)]
    pub metrics: Vec<Metric>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimension_filter: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueCell {
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Row {
    #[serde(default)]
    pub dimension_values: Vec<ValueCell>,
    #[serde(default)]
    pub metric_values: Vec<ValueCell>,
}

impl Row {
    pub fn dimension(&self, index: usize) -> Option<&str> {
        self.dimension_values.get(index).map(|c| c.value.as_str())
    }

    pub fn metric_i64(&self, index: usize) -> Option<i64> {
        let raw = self.metric_values.get(index)?.value.trim();
        raw.parse::<i64>()
            .ok()
            .or_else(|| raw.parse::<f64>().ok().map(|f| f as i64))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReportResponse {
    #[serde(default)]
    pub dimension_headers: Vec<Header>,
    #[serde(default)]
    pub metric_headers: Vec<Header>,
    #[serde(default)]
    pub rows: Vec<Row>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_count: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionMetadata {
    pub api_name: String,
    #[serde(default)]
    pub ui_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub custom_definition: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricMetadata {
    pub api_name: String,
    #[serde(default)]
    pub ui_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub custom_definition: bool,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub metric_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub dimensions: Vec<DimensionMetadata>,
    #[serde(default)]
    pub metrics: Vec<MetricMetadata>,
}

pub const CUSTOM_EVENT_PREFIX: &str = "customEvent:";

impl Metadata {
    /// Parameter names registered as event-scoped custom dimensions.
    pub fn custom_event_parameters(&self) -> impl Iterator<Item = &str> {
        self.dimensions
            .iter()
            .filter(|d| d.custom_definition)
            .filter_map(|d| d.api_name.strip_prefix(CUSTOM_EVENT_PREFIX))
            .filter(|name| !name.is_empty())
    }
}
