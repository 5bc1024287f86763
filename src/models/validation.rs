use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One GA4 event tag reduced to its event name and statically known parameter names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct GtmEventConfig {
    /// GA4 event name, e.g. purchase
    #[serde(rename = "eventName", alias = "event_name")]
    pub event_name: String,
    /// Event parameter names sent with this event
    #[serde(default)]
    pub parameters: Vec<String>,
}

impl GtmEventConfig {
    pub fn new(event_name: impl Into<String>, parameters: Vec<String>) -> Self {
        let mut config = Self {
            event_name: event_name.into(),
            parameters,
        };
        config.dedup_parameters();
        config
    }

    /// Drops repeated parameter names, keeping first-seen order.
    pub fn dedup_parameters(&mut self) {
        let mut seen = std::collections::HashSet::new();
        self.parameters.retain(|name| seen.insert(name.clone()));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Collected,
    NotCollected,
    NotRegistered,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub event_name: String,
    pub parameter: String,
    pub status: Verdict,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_count: Option<i64>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationDateRange {
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationSummary {
    pub property: String,
    pub date_range: ValidationDateRange,
    pub total_events: usize,
    pub total_checks: usize,
    pub collected: usize,
    pub not_collected: usize,
    pub not_registered: usize,
    pub registered_parameters: Vec<String>,
    pub unregistered_parameters: Vec<String>,
    /// Registered parameters whose report query failed; their pairings read `not_collected`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed_parameters: Vec<String>,
    pub api_calls: u32,
    pub recommendations: Vec<String>,
    pub results: Vec<ValidationResult>,
}
