use crate::analytics::types::CUSTOM_EVENT_PREFIX;
use crate::analytics::{AnalyticsData, DateRange, PropertyId, RunReportRequest};
use crate::error::AppResult;
use crate::models::{
    GtmEventConfig, ValidationDateRange, ValidationResult, ValidationSummary, Verdict,
};
use std::collections::{BTreeSet, HashMap, HashSet};

const NOT_SET: &str = "(not set)";

/// Per-parameter outcome of the report phase.
enum ParameterCounts {
    Counted(HashMap<String, i64>),
    Failed(String),
}

/// Cross-checks GTM event parameters against the property's custom dimensions
/// and the data GA4 actually collected.
///
/// Issues exactly one metadata call plus one report per distinct registered
/// parameter, however many events reference it. A failed per-parameter report
/// is logged and leaves that parameter's pairings `not_collected`.
pub async fn validate(
    data: &dyn AnalyticsData,
    property: &PropertyId,
    events: &[GtmEventConfig],
    date_range: &DateRange,
    row_limit: i64,
) -> AppResult<ValidationSummary> {
    tracing::info!(
        property = %property,
        events = events.len(),
        "Validating GTM parameters against GA4"
    );

    let metadata = data.get_metadata(property).await?;
    let mut api_calls: u32 = 1;
    let registry: HashSet<&str> = metadata.custom_event_parameters().collect();

    let distinct: BTreeSet<&str> = events
        .iter()
        .flat_map(|event| event.parameters.iter().map(String::as_str))
        .collect();
    let (registered, unregistered): (Vec<&str>, Vec<&str>) =
        distinct.into_iter().partition(|p| registry.contains(p));

    let mut counts: HashMap<&str, ParameterCounts> = HashMap::with_capacity(registered.len());
    for &parameter in &registered {
        let dimension = format!("{}{}", CUSTOM_EVENT_PREFIX, parameter);
        let request = RunReportRequest::new(
            &["eventName", dimension.as_str()],
            &["eventCount"],
            date_range.clone(),
        )
        .with_limit(row_limit);

        api_calls += 1;
        let outcome = match data.run_report(property, &request).await {
            Ok(response) => {
                let mut per_event: HashMap<String, i64> = HashMap::new();
                for row in &response.rows {
                    let (Some(event_name), Some(value), Some(count)) =
                        (row.dimension(0), row.dimension(1), row.metric_i64(0))
                    else {
                        continue;
                    };
                    if value.is_empty() || value == NOT_SET || count <= 0 {
                        continue;
                    }
                    *per_event.entry(event_name.to_string()).or_default() += count;
                }
                ParameterCounts::Counted(per_event)
            }
            Err(e) => {
                tracing::warn!(
                    parameter,
                    error = %e,
                    "Report query for parameter failed; its pairings will read not_collected"
                );
                ParameterCounts::Failed(e.to_string())
            }
        };
        counts.insert(parameter, outcome);
    }

    let mut results = Vec::new();
    for event in events {
        for parameter in &event.parameters {
            results.push(classify(&event.event_name, parameter, counts.get(parameter.as_str())));
        }
    }

    let tally = |verdict: Verdict| results.iter().filter(|r| r.status == verdict).count();
    let collected = tally(Verdict::Collected);
    let not_collected = tally(Verdict::NotCollected);
    let not_registered = tally(Verdict::NotRegistered);

    let failed_parameters: Vec<String> = registered
        .iter()
        .filter(|p| matches!(counts.get(*p), Some(ParameterCounts::Failed(_))))
        .map(|p| p.to_string())
        .collect();

    let summary = ValidationSummary {
        property: property.resource_name(),
        date_range: ValidationDateRange {
            start_date: date_range.start_date.clone(),
            end_date: date_range.end_date.clone(),
        },
        total_events: events.len(),
        total_checks: results.len(),
        collected,
        not_collected,
        not_registered,
        recommendations: recommendations(&unregistered, &results),
        registered_parameters: registered.iter().map(|p| p.to_string()).collect(),
        unregistered_parameters: unregistered.iter().map(|p| p.to_string()).collect(),
        failed_parameters,
        api_calls,
        results,
    };

    tracing::info!(
        api_calls = summary.api_calls,
        collected = summary.collected,
        not_collected = summary.not_collected,
        not_registered = summary.not_registered,
        "GTM validation finished"
    );
    Ok(summary)
}

fn classify(event_name: &str, parameter: &str, counts: Option<&ParameterCounts>) -> ValidationResult {
    let (status, event_count, message) = match counts {
        None => (
            Verdict::NotRegistered,
            None,
            format!(
                "Parameter '{}' is not registered as a custom dimension in GA4",
                parameter
            ),
        ),
        Some(ParameterCounts::Counted(per_event)) => {
            match per_event.get(event_name).copied().filter(|n| *n > 0) {
                Some(n) => (
                    Verdict::Collected,
                    Some(n),
                    format!(
                        "Parameter '{}' collected {} times for event '{}'",
                        parameter, n, event_name
                    ),
                ),
                None => (
                    Verdict::NotCollected,
                    Some(0),
                    format!(
                        "Parameter '{}' is registered but no data was collected for event '{}' in this date range",
                        parameter, event_name
                    ),
                ),
            }
        }
        Some(ParameterCounts::Failed(error)) => (
            Verdict::NotCollected,
            Some(0),
            format!(
                "Parameter '{}' is registered but its report query failed ({}); collection for event '{}' could not be confirmed",
                parameter, error, event_name
            ),
        ),
    };

    ValidationResult {
        event_name: event_name.to_string(),
        parameter: parameter.to_string(),
        status,
        event_count,
        message,
    }
}

fn recommendations(unregistered: &[&str], results: &[ValidationResult]) -> Vec<String> {
    let mut lines = Vec::new();
    if !unregistered.is_empty() {
        lines.push(format!(
            "Register these parameters as event-scoped custom dimensions in GA4 (Admin > Custom definitions): {}",
            unregistered.join(", ")
        ));
    }

    // Grouped by event name, in order of first appearance.
    let mut by_event: Vec<(&str, Vec<&str>)> = Vec::new();
    for result in results.iter().filter(|r| r.status == Verdict::NotCollected) {
        let index = match by_event.iter().position(|(e, _)| *e == result.event_name) {
            Some(index) => index,
            None => {
                by_event.push((result.event_name.as_str(), Vec::new()));
                by_event.len() - 1
            }
        };
        let missing = &mut by_event[index].1;
        if !missing.contains(&result.parameter.as_str()) {
            missing.push(result.parameter.as_str());
        }
    }
    for (event_name, missing) in by_event {
        lines.push(format!(
            "Event '{}': registered but not collected: {}. Check that the tag fires and these parameters are populated.",
            event_name,
            missing.join(", ")
        ));
    }
    lines
}
