//! GA4 tool operations behind the MCP server.
//!
//! Each operation returns plain JSON. [`ToolRegistry::respond`] turns the outcome
//! into a tool result: failures are rendered through [`AppError::to_failure`] with
//! `isError` set, so they never escape as protocol errors.

use crate::analytics::types::{Dimension, Metric};
use crate::analytics::{RunRealtimeReportRequest, RunReportRequest};
use crate::error::{AppError, AppResult};
use crate::models::GtmEventConfig;
use crate::modules::cache::ClientCache;
use crate::modules::gtm::{extract_events, parse_export};
use crate::modules::validation;
use crate::server::params::{
    non_negative_offset, positive_limit, ExtractParams, MetadataParams, PropertyParams,
    RealtimeReportParams, RunReportParams, ValidateParams,
};
use rmcp::model::{CallToolResult, Content};
use serde_json::{json, Value};
use std::sync::Arc;

fn export_events(export: &Value) -> AppResult<Vec<GtmEventConfig>> {
    match export {
        Value::String(raw) => parse_export(raw),
        Value::Object(_) | Value::Array(_) => Ok(extract_events(export)),
        other => Err(AppError::MalformedExportInput(format!(
            "gtm_export must be a JSON object, array or string, got {}",
            other
        ))),
    }
}

/// Explicit `events` first, then whatever the export yields.
fn validation_events(params: &ValidateParams) -> AppResult<Vec<GtmEventConfig>> {
    if params.events.is_none() && params.gtm_export.is_none() {
        return Err(AppError::MalformedExportInput(
            "provide either events or gtm_export".to_string(),
        ));
    }

    let mut events: Vec<GtmEventConfig> = params.events.clone().unwrap_or_default();
    for event in &mut events {
        event.dedup_parameters();
    }
    if let Some(export) = &params.gtm_export {
        events.extend(export_events(export)?);
    }
    events.retain(|event| !event.event_name.trim().is_empty() && !event.parameters.is_empty());

    if events.is_empty() {
        return Err(AppError::MalformedExportInput(
            "no GA4 event tags with a resolvable event name and parameters were found".to_string(),
        ));
    }
    Ok(events)
}

fn object_value(map: &Option<serde_json::Map<String, Value>>) -> Option<Value> {
    map.clone().map(Value::Object)
}

pub struct ToolRegistry {
    cache: Arc<ClientCache>,
    report_row_limit: i64,
}

impl ToolRegistry {
    pub fn new(cache: Arc<ClientCache>, report_row_limit: u32) -> Self {
        Self {
            cache,
            report_row_limit: i64::from(report_row_limit),
        }
    }

    /// Renders an operation outcome. A 401 from GA4 drops the cached clients first.
    pub async fn respond(&self, tool: &str, outcome: AppResult<Value>) -> CallToolResult {
        match outcome {
            Ok(value) => {
                tracing::info!(tool, "Tool call succeeded");
                let text =
                    serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string());
                CallToolResult::success(vec![Content::text(text)])
            }
            Err(e) => {
                if matches!(e, AppError::UpstreamApi { status: Some(401), .. }) {
                    tracing::warn!("GA4 rejected the access token; dropping cached clients");
                    self.cache.invalidate().await;
                }
                tracing::warn!(tool, kind = e.kind(), "Tool call failed: {}", e);
                CallToolResult::error(vec![Content::text(e.to_failure().to_string())])
            }
        }
    }

    pub async fn auth_status(&self) -> AppResult<Value> {
        Ok(serde_json::to_value(self.cache.auth_status().await?)?)
    }

    pub async fn account_summaries(&self) -> AppResult<Value> {
        let summaries = self.cache.admin_client().await?.list_account_summaries().await?;
        Ok(json!({ "accountSummaries": summaries }))
    }

    pub async fn property_details(&self, params: &PropertyParams) -> AppResult<Value> {
        let property = params.property_id.parse()?;
        let admin = self.cache.admin_client().await?;
        let details = admin.get_property(&property).await?;
        let streams = admin.list_data_streams(&property).await?;
        Ok(json!({ "property": details, "dataStreams": streams }))
    }

    pub async fn custom_definitions(&self, params: &PropertyParams) -> AppResult<Value> {
        let property = params.property_id.parse()?;
        let admin = self.cache.admin_client().await?;
        let dimensions = admin.list_custom_dimensions(&property).await?;
        let metrics = admin.list_custom_metrics(&property).await?;
        Ok(json!({
            "property": property.resource_name(),
            "customDimensions": dimensions,
            "customMetrics": metrics
        }))
    }

    pub async fn metadata(&self, params: &MetadataParams) -> AppResult<Value> {
        let property = params.property_id.parse()?;
        let mut metadata = self.cache.data_client().await?.get_metadata(&property).await?;
        if params.custom_only == Some(true) {
            metadata.dimensions.retain(|d| d.custom_definition);
            metadata.metrics.retain(|m| m.custom_definition);
        }
        Ok(serde_json::to_value(metadata)?)
    }

    pub async fn run_report(&self, params: &RunReportParams) -> AppResult<Value> {
        let property = params.property_id.parse()?;
        let request = self.report_request(params)?;
        let response = self.cache.data_client().await?.run_report(&property, &request).await?;
        Ok(serde_json::to_value(response)?)
    }

    pub async fn run_realtime_report(&self, params: &RealtimeReportParams) -> AppResult<Value> {
        let property = params.property_id.parse()?;
        let request = realtime_request(params)?;
        let response = self
            .cache
            .data_client()
            .await?
            .run_realtime_report(&property, &request)
            .await?;
        Ok(serde_json::to_value(response)?)
    }

    pub fn extract_parameters(&self, params: &ExtractParams) -> AppResult<Value> {
        let events = export_events(&params.gtm_export)?;
        Ok(json!({ "total_events": events.len(), "events": events }))
    }

    pub async fn validate_parameters(&self, params: &ValidateParams) -> AppResult<Value> {
        let property = params.property_id.parse()?;
        let date_range = params.date_range()?;
        let events = validation_events(params)?;
        let data = self.cache.data_client().await?;
        let summary = validation::validate(
            data.as_ref(),
            &property,
            &events,
            &date_range,
            self.report_row_limit,
        )
        .await?;
        Ok(serde_json::to_value(summary)?)
    }

    fn report_request(&self, params: &RunReportParams) -> AppResult<RunReportRequest> {
        let metrics = params.metric_names()?;
        let dimensions = params.dimension_names()?;
        let dims: Vec<&str> = dimensions.iter().map(String::as_str).collect();
        let mets: Vec<&str> = metrics.iter().map(String::as_str).collect();

        let mut request = RunReportRequest::new(&dims, &mets, params.date_range()?);
        request.limit = Some(positive_limit(params.limit)?.unwrap_or(self.report_row_limit));
        request.offset = non_negative_offset(params.offset)?;
        request.dimension_filter = object_value(&params.dimension_filter);
        request.metric_filter = object_value(&params.metric_filter);
        request.order_bys = params.order_bys.clone().map(Value::Array);
        Ok(request)
    }
}

fn realtime_request(params: &RealtimeReportParams) -> AppResult<RunRealtimeReportRequest> {
    let metrics = params.metric_names()?;
    Ok(RunRealtimeReportRequest {
        dimensions: params
            .dimension_names()?
            .into_iter()
            .map(|name| Dimension { name })
            .collect(),
        metrics: metrics.into_iter().map(|name| Metric { name }).collect(),
        dimension_filter: object_value(&params.dimension_filter),
        limit: positive_limit(params.limit)?,
    })
}
