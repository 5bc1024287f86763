use crate::analytics::types::{
    Metadata, RunRealtimeReportRequest, RunReportRequest, RunReportResponse,
};
use crate::analytics::{AnalyticsAdmin, AnalyticsData, PropertyId};
use crate::constants::{ADMIN_API_BASE, DATA_API_BASE};
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde_json::Value;

const LIST_PAGE_SIZE: u32 = 200;
const MAX_LIST_PAGES: usize = 100;

/// Bearer-token client for the GA4 Data and Admin REST APIs.
#[derive(Clone)]
pub struct HttpAnalyticsClient {
    http: Client,
    access_token: String,
    data_base: String,
    admin_base: String,
}

impl HttpAnalyticsClient {
    pub fn new(http: Client, access_token: impl Into<String>) -> Self {
        Self {
            http,
            access_token: access_token.into(),
            data_base: DATA_API_BASE.to_string(),
            admin_base: ADMIN_API_BASE.to_string(),
        }
    }

    /// Points the client at other Data / Admin API roots, such as a local mock.
    pub fn with_base_urls(
        mut self,
        data_base: impl Into<String>,
        admin_base: impl Into<String>,
    ) -> Self {
        self.data_base = data_base.into().trim_end_matches('/').to_string();
        self.admin_base = admin_base.into().trim_end_matches('/').to_string();
        self
    }

    fn data_url(&self, property: &PropertyId, suffix: &str) -> String {
        format!("{}/{}{}", self.data_base, property.resource_name(), suffix)
    }

    fn admin_url(&self, path: &str) -> String {
        format!("{}/{}", self.admin_base, path)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        url: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> AppResult<T> {
        let mut request = self
            .http
            .request(method.clone(), url)
            .bearer_auth(&self.access_token)
            .query(query);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                AppError::Timeout(format!("{} {}", method, url))
            } else {
                AppError::Network(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::upstream(
                Some(status.as_u16()),
                google_error_message(&body),
            ));
        }

        response.json::<T>().await.map_err(|e| {
            if e.is_timeout() {
                AppError::Timeout(format!("{} {}", method, url))
            } else {
                AppError::upstream(
                    Some(status.as_u16()),
                    format!("failed to decode response: {}", e),
                )
            }
        })
    }

    async fn list_all(&self, path: &str, field: &str) -> AppResult<Vec<Value>> {
        let url = self.admin_url(path);
        let mut items = Vec::new();
        let mut page_token: Option<String> = None;

        for _ in 0..MAX_LIST_PAGES {
            let mut query = vec![("pageSize", LIST_PAGE_SIZE.to_string())];
            if let Some(token) = page_token.take() {
                query.push(("pageToken", token));
            }
            let page: Value = self.send(Method::GET, &url, &query, None).await?;
            if let Some(batch) = page.get(field).and_then(|v| v.as_array()) {
                items.extend(batch.iter().cloned());
            }
            page_token = page
                .get("nextPageToken")
                .and_then(|v| v.as_str())
                .filter(|t| !t.is_empty())
                .map(str::to_string);
            if page_token.is_none() {
                return Ok(items);
            }
        }

        tracing::warn!(
            "Stopped paging {} after {} pages; result may be truncated",
            path,
            MAX_LIST_PAGES
        );
        Ok(items)
    }
}

/// Pulls `error.message` out of a Google error envelope, falling back to the raw body.
fn google_error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                "empty error response".to_string()
            } else {
                trimmed.chars().take(500).collect()
            }
        })
}

#[async_trait]
impl AnalyticsData for HttpAnalyticsClient {
    async fn get_metadata(&self, property: &PropertyId) -> AppResult<Metadata> {
        let url = self.data_url(property, "/metadata");
        self.send(Method::GET, &url, &[], None).await
    }

    async fn run_report(
        &self,
        property: &PropertyId,
        request: &RunReportRequest,
    ) -> AppResult<RunReportResponse> {
        let url = self.data_url(property, ":runReport");
        let body = serde_json::to_value(request)?;
        self.send(Method::POST, &url, &[], Some(&body)).await
    }

    async fn run_realtime_report(
        &self,
        property: &PropertyId,
        request: &RunRealtimeReportRequest,
    ) -> AppResult<RunReportResponse> {
        let url = self.data_url(property, ":runRealtimeReport");
        let body = serde_json::to_value(request)?;
        self.send(Method::POST, &url, &[], Some(&body)).await
    }
}

#[async_trait]
impl AnalyticsAdmin for HttpAnalyticsClient {
    async fn list_account_summaries(&self) -> AppResult<Vec<Value>> {
        self.list_all("accountSummaries", "accountSummaries").await
    }

    async fn get_property(&self, property: &PropertyId) -> AppResult<Value> {
        let url = self.admin_url(&property.resource_name());
        self.send(Method::GET, &url, &[], None).await
    }

    async fn list_custom_dimensions(&self, property: &PropertyId) -> AppResult<Vec<Value>> {
        let path = format!("{}/customDimensions", property.resource_name());
        self.list_all(&path, "customDimensions").await
    }

    async fn list_custom_metrics(&self, property: &PropertyId) -> AppResult<Vec<Value>> {
        let path = format!("{}/customMetrics", property.resource_name());
        self.list_all(&path, "customMetrics").await
    }

    async fn list_data_streams(&self, property: &PropertyId) -> AppResult<Vec<Value>> {
        let path = format!("{}/dataStreams", property.resource_name());
        self.list_all(&path, "dataStreams").await
    }
}
