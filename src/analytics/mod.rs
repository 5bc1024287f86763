//! GA4 Data / Admin capability interface and its HTTP backend.
//!
//! The validation engine and the tool layer only ever see the traits below, so
//! any backend exposing this shape can stand in for the real Google APIs.

pub mod client;
pub mod params;
pub mod types;

use crate::error::AppResult;
use async_trait::async_trait;
use serde_json::Value;

pub use client::HttpAnalyticsClient;
pub use params::PropertyId;
pub use types::{
    DateRange, Metadata, RunRealtimeReportRequest, RunReportRequest, RunReportResponse,
};

#[async_trait]
pub trait AnalyticsData: Send + Sync {
    async fn get_metadata(&self, property: &PropertyId) -> AppResult<Metadata>;

    async fn run_report(
        &self,
        property: &PropertyId,
        request: &RunReportRequest,
    ) -> AppResult<RunReportResponse>;

    async fn run_realtime_report(
        &self,
        property: &PropertyId,
        request: &RunRealtimeReportRequest,
    ) -> AppResult<RunReportResponse>;
}

#[async_trait]
pub trait AnalyticsAdmin: Send + Sync {
    /// All pages of `accountSummaries`.
    async fn list_account_summaries(&self) -> AppResult<Vec<Value>>;

    async fn get_property(&self, property: &PropertyId) -> AppResult<Value>;

    async fn list_custom_dimensions(&self, property: &PropertyId) -> AppResult<Vec<Value>>;

    async fn list_custom_metrics(&self, property: &PropertyId) -> AppResult<Vec<Value>>;

    async fn list_data_streams(&self, property: &PropertyId) -> AppResult<Vec<Value>>;
}
