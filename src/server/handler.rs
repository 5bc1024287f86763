//! MCP server handler for the GA4 tools.
//!
//! - `get_auth_status`: active credential source, mode and expiry
//! - `get_account_summaries`: accounts and properties visible to the credential
//! - `get_property_details`: property settings and data streams
//! - `get_custom_dimensions_and_metrics`: registered custom definitions
//! - `get_metadata`: report dimensions and metrics
//! - `run_report` / `run_realtime_report`: Data API reports
//! - `extract_gtm_parameters`: offline GTM export extraction
//! - `validate_gtm_parameters`: GTM parameters checked against GA4

use crate::constants::{SERVER_NAME, SERVER_VERSION};
use crate::server::params::{
    ExtractParams, MetadataParams, PropertyParams, RealtimeReportParams, RunReportParams,
    ValidateParams,
};
use crate::server::tools::ToolRegistry;
use rmcp::handler::server::{tool::ToolRouter, wrapper::Parameters};
use rmcp::model::{
    CallToolResult, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler, ServiceExt};
use std::sync::Arc;

#[derive(Clone)]
pub struct Ga4McpServer {
    tools: Arc<ToolRegistry>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl Ga4McpServer {
    pub fn new(tools: ToolRegistry) -> Self {
        Self {
            tools: Arc::new(tools),
            tool_router: Self::tool_router(),
        }
    }

    /// Serves MCP over stdin/stdout until the client disconnects.
    pub async fn serve_stdio(self) -> Result<(), String> {
        tracing::info!("Serving {} {} over stdio", SERVER_NAME, SERVER_VERSION);
        let running = self
            .serve(rmcp::transport::stdio())
            .await
            .map_err(|e| format!("mcp_initialize_failed: {}", e))?;
        let reason = running
            .waiting()
            .await
            .map_err(|e| format!("mcp_service_failed: {}", e))?;
        tracing::info!("MCP session ended: {:?}", reason);
        Ok(())
    }

    #[tool(description = "Show which credential source is active, its auth mode and token expiry.")]
    async fn get_auth_status(&self) -> Result<CallToolResult, McpError> {
        let outcome = self.tools.auth_status().await;
        Ok(self.tools.respond("get_auth_status", outcome).await)
    }

    #[tool(description = "List GA4 accounts and their properties visible to the active credential.")]
    async fn get_account_summaries(&self) -> Result<CallToolResult, McpError> {
        let outcome = self.tools.account_summaries().await;
        Ok(self.tools.respond("get_account_summaries", outcome).await)
    }

    #[tool(description = "Get a GA4 property's settings and its data streams.")]
    async fn get_property_details(
        &self,
        Parameters(params): Parameters<PropertyParams>,
    ) -> Result<CallToolResult, McpError> {
        let outcome = self.tools.property_details(&params).await;
        Ok(self.tools.respond("get_property_details", outcome).await)
    }

    #[tool(description = "List the custom dimensions and custom metrics registered on a property.")]
    async fn get_custom_dimensions_and_metrics(
        &self,
        Parameters(params): Parameters<PropertyParams>,
    ) -> Result<CallToolResult, McpError> {
        let outcome = self.tools.custom_definitions(&params).await;
        Ok(self
            .tools
            .respond("get_custom_dimensions_and_metrics", outcome)
            .await)
    }

    #[tool(description = "List dimensions and metrics available for reports on a property.")]
    async fn get_metadata(
        &self,
        Parameters(params): Parameters<MetadataParams>,
    ) -> Result<CallToolResult, McpError> {
        let outcome = self.tools.metadata(&params).await;
        Ok(self.tools.respond("get_metadata", outcome).await)
    }

    #[tool(description = "Run a GA4 Data API report.")]
    async fn run_report(
        &self,
        Parameters(params): Parameters<RunReportParams>,
    ) -> Result<CallToolResult, McpError> {
        let outcome = self.tools.run_report(&params).await;
        Ok(self.tools.respond("run_report", outcome).await)
    }

    #[tool(description = "Run a GA4 realtime report covering the last 30 minutes.")]
    async fn run_realtime_report(
        &self,
        Parameters(params): Parameters<RealtimeReportParams>,
    ) -> Result<CallToolResult, McpError> {
        let outcome = self.tools.run_realtime_report(&params).await;
        Ok(self.tools.respond("run_realtime_report", outcome).await)
    }

    #[tool(description = "Extract GA4 event names and parameter names from a GTM container export.")]
    async fn extract_gtm_parameters(
        &self,
        Parameters(params): Parameters<ExtractParams>,
    ) -> Result<CallToolResult, McpError> {
        let outcome = self.tools.extract_parameters(&params);
        Ok(self.tools.respond("extract_gtm_parameters", outcome).await)
    }

    #[tool(
        description = "Check that GTM event parameters are registered as GA4 custom dimensions and actually collected."
    )]
    async fn validate_gtm_parameters(
        &self,
        Parameters(params): Parameters<ValidateParams>,
    ) -> Result<CallToolResult, McpError> {
        let outcome = self.tools.validate_parameters(&params).await;
        Ok(self.tools.respond("validate_gtm_parameters", outcome).await)
    }
}

#[tool_handler]
impl ServerHandler for Ga4McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: SERVER_NAME.to_string(),
                title: Some("GA4 MCP Server".to_string()),
                version: SERVER_VERSION.to_string(),
                ..Implementation::default()
            },
            instructions: Some(
                "Read-only Google Analytics 4 tools. Start with get_auth_status and \
                 get_account_summaries to find a property id. To audit a GTM setup, run \
                 extract_gtm_parameters on the container export, then validate_gtm_parameters \
                 with the same export and the GA4 property id."
                    .to_string(),
            ),
        }
    }
}
