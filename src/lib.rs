pub mod analytics;
pub mod constants;
pub mod error;
pub mod models;
pub mod modules;
pub mod server;
mod test_utils;
pub mod utils;

use modules::auth::{CredentialPaths, CredentialResolver, EnvSource, GoogleTokenExchange};
use modules::cache::{ClientCache, HttpClientFactory};
use modules::system::{config, logger, validation};
use server::{Ga4McpServer, ToolRegistry};
use std::sync::Arc;
use tracing::{error, info};

fn build_server(app_config: &models::AppConfig) -> Ga4McpServer {
    let http = utils::http::init_shared_client(&app_config.api);
    let paths = CredentialPaths::discover(&app_config.auth);
    info!(
        "Credential search: product={:?} shared={:?} adc={:?} credentials_dir={:?}",
        paths.product_token_file,
        paths.shared_token_file,
        paths.gcloud_adc_file,
        paths.credentials_dir
    );

    let resolver = CredentialResolver::new(
        paths,
        EnvSource::Process,
        Arc::new(GoogleTokenExchange::new(http.clone())),
        app_config.auth.refresh_skew_secs,
    );
    let cache = ClientCache::new(resolver, Arc::new(HttpClientFactory::new(http)));
    Ga4McpServer::new(ToolRegistry::new(
        Arc::new(cache),
        app_config.api.report_row_limit,
    ))
}

async fn start_server() -> Result<(), String> {
    let app_config = config::load_app_config()
        .map_err(|e| format!("failed_to_load_config: {}", e))?;
    validation::validate_app_config(&app_config).map_err(|errors| {
        format!(
            "configuration_validation_failed:\n{}",
            errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("\n")
        )
    })?;

    build_server(&app_config).serve_stdio().await
}

pub fn run() {
    let retention_days = config::load_app_config()
        .map(|c| c.logging.retention_days)
        .unwrap_or(7);
    logger::init_logger(retention_days);

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create Tokio runtime: {}", e);
            std::process::exit(1);
        }
    };
    runtime.block_on(async {
        tokio::select! {
            result = start_server() => {
                if let Err(e) = result {
                    error!("{}", e);
                    std::process::exit(1);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted; shutting down");
            }
        }
    });
}
