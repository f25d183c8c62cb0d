//! Shared wiring for the hostkeeper maintenance jobs.

#![forbid(unsafe_code)]

pub mod config;
/// File-backed tracing setup.
pub mod telemetry;

use std::sync::Arc;
use std::time::Duration;

use hostkeeper_application::HostingApi;
use hostkeeper_core::{AppError, AppResult};
use hostkeeper_infrastructure::HttpHostingApi;
// Only the job binaries drive the runtime.
use tokio as _;

use crate::config::HostingConfig;

/// Builds the reqwest-backed hosting API client.
pub fn build_hosting_api(config: &HostingConfig) -> AppResult<Arc<dyn HostingApi>> {
    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .build()
        .map_err(|error| AppError::Internal(format!("failed to build HTTP client: {error}")))?;

    let hosting_api = HttpHostingApi::new(
        http_client,
        config.base_url.as_str(),
        config.credentials.clone(),
    )?;

    Ok(Arc::new(hosting_api))
}
