//! Re-issues start commands so hosted game servers stay online.

#![forbid(unsafe_code)]

use hostkeeper_application::KeepaliveService;
use hostkeeper_core::AppError;
use hostkeeper_jobs::build_hosting_api;
use hostkeeper_jobs::config::KeepaliveConfig;
use hostkeeper_jobs::telemetry::init_tracing;
use tracing::info;

// Wiring crates consumed through the hostkeeper_jobs library.
use dotenvy as _;
use hostkeeper_domain as _;
use hostkeeper_infrastructure as _;
use reqwest as _;
use serde_json as _;
use tracing_subscriber as _;

const LOG_FILE_NAME: &str = "keepalive.log";

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), AppError> {
    let config = KeepaliveConfig::load()?;
    init_tracing(&config.log_directory, LOG_FILE_NAME)?;
    let hosting_api = build_hosting_api(&config.hosting)?;

    info!(
        api_base_url = %config.hosting.base_url,
        username = %config.hosting.credentials.username(),
        server_count = config.server_ids.len(),
        allow_reassignment = config.allow_reassignment,
        "hostkeeper keepalive started"
    );

    KeepaliveService::new(hosting_api, config.allow_reassignment)
        .run(&config.server_ids)
        .await?;

    Ok(())
}
