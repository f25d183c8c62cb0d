//! Deletes stale match backups and logs from hosted game servers.

#![forbid(unsafe_code)]

use hostkeeper_application::CleanupService;
use hostkeeper_core::AppError;
use hostkeeper_jobs::build_hosting_api;
use hostkeeper_jobs::config::CleanupConfig;
use hostkeeper_jobs::telemetry::init_tracing;
use tracing::info;

// Wiring crates consumed through the hostkeeper_jobs library.
use dotenvy as _;
use hostkeeper_domain as _;
use hostkeeper_infrastructure as _;
use reqwest as _;
use serde_json as _;
use tracing_subscriber as _;

const LOG_FILE_NAME: &str = "output.log";

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), AppError> {
    let config = CleanupConfig::load()?;
    init_tracing(&config.log_directory, LOG_FILE_NAME)?;
    let hosting_api = build_hosting_api(&config.hosting)?;

    info!(
        api_base_url = %config.hosting.base_url,
        username = %config.hosting.credentials.username(),
        server_count = config.server_ids.len(),
        rule_count = config.rules.len(),
        log_retention_days = config.log_retention_days,
        "hostkeeper cleanup started"
    );

    let report = CleanupService::new(hosting_api, config.rules)
        .run(&config.server_ids)
        .await?;

    info!(
        server_count = report.servers.len(),
        deleted = report.deleted_entries(),
        failed_deletions = report.failed_deletions(),
        "hostkeeper cleanup finished"
    );

    Ok(())
}
