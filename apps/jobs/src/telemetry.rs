use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use hostkeeper_core::{AppError, AppResult};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Installs the global subscriber, appending plain-text lines to
/// `log_directory/file_name`. The directory is created when missing.
pub fn init_tracing(log_directory: &Path, file_name: &str) -> AppResult<()> {
    fs::create_dir_all(log_directory).map_err(|error| {
        AppError::Internal(format!(
            "failed to create log directory '{}': {error}",
            log_directory.display()
        ))
    })?;

    let log_path = log_directory.join(file_name);
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to open log file '{}': {error}",
                log_path.display()
            ))
        })?;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(Mutex::new(log_file))
        .compact()
        .init();

    debug!(log_path = %log_path.display(), "file logging initialized");
    Ok(())
}
