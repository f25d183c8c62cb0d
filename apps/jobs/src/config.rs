//! Job configuration loaded once from the process environment.
//!
//! Values are read through a lookup function so parsing can be exercised
//! without mutating the real environment.

use std::env;
use std::path::PathBuf;

use hostkeeper_core::{AppError, AppResult, ServerId};
use hostkeeper_domain::{
    DEFAULT_LOG_RETENTION_DAYS, RetentionRule, RetentionRuleInput, default_retention_rules,
};
use hostkeeper_infrastructure::{DEFAULT_HOSTING_API_BASE_URL, HostingCredentials};

const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Connection settings shared by both jobs.
#[derive(Debug, Clone)]
pub struct HostingConfig {
    /// API base URL without trailing slash.
    pub base_url: String,
    /// Basic auth credentials.
    pub credentials: HostingCredentials,
    /// Per-request timeout.
    pub timeout_seconds: u64,
}

/// Configuration of the cleanup job.
#[derive(Debug, Clone)]
pub struct CleanupConfig {
    /// Hosting API connection.
    pub hosting: HostingConfig,
    /// Directory holding the job log file.
    pub log_directory: PathBuf,
    /// Servers to clean, in order.
    pub server_ids: Vec<ServerId>,
    /// Retention window of the default dated-log rules.
    pub log_retention_days: u32,
    /// Rules applied to every server, in order.
    pub rules: Vec<RetentionRule>,
}

/// Configuration of the keepalive job.
#[derive(Debug, Clone)]
pub struct KeepaliveConfig {
    /// Hosting API connection.
    pub hosting: HostingConfig,
    /// Directory holding the job log file.
    pub log_directory: PathBuf,
    /// Servers to start, in order.
    pub server_ids: Vec<ServerId>,
    /// Whether the host may move a server off an unhealthy machine.
    pub allow_reassignment: bool,
}

impl HostingConfig {
    fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        let username = required_non_empty(lookup, "USERNAME")?;
        let password = required_non_empty(lookup, "PASSWORD")?;
        let base_url = lookup("HOSTING_API_BASE_URL")
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_HOSTING_API_BASE_URL.to_owned())
            .trim_end_matches('/')
            .to_owned();
        let timeout_seconds =
            parse_u64(lookup, "HOSTING_API_TIMEOUT_SECONDS", DEFAULT_TIMEOUT_SECONDS)?;

        if timeout_seconds == 0 {
            return Err(AppError::Validation(
                "HOSTING_API_TIMEOUT_SECONDS must be greater than zero".to_owned(),
            ));
        }

        Ok(Self {
            base_url,
            credentials: HostingCredentials::new(username, password),
            timeout_seconds,
        })
    }
}

impl CleanupConfig {
    /// Loads the cleanup configuration from `.env` and the environment.
    pub fn load() -> AppResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        let hosting = HostingConfig::from_lookup(&lookup)?;
        let log_directory = PathBuf::from(required_non_empty(&lookup, "LOG_DIRECTORY_PATH")?);
        let server_ids = parse_server_ids(&lookup, "SERVER_IDS")?;
        let log_retention_days =
            parse_u32(&lookup, "LOG_RETENTION_DAYS", DEFAULT_LOG_RETENTION_DAYS)?;

        let rule_inputs = match lookup("CLEANUP_RULES").filter(|value| !value.trim().is_empty()) {
            Some(raw_rules) => serde_json::from_str::<Vec<RetentionRuleInput>>(raw_rules.as_str())
                .map_err(|error| {
                    AppError::Validation(format!("invalid CLEANUP_RULES value: {error}"))
                })?,
            None => default_retention_rules(log_retention_days),
        };
        let rules = rule_inputs
            .into_iter()
            .map(RetentionRule::new)
            .collect::<AppResult<Vec<_>>>()?;

        Ok(Self {
            hosting,
            log_directory,
            server_ids,
            log_retention_days,
            rules,
        })
    }
}

impl KeepaliveConfig {
    /// Loads the keepalive configuration from `.env` and the environment.
    pub fn load() -> AppResult<Self> {
        dotenvy::dotenv_override().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        let hosting = HostingConfig::from_lookup(&lookup)?;
        let log_directory = PathBuf::from(required_non_empty(&lookup, "LOG_DIRECTORY_PATH")?);
        let server_ids = parse_server_ids(&lookup, "KEEPALIVE_SERVER_IDS")?;
        let allow_reassignment = lookup("ALLOW_REASSIGNMENT")
            .map(|value| value.trim().eq_ignore_ascii_case("true"))
            .unwrap_or(true);

        Ok(Self {
            hosting,
            log_directory,
            server_ids,
            allow_reassignment,
        })
    }
}

fn required_non_empty(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> AppResult<String> {
    let value = lookup(name).ok_or_else(|| AppError::Validation(format!("{name} is required")))?;
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::Validation(format!("{name} must not be empty")));
    }

    Ok(value.to_owned())
}

fn parse_server_ids(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
) -> AppResult<Vec<ServerId>> {
    let server_ids = required_non_empty(lookup, name)?
        .split(',')
        .filter(|value| !value.trim().is_empty())
        .map(ServerId::new)
        .collect::<AppResult<Vec<_>>>()?;

    if server_ids.is_empty() {
        return Err(AppError::Validation(format!(
            "{name} must list at least one server id"
        )));
    }

    Ok(server_ids)
}

fn parse_u32(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: u32,
) -> AppResult<u32> {
    match lookup(name) {
        Some(value) => value.trim().parse::<u32>().map_err(|error| {
            AppError::Validation(format!("invalid {name} value '{value}': {error}"))
        }),
        None => Ok(default),
    }
}

fn parse_u64(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: u64,
) -> AppResult<u64> {
    match lookup(name) {
        Some(value) => value.trim().parse::<u64>().map_err(|error| {
            AppError::Validation(format!("invalid {name} value '{value}': {error}"))
        }),
        None => Ok(default),
    }
}
