//! Remote file cleanup job.
//!
//! For each server the configured rules run in order: the rule's folder is
//! listed, every entry is evaluated, and entries marked for deletion are
//! removed one request at a time. Listing, deletion and date parsing
//! failures are logged and skipped; only a rejected credential check stops
//! the run.

use std::sync::Arc;

use chrono::{DateTime, Local, NaiveDate, TimeZone};
use tracing::{error, info, warn};

use hostkeeper_core::{AppResult, ServerId};
use hostkeeper_domain::{RetentionDecision, RetentionRule, remote_path};

use crate::HostingApi;

/// Counters collected while cleaning one server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerCleanupReport {
    /// Server the counters belong to.
    pub server_id: ServerId,
    /// Entries returned by successful listings.
    pub listed_entries: usize,
    /// Entries removed.
    pub deleted_entries: usize,
    /// Delete requests the API rejected.
    pub failed_deletions: usize,
    /// Entries retained because no date could be parsed.
    pub unparseable_entries: usize,
    /// Folder listings that failed and were treated as empty.
    pub failed_listings: usize,
}

impl ServerCleanupReport {
    fn new(server_id: ServerId) -> Self {
        Self {
            server_id,
            listed_entries: 0,
            deleted_entries: 0,
            failed_deletions: 0,
            unparseable_entries: 0,
            failed_listings: 0,
        }
    }
}

/// Outcome of a full cleanup run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupReport {
    /// Per-server counters in processing order.
    pub servers: Vec<ServerCleanupReport>,
}

impl CleanupReport {
    /// Total number of removed entries across servers.
    #[must_use]
    pub fn deleted_entries(&self) -> usize {
        self.servers
            .iter()
            .map(|server| server.deleted_entries)
            .sum()
    }

    /// Total number of rejected delete requests across servers.
    #[must_use]
    pub fn failed_deletions(&self) -> usize {
        self.servers
            .iter()
            .map(|server| server.failed_deletions)
            .sum()
    }
}

/// Application service driving the cleanup job.
#[derive(Clone)]
pub struct CleanupService {
    hosting_api: Arc<dyn HostingApi>,
    rules: Arc<[RetentionRule]>,
}

impl CleanupService {
    /// Creates a cleanup service over the given rules, evaluated in order.
    #[must_use]
    pub fn new(hosting_api: Arc<dyn HostingApi>, rules: Vec<RetentionRule>) -> Self {
        Self {
            hosting_api,
            rules: rules.into(),
        }
    }

    /// Runs the cleanup for every server using the host's local date.
    pub async fn run(&self, server_ids: &[ServerId]) -> AppResult<CleanupReport> {
        self.run_on(server_ids, calendar_day(&Local::now())).await
    }

    /// Runs the cleanup for every server as of `today`.
    ///
    /// Returns an error only when the credential check fails, in which case
    /// no server is touched.
    pub async fn run_on(
        &self,
        server_ids: &[ServerId],
        today: NaiveDate,
    ) -> AppResult<CleanupReport> {
        if let Err(error) = self.hosting_api.verify_credentials().await {
            error!(error = %error, "authentication failed");
            return Err(error);
        }
        info!("authentication successful");

        let mut report = CleanupReport::default();
        for server_id in server_ids {
            info!(server_id = %server_id, "starting cleanup process");
            let server_report = self.cleanup_server(server_id, today).await;
            info!(
                server_id = %server_id,
                listed = server_report.listed_entries,
                deleted = server_report.deleted_entries,
                failed_deletions = server_report.failed_deletions,
                unparseable = server_report.unparseable_entries,
                failed_listings = server_report.failed_listings,
                "cleanup process completed"
            );
            report.servers.push(server_report);
        }

        Ok(report)
    }

    /// Applies every rule to one server.
    pub async fn cleanup_server(
        &self,
        server_id: &ServerId,
        today: NaiveDate,
    ) -> ServerCleanupReport {
        let mut report = ServerCleanupReport::new(server_id.clone());

        for rule in self.rules.iter() {
            self.apply_rule(server_id, rule, today, &mut report).await;
        }

        report
    }

    async fn apply_rule(
        &self,
        server_id: &ServerId,
        rule: &RetentionRule,
        today: NaiveDate,
        report: &mut ServerCleanupReport,
    ) {
        let folder_path = rule.folder_path();
        let entries = match self.hosting_api.list_files(server_id, folder_path).await {
            Ok(entries) => entries,
            Err(error) => {
                report.failed_listings += 1;
                warn!(
                    server_id = %server_id,
                    folder_path = %folder_path,
                    error = %error,
                    "failed to list remote folder, skipping it"
                );
                return;
            }
        };
        report.listed_entries += entries.len();

        for entry in &entries {
            let path = remote_path(folder_path, entry);
            match rule.evaluate(entry, today) {
                RetentionDecision::Retain => continue,
                RetentionDecision::UnparseableDate { reason } => {
                    report.unparseable_entries += 1;
                    error!(
                        server_id = %server_id,
                        path = %path,
                        reason = %reason,
                        "failed to parse date from file name"
                    );
                    continue;
                }
                RetentionDecision::Delete => {}
            }

            match rule {
                RetentionRule::DatedLog(dated) => info!(
                    server_id = %server_id,
                    path = %path,
                    max_age_days = dated.max_age_days(),
                    "deleting file older than retention window"
                ),
                RetentionRule::Pattern(_) | RetentionRule::Folder(_) => info!(
                    server_id = %server_id,
                    path = %path,
                    rule = rule.rule_type(),
                    "preparing to delete"
                ),
            }

            match self.hosting_api.delete_entry(server_id, path.as_str()).await {
                Ok(response) => {
                    report.deleted_entries += 1;
                    info!(
                        server_id = %server_id,
                        path = %path,
                        response = %response,
                        "successfully deleted"
                    );
                }
                Err(error) => {
                    report.failed_deletions += 1;
                    error!(
                        server_id = %server_id,
                        path = %path,
                        error = %error,
                        "failed to delete remote entry"
                    );
                }
            }
        }
    }
}

/// Returns the calendar day of `now` in its own time zone.
///
/// Retention windows count days as seen on the wall clock of the host, so a
/// run late in the evening west of UTC still uses the local date.
#[must_use]
pub fn calendar_day<Tz: TimeZone>(now: &DateTime<Tz>) -> NaiveDate {
    now.date_naive()
}

#[cfg(test)]
mod tests;
