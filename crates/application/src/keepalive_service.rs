use std::sync::Arc;

use tracing::{error, info};

use hostkeeper_core::{AppResult, ServerId};

use crate::HostingApi;

/// Outcome of a keepalive run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeepaliveReport {
    /// Servers whose start command was accepted.
    pub started: Vec<ServerId>,
    /// Servers whose start command failed.
    pub failed: Vec<ServerId>,
}

/// Application service re-issuing start commands to keep servers alive.
#[derive(Clone)]
pub struct KeepaliveService {
    hosting_api: Arc<dyn HostingApi>,
    allow_reassignment: bool,
}

impl KeepaliveService {
    /// Creates a keepalive service.
    #[must_use]
    pub fn new(hosting_api: Arc<dyn HostingApi>, allow_reassignment: bool) -> Self {
        Self {
            hosting_api,
            allow_reassignment,
        }
    }

    /// Checks credentials once, then starts each server independently.
    pub async fn run(&self, server_ids: &[ServerId]) -> AppResult<KeepaliveReport> {
        if let Err(error) = self.hosting_api.verify_credentials().await {
            error!(error = %error, "authentication failed");
            return Err(error);
        }
        info!("authentication successful");

        let mut report = KeepaliveReport::default();
        for server_id in server_ids {
            match self.start_server(server_id).await {
                Ok(()) => report.started.push(server_id.clone()),
                Err(_) => report.failed.push(server_id.clone()),
            }
        }

        info!(
            started = report.started.len(),
            failed = report.failed.len(),
            "keepalive run completed"
        );

        Ok(report)
    }

    /// Sends one start command and logs its outcome.
    pub async fn start_server(&self, server_id: &ServerId) -> AppResult<()> {
        info!(
            server_id = %server_id,
            allow_reassignment = self.allow_reassignment,
            "attempting to start server"
        );

        match self
            .hosting_api
            .start_server(server_id, self.allow_reassignment)
            .await
        {
            Ok(()) => {
                info!(server_id = %server_id, "successfully started server");
                Ok(())
            }
            Err(error) => {
                error!(server_id = %server_id, error = %error, "failed to start server");
                Err(error)
            }
        }
    }
}
