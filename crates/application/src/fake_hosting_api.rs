use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::Mutex;

use hostkeeper_core::{AppError, AppResult, ServerId};
use hostkeeper_domain::FileEntry;

use crate::HostingApi;

/// Remote call observed by [`FakeHostingApi`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum HostingCall {
    VerifyCredentials,
    List { server_id: String, folder_path: String },
    Delete { server_id: String, path: String },
    Start { server_id: String, allow_reassignment: bool },
}

/// In-memory hosting API recording every call in order.
pub(crate) struct FakeHostingApi {
    credentials_accepted: bool,
    listings: HashMap<(String, String), Vec<FileEntry>>,
    failing_listings: HashSet<(String, String)>,
    failing_deletes: HashSet<String>,
    failing_starts: HashSet<String>,
    calls: Mutex<Vec<HostingCall>>,
}

impl FakeHostingApi {
    pub(crate) fn new() -> Self {
        Self {
            credentials_accepted: true,
            listings: HashMap::new(),
            failing_listings: HashSet::new(),
            failing_deletes: HashSet::new(),
            failing_starts: HashSet::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn rejecting_credentials(mut self) -> Self {
        self.credentials_accepted = false;
        self
    }

    pub(crate) fn with_listing(
        mut self,
        server_id: &str,
        folder_path: &str,
        paths: &[&str],
    ) -> Self {
        self.listings.insert(
            (server_id.to_owned(), folder_path.to_owned()),
            paths.iter().map(|path| FileEntry::new(*path)).collect(),
        );
        self
    }

    pub(crate) fn with_failing_listing(mut self, server_id: &str, folder_path: &str) -> Self {
        self.failing_listings
            .insert((server_id.to_owned(), folder_path.to_owned()));
        self
    }

    pub(crate) fn with_failing_delete(mut self, path: &str) -> Self {
        self.failing_deletes.insert(path.to_owned());
        self
    }

    pub(crate) fn with_failing_start(mut self, server_id: &str) -> Self {
        self.failing_starts.insert(server_id.to_owned());
        self
    }

    pub(crate) async fn calls(&self) -> Vec<HostingCall> {
        self.calls.lock().await.clone()
    }

    pub(crate) async fn deleted_paths(&self, server_id: &str) -> Vec<String> {
        self.calls
            .lock()
            .await
            .iter()
            .filter_map(|call| match call {
                HostingCall::Delete {
                    server_id: called_server_id,
                    path,
                } if called_server_id == server_id => Some(path.clone()),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl HostingApi for FakeHostingApi {
    async fn verify_credentials(&self) -> AppResult<()> {
        self.calls.lock().await.push(HostingCall::VerifyCredentials);
        if self.credentials_accepted {
            Ok(())
        } else {
            Err(AppError::Unauthorized(
                "account endpoint returned status 401: invalid credentials".to_owned(),
            ))
        }
    }

    async fn list_files(
        &self,
        server_id: &ServerId,
        folder_path: &str,
    ) -> AppResult<Vec<FileEntry>> {
        self.calls.lock().await.push(HostingCall::List {
            server_id: server_id.as_str().to_owned(),
            folder_path: folder_path.to_owned(),
        });

        let key = (server_id.as_str().to_owned(), folder_path.to_owned());
        if self.failing_listings.contains(&key) {
            return Err(AppError::Internal(
                "failed to call file listing endpoint: connection reset".to_owned(),
            ));
        }

        Ok(self.listings.get(&key).cloned().unwrap_or_default())
    }

    async fn delete_entry(&self, server_id: &ServerId, path: &str) -> AppResult<String> {
        self.calls.lock().await.push(HostingCall::Delete {
            server_id: server_id.as_str().to_owned(),
            path: path.to_owned(),
        });

        if self.failing_deletes.contains(path) {
            return Err(AppError::Internal(format!(
                "file delete endpoint returned status 404: '{path}' not found"
            )));
        }

        Ok("OK".to_owned())
    }

    async fn start_server(
        &self,
        server_id: &ServerId,
        allow_reassignment: bool,
    ) -> AppResult<()> {
        self.calls.lock().await.push(HostingCall::Start {
            server_id: server_id.as_str().to_owned(),
            allow_reassignment,
        });

        if self.failing_starts.contains(server_id.as_str()) {
            return Err(AppError::Internal(
                "server start endpoint returned status 500: host unavailable".to_owned(),
            ));
        }

        Ok(())
    }
}

pub(crate) fn server_ids(values: &[&str]) -> Vec<ServerId> {
    values
        .iter()
        .map(|value| ServerId::new(*value).unwrap_or_else(|_| unreachable!()))
        .collect()
}
