use async_trait::async_trait;

use hostkeeper_core::{AppResult, ServerId};
use hostkeeper_domain::FileEntry;

/// Port for the game-server hosting API.
///
/// Every call is scoped to one server and awaited to completion before the
/// caller issues the next one.
#[async_trait]
pub trait HostingApi: Send + Sync {
    /// Confirms the configured credentials are accepted.
    ///
    /// Returns `AppError::Unauthorized` when the API rejects them.
    async fn verify_credentials(&self) -> AppResult<()>;

    /// Lists non-default files under a folder, `""` being the server root.
    async fn list_files(
        &self,
        server_id: &ServerId,
        folder_path: &str,
    ) -> AppResult<Vec<FileEntry>>;

    /// Removes exactly one file or folder, returning the response body.
    async fn delete_entry(&self, server_id: &ServerId, path: &str) -> AppResult<String>;

    /// Issues a start command, optionally allowing the host to move the
    /// server to another machine.
    async fn start_server(
        &self,
        server_id: &ServerId,
        allow_reassignment: bool,
    ) -> AppResult<()>;
}
