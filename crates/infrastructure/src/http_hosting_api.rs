use std::fmt::{Debug, Formatter};

use async_trait::async_trait;
use hostkeeper_application::HostingApi;
use hostkeeper_core::{AppError, AppResult, ServerId};
use hostkeeper_domain::FileEntry;
use reqwest::multipart::Form;
use url::Url;

/// Default base URL of the Dathost REST API.
pub const DEFAULT_HOSTING_API_BASE_URL: &str = "https://dathost.net/api/0.1";

const REASSIGNMENT_FIELD: &str = "allow_host_reassignment";

/// HTTP Basic credentials for the hosting API.
#[derive(Clone)]
pub struct HostingCredentials {
    username: String,
    password: String,
}

impl HostingCredentials {
    /// Creates credentials from a username and password.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Returns the account username.
    #[must_use]
    pub fn username(&self) -> &str {
        self.username.as_str()
    }
}

impl Debug for HostingCredentials {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("HostingCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// reqwest-based implementation of the hosting API port.
pub struct HttpHostingApi {
    http_client: reqwest::Client,
    base_url: Url,
    credentials: HostingCredentials,
}

impl HttpHostingApi {
    /// Creates a hosting API client rooted at `base_url`.
    pub fn new(
        http_client: reqwest::Client,
        base_url: &str,
        credentials: HostingCredentials,
    ) -> AppResult<Self> {
        let base_url = Url::parse(base_url).map_err(|error| {
            AppError::Validation(format!("invalid hosting API base URL '{base_url}': {error}"))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(AppError::Validation(format!(
                "hosting API base URL '{base_url}' cannot carry a path"
            )));
        }

        Ok(Self {
            http_client,
            base_url,
            credentials,
        })
    }

    fn endpoint<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> AppResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                AppError::Internal(format!(
                    "hosting API base URL '{}' cannot carry a path",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);

        Ok(url)
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder.basic_auth(
            self.credentials.username.as_str(),
            Some(self.credentials.password.as_str()),
        )
    }
}

#[async_trait]
impl HostingApi for HttpHostingApi {
    async fn verify_credentials(&self) -> AppResult<()> {
        let endpoint = self.endpoint(["account"])?;
        let response = self
            .authorized(self.http_client.get(endpoint))
            .send()
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to call account endpoint: {error}"))
            })?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let body = response_body(response).await;
            return Err(AppError::Unauthorized(format!(
                "account endpoint returned status {}: {body}",
                status.as_u16()
            )));
        }

        Ok(())
    }

    async fn list_files(
        &self,
        server_id: &ServerId,
        folder_path: &str,
    ) -> AppResult<Vec<FileEntry>> {
        let mut endpoint = self.endpoint(["game-servers", server_id.as_str(), "files"])?;
        endpoint
            .query_pairs_mut()
            .append_pair("hide_default_files", "true")
            .append_pair("path", folder_path);

        let response = self
            .authorized(self.http_client.get(endpoint))
            .send()
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to call file listing endpoint: {error}"))
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|error| {
            AppError::Internal(format!("failed to read file listing response body: {error}"))
        })?;
        if !status.is_success() {
            return Err(AppError::Internal(format!(
                "file listing endpoint returned status {}: {body}",
                status.as_u16()
            )));
        }

        if body.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str::<Vec<FileEntry>>(body.as_str()).map_err(|error| {
            AppError::Internal(format!(
                "failed to parse file listing response body: {error}"
            ))
        })
    }

    async fn delete_entry(&self, server_id: &ServerId, path: &str) -> AppResult<String> {
        let mut segments = vec!["game-servers", server_id.as_str(), "files"];
        segments.extend(path.trim_start_matches('/').split('/'));
        let endpoint = self.endpoint(segments)?;

        let response = self
            .authorized(self.http_client.delete(endpoint))
            .send()
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to call file delete endpoint: {error}"))
            })?;

        let status = response.status();
        let body = response_body(response).await;
        if status != reqwest::StatusCode::OK {
            return Err(AppError::Internal(format!(
                "file delete endpoint returned status {}: {body}",
                status.as_u16()
            )));
        }

        Ok(body)
    }

    async fn start_server(
        &self,
        server_id: &ServerId,
        allow_reassignment: bool,
    ) -> AppResult<()> {
        let endpoint = self.endpoint(["game-servers", server_id.as_str(), "start"])?;
        let mut request = self.authorized(self.http_client.post(endpoint));
        if allow_reassignment {
            request = request.multipart(Form::new().text(REASSIGNMENT_FIELD, "true"));
        }

        let response = request.send().await.map_err(|error| {
            AppError::Internal(format!("failed to call server start endpoint: {error}"))
        })?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let body = response_body(response).await;
            return Err(AppError::Internal(format!(
                "server start endpoint returned status {}: {body}",
                status.as_u16()
            )));
        }

        Ok(())
    }
}

async fn response_body(response: reqwest::Response) -> String {
    response
        .text()
        .await
        .unwrap_or_else(|_| "<body unavailable>".to_owned())
}
