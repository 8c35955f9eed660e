//! HTTP client for the device management API
//!
//! Every call goes through one authenticated request primitive that attaches
//! the bearer token, logs the exchange and checks the response status. The
//! resource-specific operations are grouped by service:
//! - Inventory: list the devices of a group
//! - Artifacts: upload a generated artifact
//! - Deployments: create a deployment for a set of devices

pub mod artifacts;
pub mod deployments;
pub mod error;
pub mod inventory;

pub use artifacts::{ArtifactStore, UploadRequest};
pub use deployments::{DeploymentRequest, DeploymentService};
pub use error::{ApiError, DeploymentError, DirectoryError, UploadError};
pub use inventory::DeviceDirectory;

use crate::core::{Credential, ServerConfig};
use reqwest::multipart::Form;
use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

/// Request body for an API call
pub enum Payload {
    Empty,
    Json(serde_json::Value),
    Multipart(Form),
}

/// Join a base URL and an API path with exactly one slash between them
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Client for the management API of the device management service
#[derive(Debug, Clone)]
pub struct ManagementClient {
    /// Base URL of the service (e.g., "https://hosted.mender.io")
    base_url: String,
    /// HTTP client instance
    client: Client,
}

impl ManagementClient {
    /// Create a client from server settings
    ///
    /// `skip_verify` disables TLS certificate verification.
    pub fn new(config: &ServerConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .danger_accept_invalid_certs(config.skip_verify)
            .build()
            .map_err(ApiError::Client)?;
        Ok(Self::with_client(&config.url, client))
    }

    /// Create a client with a preconfigured reqwest `Client`
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send an authenticated request and check the response status
    ///
    /// `accept` decides which status codes count as success; any other
    /// status is returned as `ApiError::Status` with the response body.
    pub async fn call(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        payload: Payload,
        credential: &Credential,
        accept: fn(StatusCode) -> bool,
    ) -> Result<Response, ApiError> {
        let url = join_url(&self.base_url, path);

        let mut request = self
            .client
            .request(method.clone(), &url)
            .header(reqwest::header::AUTHORIZATION, credential.bearer());
        if !query.is_empty() {
            request = request.query(query);
        }
        debug!("sending request: {} {} {:?}", method, url, query);

        request = match payload {
            Payload::Empty => request,
            Payload::Json(body) => {
                debug!("request body: {}", body);
                request.json(&body)
            }
            Payload::Multipart(form) => request.multipart(form),
        };

        let response = request.send().await.map_err(|source| ApiError::Transport {
            method: method.clone(),
            url: url.clone(),
            source,
        })?;

        let status = response.status();
        debug!("response: {} for {} {}", status, method, url);

        if !accept(status) {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            debug!("response body: {}", body);
            return Err(ApiError::Status {
                method,
                url,
                status,
                body,
            });
        }

        Ok(response)
    }

    /// Read a successful response body as JSON
    ///
    /// `method` is the method of the request that produced `response`.
    async fn read_json<T: DeserializeOwned>(
        method: Method,
        response: Response,
    ) -> Result<T, ApiError> {
        let url = response.url().to_string();
        let body = response.text().await.map_err(|source| ApiError::Transport {
            method,
            url: url.clone(),
            source,
        })?;
        debug!("response body: {}", body);

        serde_json::from_str(&body).map_err(|source| ApiError::Decode { url, source })
    }
}
