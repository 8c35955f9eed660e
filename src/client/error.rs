//! Error types for the management API client

use reqwest::{Method, StatusCode};
use std::path::PathBuf;
use thiserror::Error;

/// Failure of a single authenticated API call
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response
    #[error("{method} {url} failed: {source}")]
    Transport {
        method: Method,
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The service answered with an unexpected status code
    #[error("{method} {url} returned status {status}: {body}")]
    Status {
        method: Method,
        url: String,
        status: StatusCode,
        body: String,
    },

    /// The response body could not be parsed
    #[error("malformed response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// A local file sent with the request could not be read
    #[error("cannot read {}: {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The HTTP client could not be built
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl ApiError {
    /// HTTP status code of the response, when there was one
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(status.as_u16()),
            Self::Transport { source, .. } => source.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Check if the service rejected the credential
    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401) | Some(403))
    }
}

/// Listing the devices of a group failed
#[derive(Debug, Error)]
#[error("listing devices in group '{group}' failed: {source}")]
pub struct DirectoryError {
    pub group: String,
    #[source]
    pub source: ApiError,
}

impl DirectoryError {
    pub fn status(&self) -> Option<u16> {
        self.source.status()
    }
}

/// Uploading an artifact failed
#[derive(Debug, Error)]
#[error("uploading {} failed: {source}", path.display())]
pub struct UploadError {
    pub path: PathBuf,
    #[source]
    pub source: ApiError,
}

impl UploadError {
    pub fn status(&self) -> Option<u16> {
        self.source.status()
    }
}

/// Creating a deployment failed
#[derive(Debug, Error)]
#[error("deploying artifact '{artifact_name}' failed: {source}")]
pub struct DeploymentError {
    pub artifact_name: String,
    #[source]
    pub source: ApiError,
}

impl DeploymentError {
    pub fn status(&self) -> Option<u16> {
        self.source.status()
    }
}
