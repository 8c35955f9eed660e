//! Deployments API: artifact upload

use crate::client::{ApiError, ManagementClient, Payload, UploadError};
use crate::core::Credential;
use async_trait::async_trait;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Method};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

pub const ARTIFACTS_PATH: &str = "/api/management/v1/deployments/artifacts";

/// An artifact file to upload, with its description
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub description: String,
    pub path: PathBuf,
    /// Show a spinner on the terminal while the upload runs
    pub show_progress: bool,
}

/// Stores artifacts on the service
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    async fn upload(
        &self,
        request: &UploadRequest,
        credential: &Credential,
    ) -> Result<(), UploadError>;
}

fn upload_spinner(path: &std::path::Path) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(format!("Uploading {}", path.display()));
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

impl ManagementClient {
    async fn artifact_form(request: &UploadRequest) -> Result<Form, ApiError> {
        let file_error = |source| ApiError::File {
            path: request.path.clone(),
            source,
        };

        let file = tokio::fs::File::open(&request.path).await.map_err(file_error)?;
        let size = file.metadata().await.map_err(file_error)?.len();
        let file_name = request
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "artifact.mender".to_string());

        let part = Part::stream_with_length(Body::from(file), size).file_name(file_name);

        Ok(Form::new()
            .text("description", request.description.clone())
            .text("size", size.to_string())
            .part("artifact", part))
    }
}

#[async_trait]
impl ArtifactStore for ManagementClient {
    /// Stream the artifact file to the service as a multipart body
    async fn upload(
        &self,
        request: &UploadRequest,
        credential: &Credential,
    ) -> Result<(), UploadError> {
        let wrap = |source: ApiError| UploadError {
            path: request.path.clone(),
            source,
        };

        let form = Self::artifact_form(request).await.map_err(wrap)?;
        debug!("uploading {} ({})", request.path.display(), request.description);

        let spinner = request.show_progress.then(|| upload_spinner(&request.path));
        let result = self
            .call(
                Method::POST,
                ARTIFACTS_PATH,
                &[],
                Payload::Multipart(form),
                credential,
                |s| s.is_success(),
            )
            .await;
        if let Some(spinner) = spinner {
            spinner.finish_and_clear();
        }

        result.map_err(wrap)?;
        info!("Uploaded {}", request.path.display());
        Ok(())
    }
}
