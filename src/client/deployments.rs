//! Deployments API: deployment creation

use crate::client::{ApiError, DeploymentError, ManagementClient, Payload};
use crate::core::Credential;
use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use tracing::info;

pub const DEPLOYMENTS_PATH: &str = "/api/management/v1/deployments/deployments";

/// A deployment of an uploaded artifact to a set of devices
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentRequest {
    pub artifact_name: String,
    pub devices: Vec<String>,
    pub name: String,
}

/// Creates deployments on the service
#[async_trait]
pub trait DeploymentService: Send + Sync {
    async fn deploy(
        &self,
        request: &DeploymentRequest,
        credential: &Credential,
    ) -> Result<(), DeploymentError>;
}

#[async_trait]
impl DeploymentService for ManagementClient {
    /// Create the deployment; only `201 Created` counts as success
    async fn deploy(
        &self,
        request: &DeploymentRequest,
        credential: &Credential,
    ) -> Result<(), DeploymentError> {
        let wrap = |source: ApiError| DeploymentError {
            artifact_name: request.artifact_name.clone(),
            source,
        };

        let body = serde_json::json!({
            "artifact_name": request.artifact_name,
            "devices": request.devices,
            "name": request.name,
        });

        self.call(
            Method::POST,
            DEPLOYMENTS_PATH,
            &[],
            Payload::Json(body),
            credential,
            |s| s == StatusCode::CREATED,
        )
        .await
        .map_err(wrap)?;

        info!(
            "Created deployment {} for {} devices",
            request.name,
            request.devices.len()
        );
        Ok(())
    }
}
