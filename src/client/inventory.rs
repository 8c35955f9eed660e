//! Inventory API: devices by group

use crate::client::{ApiError, DirectoryError, ManagementClient, Payload};
use crate::core::{Credential, Device, DeviceSet, Group};
use async_trait::async_trait;
use reqwest::Method;
use tracing::debug;

pub const DEVICES_PATH: &str = "/api/management/v1/inventory/devices";

/// Looks up the devices that belong to a group
#[async_trait]
pub trait DeviceDirectory: Send + Sync {
    /// List every device in `group`, in the order the service returns them
    async fn list_devices(
        &self,
        group: &Group,
        credential: &Credential,
    ) -> Result<DeviceSet, DirectoryError>;
}

#[async_trait]
impl DeviceDirectory for ManagementClient {
    async fn list_devices(
        &self,
        group: &Group,
        credential: &Credential,
    ) -> Result<DeviceSet, DirectoryError> {
        let wrap = |source: ApiError| DirectoryError {
            group: group.to_string(),
            source,
        };

        let response = self
            .call(
                Method::GET,
                DEVICES_PATH,
                &[("group", group.as_str())],
                Payload::Empty,
                credential,
                |s| s.is_success(),
            )
            .await
            .map_err(wrap)?;

        let devices: Vec<Device> = Self::read_json(Method::GET, response).await.map_err(wrap)?;
        debug!("group {} has {} devices", group, devices.len());

        Ok(DeviceSet::new(devices))
    }
}
