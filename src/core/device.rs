//! Device inventory records

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Inventory attribute carrying the device type reported by the device
pub const DEVICE_TYPE_ATTRIBUTE: &str = "device_type";

/// A single inventory attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,

    /// Attribute value, a string or a list of strings in practice
    #[serde(default)]
    pub value: Value,

    #[serde(default)]
    pub description: Option<String>,
}

/// A device as listed by the inventory service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub id: String,

    #[serde(default)]
    pub attributes: Vec<Attribute>,

    #[serde(default)]
    pub updated_ts: Option<String>,
}

impl Device {
    /// Look up an attribute by name
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// The device type this device reports, if it reports exactly one
    pub fn device_type(&self) -> Option<&str> {
        match &self.attribute(DEVICE_TYPE_ATTRIBUTE)?.value {
            Value::String(s) => Some(s.as_str()),
            Value::Array(items) if items.len() == 1 => items[0].as_str(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeviceTypeError {
    #[error("device {0} does not report a device type")]
    Missing(String),

    #[error("devices report conflicting device types: {}", .0.join(", "))]
    Conflicting(Vec<String>),

    #[error("no devices to infer a device type from")]
    NoDevices,
}

/// The devices resolved for a group, in server response order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceSet {
    devices: Vec<Device>,
}

impl DeviceSet {
    pub fn new(devices: Vec<Device>) -> Self {
        Self { devices }
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    /// Device identifiers in response order
    pub fn ids(&self) -> Vec<String> {
        self.devices.iter().map(|d| d.id.clone()).collect()
    }

    /// Infer the single device type shared by every device in the set
    pub fn common_device_type(&self) -> Result<String, DeviceTypeError> {
        let mut found: Vec<String> = Vec::new();
        for device in &self.devices {
            let device_type = device
                .device_type()
                .ok_or_else(|| DeviceTypeError::Missing(device.id.clone()))?;
            if !found.iter().any(|t| t == device_type) {
                found.push(device_type.to_string());
            }
        }

        match found.len() {
            0 => Err(DeviceTypeError::NoDevices),
            1 => Ok(found.remove(0)),
            _ => Err(DeviceTypeError::Conflicting(found)),
        }
    }
}

impl From<Vec<Device>> for DeviceSet {
    fn from(devices: Vec<Device>) -> Self {
        Self::new(devices)
    }
}
