//! Core domain models
//!
//! Groups, devices, credentials, configuration and the state of a push run.

pub mod config;
pub mod credential;
pub mod device;
pub mod group;
pub mod state;

pub use config::{ConfigFile, PushConfig, ReleaseSettings, ServerConfig};
pub use credential::{Credential, CredentialError};
pub use device::{Attribute, Device, DeviceSet, DeviceTypeError};
pub use group::{Group, GroupError};
pub use state::{PushState, RunState};
