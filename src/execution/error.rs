//! Push failures, one variant per failing step

use crate::artifact::{Artifact, GenerationError};
use crate::client::{DeploymentError, DirectoryError, UploadError};
use crate::core::{CredentialError, DeviceTypeError, GroupError, RunState};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// The step of a push run that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    Setup,
    Directory,
    DeviceType,
    Generation,
    Upload,
    Deployment,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Setup => "setup",
            Stage::Directory => "device listing",
            Stage::DeviceType => "device type resolution",
            Stage::Generation => "artifact generation",
            Stage::Upload => "artifact upload",
            Stage::Deployment => "deployment",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum PushError {
    #[error("not logged in: {0}")]
    Credential(#[from] CredentialError),

    #[error(transparent)]
    InvalidGroup(#[from] GroupError),

    #[error("push state is already {0:?}, runs start from Start")]
    AlreadyStarted(RunState),

    #[error(transparent)]
    Directory(#[from] DirectoryError),

    #[error("cannot determine device type for group '{group}': {source}")]
    DeviceType {
        group: String,
        #[source]
        source: DeviceTypeError,
    },

    #[error("generating artifact '{artifact_name}' failed: {source}")]
    Generation {
        artifact_name: String,
        /// Generator executable that was run
        program: String,
        #[source]
        source: GenerationError,
    },

    #[error("{source}")]
    Upload {
        artifact: Artifact,
        #[source]
        source: UploadError,
    },

    #[error("{source}")]
    Deployment {
        artifact: Artifact,
        #[source]
        source: DeploymentError,
    },
}

impl PushError {
    /// Which step failed
    pub fn stage(&self) -> Stage {
        match self {
            PushError::Credential(_)
            | PushError::InvalidGroup(_)
            | PushError::AlreadyStarted(_) => Stage::Setup,
            PushError::Directory(_) => Stage::Directory,
            PushError::DeviceType { .. } => Stage::DeviceType,
            PushError::Generation { .. } => Stage::Generation,
            PushError::Upload { .. } => Stage::Upload,
            PushError::Deployment { .. } => Stage::Deployment,
        }
    }

    /// HTTP status observed by the failing call, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            PushError::Directory(e) => e.status(),
            PushError::Upload { source, .. } => source.status(),
            PushError::Deployment { source, .. } => source.status(),
            _ => None,
        }
    }

    /// Check if the service rejected the credential
    pub fn is_unauthorized(&self) -> bool {
        match self {
            PushError::Directory(e) => e.source.is_unauthorized(),
            PushError::Upload { source, .. } => source.source.is_unauthorized(),
            PushError::Deployment { source, .. } => source.source.is_unauthorized(),
            _ => false,
        }
    }

    /// Artifact file left on disk by the failed run
    pub fn retained_artifact(&self) -> Option<&Path> {
        match self {
            PushError::Upload { artifact, .. } | PushError::Deployment { artifact, .. } => {
                Some(artifact.path.as_path())
            }
            _ => None,
        }
    }

    /// Something the operator can do about this failure
    pub fn hint(&self) -> Option<String> {
        match self {
            PushError::Credential(_) => Some("Please log in first".to_string()),
            PushError::Generation { program, .. } => {
                Some(format!("Make sure {} is installed and on your PATH", program))
            }
            PushError::DeviceType { .. } => {
                Some("Pass --device-type to choose the device type explicitly".to_string())
            }
            _ if self.is_unauthorized() => {
                Some("The session has expired, please log in again".to_string())
            }
            _ => None,
        }
    }
}
