//! releasectl - package a directory as a release artifact and deploy it to a device group

pub mod artifact;
pub mod cli;
pub mod client;
pub mod core;
pub mod execution;

// Re-export commonly used types
pub use artifact::{Artifact, ArtifactGenerator, DirectoryArtifactGen, GenerateRequest, GenerationError};
pub use client::{ArtifactStore, DeploymentService, DeviceDirectory, ManagementClient};
pub use core::{Credential, DeviceSet, Group, PushConfig, ReleaseSettings, RunState, ServerConfig};
pub use execution::{PushError, PushEvent, PushOutcome, ReleasePipeline, Stage};
