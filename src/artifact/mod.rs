//! Release artifacts and the generator that builds them

pub mod subprocess_generator;

use crate::core::Group;
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub use subprocess_generator::DirectoryArtifactGen;

/// File extension of generated artifacts
pub const ARTIFACT_EXTENSION: &str = "mender";

/// Error types for artifact generation
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("generator timed out after {0} seconds")]
    Timeout(u64),

    #[error("generator exited with code {}: {stderr}", code.map_or_else(|| "none".to_string(), |c| c.to_string()))]
    Exit { code: Option<i32>, stderr: String },

    #[error("generator succeeded but {} was not written", .0.display())]
    MissingOutput(PathBuf),
}

/// A generated artifact: its name and the file holding it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub name: String,
    pub path: PathBuf,
}

impl Artifact {
    /// Name and place the artifact for `group` built at `at`
    ///
    /// The name is `<group>-<RFC3339 UTC timestamp>` and the file is
    /// `<output_dir>/<name>.mender`.
    pub fn for_group(group: &Group, at: DateTime<Utc>, output_dir: &Path) -> Self {
        let name = format!(
            "{}-{}",
            group,
            at.to_rfc3339_opts(SecondsFormat::Secs, true)
        );
        let path = output_dir.join(format!("{}.{}", name, ARTIFACT_EXTENSION));
        Self { name, path }
    }
}

/// Everything the generator needs to build one artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateRequest {
    pub artifact_name: String,
    pub device_type: String,
    /// Directory to package
    pub source_dir: PathBuf,
    /// Install location on the device
    pub dest_dir: String,
    pub output_path: PathBuf,
}

/// Builds artifact files - allows for different implementations
#[async_trait]
pub trait ArtifactGenerator: Send + Sync {
    /// Build the artifact; on success the file exists at `request.output_path`
    async fn generate(&self, request: &GenerateRequest) -> Result<(), GenerationError>;
}
