//! Artifact generator backed by the directory-artifact-gen executable

use crate::artifact::{ArtifactGenerator, GenerateRequest, GenerationError};
use async_trait::async_trait;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Runs an external packaging executable to build artifacts
#[derive(Debug, Clone)]
pub struct DirectoryArtifactGen {
    /// Path to the generator executable
    program: String,

    /// Timeout for one generator run in seconds
    timeout_secs: u64,
}

impl DirectoryArtifactGen {
    /// Create a generator
    ///
    /// # Arguments
    /// * `program` - Path to the executable (e.g., "directory-artifact-gen")
    /// * `timeout_secs` - Timeout for one run in seconds
    pub fn new(program: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            program: program.into(),
            timeout_secs,
        }
    }

    /// Command-line arguments for a request, in invocation order
    pub fn arguments(request: &GenerateRequest) -> Vec<String> {
        vec![
            "--artifact-name".to_string(),
            request.artifact_name.clone(),
            "--device-type".to_string(),
            request.device_type.clone(),
            "--dest-dir".to_string(),
            request.dest_dir.clone(),
            "--output-path".to_string(),
            request.output_path.display().to_string(),
            request.source_dir.display().to_string(),
        ]
    }
}

#[async_trait]
impl ArtifactGenerator for DirectoryArtifactGen {
    /// Run the generator and wait for it to exit
    ///
    /// # Errors
    /// Returns `GenerationError` if:
    /// - The executable cannot be spawned
    /// - It exits with a non-zero status
    /// - It runs longer than the timeout
    /// - It exits successfully without writing the output file
    async fn generate(&self, request: &GenerateRequest) -> Result<(), GenerationError> {
        let args = Self::arguments(request);
        debug!("Running {} {}", self.program, args.join(" "));

        let output = timeout(
            Duration::from_secs(self.timeout_secs),
            Command::new(&self.program)
                .args(&args)
                .kill_on_drop(true)
                .output(),
        )
        .await
        .map_err(|_| GenerationError::Timeout(self.timeout_secs))?
        .map_err(|source| GenerationError::Spawn {
            program: self.program.clone(),
            source,
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            warn!(
                "{} exited with code {:?}: {}",
                self.program,
                output.status.code(),
                stderr
            );
            return Err(GenerationError::Exit {
                code: output.status.code(),
                stderr,
            });
        }

        if tokio::fs::metadata(&request.output_path).await.is_err() {
            return Err(GenerationError::MissingOutput(request.output_path.clone()));
        }

        debug!("Artifact written to {}", request.output_path.display());
        Ok(())
    }
}
