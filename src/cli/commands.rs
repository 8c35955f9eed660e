//! CLI command definitions

use crate::core::{ConfigFile, ReleaseSettings};
use clap::Args;
use std::path::PathBuf;

/// Create a release and deploy it to a device group
#[derive(Debug, Args, Clone)]
pub struct PushCommand {
    /// Device group to deploy to
    pub group: String,

    /// Device type to build for (inferred from the group's devices when omitted)
    #[arg(long)]
    pub device_type: Option<String>,

    /// Install location of the packaged files on the device
    #[arg(long)]
    pub dest_dir: Option<String>,

    /// Directory to package
    #[arg(long, default_value = ".")]
    pub source_dir: PathBuf,

    /// Directory the artifact file is written to
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Path to the artifact generator executable
    #[arg(long)]
    pub generator: Option<String>,

    /// Don't show upload progress
    #[arg(long)]
    pub no_progress: bool,
}

impl PushCommand {
    /// Release settings: flags over config file over defaults
    pub fn release_settings(&self, file: &ConfigFile) -> ReleaseSettings {
        let mut settings = file.release_settings().with_source_dir(self.source_dir.clone());
        if let Some(device_type) = &self.device_type {
            settings.device_type = Some(device_type.clone());
        }
        if let Some(dest_dir) = &self.dest_dir {
            settings.dest_dir = dest_dir.clone();
        }
        if let Some(output_dir) = &self.output_dir {
            settings.output_dir = output_dir.clone();
        }
        if let Some(generator) = &self.generator {
            settings.generator = generator.clone();
        }
        settings.show_progress = !self.no_progress;
        settings
    }
}
