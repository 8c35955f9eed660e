//! Client configuration: server connection and release settings

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_SERVER_URL: &str = "https://hosted.mender.io";
pub const DEFAULT_GENERATOR: &str = "directory-artifact-gen";
pub const DEFAULT_DEST_DIR: &str = "/opt/release";
pub const DEFAULT_GENERATOR_TIMEOUT_SECS: u64 = 600;

/// Default location of the token written by a login
pub fn default_token_path() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("mender")
        .join("authtoken")
}

/// Connection settings for the management service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Base URL of the management service
    pub url: String,

    /// Accept invalid TLS certificates
    pub skip_verify: bool,

    /// File holding the bearer token
    pub token_path: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_SERVER_URL.to_string(),
            skip_verify: false,
            token_path: default_token_path(),
        }
    }
}

impl ServerConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn with_skip_verify(mut self, skip_verify: bool) -> Self {
        self.skip_verify = skip_verify;
        self
    }

    pub fn with_token_path(mut self, token_path: impl Into<PathBuf>) -> Self {
        self.token_path = token_path.into();
        self
    }
}

/// How a release artifact is built for a push
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseSettings {
    /// Device type to build for; inferred from the group when unset
    pub device_type: Option<String>,

    /// Directory packaged into the artifact
    pub source_dir: PathBuf,

    /// Install location of the packaged files on the device
    pub dest_dir: String,

    /// Where the artifact file is written
    pub output_dir: PathBuf,

    /// Path to the artifact generator executable
    pub generator: String,

    /// Timeout for the generator process in seconds
    pub generator_timeout_secs: u64,

    /// Show a spinner while uploading
    pub show_progress: bool,
}

impl Default for ReleaseSettings {
    fn default() -> Self {
        Self {
            device_type: None,
            source_dir: PathBuf::from("."),
            dest_dir: DEFAULT_DEST_DIR.to_string(),
            output_dir: std::env::temp_dir(),
            generator: DEFAULT_GENERATOR.to_string(),
            generator_timeout_secs: DEFAULT_GENERATOR_TIMEOUT_SECS,
            show_progress: true,
        }
    }
}

impl ReleaseSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_device_type(mut self, device_type: impl Into<String>) -> Self {
        self.device_type = Some(device_type.into());
        self
    }

    pub fn with_source_dir(mut self, source_dir: impl Into<PathBuf>) -> Self {
        self.source_dir = source_dir.into();
        self
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }
}

/// Everything a push run is configured with
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PushConfig {
    pub server: ServerConfig,
    pub release: ReleaseSettings,
}

impl PushConfig {
    pub fn new(server: ServerConfig, release: ReleaseSettings) -> Self {
        Self { server, release }
    }
}

/// Optional settings loaded from a YAML file
///
/// Every key may be omitted; command-line flags take precedence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub server: Option<String>,

    #[serde(default)]
    pub skip_verify: Option<bool>,

    #[serde(default)]
    pub token_path: Option<PathBuf>,

    #[serde(default)]
    pub device_type: Option<String>,

    #[serde(default)]
    pub dest_dir: Option<String>,

    #[serde(default)]
    pub generator: Option<String>,

    #[serde(default)]
    pub generator_timeout_secs: Option<u64>,
}

impl ConfigFile {
    /// Load configuration from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_yaml(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Parse configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: ConfigFile =
            serde_yaml::from_str(yaml).context("Failed to parse YAML config")?;
        Ok(config)
    }

    /// Server settings with file values applied over the defaults
    pub fn server_config(&self) -> ServerConfig {
        let defaults = ServerConfig::default();
        ServerConfig {
            url: self.server.clone().unwrap_or(defaults.url),
            skip_verify: self.skip_verify.unwrap_or(defaults.skip_verify),
            token_path: self.token_path.clone().unwrap_or(defaults.token_path),
        }
    }

    /// Release settings with file values applied over the defaults
    pub fn release_settings(&self) -> ReleaseSettings {
        let defaults = ReleaseSettings::default();
        ReleaseSettings {
            device_type: self.device_type.clone(),
            dest_dir: self.dest_dir.clone().unwrap_or(defaults.dest_dir),
            generator: self.generator.clone().unwrap_or(defaults.generator),
            generator_timeout_secs: self
                .generator_timeout_secs
                .unwrap_or(defaults.generator_timeout_secs),
            ..defaults
        }
    }
}
