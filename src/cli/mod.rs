//! Command-line interface

pub mod commands;
pub mod output;

use crate::core::{ConfigFile, ServerConfig};
use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::PushCommand;
use std::ffi::OsString;
use std::path::PathBuf;

/// Release and deployment client for a device management server
#[derive(Debug, Parser, Clone)]
#[command(name = "releasectl")]
#[command(version)]
#[command(about = "Package the current directory and deploy it to a device group", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a YAML configuration file
    #[arg(short, long, global = true, env = "RELEASECTL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Server URL
    #[arg(long, global = true, env = "RELEASECTL_SERVER")]
    pub server: Option<String>,

    /// Skip TLS certificate verification
    #[arg(short = 'k', long, global = true)]
    pub skip_verify: bool,

    /// Path to the authentication token written by login
    #[arg(long, global = true, env = "RELEASECTL_TOKEN")]
    pub token: Option<PathBuf>,
}

/// Available commands
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Create a new release and deploy it to the devices in GROUP
    ///
    /// Packages the source directory as an artifact using the artifact
    /// generator, uploads it to the server and deploys it to every device
    /// in the group. The artifact is deleted locally once deployed.
    Push(PushCommand),
}

impl Cli {
    /// Parse CLI arguments from environment
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Parse CLI arguments from a slice
    pub fn try_parse_from<I, T>(itr: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(itr)
    }

    /// Load the config file named by `--config`, if any
    pub fn config_file(&self) -> Result<ConfigFile> {
        match &self.config {
            Some(path) => ConfigFile::from_file(path),
            None => Ok(ConfigFile::default()),
        }
    }

    /// Server settings: flags over config file over defaults
    pub fn server_config(&self, file: &ConfigFile) -> ServerConfig {
        let mut server = file.server_config();
        if let Some(url) = &self.server {
            server.url = url.clone();
        }
        if self.skip_verify {
            server.skip_verify = true;
        }
        if let Some(token) = &self.token {
            server.token_path = token.clone();
        }
        server
    }
}
