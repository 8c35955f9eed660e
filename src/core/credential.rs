//! Bearer token loading

use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("cannot read token from {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("token file {} is empty", path.display())]
    Empty { path: PathBuf },
}

/// A bearer token for the management API
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Read the token stored at `path` by a previous login
    pub async fn from_file(path: &Path) -> Result<Self, CredentialError> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| CredentialError::Unreadable {
                path: path.to_path_buf(),
                source,
            })?;

        let token = raw.trim();
        if token.is_empty() {
            return Err(CredentialError::Empty {
                path: path.to_path_buf(),
            });
        }

        Ok(Self(token.to_string()))
    }

    /// Value for the `Authorization` header
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}
