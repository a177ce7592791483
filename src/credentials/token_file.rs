//! Token-file credentials.
//!
//! Reads the token from a file on every retrieval, so rotating the file's
//! contents takes effect without rebuilding the credential. The default
//! location is `~/.vault-token`, the file the `vault login` command writes.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use super::{CredentialInfo, TokenRetrievalError, VaultCredential};
use crate::vault::VaultConfig;

/// A credential whose token lives in a file.
#[derive(Debug, Clone)]
pub struct TokenFileCredential {
  info: CredentialInfo,
  path: PathBuf,
}

impl TokenFileCredential {
  /// Read the token from `path`.
  pub fn new(info: CredentialInfo, path: impl Into<PathBuf>) -> Self {
    Self {
      info,
      path: path.into(),
    }
  }

  /// Read the token from `~/.vault-token`.
  ///
  /// # Errors
  /// Returns [`TokenRetrievalError::MissingEnvironment`] when `HOME` is unset.
  pub fn from_home(info: CredentialInfo) -> Result<Self, TokenRetrievalError> {
    Ok(Self::new(info, default_token_path()?))
  }

  /// File the token is read from.
  pub fn path(&self) -> &Path {
    &self.path
  }
}

/// Location of the Vault CLI token helper file, `$HOME/.vault-token`.
pub fn default_token_path() -> Result<PathBuf, TokenRetrievalError> {
  let home = std::env::var("HOME").map_err(|_| TokenRetrievalError::MissingEnvironment("HOME"))?;
  Ok(Path::new(&home).join(".vault-token"))
}

#[async_trait]
impl VaultCredential for TokenFileCredential {
  fn info(&self) -> &CredentialInfo {
    &self.info
  }

  fn kind(&self) -> &'static str {
    "token_file"
  }

  async fn token(&self, _config: &VaultConfig) -> Result<String, TokenRetrievalError> {
    debug!(id = %self.info.id, path = %self.path.display(), "Reading token file");

    let content = tokio::fs::read_to_string(&self.path)
      .await
      .map_err(|source| TokenRetrievalError::Io {
        path: self.path.clone(),
        source,
      })?;

    Ok(content.trim().to_string())
  }
}
