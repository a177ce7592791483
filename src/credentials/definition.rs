//! Serializable credential definitions.
//!
//! A credentials file is a JSON array of definitions tagged by `kind`:
//!
//! ```json
//! [
//!   { "kind": "token", "id": "ops", "token": "s.xxxxx" },
//!   { "kind": "app_role", "id": "ci", "scope": "system", "role_id": "...", "secret_id": "..." },
//!   { "kind": "kubernetes", "id": "pod", "role": "builder" }
//! ]
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{
  AppRoleCredential, CredentialInfo, GithubTokenCredential, KubernetesCredential, TokenCredential,
  TokenFileCredential, TokenRetrievalError, VaultCredential, WrappedTokenCredential,
};

/// One entry of a credentials file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CredentialDefinition {
  Token {
    #[serde(flatten)]
    info: CredentialInfo,
    token: String,
  },
  TokenFile {
    #[serde(flatten)]
    info: CredentialInfo,
    /// Defaults to `~/.vault-token`
    #[serde(default)]
    path: Option<PathBuf>,
  },
  AppRole {
    #[serde(flatten)]
    info: CredentialInfo,
    role_id: String,
    secret_id: String,
    #[serde(default)]
    mount: Option<String>,
  },
  Github {
    #[serde(flatten)]
    info: CredentialInfo,
    access_token: String,
    #[serde(default)]
    mount: Option<String>,
  },
  Kubernetes {
    #[serde(flatten)]
    info: CredentialInfo,
    role: String,
    #[serde(default)]
    jwt_path: Option<PathBuf>,
    #[serde(default)]
    mount: Option<String>,
  },
  Wrapped {
    #[serde(flatten)]
    info: CredentialInfo,
    wrapping_token: String,
  },
}

impl CredentialDefinition {
  /// Identity of the defined credential.
  pub fn info(&self) -> &CredentialInfo {
    match self {
      Self::Token { info, .. }
      | Self::TokenFile { info, .. }
      | Self::AppRole { info, .. }
      | Self::Github { info, .. }
      | Self::Kubernetes { info, .. }
      | Self::Wrapped { info, .. } => info,
    }
  }

  /// Build the credential this entry describes.
  ///
  /// # Errors
  /// Returns an error when a token file has no explicit path and `HOME` is
  /// not set.
  pub fn build(self) -> Result<Arc<dyn VaultCredential>, TokenRetrievalError> {
    let credential: Arc<dyn VaultCredential> = match self {
      Self::Token { info, token } => Arc::new(TokenCredential::new(info, token)),
      Self::TokenFile { info, path: Some(path) } => Arc::new(TokenFileCredential::new(info, path)),
      Self::TokenFile { info, path: None } => Arc::new(TokenFileCredential::from_home(info)?),
      Self::AppRole {
        info,
        role_id,
        secret_id,
        mount,
      } => {
        let credential = AppRoleCredential::new(info, role_id, secret_id);
        Arc::new(match mount {
          Some(mount) => credential.with_mount(mount),
          None => credential,
        })
      }
      Self::Github {
        info,
        access_token,
        mount,
      } => {
        let credential = GithubTokenCredential::new(info, access_token);
        Arc::new(match mount {
          Some(mount) => credential.with_mount(mount),
          None => credential,
        })
      }
      Self::Kubernetes {
        info,
        role,
        jwt_path,
        mount,
      } => {
        let mut credential = KubernetesCredential::new(info, role);
        if let Some(path) = jwt_path {
          credential = credential.with_jwt_path(path);
        }
        if let Some(mount) = mount {
          credential = credential.with_mount(mount);
        }
        Arc::new(credential)
      }
      Self::Wrapped { info, wrapping_token } => Arc::new(WrappedTokenCredential::new(info, wrapping_token)),
    };

    Ok(credential)
  }
}
