//! Kubernetes service-account credentials.
//!
//! The service-account JWT is read from disk on every retrieval because the
//! kubelet rotates projected tokens in place.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::json;

use super::login::{login, mount_or};
use super::{CredentialInfo, TokenRetrievalError, VaultCredential};
use crate::vault::VaultConfig;

const DEFAULT_MOUNT: &str = "kubernetes";

/// Where the kubelet mounts the pod's service-account token.
pub const SERVICE_ACCOUNT_TOKEN_PATH: &str = "/var/run/secrets/kubernetes.io/serviceaccount/token";

/// A credential that logs in with the pod's service-account JWT.
#[derive(Debug, Clone)]
pub struct KubernetesCredential {
  info: CredentialInfo,
  role: String,
  jwt_path: PathBuf,
  mount: Option<String>,
}

impl KubernetesCredential {
  /// Log in as `role` using the default service-account token path.
  pub fn new(info: CredentialInfo, role: impl Into<String>) -> Self {
    Self {
      info,
      role: role.into(),
      jwt_path: PathBuf::from(SERVICE_ACCOUNT_TOKEN_PATH),
      mount: None,
    }
  }

  /// Read the JWT from `path` instead of the default location.
  pub fn with_jwt_path(mut self, path: impl Into<PathBuf>) -> Self {
    self.jwt_path = path.into();
    self
  }

  /// Log in through the auth method mounted at `mount` (default `kubernetes`).
  pub fn with_mount(mut self, mount: impl Into<String>) -> Self {
    self.mount = Some(mount.into());
    self
  }

  /// Vault role bound to the service account.
  pub fn role(&self) -> &str {
    &self.role
  }

  /// File the JWT is read from.
  pub fn jwt_path(&self) -> &Path {
    &self.jwt_path
  }

  /// Effective mount path of the auth method.
  pub fn mount(&self) -> &str {
    mount_or(&self.mount, DEFAULT_MOUNT)
  }
}

#[async_trait]
impl VaultCredential for KubernetesCredential {
  fn info(&self) -> &CredentialInfo {
    &self.info
  }

  fn kind(&self) -> &'static str {
    "kubernetes"
  }

  async fn token(&self, config: &VaultConfig) -> Result<String, TokenRetrievalError> {
    let jwt = tokio::fs::read_to_string(&self.jwt_path)
      .await
      .map_err(|source| TokenRetrievalError::Io {
        path: self.jwt_path.clone(),
        source,
      })?;

    let body = json!({ "role": self.role, "jwt": jwt.trim() });
    login(&self.info.id, config, self.mount(), &body).await
  }
}
