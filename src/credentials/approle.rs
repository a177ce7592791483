//! AppRole credentials.

use std::fmt;

use async_trait::async_trait;
use serde_json::json;

use super::login::{login, mount_or};
use super::{CredentialInfo, TokenRetrievalError, VaultCredential, mask_token};
use crate::vault::VaultConfig;

const DEFAULT_MOUNT: &str = "approle";

/// A credential that logs in with an AppRole role ID and secret ID.
#[derive(Clone)]
pub struct AppRoleCredential {
  info: CredentialInfo,
  role_id: String,
  secret_id: String,
  mount: Option<String>,
}

impl AppRoleCredential {
  /// Log in at the default `approle` mount.
  pub fn new(info: CredentialInfo, role_id: impl Into<String>, secret_id: impl Into<String>) -> Self {
    Self {
      info,
      role_id: role_id.into(),
      secret_id: secret_id.into(),
      mount: None,
    }
  }

  /// Log in at a custom mount path instead of `approle`.
  pub fn with_mount(mut self, mount: impl Into<String>) -> Self {
    self.mount = Some(mount.into());
    self
  }

  /// Role ID sent at login.
  pub fn role_id(&self) -> &str {
    &self.role_id
  }

  /// Mount path the login is sent to.
  pub fn mount(&self) -> &str {
    mount_or(&self.mount, DEFAULT_MOUNT)
  }
}

impl fmt::Debug for AppRoleCredential {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("AppRoleCredential")
      .field("info", &self.info)
      .field("role_id", &self.role_id)
      .field("secret_id", &mask_token(&self.secret_id))
      .field("mount", &self.mount())
      .finish()
  }
}

#[async_trait]
impl VaultCredential for AppRoleCredential {
  fn info(&self) -> &CredentialInfo {
    &self.info
  }

  fn kind(&self) -> &'static str {
    "app_role"
  }

  async fn token(&self, config: &VaultConfig) -> Result<String, TokenRetrievalError> {
    let body = json!({ "role_id": self.role_id, "secret_id": self.secret_id });
    login(&self.info.id, config, self.mount(), &body).await
  }
}
