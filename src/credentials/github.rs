//! GitHub personal-access-token credentials.

use std::fmt;

use async_trait::async_trait;
use serde_json::json;

use super::login::{login, mount_or};
use super::{CredentialInfo, TokenRetrievalError, VaultCredential, mask_token};
use crate::vault::VaultConfig;

const DEFAULT_MOUNT: &str = "github";

/// A credential that exchanges a GitHub token for a Vault token.
#[derive(Clone)]
pub struct GithubTokenCredential {
  info: CredentialInfo,
  access_token: String,
  mount: Option<String>,
}

impl GithubTokenCredential {
  pub fn new(info: CredentialInfo, access_token: impl Into<String>) -> Self {
    Self {
      info,
      access_token: access_token.into(),
      mount: None,
    }
  }

  pub fn with_mount(mut self, mount: impl Into<String>) -> Self {
    self.mount = Some(mount.into());
    self
  }

  pub fn mount(&self) -> &str {
    mount_or(&self.mount, DEFAULT_MOUNT)
  }
}

impl fmt::Debug for GithubTokenCredential {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("GithubTokenCredential")
      .field("info", &self.info)
      .field("access_token", &mask_token(&self.access_token))
      .field("mount", &self.mount())
      .finish()
  }
}

#[async_trait]
impl VaultCredential for GithubTokenCredential {
  fn info(&self) -> &CredentialInfo {
    &self.info
  }

  fn kind(&self) -> &'static str {
    "github"
  }

  async fn token(&self, config: &VaultConfig) -> Result<String, TokenRetrievalError> {
    let body = json!({ "token": self.access_token });
    login(&self.info.id, config, self.mount(), &body).await
  }
}

#[cfg(test)]
mod tests {
  use wiremock::matchers::{body_json, method, path};
  use wiremock::{Mock, MockServer, ResponseTemplate};

  use super::*;

  #[tokio::test]
  async fn test_login_with_github_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
      .and(path("/v1/auth/github/login"))
      .and(body_json(json!({ "token": "ghp_example" })))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({
        "auth": { "client_token": "s.github" }
      })))
      .mount(&server)
      .await;

    let credential = GithubTokenCredential::new(CredentialInfo::new("gh"), "ghp_example");
    let config = VaultConfig::builder().address(server.uri()).build().unwrap();

    assert_eq!(credential.token(&config).await.unwrap(), "s.github");
  }
}
