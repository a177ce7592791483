//! Static token credentials.

use std::fmt;

use async_trait::async_trait;

use super::{CredentialInfo, TokenRetrievalError, VaultCredential, mask_token};
use crate::vault::VaultConfig;

/// A credential holding a plaintext Vault token.
#[derive(Clone)]
pub struct TokenCredential {
  info: CredentialInfo,
  token: String,
}

impl TokenCredential {
  /// Wrap `token` under the given identity.
  pub fn new(info: CredentialInfo, token: impl Into<String>) -> Self {
    Self {
      info,
      token: token.into(),
    }
  }
}

impl fmt::Debug for TokenCredential {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("TokenCredential")
      .field("info", &self.info)
      .field("token", &mask_token(&self.token))
      .finish()
  }
}

#[async_trait]
impl VaultCredential for TokenCredential {
  fn info(&self) -> &CredentialInfo {
    &self.info
  }

  fn kind(&self) -> &'static str {
    "token"
  }

  async fn token(&self, _config: &VaultConfig) -> Result<String, TokenRetrievalError> {
    Ok(self.token.clone())
  }
}
