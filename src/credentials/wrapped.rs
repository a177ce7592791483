//! Response-wrapped token credentials.
//!
//! A wrapping token can be unwrapped exactly once, so the first successful
//! retrieval consumes it and later retrievals fail with a 400 from Vault.

use std::fmt;

use async_trait::async_trait;

use super::login::unwrap;
use super::{CredentialInfo, TokenRetrievalError, VaultCredential, mask_token};
use crate::vault::VaultConfig;

/// A credential holding a single-use wrapping token.
///
/// The token it yields is the `auth.client_token` of the unwrapped response.
#[derive(Clone)]
pub struct WrappedTokenCredential {
  info: CredentialInfo,
  wrapping_token: String,
}

impl WrappedTokenCredential {
  /// Wrap `wrapping_token`, as returned by a `-wrap-ttl` request.
  pub fn new(info: CredentialInfo, wrapping_token: impl Into<String>) -> Self {
    Self {
      info,
      wrapping_token: wrapping_token.into(),
    }
  }
}

impl fmt::Debug for WrappedTokenCredential {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("WrappedTokenCredential")
      .field("info", &self.info)
      .field("wrapping_token", &mask_token(&self.wrapping_token))
      .finish()
  }
}

#[async_trait]
impl VaultCredential for WrappedTokenCredential {
  fn info(&self) -> &CredentialInfo {
    &self.info
  }

  fn kind(&self) -> &'static str {
    "wrapped"
  }

  fn is_single_use(&self) -> bool {
    true
  }

  async fn token(&self, config: &VaultConfig) -> Result<String, TokenRetrievalError> {
    if self.wrapping_token.trim().is_empty() {
      return Err(TokenRetrievalError::EmptyToken {
        id: self.info.id.clone(),
      });
    }
    unwrap(&self.info.id, config, &self.wrapping_token).await
  }
}
