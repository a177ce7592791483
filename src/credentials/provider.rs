//! The credential capability trait.
//!
//! Defines [`VaultCredential`] so that different token sources (static
//! tokens, token files, auth-method logins, wrapped tokens) can plug into the
//! authenticator without changing call sites.

use async_trait::async_trait;

use super::{CredentialInfo, CredentialScope, TokenRetrievalError};
use crate::vault::VaultConfig;

/// A stored identity that can produce a Vault token.
#[async_trait]
pub trait VaultCredential: Send + Sync {
  /// Identity and visibility of the credential.
  fn info(&self) -> &CredentialInfo;

  /// Short name of the retrieval strategy, such as `token` or `app_role`.
  fn kind(&self) -> &'static str;

  /// Produce the token to bind to a client.
  ///
  /// # Arguments
  /// * `config` - Connection settings of the target server. Strategies that
  ///   log in or unwrap use it to reach Vault; static ones ignore it.
  ///
  /// # Returns
  /// The current token value. Implementations do not check it for emptiness;
  /// the authenticator does.
  ///
  /// # Errors
  /// Returns [`TokenRetrievalError`] when the token source is unreachable or
  /// Vault refuses the login.
  async fn token(&self, config: &VaultConfig) -> Result<String, TokenRetrievalError>;

  /// Unique identifier.
  fn id(&self) -> &str {
    &self.info().id
  }

  /// Free-form description.
  fn description(&self) -> &str {
    &self.info().description
  }

  /// Visibility scope.
  fn scope(&self) -> CredentialScope {
    self.info().scope
  }

  /// Whether retrieving the token consumes the credential, so it cannot be
  /// checked without being spent.
  fn is_single_use(&self) -> bool {
    false
  }
}
