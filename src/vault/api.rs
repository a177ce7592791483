//! Trait definitions for interacting with Vault.

use async_trait::async_trait;

use super::error::VaultApiError;
use super::models::{SecretResponse, TokenLookup};
use super::path::SecretRef;

/// Operations available to an authorized Vault session (enables testing with
/// fake implementations).
#[async_trait]
pub trait VaultApi: Send + Sync {
  /// Describe the token this session is bound to.
  ///
  /// # Returns
  /// The `auth/token/lookup-self` data for the bound token.
  ///
  /// # Errors
  /// Returns a status error when Vault rejects the token and a network error
  /// when Vault is unreachable.
  async fn lookup_self(&self) -> Result<TokenLookup, VaultApiError>;

  /// Read the secret at a logical path.
  ///
  /// # Arguments
  /// * `path` - Logical path such as `secret/data/app` (KV v2) or `kv/app`
  ///   (KV v1).
  async fn read_secret(&self, path: &str) -> Result<SecretResponse, VaultApiError>;

  /// Read one field of a secret.
  ///
  /// # Errors
  /// Returns [`VaultApiError::MissingField`] when the secret exists but does
  /// not contain the field, or when `reference` selects no field.
  async fn read_field(&self, reference: &SecretRef) -> Result<String, VaultApiError> {
    let field = reference.field.as_deref().unwrap_or_default();
    let secret = self.read_secret(&reference.path).await?;
    secret.field(field).ok_or_else(|| VaultApiError::MissingField {
      path: reference.path.clone(),
      field: field.to_string(),
    })
  }
}
