//! Shared plumbing for credentials that obtain their token from Vault.

use serde_json::Value;
use tracing::debug;

use super::TokenRetrievalError;
use crate::vault::{AuthResponse, VaultApiError, VaultClient, VaultConfig};

/// Log in through the auth method at `mount` and return the issued token.
///
/// The login request is sent without any token that may already be bound to
/// `config`.
pub(crate) async fn login(
  id: &str,
  config: &VaultConfig,
  mount: &str,
  body: &Value,
) -> Result<String, TokenRetrievalError> {
  debug!(id, mount, "Requesting token from auth method");

  let client = VaultClient::new(config.without_token()).map_err(|source| backend(id, source))?;
  let response = client.login(mount, body).await.map_err(|source| backend(id, source))?;
  client_token(id, response)
}

/// Unwrap `wrapping_token` and return the token it protects.
pub(crate) async fn unwrap(id: &str, config: &VaultConfig, wrapping_token: &str) -> Result<String, TokenRetrievalError> {
  debug!(id, "Unwrapping response-wrapped token");

  let client = VaultClient::new(config.with_token(wrapping_token)).map_err(|source| backend(id, source))?;
  let response = client.unwrap().await.map_err(|source| backend(id, source))?;
  client_token(id, response)
}

fn client_token(id: &str, response: AuthResponse) -> Result<String, TokenRetrievalError> {
  let auth = response
    .auth
    .ok_or_else(|| TokenRetrievalError::MissingAuth { id: id.to_string() })?;
  Ok(auth.client_token)
}

fn backend(id: &str, source: VaultApiError) -> TokenRetrievalError {
  TokenRetrievalError::Backend {
    id: id.to_string(),
    source,
  }
}

/// Default mount of an auth method when none is configured.
pub(crate) fn mount_or<'a>(mount: &'a Option<String>, default: &'a str) -> &'a str {
  mount.as_deref().map(|m| m.trim_matches('/')).filter(|m| !m.is_empty()).unwrap_or(default)
}
