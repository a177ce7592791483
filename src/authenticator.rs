//! Turning a credential into an authorized Vault client.
//!
//! [`TokenAuthenticator`] asks a [`VaultCredential`] for its token, binds the
//! token to a copy of the caller's [`VaultConfig`] and builds a fresh
//! [`VaultClient`]. It keeps no state between calls, performs no retries and
//! passes every failure straight back to the caller.

use std::fmt;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::credentials::{TokenRetrievalError, VaultCredential};
use crate::vault::{VaultApi, VaultApiError, VaultClient, VaultConfig};

/// Errors returned by [`VaultAuthenticator::authorize`].
#[derive(Debug)]
pub enum AuthenticationError {
  /// The credential could not produce a usable token; no client was built
  TokenRetrieval(TokenRetrievalError),
  /// The client could not be constructed from the config
  ClientBuild(VaultApiError),
  /// Vault refused the token during verification
  Rejected { id: String, status: u16, errors: Vec<String> },
  /// Verification failed for a reason other than a refused token
  Backend(VaultApiError),
}

impl fmt::Display for AuthenticationError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::TokenRetrieval(err) => write!(f, "token retrieval failed: {err}"),
      Self::ClientBuild(err) => write!(f, "could not create Vault client: {err}"),
      Self::Rejected { id, status, errors } if errors.is_empty() => {
        write!(f, "Vault rejected the token of credential '{id}' (status {status})")
      }
      Self::Rejected { id, status, errors } => write!(
        f,
        "Vault rejected the token of credential '{id}' (status {status}): {}",
        errors.join("; ")
      ),
      Self::Backend(err) => write!(f, "could not verify token: {err}"),
    }
  }
}

impl std::error::Error for AuthenticationError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      Self::TokenRetrieval(err) => Some(err),
      Self::ClientBuild(err) | Self::Backend(err) => Some(err),
      Self::Rejected { .. } => None,
    }
  }
}

impl From<TokenRetrievalError> for AuthenticationError {
  fn from(err: TokenRetrievalError) -> Self {
    Self::TokenRetrieval(err)
  }
}

/// Capability to produce an authorized Vault client from a credential.
#[async_trait]
pub trait VaultAuthenticator: Send + Sync {
  /// Build a client bound to the token supplied by `credential`.
  ///
  /// # Arguments
  /// * `config` - Connection settings; any token already set on it is
  ///   replaced.
  /// * `credential` - Source of the token.
  ///
  /// # Returns
  /// A new client owned by the caller. Successive calls never share a client.
  ///
  /// # Errors
  /// Returns [`AuthenticationError::TokenRetrieval`] when the credential fails
  /// or yields an empty token, before any client is constructed.
  async fn authorize(
    &self,
    config: &VaultConfig,
    credential: &dyn VaultCredential,
  ) -> Result<VaultClient, AuthenticationError>;
}

/// The token-binding authenticator.
///
/// By default the returned client has not contacted Vault yet. A verifying
/// authenticator additionally calls `auth/token/lookup-self` so that a
/// revoked or expired token is reported at authorization time.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenAuthenticator {
  verify: bool,
}

impl TokenAuthenticator {
  /// Authenticator that performs no network I/O of its own.
  pub fn new() -> Self {
    Self { verify: false }
  }

  /// Authenticator that checks the token with Vault before returning.
  pub fn verifying() -> Self {
    Self { verify: true }
  }

  /// Whether tokens are checked with Vault.
  pub fn verifies(&self) -> bool {
    self.verify
  }
}

#[async_trait]
impl VaultAuthenticator for TokenAuthenticator {
  async fn authorize(
    &self,
    config: &VaultConfig,
    credential: &dyn VaultCredential,
  ) -> Result<VaultClient, AuthenticationError> {
    let id = credential.id();
    debug!(id, kind = credential.kind(), "Retrieving token");

    let token = credential.token(config).await?;
    if token.trim().is_empty() {
      return Err(TokenRetrievalError::EmptyToken { id: id.to_string() }.into());
    }

    let client = VaultClient::new(config.with_token(token)).map_err(AuthenticationError::ClientBuild)?;

    if self.verify {
      match client.lookup_self().await {
        Ok(lookup) => {
          info!(id, display_name = %lookup.display_name, "Token verified");
        }
        Err(VaultApiError::Status { status, errors }) if matches!(status, 401 | 403) => {
          return Err(AuthenticationError::Rejected {
            id: id.to_string(),
            status,
            errors,
          });
        }
        Err(err) => return Err(AuthenticationError::Backend(err)),
      }
    }

    debug!(id, address = %config.address_str(), "Authorized Vault client");
    Ok(client)
  }
}

#[cfg(test)]
mod tests {
  use std::sync::atomic::{AtomicUsize, Ordering};

  use serde_json::json;
  use wiremock::matchers::{header, method, path};
  use wiremock::{Mock, MockServer, ResponseTemplate};

  use super::*;
  use crate::credentials::{CredentialInfo, TokenCredential};

  struct CountingCredential {
    info: CredentialInfo,
    result: fn() -> Result<String, TokenRetrievalError>,
    calls: AtomicUsize,
  }

  impl CountingCredential {
    fn new(result: fn() -> Result<String, TokenRetrievalError>) -> Self {
      Self {
        info: CredentialInfo::new("counting"),
        result,
        calls: AtomicUsize::new(0),
      }
    }
  }

  #[async_trait]
  impl VaultCredential for CountingCredential {
    fn info(&self) -> &CredentialInfo {
      &self.info
    }

    fn kind(&self) -> &'static str {
      "counting"
    }

    async fn token(&self, _config: &VaultConfig) -> Result<String, TokenRetrievalError> {
      self.calls.fetch_add(1, Ordering::SeqCst);
      (self.result)()
    }
  }

  fn config() -> VaultConfig {
    VaultConfig::builder()
      .address("https://vault.example.com:8200")
      .build()
      .unwrap()
  }

  #[tokio::test]
  async fn test_binds_credential_token() {
    let credential = TokenCredential::new(CredentialInfo::new("static"), "s.abcdef123");

    let client = TokenAuthenticator::new().authorize(&config(), &credential).await.unwrap();

    assert_eq!(client.token(), Some("s.abcdef123"));
    assert_eq!(client.config().address_str(), "https://vault.example.com:8200");
  }

  #[tokio::test]
  async fn test_replaces_token_already_on_config() {
    let credential = TokenCredential::new(CredentialInfo::new("static"), "s.fromcredential");
    let config = config().with_token("s.stale");

    let client = TokenAuthenticator::new().authorize(&config, &credential).await.unwrap();

    assert_eq!(client.token(), Some("s.fromcredential"));
    assert_eq!(config.token(), Some("s.stale"));
  }

  #[tokio::test]
  async fn test_empty_token_fails_before_construction() {
    let credential = CountingCredential::new(|| Ok(String::new()));

    let err = TokenAuthenticator::new()
      .authorize(&config(), &credential)
      .await
      .unwrap_err();

    assert!(matches!(
      err,
      AuthenticationError::TokenRetrieval(TokenRetrievalError::EmptyToken { ref id }) if id == "counting"
    ));
    assert_eq!(credential.calls.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn test_unusable_ca_bundle_is_client_build_error() {
    let credential = CountingCredential::new(|| Ok("s.abcdef123".to_string()));
    let config = VaultConfig::builder()
      .address("https://vault.example.com:8200")
      .ca_cert_pem(b"-----BEGIN CERTIFICATE-----\nnotbase64!!\n-----END CERTIFICATE-----\n".to_vec())
      .build()
      .unwrap();

    let err = TokenAuthenticator::new()
      .authorize(&config, &credential)
      .await
      .unwrap_err();

    assert!(matches!(err, AuthenticationError::ClientBuild(VaultApiError::Build(_))));
    assert_eq!(credential.calls.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn test_whitespace_token_is_empty() {
    let credential = CountingCredential::new(|| Ok(" \n".to_string()));

    let err = TokenAuthenticator::new()
      .authorize(&config(), &credential)
      .await
      .unwrap_err();

    assert!(matches!(
      err,
      AuthenticationError::TokenRetrieval(TokenRetrievalError::EmptyToken { .. })
    ));
  }

  #[tokio::test]
  async fn test_retrieval_failure_passes_through() {
    let credential = CountingCredential::new(|| Err(TokenRetrievalError::MissingEnvironment("HOME")));

    let err = TokenAuthenticator::new()
      .authorize(&config(), &credential)
      .await
      .unwrap_err();

    assert!(matches!(
      err,
      AuthenticationError::TokenRetrieval(TokenRetrievalError::MissingEnvironment("HOME"))
    ));
    assert!(err.to_string().contains("HOME"));
  }

  #[tokio::test]
  async fn test_each_call_returns_independent_client() {
    let credential = TokenCredential::new(CredentialInfo::new("static"), "s.abcdef123");
    let authenticator = TokenAuthenticator::new();
    let config = config();

    let first = authenticator.authorize(&config, &credential).await.unwrap();
    let second = authenticator.authorize(&config, &credential).await.unwrap();

    assert!(!std::ptr::eq(&first, &second));
    assert_eq!(first.token(), second.token());
    assert_eq!(first.config(), second.config());

    drop(first);
    assert_eq!(second.token(), Some("s.abcdef123"));
  }

  #[tokio::test]
  async fn test_concurrent_authorizations() {
    let authenticator = TokenAuthenticator::new();
    let config = config();
    let credentials: Vec<TokenCredential> = (0..16)
      .map(|i| TokenCredential::new(CredentialInfo::new(format!("c{i}")), format!("s.token{i}")))
      .collect();

    let clients = futures::future::join_all(
      credentials
        .iter()
        .map(|credential| authenticator.authorize(&config, credential)),
    )
    .await;

    for (i, client) in clients.into_iter().enumerate() {
      assert_eq!(client.unwrap().token(), Some(format!("s.token{i}").as_str()));
    }
  }

  #[tokio::test]
  async fn test_lazy_mode_makes_no_requests() {
    let server = MockServer::start().await;
    let config = VaultConfig::builder().address(server.uri()).build().unwrap();
    let credential = TokenCredential::new(CredentialInfo::new("static"), "s.abcdef123");

    TokenAuthenticator::new().authorize(&config, &credential).await.unwrap();

    assert!(server.received_requests().await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn test_verifying_mode_accepts_valid_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path("/v1/auth/token/lookup-self"))
      .and(header("x-vault-token", "s.valid"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({
        "data": { "display_name": "token", "policies": ["default"], "ttl": 60 }
      })))
      .expect(1)
      .mount(&server)
      .await;

    let config = VaultConfig::builder().address(server.uri()).build().unwrap();
    let credential = TokenCredential::new(CredentialInfo::new("static"), "s.valid");

    let client = TokenAuthenticator::verifying()
      .authorize(&config, &credential)
      .await
      .unwrap();
    assert_eq!(client.token(), Some("s.valid"));
  }

  #[tokio::test]
  async fn test_verifying_mode_reports_rejection() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path("/v1/auth/token/lookup-self"))
      .respond_with(ResponseTemplate::new(403).set_body_json(json!({ "errors": ["permission denied"] })))
      .mount(&server)
      .await;

    let config = VaultConfig::builder().address(server.uri()).build().unwrap();
    let credential = TokenCredential::new(CredentialInfo::new("static"), "s.revoked");

    let err = TokenAuthenticator::verifying()
      .authorize(&config, &credential)
      .await
      .unwrap_err();

    match err {
      AuthenticationError::Rejected { id, status, errors } => {
        assert_eq!(id, "static");
        assert_eq!(status, 403);
        assert_eq!(errors, vec!["permission denied".to_string()]);
      }
      other => panic!("unexpected error: {other:?}"),
    }
  }

  #[tokio::test]
  async fn test_verifying_mode_server_error_is_backend() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path("/v1/auth/token/lookup-self"))
      .respond_with(ResponseTemplate::new(503))
      .mount(&server)
      .await;

    let config = VaultConfig::builder().address(server.uri()).build().unwrap();
    let credential = TokenCredential::new(CredentialInfo::new("static"), "s.valid");

    let err = TokenAuthenticator::verifying()
      .authorize(&config, &credential)
      .await
      .unwrap_err();
    assert!(matches!(err, AuthenticationError::Backend(ref e) if e.status() == Some(503)));
  }
}
