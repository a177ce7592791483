//! HTTP client implementation for talking to the Vault REST API.

use std::fmt;

use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use super::api::VaultApi;
use super::config::VaultConfig;
use super::error::VaultApiError;
use super::models::{AuthResponse, ErrorResponse, SecretResponse, TokenLookup, TokenLookupResponse};

/// A Vault session: connection settings plus the token they are bound to.
///
/// Constructing a client performs no network I/O. Each instance owns its own
/// HTTP connection pool, so two clients never share state.
pub struct VaultClient {
  config: VaultConfig,
  http: reqwest::Client,
}

impl fmt::Debug for VaultClient {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("VaultClient").field("config", &self.config).finish_non_exhaustive()
  }
}

impl VaultClient {
  /// Create a client for `config`.
  ///
  /// # Arguments
  /// * `config` - Connection settings. The token, if any, is sent with every
  ///   request as `X-Vault-Token`.
  ///
  /// # Errors
  /// Returns [`VaultApiError::Build`] when the CA bundle cannot be parsed or
  /// the TLS backend fails to initialize.
  pub fn new(config: VaultConfig) -> Result<Self, VaultApiError> {
    let mut builder = reqwest::Client::builder()
      .timeout(config.timeout())
      .user_agent(format!("vault-creds/{} ({})", env!("CARGO_PKG_VERSION"), env!("TARGET")))
      .danger_accept_invalid_certs(config.skip_verify());

    if let Some(pem) = config.ca_cert_pem() {
      for certificate in reqwest::Certificate::from_pem_bundle(pem).map_err(VaultApiError::Build)? {
        builder = builder.add_root_certificate(certificate);
      }
    }

    let http = builder.build().map_err(VaultApiError::Build)?;

    Ok(Self { config, http })
  }

  /// The token this client authenticates with.
  pub fn token(&self) -> Option<&str> {
    self.config.token()
  }

  /// Connection settings the client was built from.
  pub fn config(&self) -> &VaultConfig {
    &self.config
  }

  /// Log in through an auth method mounted at `mount`.
  ///
  /// # Arguments
  /// * `mount` - Mount path of the auth method, such as `approle`.
  /// * `body` - Method-specific login payload.
  ///
  /// # Returns
  /// The login response; `auth.client_token` holds the issued token.
  pub async fn login(&self, mount: &str, body: &serde_json::Value) -> Result<AuthResponse, VaultApiError> {
    let mount = mount.trim_matches('/');
    if mount.is_empty() {
      return Err(VaultApiError::InvalidPath(String::new()));
    }

    let url = self.endpoint(&format!("auth/{mount}/login"))?;
    debug!(mount, "Logging in to Vault");
    self.send(self.request(Method::POST, url).json(body)).await
  }

  /// Unwrap the response-wrapping token this client is bound to.
  ///
  /// The wrapping token is single use; a second unwrap is rejected by Vault.
  pub async fn unwrap(&self) -> Result<AuthResponse, VaultApiError> {
    let url = self.endpoint("sys/wrapping/unwrap")?;
    debug!("Unwrapping response-wrapped token");
    self.send(self.request(Method::POST, url)).await
  }

  fn endpoint(&self, path: &str) -> Result<Url, VaultApiError> {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
      return Err(VaultApiError::InvalidPath(path.to_string()));
    }

    let mut url = self.config.address().clone();
    url
      .path_segments_mut()
      .map_err(|_| VaultApiError::InvalidPath(path.to_string()))?
      .pop_if_empty()
      .push("v1")
      .extend(trimmed.split('/'));

    Ok(url)
  }

  fn request(&self, method: Method, url: Url) -> reqwest::RequestBuilder {
    trace!(%method, path = url.path(), "Vault request");

    let mut request = self.http.request(method, url).header("Accept", "application/json");
    if let Some(token) = self.config.token() {
      request = request.header("X-Vault-Token", token);
    }
    if let Some(namespace) = self.config.namespace() {
      request = request.header("X-Vault-Namespace", namespace);
    }
    request
  }

  async fn send<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T, VaultApiError> {
    let response = request.send().await.map_err(VaultApiError::Network)?;

    let status = response.status();
    if !status.is_success() {
      let errors = response
        .json::<ErrorResponse>()
        .await
        .map(|body| body.errors)
        .unwrap_or_default();
      debug!(status = status.as_u16(), "Vault returned an error status");
      return Err(VaultApiError::Status {
        status: status.as_u16(),
        errors,
      });
    }

    response.json::<T>().await.map_err(VaultApiError::Decode)
  }
}

#[async_trait]
impl VaultApi for VaultClient {
  async fn lookup_self(&self) -> Result<TokenLookup, VaultApiError> {
    let url = self.endpoint("auth/token/lookup-self")?;
    let response: TokenLookupResponse = self.send(self.request(Method::GET, url)).await?;
    Ok(response.data)
  }

  async fn read_secret(&self, path: &str) -> Result<SecretResponse, VaultApiError> {
    let url = self.endpoint(path)?;
    self.send(self.request(Method::GET, url)).await
  }
}
