//! Connection settings for a Vault server.
//!
//! A [`VaultConfig`] is assembled once through [`VaultConfigBuilder`] and is
//! never mutated afterwards. Injecting a token produces a new value via
//! [`VaultConfig::with_token`], so a config can be shared between many
//! authorization calls without any of them observing another's token.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use url::Url;

use crate::credentials::mask_token;

/// Request timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Address used when `VAULT_ADDR` is not set.
pub const DEFAULT_ADDRESS: &str = "https://127.0.0.1:8200";

/// Errors raised while assembling a [`VaultConfig`].
#[derive(Debug)]
pub enum ConfigError {
  /// The server address could not be parsed or uses an unsupported scheme
  InvalidAddress(String),
  /// The CA certificate bundle could not be read
  CaCert { path: PathBuf, source: std::io::Error },
  /// An environment variable held a value that could not be interpreted
  InvalidEnvironment { var: &'static str, value: String },
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::InvalidAddress(msg) => write!(f, "invalid Vault address: {msg}"),
      Self::CaCert { path, source } => {
        write!(f, "failed to read CA certificate {}: {source}", path.display())
      }
      Self::InvalidEnvironment { var, value } => write!(f, "invalid value for {var}: {value:?}"),
    }
  }
}

impl std::error::Error for ConfigError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      Self::CaCert { source, .. } => Some(source),
      _ => None,
    }
  }
}

/// Normalize a Vault address, adding `https://` when no scheme is present.
///
/// # Arguments
/// * `address` - User-supplied address such as `vault.example.com:8200` or
///   `http://127.0.0.1:8200/`.
///
/// # Returns
/// The address as a string without a trailing slash.
///
/// # Errors
/// Returns an error when the address cannot be parsed, has no host, or uses a
/// scheme other than `http`/`https`.
pub fn normalize_address(address: &str) -> Result<String, String> {
  let url = parse_address(address).map_err(|e| e.to_string())?;
  Ok(display_address(&url))
}

fn parse_address(address: &str) -> Result<Url, ConfigError> {
  let trimmed = address.trim();
  if trimmed.is_empty() {
    return Err(ConfigError::InvalidAddress("address is empty".to_string()));
  }

  let parsed = if trimmed.contains("://") {
    Url::parse(trimmed)
  } else {
    Url::parse(&format!("https://{trimmed}"))
  }
  .map_err(|e| ConfigError::InvalidAddress(format!("{trimmed}: {e}")))?;

  if parsed.scheme() != "http" && parsed.scheme() != "https" {
    return Err(ConfigError::InvalidAddress(format!(
      "unsupported scheme '{}' in {trimmed}",
      parsed.scheme()
    )));
  }

  if parsed.host_str().is_none_or(str::is_empty) {
    return Err(ConfigError::InvalidAddress(format!("{trimmed} has no host")));
  }

  Ok(parsed)
}

fn display_address(url: &Url) -> String {
  url.as_str().trim_end_matches('/').to_string()
}

/// Immutable connection parameters for a Vault server.
#[derive(Clone, PartialEq, Eq)]
pub struct VaultConfig {
  address: Url,
  namespace: Option<String>,
  token: Option<String>,
  ca_cert_pem: Option<Vec<u8>>,
  skip_verify: bool,
  timeout: Duration,
}

impl VaultConfig {
  /// Start building a config.
  pub fn builder() -> VaultConfigBuilder {
    VaultConfigBuilder::default()
  }

  /// Build a config from the standard Vault environment variables.
  ///
  /// Reads `VAULT_ADDR`, `VAULT_NAMESPACE`, `VAULT_TOKEN`, `VAULT_CACERT`,
  /// `VAULT_SKIP_VERIFY` and `VAULT_CLIENT_TIMEOUT` (seconds).
  ///
  /// # Errors
  /// Returns an error when any of the variables holds an invalid value or the
  /// CA bundle cannot be read.
  pub fn from_env() -> Result<Self, ConfigError> {
    Self::from_lookup(|name| std::env::var(name).ok())
  }

  /// Build a config using `lookup` in place of the process environment.
  pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
  where
    F: Fn(&str) -> Option<String>,
  {
    let mut builder = Self::builder();

    if let Some(address) = lookup("VAULT_ADDR") {
      builder = builder.address(address);
    }
    if let Some(namespace) = lookup("VAULT_NAMESPACE") {
      builder = builder.namespace(namespace);
    }
    if let Some(token) = lookup("VAULT_TOKEN") {
      builder = builder.token(token);
    }
    if let Some(path) = lookup("VAULT_CACERT") {
      builder = builder.ca_cert_file(path);
    }
    if let Some(value) = lookup("VAULT_SKIP_VERIFY") {
      builder = builder.skip_verify(parse_bool("VAULT_SKIP_VERIFY", &value)?);
    }
    if let Some(value) = lookup("VAULT_CLIENT_TIMEOUT") {
      let secs = value
        .trim()
        .trim_end_matches('s')
        .parse::<u64>()
        .map_err(|_| ConfigError::InvalidEnvironment {
          var: "VAULT_CLIENT_TIMEOUT",
          value: value.clone(),
        })?;
      builder = builder.timeout(Duration::from_secs(secs));
    }

    builder.build()
  }

  /// Return a copy of this config bound to `token`.
  pub fn with_token(&self, token: impl Into<String>) -> Self {
    Self {
      token: Some(token.into()),
      ..self.clone()
    }
  }

  /// Return a copy of this config with no token attached.
  pub fn without_token(&self) -> Self {
    Self {
      token: None,
      ..self.clone()
    }
  }

  /// Parsed server address.
  pub fn address(&self) -> &Url {
    &self.address
  }

  /// Server address as displayed to users, without a trailing slash.
  pub fn address_str(&self) -> String {
    display_address(&self.address)
  }

  /// Vault Enterprise namespace sent as `X-Vault-Namespace`.
  pub fn namespace(&self) -> Option<&str> {
    self.namespace.as_deref()
  }

  /// Token bound to this config, if any.
  pub fn token(&self) -> Option<&str> {
    self.token.as_deref()
  }

  /// Additional PEM-encoded root certificates to trust.
  pub fn ca_cert_pem(&self) -> Option<&[u8]> {
    self.ca_cert_pem.as_deref()
  }

  /// Whether TLS certificate verification is disabled.
  pub fn skip_verify(&self) -> bool {
    self.skip_verify
  }

  /// Per-request timeout.
  pub fn timeout(&self) -> Duration {
    self.timeout
  }
}

impl fmt::Debug for VaultConfig {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("VaultConfig")
      .field("address", &self.address_str())
      .field("namespace", &self.namespace)
      .field("token", &self.token.as_deref().map(mask_token))
      .field("ca_cert", &self.ca_cert_pem.as_ref().map(|pem| pem.len()))
      .field("skip_verify", &self.skip_verify)
      .field("timeout", &self.timeout)
      .finish()
  }
}

enum CaSource {
  Pem(Vec<u8>),
  File(PathBuf),
}

/// Builder for [`VaultConfig`].
#[derive(Default)]
pub struct VaultConfigBuilder {
  address: Option<String>,
  namespace: Option<String>,
  token: Option<String>,
  ca: Option<CaSource>,
  skip_verify: bool,
  timeout: Option<Duration>,
}

impl VaultConfigBuilder {
  /// Server address; a missing scheme defaults to `https://`.
  pub fn address(mut self, address: impl Into<String>) -> Self {
    self.address = Some(address.into());
    self
  }

  /// Vault Enterprise namespace. Blank values are ignored.
  pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
    let namespace = namespace.into();
    let trimmed = namespace.trim().trim_matches('/');
    self.namespace = (!trimmed.is_empty()).then(|| trimmed.to_string());
    self
  }

  /// Token to bind. Usually left unset and injected by an authenticator.
  pub fn token(mut self, token: impl Into<String>) -> Self {
    self.token = Some(token.into());
    self
  }

  /// Trust the PEM-encoded certificates in `pem`.
  pub fn ca_cert_pem(mut self, pem: impl Into<Vec<u8>>) -> Self {
    self.ca = Some(CaSource::Pem(pem.into()));
    self
  }

  /// Trust the PEM-encoded certificates stored at `path`.
  pub fn ca_cert_file(mut self, path: impl AsRef<Path>) -> Self {
    self.ca = Some(CaSource::File(path.as_ref().to_path_buf()));
    self
  }

  /// Disable TLS certificate verification.
  pub fn skip_verify(mut self, skip: bool) -> Self {
    self.skip_verify = skip;
    self
  }

  /// Per-request timeout.
  pub fn timeout(mut self, timeout: Duration) -> Self {
    self.timeout = Some(timeout);
    self
  }

  /// Validate the settings and produce a [`VaultConfig`].
  ///
  /// # Errors
  /// Returns an error when the address is invalid or the CA file cannot be
  /// read.
  pub fn build(self) -> Result<VaultConfig, ConfigError> {
    let address = parse_address(self.address.as_deref().unwrap_or(DEFAULT_ADDRESS))?;

    let ca_cert_pem = match self.ca {
      Some(CaSource::Pem(pem)) => Some(pem),
      Some(CaSource::File(path)) => {
        Some(std::fs::read(&path).map_err(|source| ConfigError::CaCert { path, source })?)
      }
      None => None,
    };

    Ok(VaultConfig {
      address,
      namespace: self.namespace,
      token: self.token,
      ca_cert_pem,
      skip_verify: self.skip_verify,
      timeout: self.timeout.unwrap_or(DEFAULT_TIMEOUT),
    })
  }
}

fn parse_bool(var: &'static str, value: &str) -> Result<bool, ConfigError> {
  match value.trim().to_ascii_lowercase().as_str() {
    "1" | "true" | "yes" | "on" => Ok(true),
    "" | "0" | "false" | "no" | "off" => Ok(false),
    _ => Err(ConfigError::InvalidEnvironment {
      var,
      value: value.to_string(),
    }),
  }
}

#[cfg(test)]
mod tests {
  use std::collections::HashMap;

  use super::*;

  fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    move |name| map.get(name).cloned()
  }

  #[test]
  fn test_normalize_address_adds_https() {
    assert_eq!(
      normalize_address("vault.example.com:8200").unwrap(),
      "https://vault.example.com:8200"
    );
  }

  #[test]
  fn test_normalize_address_keeps_http_and_strips_slash() {
    assert_eq!(
      normalize_address("http://127.0.0.1:8200/").unwrap(),
      "http://127.0.0.1:8200"
    );
  }

  #[test]
  fn test_normalize_address_rejects_other_schemes() {
    let err = normalize_address("ftp://vault.example.com").unwrap_err();
    assert!(err.contains("unsupported scheme"));
  }

  #[test]
  fn test_normalize_address_rejects_empty() {
    assert!(normalize_address("   ").is_err());
  }

  #[test]
  fn test_builder_defaults() {
    let config = VaultConfig::builder().build().unwrap();
    assert_eq!(config.address_str(), "https://127.0.0.1:8200");
    assert_eq!(config.timeout(), DEFAULT_TIMEOUT);
    assert!(config.token().is_none());
    assert!(config.namespace().is_none());
    assert!(!config.skip_verify());
  }

  #[test]
  fn test_builder_trims_namespace() {
    let config = VaultConfig::builder().namespace("/team-a/").build().unwrap();
    assert_eq!(config.namespace(), Some("team-a"));

    let config = VaultConfig::builder().namespace("  ").build().unwrap();
    assert_eq!(config.namespace(), None);
  }

  #[test]
  fn test_with_token_leaves_original_untouched() {
    let base = VaultConfig::builder().address("https://vault.example.com").build().unwrap();
    let bound = base.with_token("s.abcdef123");

    assert_eq!(bound.token(), Some("s.abcdef123"));
    assert_eq!(base.token(), None);
    assert_eq!(bound.address(), base.address());
    assert_eq!(bound.without_token(), base);
  }

  #[test]
  fn test_ca_cert_file_missing() {
    let err = VaultConfig::builder()
      .ca_cert_file("/nonexistent/ca.pem")
      .build()
      .unwrap_err();
    assert!(matches!(err, ConfigError::CaCert { .. }));
  }

  #[test]
  fn test_ca_cert_file_is_loaded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ca.pem");
    std::fs::write(&path, b"-----BEGIN CERTIFICATE-----").unwrap();

    let config = VaultConfig::builder().ca_cert_file(&path).build().unwrap();
    assert_eq!(config.ca_cert_pem(), Some(&b"-----BEGIN CERTIFICATE-----"[..]));
  }

  #[test]
  fn test_from_lookup_reads_all_variables() {
    let config = VaultConfig::from_lookup(lookup_from(&[
      ("VAULT_ADDR", "http://localhost:8200"),
      ("VAULT_NAMESPACE", "admin"),
      ("VAULT_TOKEN", "s.envtoken"),
      ("VAULT_SKIP_VERIFY", "true"),
      ("VAULT_CLIENT_TIMEOUT", "45s"),
    ]))
    .unwrap();

    assert_eq!(config.address_str(), "http://localhost:8200");
    assert_eq!(config.namespace(), Some("admin"));
    assert_eq!(config.token(), Some("s.envtoken"));
    assert!(config.skip_verify());
    assert_eq!(config.timeout(), Duration::from_secs(45));
  }

  #[test]
  fn test_from_lookup_rejects_bad_skip_verify() {
    let err = VaultConfig::from_lookup(lookup_from(&[("VAULT_SKIP_VERIFY", "maybe")])).unwrap_err();
    assert!(matches!(
      err,
      ConfigError::InvalidEnvironment {
        var: "VAULT_SKIP_VERIFY",
        ..
      }
    ));
  }

  #[test]
  fn test_debug_masks_token() {
    let config = VaultConfig::builder().token("s.abcdef1234567890").build().unwrap();
    let rendered = format!("{config:?}");
    assert!(!rendered.contains("s.abcdef1234567890"));
    assert!(rendered.contains("s.ab"));
  }
}
