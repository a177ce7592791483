//! Errors produced while talking to the Vault HTTP API.

use std::fmt;

/// Failure of a single Vault API call.
#[derive(Debug)]
pub enum VaultApiError {
  /// The HTTP client could not be constructed (bad CA bundle, TLS backend)
  Build(reqwest::Error),
  /// The request never produced a response
  Network(reqwest::Error),
  /// Vault answered with a non-success status
  Status { status: u16, errors: Vec<String> },
  /// The response body did not match the expected shape
  Decode(reqwest::Error),
  /// The requested API path is empty or cannot be encoded
  InvalidPath(String),
  /// The secret exists but does not carry the requested field
  MissingField { path: String, field: String },
}

impl VaultApiError {
  /// HTTP status returned by Vault, when there was one.
  pub fn status(&self) -> Option<u16> {
    match self {
      Self::Status { status, .. } => Some(*status),
      _ => None,
    }
  }

  /// Whether Vault refused the token (401 or 403).
  pub fn is_permission_denied(&self) -> bool {
    matches!(self.status(), Some(401 | 403))
  }
}

impl fmt::Display for VaultApiError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Build(err) => write!(f, "failed to create HTTP client: {err}"),
      Self::Network(err) => write!(f, "network error communicating with Vault: {err}"),
      Self::Status { status, errors } if errors.is_empty() => write!(f, "Vault returned status {status}"),
      Self::Status { status, errors } => write!(f, "Vault returned status {status}: {}", errors.join("; ")),
      Self::Decode(err) => write!(f, "unexpected response from Vault: {err}"),
      Self::InvalidPath(path) => write!(f, "invalid Vault path: {path:?}"),
      Self::MissingField { path, field } => write!(f, "field '{field}' not found at '{path}'"),
    }
  }
}

impl std::error::Error for VaultApiError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      Self::Build(err) | Self::Network(err) | Self::Decode(err) => Some(err),
      _ => None,
    }
  }
}
