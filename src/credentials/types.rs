//! Strongly typed credential metadata and token-retrieval errors.
//!
//! These types are shared between the credential variants, the registry and
//! the CLI so that callers can reason about identifiers, scopes and failure
//! modes consistently.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::vault::VaultApiError;

/// Where a credential may be used.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialScope {
  /// Available everywhere, including to individual jobs
  #[default]
  Global,
  /// Restricted to the embedding system itself
  System,
  /// Owned by a single user
  User,
}

impl fmt::Display for CredentialScope {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      Self::Global => "global",
      Self::System => "system",
      Self::User => "user",
    };
    f.write_str(name)
  }
}

/// Identity shared by every credential variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialInfo {
  /// Unique identifier used to look the credential up
  pub id: String,
  /// Free-form description shown in listings
  #[serde(default)]
  pub description: String,
  /// Visibility of the credential
  #[serde(default)]
  pub scope: CredentialScope,
}

impl CredentialInfo {
  /// Create metadata with global scope and no description.
  pub fn new(id: impl Into<String>) -> Self {
    Self {
      id: id.into(),
      description: String::new(),
      scope: CredentialScope::Global,
    }
  }

  /// Attach a description.
  pub fn with_description(mut self, description: impl Into<String>) -> Self {
    self.description = description.into();
    self
  }

  /// Override the scope.
  pub fn with_scope(mut self, scope: CredentialScope) -> Self {
    self.scope = scope;
    self
  }
}

/// Errors that can occur while obtaining a token from a credential.
#[derive(Debug)]
pub enum TokenRetrievalError {
  /// The credential produced an empty token
  EmptyToken { id: String },
  /// A token or JWT file could not be read
  Io { path: PathBuf, source: std::io::Error },
  /// A required environment variable is not set
  MissingEnvironment(&'static str),
  /// A login or unwrap call succeeded but returned no `auth` block
  MissingAuth { id: String },
  /// Vault refused or failed the login/unwrap call
  Backend { id: String, source: VaultApiError },
}

impl fmt::Display for TokenRetrievalError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::EmptyToken { id } => write!(f, "credential '{id}' produced an empty token"),
      Self::Io { path, source } => write!(f, "failed to read {}: {source}", path.display()),
      Self::MissingEnvironment(var) => write!(f, "environment variable {var} is not set"),
      Self::MissingAuth { id } => write!(f, "Vault response for credential '{id}' did not contain a token"),
      Self::Backend { id, source } => write!(f, "credential '{id}' could not obtain a token: {source}"),
    }
  }
}

impl std::error::Error for TokenRetrievalError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      Self::Io { source, .. } => Some(source),
      Self::Backend { source, .. } => Some(source),
      _ => None,
    }
  }
}

/// Mask a token for display, keeping the first four characters of long
/// tokens.
pub fn mask_token(token: &str) -> String {
  let len = token.chars().count();
  if len > 8 {
    let prefix: String = token.chars().take(4).collect();
    format!("{prefix}{}", "*".repeat(len - 4))
  } else {
    "*".repeat(len)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_mask_token_long() {
    assert_eq!(mask_token("s.abcdef123"), "s.ab*******");
  }

  #[test]
  fn test_mask_token_short() {
    assert_eq!(mask_token("abc"), "***");
    assert_eq!(mask_token(""), "");
  }

  #[test]
  fn test_scope_serde_lowercase() {
    let scope: CredentialScope = serde_json::from_str("\"system\"").unwrap();
    assert_eq!(scope, CredentialScope::System);
    assert_eq!(serde_json::to_string(&CredentialScope::User).unwrap(), "\"user\"");
    assert_eq!(CredentialScope::default().to_string(), "global");
  }

  #[test]
  fn test_credential_info_builders() {
    let info = CredentialInfo::new("ci")
      .with_description("CI runner")
      .with_scope(CredentialScope::System);
    assert_eq!(info.id, "ci");
    assert_eq!(info.description, "CI runner");
    assert_eq!(info.scope, CredentialScope::System);
  }

  #[test]
  fn test_retrieval_error_source() {
    use std::error::Error;

    let err = TokenRetrievalError::Io {
      path: PathBuf::from("/tmp/token"),
      source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
    };
    assert!(err.source().is_some());
    assert!(err.to_string().contains("/tmp/token"));

    let err = TokenRetrievalError::EmptyToken { id: "ci".to_string() };
    assert!(err.source().is_none());
  }
}
