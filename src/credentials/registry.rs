//! Explicit registration of credentials by id.
//!
//! The embedding application owns a [`CredentialRegistry`] and decides what
//! goes into it, either programmatically or from a credentials file.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use super::{CredentialDefinition, TokenRetrievalError, VaultCredential};

/// Errors raised while populating a registry.
#[derive(Debug)]
pub enum RegistryError {
  /// Another credential already uses this id
  DuplicateId(String),
  /// The credentials file could not be read
  Io { path: PathBuf, source: std::io::Error },
  /// The credentials file is not a valid JSON array of definitions
  Parse { path: PathBuf, source: serde_json::Error },
  /// A definition could not be turned into a credential
  Invalid { id: String, source: TokenRetrievalError },
}

impl fmt::Display for RegistryError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::DuplicateId(id) => write!(f, "credential id '{id}' is registered twice"),
      Self::Io { path, source } => write!(f, "failed to read {}: {source}", path.display()),
      Self::Parse { path, source } => write!(f, "failed to parse {}: {source}", path.display()),
      Self::Invalid { id, source } => write!(f, "invalid credential '{id}': {source}"),
    }
  }
}

impl std::error::Error for RegistryError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      Self::Io { source, .. } => Some(source),
      Self::Parse { source, .. } => Some(source),
      Self::Invalid { source, .. } => Some(source),
      Self::DuplicateId(_) => None,
    }
  }
}

/// Credentials keyed by id, iterated in id order.
#[derive(Clone, Default)]
pub struct CredentialRegistry {
  credentials: BTreeMap<String, Arc<dyn VaultCredential>>,
}

impl CredentialRegistry {
  /// Create an empty registry.
  pub fn new() -> Self {
    Self::default()
  }

  /// Build a registry from parsed definitions.
  pub fn from_definitions(definitions: Vec<CredentialDefinition>) -> Result<Self, RegistryError> {
    let mut registry = Self::new();
    for definition in definitions {
      let id = definition.info().id.clone();
      let credential = definition
        .build()
        .map_err(|source| RegistryError::Invalid { id, source })?;
      registry.register_arc(credential)?;
    }
    Ok(registry)
  }

  /// Load a JSON credentials file.
  pub fn load(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| RegistryError::Io {
      path: path.to_path_buf(),
      source,
    })?;
    let definitions: Vec<CredentialDefinition> =
      serde_json::from_str(&content).map_err(|source| RegistryError::Parse {
        path: path.to_path_buf(),
        source,
      })?;

    let registry = Self::from_definitions(definitions)?;
    debug!(path = %path.display(), count = registry.len(), "Loaded credentials file");
    Ok(registry)
  }

  /// Add a credential.
  ///
  /// # Errors
  /// Returns [`RegistryError::DuplicateId`] when the id is already taken; the
  /// existing entry is kept.
  pub fn register<C>(&mut self, credential: C) -> Result<(), RegistryError>
  where
    C: VaultCredential + 'static,
  {
    self.register_arc(Arc::new(credential))
  }

  /// Add an already shared credential.
  pub fn register_arc(&mut self, credential: Arc<dyn VaultCredential>) -> Result<(), RegistryError> {
    let id = credential.id().to_string();
    if self.credentials.contains_key(&id) {
      return Err(RegistryError::DuplicateId(id));
    }
    self.credentials.insert(id, credential);
    Ok(())
  }

  /// Look a credential up by id.
  pub fn get(&self, id: &str) -> Option<Arc<dyn VaultCredential>> {
    self.credentials.get(id).cloned()
  }

  /// Remove and return a credential.
  pub fn remove(&mut self, id: &str) -> Option<Arc<dyn VaultCredential>> {
    self.credentials.remove(id)
  }

  /// Iterate over all credentials in id order.
  pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn VaultCredential>> {
    self.credentials.values()
  }

  /// Number of registered credentials.
  pub fn len(&self) -> usize {
    self.credentials.len()
  }

  /// Whether no credential is registered.
  pub fn is_empty(&self) -> bool {
    self.credentials.is_empty()
  }
}

impl fmt::Debug for CredentialRegistry {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_list()
      .entries(self.credentials.values().map(|c| (c.id(), c.kind())))
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use tempfile::TempDir;

  use super::*;
  use crate::credentials::{CredentialInfo, TokenCredential};

  #[test]
  fn test_register_and_get() {
    let mut registry = CredentialRegistry::new();
    registry
      .register(TokenCredential::new(CredentialInfo::new("ops"), "s.ops"))
      .unwrap();

    assert_eq!(registry.len(), 1);
    assert_eq!(registry.get("ops").unwrap().kind(), "token");
    assert!(registry.get("missing").is_none());
  }

  #[test]
  fn test_duplicate_id_keeps_first() {
    let mut registry = CredentialRegistry::new();
    registry
      .register(TokenCredential::new(CredentialInfo::new("ops").with_description("first"), "s.1"))
      .unwrap();

    let err = registry
      .register(TokenCredential::new(CredentialInfo::new("ops").with_description("second"), "s.2"))
      .unwrap_err();

    assert!(matches!(err, RegistryError::DuplicateId(ref id) if id == "ops"));
    assert_eq!(registry.get("ops").unwrap().description(), "first");
  }

  #[test]
  fn test_iterates_in_id_order() {
    let mut registry = CredentialRegistry::new();
    for id in ["zeta", "alpha", "mid"] {
      registry
        .register(TokenCredential::new(CredentialInfo::new(id), "s.x"))
        .unwrap();
    }

    let ids: Vec<&str> = registry.iter().map(|c| c.id()).collect();
    assert_eq!(ids, vec!["alpha", "mid", "zeta"]);

    assert!(registry.remove("mid").is_some());
    assert_eq!(registry.len(), 2);
  }

  #[test]
  fn test_load_credentials_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("credentials.json");
    std::fs::write(
      &path,
      r#"[
        { "kind": "token", "id": "ops", "token": "s.ops" },
        { "kind": "app_role", "id": "ci", "role_id": "r", "secret_id": "s" }
      ]"#,
    )
    .unwrap();

    let registry = CredentialRegistry::load(&path).unwrap();
    assert_eq!(registry.len(), 2);
    assert_eq!(registry.get("ci").unwrap().kind(), "app_role");
  }

  #[test]
  fn test_load_rejects_duplicate_ids() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("credentials.json");
    std::fs::write(
      &path,
      r#"[
        { "kind": "token", "id": "ops", "token": "s.1" },
        { "kind": "token", "id": "ops", "token": "s.2" }
      ]"#,
    )
    .unwrap();

    assert!(matches!(
      CredentialRegistry::load(&path),
      Err(RegistryError::DuplicateId(_))
    ));
  }

  #[test]
  fn test_load_reports_parse_and_io_errors() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("credentials.json");
    std::fs::write(&path, "{ not json").unwrap();

    assert!(matches!(
      CredentialRegistry::load(&path),
      Err(RegistryError::Parse { .. })
    ));
    assert!(matches!(
      CredentialRegistry::load(dir.path().join("absent.json")),
      Err(RegistryError::Io { .. })
    ));
  }
}
