//! In-memory stand-ins for Vault and for credential implementations
//!
//! `FakeVault` answers [`VaultApi`] calls from a map of canned secrets without
//! any network I/O. `ScriptedCredential` is a credential kind defined outside
//! the library, used to check that the authenticator only relies on the trait.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use vault_creds::credentials::{CredentialInfo, TokenRetrievalError, VaultCredential};
use vault_creds::vault::{SecretResponse, TokenLookup, VaultApi, VaultApiError, VaultConfig};

use crate::common::fixtures;

/// A fake Vault session that serves predefined secrets
pub struct FakeVault {
  secrets: HashMap<String, SecretResponse>,
  token_valid: bool,
}

impl FakeVault {
  /// Create a fake with no secrets and a valid token
  pub fn new() -> Self {
    Self {
      secrets: HashMap::new(),
      token_valid: true,
    }
  }

  /// Create a fake holding a KV v2 secret at `secret/data/app` and a KV v1
  /// secret at `kv/legacy`
  pub fn with_sample_secrets() -> Self {
    let mut vault = Self::new();
    vault.add_secret_from_json("secret/data/app", fixtures::kv2_secret_response());
    vault.add_secret_from_json("kv/legacy", fixtures::kv1_secret_response());
    vault
  }

  /// Add a secret from a raw response body
  pub fn add_secret_from_json(&mut self, path: &str, json: serde_json::Value) {
    if let Ok(secret) = serde_json::from_value::<SecretResponse>(json) {
      self.secrets.insert(path.to_string(), secret);
    }
  }

  /// Make every call fail with 403
  pub fn revoke_token(&mut self) {
    self.token_valid = false;
  }

  fn check_token(&self) -> Result<(), VaultApiError> {
    if self.token_valid {
      Ok(())
    } else {
      Err(VaultApiError::Status {
        status: 403,
        errors: vec!["permission denied".to_string()],
      })
    }
  }
}

impl Default for FakeVault {
  fn default() -> Self {
    Self::new()
  }
}

#[async_trait]
impl VaultApi for FakeVault {
  async fn lookup_self(&self) -> Result<TokenLookup, VaultApiError> {
    self.check_token()?;
    let body = fixtures::lookup_self_response("token-fake");
    Ok(serde_json::from_value(body["data"].clone()).expect("lookup fixture matches TokenLookup"))
  }

  async fn read_secret(&self, path: &str) -> Result<SecretResponse, VaultApiError> {
    self.check_token()?;
    self.secrets.get(path).cloned().ok_or_else(|| VaultApiError::Status {
      status: 404,
      errors: Vec::new(),
    })
  }
}

/// A credential whose token comes from a closure, counting every request
pub struct ScriptedCredential {
  info: CredentialInfo,
  script: fn(&VaultConfig) -> Result<String, TokenRetrievalError>,
  calls: AtomicUsize,
}

impl ScriptedCredential {
  pub fn new(id: &str, script: fn(&VaultConfig) -> Result<String, TokenRetrievalError>) -> Self {
    Self {
      info: CredentialInfo::new(id),
      script,
      calls: AtomicUsize::new(0),
    }
  }

  /// Number of times the token was requested
  pub fn calls(&self) -> usize {
    self.calls.load(Ordering::SeqCst)
  }
}

#[async_trait]
impl VaultCredential for ScriptedCredential {
  fn info(&self) -> &CredentialInfo {
    &self.info
  }

  fn kind(&self) -> &'static str {
    "scripted"
  }

  async fn token(&self, config: &VaultConfig) -> Result<String, TokenRetrievalError> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    (self.script)(config)
  }
}
