//! Data transfer objects exchanged with the Vault HTTP API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Envelope returned by login endpoints and `sys/wrapping/unwrap`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
  /// Present when the call issued a token.
  pub auth: Option<AuthInfo>,
  /// Non-fatal warnings attached by the server.
  #[serde(default)]
  pub warnings: Option<Vec<String>>,
}

/// Token issued by an auth method.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthInfo {
  /// The token to send as `X-Vault-Token`.
  pub client_token: String,
  /// Accessor that identifies the token without revealing it.
  pub accessor: Option<String>,
  /// Policies attached to the token.
  #[serde(default)]
  pub policies: Vec<String>,
  /// Lease length in seconds.
  #[serde(default)]
  pub lease_duration: u64,
  /// Whether the token can be renewed.
  #[serde(default)]
  pub renewable: bool,
}

/// Envelope of `auth/token/lookup-self`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenLookupResponse {
  pub data: TokenLookup,
}

/// Properties of the token a client is bound to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenLookup {
  /// Accessor for the token.
  #[serde(default)]
  pub accessor: Option<String>,
  /// Human-readable name assigned by the issuing auth method.
  #[serde(default)]
  pub display_name: String,
  /// Policies attached to the token.
  #[serde(default)]
  pub policies: Vec<String>,
  /// Remaining lifetime in seconds (`0` means no expiry).
  #[serde(default)]
  pub ttl: u64,
  /// Absolute expiry, absent for root or periodic tokens.
  #[serde(default)]
  pub expire_time: Option<DateTime<Utc>>,
  /// Whether the token can be renewed.
  #[serde(default)]
  pub renewable: bool,
  /// Namespace the token was created in.
  #[serde(default)]
  pub namespace_path: Option<String>,
}

/// Response of a logical read such as a KV secret.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecretResponse {
  #[serde(default)]
  pub request_id: Option<String>,
  #[serde(default)]
  pub lease_id: Option<String>,
  #[serde(default)]
  pub lease_duration: u64,
  #[serde(default)]
  pub renewable: bool,
  /// Secret payload. For KV v2 the actual fields sit under `data.data`.
  #[serde(default)]
  pub data: Option<Value>,
}

impl SecretResponse {
  /// Key/value fields of the secret, unwrapping the KV v2 envelope when
  /// present.
  pub fn fields(&self) -> Option<&serde_json::Map<String, Value>> {
    let data = self.data.as_ref()?;
    let is_kv_v2 = data.get("metadata").is_some_and(Value::is_object);
    match data.get("data") {
      Some(Value::Object(inner)) if is_kv_v2 => Some(inner),
      _ => data.as_object(),
    }
  }

  /// A single field rendered as a string. Objects and arrays are returned as
  /// JSON text.
  pub fn field(&self, name: &str) -> Option<String> {
    match self.fields()?.get(name)? {
      Value::String(s) => Some(s.clone()),
      Value::Null => None,
      other => Some(other.to_string()),
    }
  }
}

/// Body Vault sends alongside error statuses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorResponse {
  #[serde(default)]
  pub errors: Vec<String>,
}
