//! Test fixtures for Vault API responses
//!
//! Bodies follow the shapes Vault returns from the HTTP API.

use serde_json::json;

// auth/token/lookup-self for a periodic service token
pub fn lookup_self_response(display_name: &str) -> serde_json::Value {
  json!({
    "request_id": "6b1e0c1e-5a8e-4b0e-9e7a-1c0e7cf8b2a1",
    "lease_id": "",
    "renewable": false,
    "lease_duration": 0,
    "data": {
      "accessor": "8609694a-cdbc-db9b-d345-e782dbb562ed",
      "creation_time": 1523979354,
      "creation_ttl": 2764800,
      "display_name": display_name,
      "entity_id": "",
      "expire_time": "2030-05-19T11:35:54.466476215-04:00",
      "explicit_max_ttl": 0,
      "id": "s.abcdef123",
      "issue_time": "2018-04-17T11:35:54.466476078-04:00",
      "meta": null,
      "num_uses": 0,
      "orphan": false,
      "path": "auth/token/create",
      "policies": ["default", "app-read"],
      "renewable": true,
      "ttl": 2764790
    },
    "warnings": null,
    "auth": null
  })
}

// auth/<mount>/login
pub fn login_response(client_token: &str) -> serde_json::Value {
  json!({
    "request_id": "2e8b7f54-2f0c-46d3-8e4a-2c7a7a4f7c0e",
    "lease_id": "",
    "renewable": false,
    "lease_duration": 0,
    "data": null,
    "warnings": null,
    "auth": {
      "client_token": client_token,
      "accessor": "0e9e354a-520f-df04-6867-ee81cae3d42d",
      "policies": ["default", "app-read"],
      "token_policies": ["default", "app-read"],
      "metadata": { "role_name": "app" },
      "lease_duration": 1200,
      "renewable": true
    }
  })
}

// sys/wrapping/unwrap of a wrapped token-create response
pub fn unwrap_response(client_token: &str) -> serde_json::Value {
  login_response(client_token)
}

// KV v2 read of secret/data/app
pub fn kv2_secret_response() -> serde_json::Value {
  json!({
    "request_id": "f3c1b6a2-7d1e-4f0b-9c5e-9a1d0e2b3c4d",
    "lease_id": "",
    "renewable": false,
    "lease_duration": 0,
    "data": {
      "data": {
        "username": "app",
        "password": "hunter2"
      },
      "metadata": {
        "created_time": "2018-03-22T02:24:06.945319214Z",
        "deletion_time": "",
        "destroyed": false,
        "version": 2
      }
    }
  })
}

// KV v1 read of kv/legacy
pub fn kv1_secret_response() -> serde_json::Value {
  json!({
    "request_id": "0d6a6e5f-1b2c-4d3e-8f9a-0b1c2d3e4f5a",
    "lease_id": "",
    "renewable": false,
    "lease_duration": 2764800,
    "data": {
      "api_key": "legacy-key",
      "port": 5432
    }
  })
}

pub fn permission_denied_response() -> serde_json::Value {
  json!({ "errors": ["permission denied"] })
}
