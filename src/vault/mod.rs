//! Vault module providing connection settings, the HTTP client, the API
//! abstraction used by callers and tests, and response models.

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod path;

pub use api::VaultApi;
pub use client::VaultClient;
pub use config::{ConfigError, VaultConfig, VaultConfigBuilder, normalize_address};
pub use error::VaultApiError;
pub use models::{AuthInfo, AuthResponse, SecretResponse, TokenLookup};
pub use path::SecretRef;
