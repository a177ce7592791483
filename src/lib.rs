//! Authorize HashiCorp Vault clients from stored credentials.
//!
//! A [`VaultCredential`] knows how to produce a Vault token: a literal token,
//! a token file, an auth-method login (AppRole, GitHub, Kubernetes) or a
//! response-wrapped token. [`TokenAuthenticator`] binds that token to a copy
//! of the caller's [`VaultConfig`] and hands back a ready [`VaultClient`].
//!
//! ```no_run
//! use vault_creds::{CredentialInfo, TokenAuthenticator, TokenCredential, VaultAuthenticator, VaultConfig};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let config = VaultConfig::builder().address("https://vault.example.com:8200").build()?;
//! let credential = TokenCredential::new(CredentialInfo::new("ops"), "s.abcdef123");
//!
//! let client = TokenAuthenticator::new().authorize(&config, &credential).await?;
//! assert_eq!(client.token(), Some("s.abcdef123"));
//! # Ok(())
//! # }
//! ```

pub mod authenticator;
pub mod cli;
pub mod color;
pub mod commands;
pub mod credentials;
pub mod vault;

pub use authenticator::{AuthenticationError, TokenAuthenticator, VaultAuthenticator};
pub use credentials::{
  AppRoleCredential, CredentialDefinition, CredentialInfo, CredentialRegistry, CredentialScope, GithubTokenCredential,
  KubernetesCredential, TokenCredential, TokenFileCredential, TokenRetrievalError, VaultCredential,
  WrappedTokenCredential,
};
pub use vault::{SecretRef, VaultApi, VaultApiError, VaultClient, VaultConfig};
