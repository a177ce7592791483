//! Credentials that can produce a Vault token.
//!
//! Every variant implements [`VaultCredential`], so the authenticator never
//! needs to know whether a token was stored verbatim, read from a file,
//! obtained through an auth-method login, or unwrapped from a
//! response-wrapping token.
//!
//! | Kind         | Token source                                         |
//! |--------------|------------------------------------------------------|
//! | `token`      | plaintext token held in memory                       |
//! | `token_file` | file contents, `~/.vault-token` by default           |
//! | `app_role`   | `auth/approle/login` with role ID and secret ID      |
//! | `github`     | `auth/github/login` with a GitHub access token       |
//! | `kubernetes` | `auth/kubernetes/login` with the service-account JWT |
//! | `wrapped`    | `sys/wrapping/unwrap` with a single-use wrapping token |

mod approle;
mod definition;
mod github;
mod kubernetes;
mod login;
mod provider;
mod registry;
mod token;
mod token_file;
mod types;
mod wrapped;

pub use approle::AppRoleCredential;
pub use definition::CredentialDefinition;
pub use github::GithubTokenCredential;
pub use kubernetes::{KubernetesCredential, SERVICE_ACCOUNT_TOKEN_PATH};
pub use provider::VaultCredential;
pub use registry::{CredentialRegistry, RegistryError};
pub use token::TokenCredential;
pub use token_file::{TokenFileCredential, default_token_path};
pub use types::{CredentialInfo, CredentialScope, TokenRetrievalError, mask_token};
pub use wrapped::WrappedTokenCredential;
