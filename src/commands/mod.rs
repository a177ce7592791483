//! CLI subcommand handlers.
//!
//! One module per `vault-creds` subcommand. Credential resolution and
//! connection settings live in [`auth`] and are shared by the other handlers.

pub mod auth;
pub mod completions;
pub mod credentials;
pub mod read;
pub mod version;
