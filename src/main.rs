//! vault-creds - Authorize HashiCorp Vault clients from stored credentials
//!
//! This is the main entry point for the CLI application.

#[tokio::main]
async fn main() {
  vault_creds::cli::run().await;
}
