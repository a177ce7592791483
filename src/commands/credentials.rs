//! `credentials` subcommands for inspecting a credentials file.
//!
//! `list` prints the registered credentials without contacting Vault, and
//! `verify` authorizes every credential concurrently and checks each token
//! with `auth/token/lookup-self`. Single-use credentials are skipped by
//! `verify`, since checking one would spend it.

use std::process;
use std::sync::Arc;

use futures::future::join_all;

use crate::authenticator::{AuthenticationError, TokenAuthenticator, VaultAuthenticator};
use crate::cli::{Cli, CredentialsCommand};
use crate::color::ColorScheme;
use crate::commands::auth::{build_config, load_registry};
use crate::credentials::{CredentialRegistry, VaultCredential};
use crate::vault::VaultConfig;

/// Dispatch the subcommands defined under `vault-creds credentials`.
pub(crate) async fn handle_credentials_command(subcommand: CredentialsCommand, cli: &Cli, colors: &ColorScheme) {
  let Some(path) = cli.credential.credentials_file.as_ref() else {
    eprintln!("{} --credentials-file is required", colors.error("Error:"));
    process::exit(4);
  };

  let registry = match load_registry(path) {
    Ok(registry) => registry,
    Err(e) => {
      eprintln!("{} {e:#}", colors.error("✗"));
      process::exit(1);
    }
  };

  match subcommand {
    CredentialsCommand::List => {
      if registry.is_empty() {
        println!("{}", colors.dimmed(format!("No credentials defined in {}", path.display())));
        return;
      }
      print!("{}", render_credential_table(&registry));
    }
    CredentialsCommand::Verify => verify_credentials(&registry, cli, colors).await,
  }
}

async fn verify_credentials(registry: &CredentialRegistry, cli: &Cli, colors: &ColorScheme) {
  let config = match build_config(cli) {
    Ok(config) => config,
    Err(e) => {
      eprintln!("{} {e:#}", colors.error("Error:"));
      process::exit(4);
    }
  };

  println!(
    "{} Verifying {} credential(s) against {}",
    colors.progress("→"),
    colors.number(registry.len()),
    colors.link(config.address_str())
  );

  let outcomes = verify_all(registry, &config).await;
  let mut failures = 0;
  for (credential, outcome) in &outcomes {
    match outcome {
      VerifyOutcome::Verified => println!("  {} {} ({})", colors.success("✓"), credential.id(), credential.kind()),
      VerifyOutcome::Skipped => {
        println!("  {} {} ({})", colors.warning("-"), credential.id(), credential.kind());
        println!(
          "      {}",
          colors.dimmed("skipped: single-use credential cannot be verified without consuming it")
        );
      }
      VerifyOutcome::Failed(e) => {
        failures += 1;
        println!("  {} {} ({})", colors.error("✗"), credential.id(), credential.kind());
        println!("      {}", colors.dimmed(e));
      }
    }
  }

  if failures > 0 {
    eprintln!(
      "\n{} {} of {} credential(s) failed",
      colors.error("✗"),
      colors.number(failures),
      colors.number(outcomes.len())
    );
    process::exit(2);
  }
  println!("\n{} {}", colors.success("✓"), colors.success("All credentials verified"));
}

/// Result of verifying one credential.
#[derive(Debug)]
pub(crate) enum VerifyOutcome {
  Verified,
  /// Not attempted because retrieval would consume the credential
  Skipped,
  Failed(AuthenticationError),
}

/// Authorize every reusable credential in `registry` with verification
/// enabled.
///
/// Results are returned in id order. Single-use credentials are reported as
/// [`VerifyOutcome::Skipped`] without any request.
pub(crate) async fn verify_all(
  registry: &CredentialRegistry,
  config: &VaultConfig,
) -> Vec<(Arc<dyn VaultCredential>, VerifyOutcome)> {
  let authenticator = TokenAuthenticator::verifying();
  let checks = registry.iter().map(|credential| {
    let credential = Arc::clone(credential);
    async move {
      if credential.is_single_use() {
        return (credential, VerifyOutcome::Skipped);
      }
      let outcome = match authenticator.authorize(config, credential.as_ref()).await {
        Ok(_) => VerifyOutcome::Verified,
        Err(e) => VerifyOutcome::Failed(e),
      };
      (credential, outcome)
    }
  });
  join_all(checks).await
}

/// Render the registry as an aligned table of id, kind, scope and
/// description.
pub(crate) fn render_credential_table(registry: &CredentialRegistry) -> String {
  let headers = ["ID", "KIND", "SCOPE", "DESCRIPTION"];
  let rows: Vec<[String; 4]> = registry
    .iter()
    .map(|c| {
      [
        c.id().to_string(),
        c.kind().to_string(),
        c.scope().to_string(),
        c.description().to_string(),
      ]
    })
    .collect();

  let mut widths = headers.map(|h| h.chars().count());
  for row in &rows {
    for (width, cell) in widths.iter_mut().zip(row) {
      *width = (*width).max(cell.chars().count());
    }
  }

  let mut out = String::new();
  let mut push_row = |cells: [&str; 4]| {
    let line = cells
      .iter()
      .zip(widths)
      .map(|(cell, width)| format!("{cell:<width$}"))
      .collect::<Vec<_>>()
      .join("  ");
    out.push_str(line.trim_end());
    out.push('\n');
  };

  push_row(headers);
  for row in &rows {
    push_row([row[0].as_str(), row[1].as_str(), row[2].as_str(), row[3].as_str()]);
  }
  out
}
