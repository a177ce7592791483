//! Authentication subcommand handlers.
//!
//! Covers both `vault-creds auth test`, which authorizes and verifies the
//! token against Vault, and `vault-creds auth show`, which prints the resolved
//! connection settings and credential source. The credential resolution
//! helpers here are shared with the other commands.

use std::fmt;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chrono::Utc;
use clap::parser::ValueSource;

use crate::authenticator::{AuthenticationError, TokenAuthenticator, VaultAuthenticator};
use crate::cli::{AuthCommand, Cli};
use crate::color::ColorScheme;
use crate::credentials::{
  CredentialInfo, CredentialRegistry, TokenCredential, TokenFileCredential, VaultCredential, default_token_path,
  mask_token,
};
use crate::vault::{TokenLookup, VaultApi, VaultClient, VaultConfig};

/// Where the credential used by a command came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum CredentialSource {
  CredentialsFile(PathBuf),
  TokenFlag,
  TokenEnv,
  TokenFile(PathBuf),
  HomeTokenFile(PathBuf),
}

impl fmt::Display for CredentialSource {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::CredentialsFile(path) => write!(f, "credentials file {}", path.display()),
      Self::TokenFlag => write!(f, "command-line flag"),
      Self::TokenEnv => write!(f, "environment variable VAULT_TOKEN"),
      Self::TokenFile(path) => write!(f, "token file {}", path.display()),
      Self::HomeTokenFile(path) => write!(f, "Vault CLI token file {}", path.display()),
    }
  }
}

/// A credential together with the place it was found.
pub(crate) struct ResolvedCredential {
  pub credential: Arc<dyn VaultCredential>,
  pub source: CredentialSource,
}

/// Dispatch the authentication subcommands defined under `vault-creds auth`.
///
/// # Arguments
/// * `subcommand` - Auth-specific variant to execute.
/// * `cli` - Parsed CLI settings containing connection and credential options.
/// * `colors` - Shared color scheme used to render output consistently.
pub(crate) async fn handle_auth_command(subcommand: AuthCommand, cli: &Cli, colors: &ColorScheme) {
  match subcommand {
    AuthCommand::Test => test_auth(cli, colors).await,
    AuthCommand::Show => show_auth_config(cli, colors),
  }
}

async fn test_auth(cli: &Cli, colors: &ColorScheme) {
  let config = match build_config(cli) {
    Ok(config) => config,
    Err(e) => {
      eprintln!("{} {}", colors.error("✗"), colors.error("Invalid connection settings"));
      eprintln!("  {e:#}");
      process::exit(4);
    }
  };

  println!("{} {}", colors.info("→"), colors.info("Testing authentication"));
  println!("  {}: {}", colors.emphasis("Address"), colors.link(config.address_str()));
  if let Some(namespace) = config.namespace() {
    println!("  {}: {}", colors.emphasis("Namespace"), namespace);
  }

  let resolved = match resolve_credential(cli) {
    Ok(resolved) => resolved,
    Err(e) => {
      eprintln!("\n{} {}", colors.error("✗"), colors.error("Failed to load credentials"));
      eprintln!("  {e:#}");
      print_setup_instructions(colors);
      process::exit(2);
    }
  };

  println!(
    "  {}: {} ({})",
    colors.emphasis("Credential"),
    resolved.credential.id(),
    colors.dimmed(&resolved.source)
  );

  println!("\n{} {}", colors.info("→"), colors.info("Calling Vault..."));
  let client = match authorize(&config, resolved.credential.as_ref(), TokenAuthenticator::verifying()).await {
    Ok(client) => client,
    Err(e @ AuthenticationError::TokenRetrieval(_)) => exit_with_auth_error(&e, colors),
    Err(e) => {
      eprintln!("\n{} {}", colors.error("✗"), colors.error("Authentication failed"));
      eprintln!("  {e}");
      eprintln!("\n{}", colors.info("Common issues:"));
      eprintln!("  1. Expired or revoked token - log in again or rotate the credential");
      eprintln!("  2. Wrong namespace - tokens are only valid in the namespace that issued them");
      eprintln!("  3. Wrong address - should look like https://vault.example.com:8200");
      eprintln!("  4. Network connectivity issues or an untrusted TLS certificate (see --ca-cert)");
      eprintln!(
        "\n{}",
        colors.dimmed("Run 'vault-creds auth show' to see your current configuration")
      );
      process::exit(2);
    }
  };

  println!(
    "\n{} {}",
    colors.success("✓"),
    colors.success("Authentication successful!")
  );
  match client.lookup_self().await {
    Ok(lookup) => print_token_details(&lookup, colors),
    Err(e) => eprintln!("\n{} Could not load token details: {e}", colors.warning("⚠")),
  }
  println!("\n{} Your credentials are working correctly.", colors.info("ℹ"));
}

fn print_token_details(lookup: &TokenLookup, colors: &ColorScheme) {
  println!("\n{}", colors.emphasis("Token Information:"));
  if !lookup.display_name.is_empty() {
    println!("  {}: {}", colors.emphasis("Display Name"), lookup.display_name);
  }
  if let Some(accessor) = &lookup.accessor {
    println!("  {}: {}", colors.emphasis("Accessor"), colors.dimmed(accessor));
  }
  if !lookup.policies.is_empty() {
    println!("  {}: {}", colors.emphasis("Policies"), lookup.policies.join(", "));
  }
  if lookup.ttl == 0 {
    println!("  {}: {}", colors.emphasis("TTL"), colors.dimmed("never expires"));
  } else {
    println!("  {}: {}", colors.emphasis("TTL"), format_ttl(lookup.ttl));
  }
  if let Some(expire_time) = lookup.expire_time {
    let remaining = expire_time.signed_duration_since(Utc::now());
    let label = expire_time.format("%Y-%m-%d %H:%M:%S UTC").to_string();
    if remaining.num_seconds() <= 0 {
      println!("  {}: {}", colors.emphasis("Expires"), colors.warning(format!("{label} (expired)")));
    } else {
      println!("  {}: {}", colors.emphasis("Expires"), label);
    }
  }
  println!(
    "  {}: {}",
    colors.emphasis("Renewable"),
    if lookup.renewable { "yes" } else { "no" }
  );
}

/// Render a TTL in seconds as `1h2m3s`.
pub(crate) fn format_ttl(seconds: u64) -> String {
  let hours = seconds / 3600;
  let minutes = (seconds % 3600) / 60;
  let secs = seconds % 60;

  let mut out = String::new();
  if hours > 0 {
    out.push_str(&format!("{hours}h"));
  }
  if minutes > 0 {
    out.push_str(&format!("{minutes}m"));
  }
  if secs > 0 || out.is_empty() {
    out.push_str(&format!("{secs}s"));
  }
  out
}

/// Print an authorization failure and exit with code 2.
pub(crate) fn exit_with_auth_error(err: &AuthenticationError, colors: &ColorScheme) -> ! {
  eprintln!("\n{} {}", colors.error("✗"), colors.error("Authorization failed"));
  eprintln!("  {err}");
  if matches!(err, AuthenticationError::TokenRetrieval(_)) {
    print_setup_instructions(colors);
  }
  process::exit(2);
}

fn print_setup_instructions(colors: &ColorScheme) {
  eprintln!("\n{}", colors.info("Setup instructions:"));
  eprintln!("  Provide a credential via one of:");
  eprintln!("     • CLI flag: --token or --token-file");
  eprintln!("     • Environment variables: VAULT_TOKEN or VAULT_TOKEN_FILE");
  eprintln!("     • A credentials file: --credentials-file with --credential <ID>");
  eprintln!("     • ~/.vault-token (written by 'vault login')");
}

/// Display the currently configured connection and credential sources.
///
/// Token values are masked; only their length and first characters are
/// shown.
fn show_auth_config(cli: &Cli, colors: &ColorScheme) {
  println!("{}\n", colors.emphasis("Authentication Configuration"));

  let address_source = describe_value_source(cli.connection.address_source, "VAULT_ADDR");

  match build_config(cli) {
    Ok(config) => {
      println!("{}: {}", colors.emphasis("Address"), colors.link(config.address_str()));
      println!("  {}: {}", colors.dimmed("Source"), colors.dimmed(address_source));
      match config.namespace() {
        Some(namespace) => println!("\n{}: {}", colors.emphasis("Namespace"), namespace),
        None => println!("\n{}: {}", colors.emphasis("Namespace"), colors.dimmed("(not set)")),
      }
      if config.skip_verify() {
        println!(
          "\n{} {}",
          colors.warning("⚠"),
          colors.warning("TLS certificate verification is disabled")
        );
      } else if let Some(path) = &cli.connection.ca_cert {
        println!("\n{}: {}", colors.emphasis("CA certificate"), colors.path(path.display()));
      }
    }
    Err(e) => {
      println!("{}: {}", colors.emphasis("Address"), colors.error(format!("{e:#}")));
    }
  }

  match resolve_credential(cli) {
    Ok(resolved) => {
      let credential = &resolved.credential;
      println!("\n{}: {}", colors.emphasis("Credential"), credential.id());
      println!("  {}: {}", colors.dimmed("Kind"), credential.kind());
      println!("  {}: {}", colors.dimmed("Scope"), credential.scope());
      println!("  {}: {}", colors.dimmed("Source"), colors.dimmed(&resolved.source));

      if let Some(token) = cli.credential.token.as_deref() {
        println!("\n{}: {}", colors.emphasis("Token"), colors.dimmed(mask_token(token)));
        println!(
          "  {}: {} characters",
          colors.dimmed("Length"),
          colors.number(token.chars().count())
        );
      }

      println!("\n{} {}", colors.success("✓"), colors.success("Credential configured"));
    }
    Err(e) => {
      println!(
        "\n{} {}",
        colors.warning("⚠"),
        colors.warning("No usable credential found")
      );
      println!("  {e:#}");
      println!("\n  Provide --token, --token-file, or --credentials-file with --credential,");
      println!("  or run 'vault login' to create ~/.vault-token");
    }
  }
}

/// Describe where a setting came from for `auth show`.
fn describe_value_source(source: Option<ValueSource>, env_var: &str) -> String {
  match source {
    Some(ValueSource::CommandLine) => "command-line flag".to_string(),
    Some(ValueSource::EnvVariable) => format!("environment variable {env_var}"),
    _ => "default".to_string(),
  }
}

/// Build the connection settings from CLI flags and environment variables.
///
/// # Errors
/// Returns an error when the address is invalid or the CA bundle cannot be
/// read.
pub(crate) fn build_config(cli: &Cli) -> anyhow::Result<VaultConfig> {
  let mut builder = VaultConfig::builder()
    .skip_verify(cli.connection.skip_verify)
    .timeout(Duration::from_secs(cli.connection.timeout));

  if let Some(address) = &cli.connection.address {
    builder = builder.address(address);
  }
  if let Some(namespace) = &cli.connection.namespace {
    builder = builder.namespace(namespace);
  }
  if let Some(path) = &cli.connection.ca_cert {
    builder = builder.ca_cert_file(path);
  }

  builder.build().context("Failed to build Vault connection settings")
}

/// Resolve the credential a command should authorize with.
///
/// The lookup order is: `--credential` from the credentials file, then
/// `--token`/`VAULT_TOKEN`, then `--token-file`/`VAULT_TOKEN_FILE`, then the
/// Vault CLI's `~/.vault-token`.
///
/// # Errors
/// Returns an error when the credentials file cannot be loaded, the requested
/// id is not registered, or no source is available at all.
pub(crate) fn resolve_credential(cli: &Cli) -> anyhow::Result<ResolvedCredential> {
  let options = &cli.credential;

  if let Some(id) = &options.credential_id {
    let path = options
      .credentials_file
      .as_ref()
      .context("--credential requires --credentials-file")?;
    let registry = load_registry(path)?;
    let credential = registry
      .get(id)
      .with_context(|| format!("Credential '{id}' is not defined in {}", path.display()))?;
    return Ok(ResolvedCredential {
      credential,
      source: CredentialSource::CredentialsFile(path.clone()),
    });
  }

  if let Some(token) = &options.token {
    let source = match cli.credential.token_source {
      Some(ValueSource::EnvVariable) => CredentialSource::TokenEnv,
      _ => CredentialSource::TokenFlag,
    };
    let info = CredentialInfo::new("cli-token").with_description("Token supplied on the command line");
    return Ok(ResolvedCredential {
      credential: Arc::new(TokenCredential::new(info, token.clone())),
      source,
    });
  }

  if let Some(path) = &options.token_file {
    let info = CredentialInfo::new("token-file").with_description("Token read from a file");
    return Ok(ResolvedCredential {
      credential: Arc::new(TokenFileCredential::new(info, path.clone())),
      source: CredentialSource::TokenFile(path.clone()),
    });
  }

  let path = default_token_path()?;
  if path.exists() {
    let info = CredentialInfo::new("vault-token").with_description("Vault CLI token helper file");
    return Ok(ResolvedCredential {
      credential: Arc::new(TokenFileCredential::new(info, path.clone())),
      source: CredentialSource::HomeTokenFile(path),
    });
  }

  anyhow::bail!(
    "Credentials not found. Provide --token, set VAULT_TOKEN, use --credentials-file with --credential, or run 'vault login'"
  )
}

/// Load the credentials file into a registry.
pub(crate) fn load_registry(path: &std::path::Path) -> anyhow::Result<CredentialRegistry> {
  CredentialRegistry::load(path).with_context(|| format!("Failed to load credentials from {}", path.display()))
}

/// Authorize `credential` against `config` with `authenticator`.
pub(crate) async fn authorize(
  config: &VaultConfig,
  credential: &dyn VaultCredential,
  authenticator: impl VaultAuthenticator,
) -> Result<VaultClient, AuthenticationError> {
  authenticator.authorize(config, credential).await
}
