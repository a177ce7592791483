//! Command-line interface definitions for vault-creds.
//!
//! This module defines the CLI structure using clap derives and dispatches to
//! the handlers in [`crate::commands`].

use std::path::PathBuf;
use std::process;

use clap::parser::ValueSource;
use clap::{CommandFactory, FromArgMatches, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

use crate::color::ColorScheme;
use crate::commands::auth::handle_auth_command;
use crate::commands::completions::handle_completions_command;
use crate::commands::credentials::handle_credentials_command;
use crate::commands::read::handle_read_command;
use crate::commands::version::handle_version_command;
use crate::vault::{SecretRef, normalize_address};

/// vault-creds - Authorize Vault clients from stored credentials
#[derive(Debug, Parser)]
#[command(
  name = "vault-creds",
  version,
  about = "Authorize HashiCorp Vault clients from stored credentials",
  long_about = "A command-line tool for turning stored credentials (tokens, token files, AppRole,\n\
                GitHub, Kubernetes and response-wrapped tokens) into authorized Vault sessions.",
  styles = get_clap_styles()
)]
pub struct Cli {
  /// Subcommand to execute
  #[command(subcommand)]
  pub command: Command,

  /// Connection options
  #[command(flatten)]
  pub connection: ConnectionOptions,

  /// Credential options
  #[command(flatten)]
  pub credential: CredentialOptions,

  /// Behavior options
  #[command(flatten)]
  pub behavior: BehaviorOptions,
}

/// Top-level subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
  /// Authentication testing and inspection
  Auth {
    #[command(subcommand)]
    subcommand: AuthCommand,
  },

  /// Read a secret with the resolved credential
  Read {
    /// Secret path, optionally followed by `#field`
    #[arg(value_name = "PATH[#FIELD]", value_parser = parse_secret_ref)]
    reference: SecretRef,

    /// Field to print (overrides a `#field` suffix)
    #[arg(long, value_name = "FIELD")]
    field: Option<String>,

    /// Print all fields as JSON (not with --field or a `#field` suffix)
    #[arg(long, conflicts_with = "field")]
    json: bool,
  },

  /// Inspect the credentials file
  Credentials {
    #[command(subcommand)]
    subcommand: CredentialsCommand,
  },

  /// Display version and build information
  Version {
    /// Output in JSON format
    #[arg(long)]
    json: bool,

    /// Show only version number
    #[arg(long)]
    short: bool,
  },

  /// Generate shell completion scripts
  Completions {
    /// Target shell for completions
    #[arg(value_enum)]
    shell: Shell,
  },
}

/// Authentication subcommands
#[derive(Debug, Clone, Copy, Subcommand)]
pub enum AuthCommand {
  /// Authorize and verify the token with Vault
  Test,
  /// Show the resolved address and credential source
  Show,
}

/// Credentials-file subcommands
#[derive(Debug, Clone, Copy, Subcommand)]
pub enum CredentialsCommand {
  /// List registered credentials
  List,
  /// Authorize every registered credential and report the outcome
  Verify,
}

/// Shells supported by `completions`
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
  Bash,
  Zsh,
  Fish,
  Powershell,
  Elvish,
}

fn parse_secret_ref(input: &str) -> Result<SecretRef, String> {
  input.parse()
}

/// Connection options
#[derive(Debug, Parser)]
pub struct ConnectionOptions {
  /// Vault server address
  #[arg(long, env = "VAULT_ADDR", value_name = "URL", value_parser = normalize_address)]
  pub address: Option<String>,

  /// Vault Enterprise namespace
  #[arg(long, env = "VAULT_NAMESPACE", value_name = "NAMESPACE")]
  pub namespace: Option<String>,

  /// PEM file with additional CA certificates to trust
  #[arg(long, env = "VAULT_CACERT", value_name = "FILE")]
  pub ca_cert: Option<PathBuf>,

  /// Disable TLS certificate verification
  #[arg(long, env = "VAULT_SKIP_VERIFY")]
  pub skip_verify: bool,

  /// Request timeout in seconds
  #[arg(long, default_value = "30", value_name = "SECONDS")]
  pub timeout: u64,

  /// Where `address` came from, recorded by [`Cli::parse_args`]
  #[arg(skip)]
  pub address_source: Option<ValueSource>,
}

/// Credential options
#[derive(Debug, Parser)]
pub struct CredentialOptions {
  /// Vault token
  #[arg(long, env = "VAULT_TOKEN", value_name = "TOKEN", hide_env_values = true)]
  pub token: Option<String>,

  /// File containing a Vault token (used when no token is given)
  #[arg(long, env = "VAULT_TOKEN_FILE", value_name = "FILE")]
  pub token_file: Option<PathBuf>,

  /// JSON file with credential definitions
  #[arg(long, env = "VAULT_CREDENTIALS_FILE", value_name = "FILE")]
  pub credentials_file: Option<PathBuf>,

  /// Id of the credential to use from the credentials file
  #[arg(long = "credential", env = "VAULT_CREDENTIAL_ID", value_name = "ID")]
  pub credential_id: Option<String>,

  /// Where `token` came from, recorded by [`Cli::parse_args`]
  #[arg(skip)]
  pub token_source: Option<ValueSource>,
}

/// Behavior options
#[derive(Debug, Parser)]
pub struct BehaviorOptions {
  /// Increase verbosity (-v info, -vv debug, -vvv trace)
  #[arg(short, long, action = clap::ArgAction::Count)]
  pub verbose: u8,

  /// Suppress all output except errors
  #[arg(short, long, conflicts_with = "verbose")]
  pub quiet: bool,

  /// Colorize output
  #[arg(long, value_enum, default_value = "auto", value_name = "WHEN")]
  pub color: ColorOption,
}

/// Color output options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorOption {
  Auto,
  Always,
  Never,
}

impl Cli {
  /// Parse CLI arguments from the environment
  pub fn parse_args() -> Self {
    Self::from_matches(Self::command().get_matches())
  }

  /// Build the CLI from matched arguments, keeping track of whether the
  /// address and token were given as flags or environment variables.
  pub fn from_matches(matches: clap::ArgMatches) -> Self {
    let mut cli = Self::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());
    cli.connection.address_source = matches.value_source("address");
    cli.credential.token_source = matches.value_source("token");
    cli
  }

  /// Validate CLI arguments
  ///
  /// Returns an error if the CLI configuration is invalid.
  pub fn validate(&self) -> Result<(), String> {
    if self.credential.credential_id.is_some() && self.credential.credentials_file.is_none() {
      return Err("--credential requires --credentials-file".to_string());
    }

    if matches!(
      self.command,
      Command::Credentials { .. }
    ) && self.credential.credentials_file.is_none()
    {
      return Err("the credentials subcommands require --credentials-file".to_string());
    }

    if matches!(&self.command, Command::Read { reference, json: true, .. } if reference.field.is_some()) {
      return Err("--json prints every field and cannot be combined with a #field suffix".to_string());
    }

    if self.connection.timeout == 0 {
      return Err("--timeout must be at least 1 second".to_string());
    }

    Ok(())
  }
}

/// Parse CLI arguments, initialize logging, and dispatch to the chosen
/// command.
pub async fn run() {
  let cli = Cli::parse_args();

  init_tracing(&cli.behavior);

  let colors = ColorScheme::new(cli.behavior.color);

  if let Err(e) = cli.validate() {
    eprintln!("{} {}", colors.error("Error:"), e);
    process::exit(4); // Invalid arguments exit code
  }

  match &cli.command {
    Command::Auth { subcommand } => {
      handle_auth_command(*subcommand, &cli, &colors).await;
    }
    Command::Read {
      reference,
      field,
      json,
    } => {
      handle_read_command(reference, field.as_deref(), *json, &cli, &colors).await;
    }
    Command::Credentials { subcommand } => {
      handle_credentials_command(*subcommand, &cli, &colors).await;
    }
    Command::Version { json, short } => {
      handle_version_command(*json, *short, &colors);
    }
    Command::Completions { shell } => {
      handle_completions_command(*shell);
    }
  }
}

fn init_tracing(behavior: &BehaviorOptions) {
  let level = if behavior.quiet {
    LevelFilter::ERROR
  } else {
    match behavior.verbose {
      0 => LevelFilter::WARN,
      1 => LevelFilter::INFO,
      2 => LevelFilter::DEBUG,
      _ => LevelFilter::TRACE,
    }
  };

  let env_filter = EnvFilter::builder()
    .with_default_directive(level.into())
    .from_env_lossy();

  let _ = tracing_subscriber::fmt()
    .with_env_filter(env_filter)
    .with_target(false)
    .with_writer(std::io::stderr)
    .try_init();
}

/// Get custom styles for clap help output
fn get_clap_styles() -> clap::builder::Styles {
  use clap::builder::styling::{AnsiColor, Effects};

  clap::builder::Styles::styled()
    .header(AnsiColor::BrightYellow.on_default() | Effects::BOLD)
    .usage(AnsiColor::BrightYellow.on_default() | Effects::BOLD)
    .literal(AnsiColor::BrightGreen.on_default())
    .placeholder(AnsiColor::BrightCyan.on_default())
    .error(AnsiColor::BrightRed.on_default() | Effects::BOLD)
    .valid(AnsiColor::BrightGreen.on_default())
    .invalid(AnsiColor::BrightRed.on_default())
}
