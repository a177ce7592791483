//! Secret reading.
//!
//! Implements `vault-creds read PATH[#FIELD]`: the resolved credential is
//! authorized lazily and the secret is fetched with the resulting client.

use std::process;

use serde_json::{Map, Value};

use crate::authenticator::TokenAuthenticator;
use crate::cli::Cli;
use crate::color::ColorScheme;
use crate::commands::auth::{authorize, build_config, exit_with_auth_error, resolve_credential};
use crate::vault::{SecretRef, VaultApi, VaultApiError};

/// Fetch a secret and print it.
///
/// # Arguments
/// * `reference` - Secret path with an optional `#field` suffix.
/// * `field` - Field from `--field`, taking precedence over the suffix.
/// * `json` - Print every field as pretty JSON.
/// * `cli` - Parsed CLI settings.
/// * `colors` - Shared color scheme.
pub(crate) async fn handle_read_command(
  reference: &SecretRef,
  field: Option<&str>,
  json: bool,
  cli: &Cli,
  colors: &ColorScheme,
) {
  let config = match build_config(cli) {
    Ok(config) => config,
    Err(e) => {
      eprintln!("{} {e:#}", colors.error("Error:"));
      process::exit(4);
    }
  };

  let resolved = match resolve_credential(cli) {
    Ok(resolved) => resolved,
    Err(e) => {
      eprintln!("{} {e:#}", colors.error("Error:"));
      process::exit(2);
    }
  };

  let client = match authorize(&config, resolved.credential.as_ref(), TokenAuthenticator::new()).await {
    Ok(client) => client,
    Err(e) => exit_with_auth_error(&e, colors),
  };

  let mut reference = reference.clone();
  if let Some(field) = field {
    reference.field = Some(field.to_string());
  }

  if reference.field.is_some() {
    match client.read_field(&reference).await {
      Ok(value) => println!("{value}"),
      Err(e) => exit_with_read_error(&reference, &e, colors),
    }
    return;
  }

  let secret = match client.read_secret(&reference.path).await {
    Ok(secret) => secret,
    Err(e) => exit_with_read_error(&reference, &e, colors),
  };

  let empty = Map::new();
  let fields = secret.fields().unwrap_or(&empty);
  if json {
    match serde_json::to_string_pretty(fields) {
      Ok(rendered) => println!("{rendered}"),
      Err(e) => {
        eprintln!("{} {e}", colors.error("Error:"));
        process::exit(1);
      }
    }
  } else {
    print!("{}", render_fields(fields, colors));
  }
}

fn exit_with_read_error(reference: &SecretRef, err: &VaultApiError, colors: &ColorScheme) -> ! {
  eprintln!("{} Failed to read {}", colors.error("✗"), colors.path(reference));
  eprintln!("  {err}");
  if err.is_permission_denied() {
    eprintln!(
      "\n{}",
      colors.dimmed("The token was rejected or lacks a policy granting read on this path")
    );
    process::exit(2);
  }
  process::exit(1);
}

/// Render fields as `key: value` lines in key order.
pub(crate) fn render_fields(fields: &Map<String, Value>, colors: &ColorScheme) -> String {
  let mut keys: Vec<&String> = fields.keys().collect();
  keys.sort();

  let mut out = String::new();
  for key in keys {
    let value = match &fields[key.as_str()] {
      Value::String(s) => s.clone(),
      other => other.to_string(),
    };
    out.push_str(&format!("{}: {value}\n", colors.emphasis(key)));
  }
  out
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;
  use crate::cli::ColorOption;

  #[test]
  fn test_render_fields_sorted() {
    let colors = ColorScheme::new(ColorOption::Never);
    let value = json!({
      "username": "app",
      "password": "hunter2",
      "port": 5432,
      "tags": ["a", "b"]
    });

    let rendered = render_fields(value.as_object().unwrap(), &colors);
    insta::assert_snapshot!(rendered.trim_end(), @r#"
    password: hunter2
    port: 5432
    tags: ["a","b"]
    username: app
    "#);
  }

  #[test]
  fn test_render_no_fields() {
    let colors = ColorScheme::new(ColorOption::Never);
    assert_eq!(render_fields(&Map::new(), &colors), "");
  }
}
