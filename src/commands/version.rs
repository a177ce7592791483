//! `vault-creds version`: build metadata as text or JSON.

use crate::color::ColorScheme;

/// Render version and build metadata in JSON or human-readable form.
///
/// # Arguments
/// * `json` - When `true`, emit a JSON document instead of colored text.
/// * `short` - When `true`, print only the semantic version string.
/// * `colors` - Shared color palette for styled terminal output.
pub(crate) fn handle_version_command(json: bool, short: bool, colors: &ColorScheme) {
  let version = env!("CARGO_PKG_VERSION");

  if short {
    println!("{version}");
    return;
  }

  let git_hash = env!("GIT_HASH");
  let build_timestamp = env!("BUILD_TIMESTAMP");
  let target = env!("TARGET");

  if json {
    let document = serde_json::json!({
      "version": version,
      "git_commit": git_hash,
      "build_timestamp": format_timestamp(build_timestamp),
      "target": target,
      "rust_version": rustc_version(),
    });
    println!("{document:#}");
  } else {
    println!("{} {}", colors.emphasis("vault-creds"), colors.number(version));
    println!("{}: {}", colors.emphasis("Git commit"), colors.code(git_hash));
    println!(
      "{}: {}",
      colors.emphasis("Built"),
      colors.dimmed(format_timestamp(build_timestamp))
    );
    println!("{}: {}", colors.emphasis("Target"), target);
    println!("{}: {}", colors.emphasis("Rust version"), rustc_version());
  }
}

/// Convert the embedded build timestamp into a human-readable ISO-8601 string.
///
/// # Arguments
/// * `timestamp` - Unix epoch seconds encoded as a string.
///
/// # Returns
/// ISO-8601 UTC timestamp when parsing succeeds, otherwise the raw input.
fn format_timestamp(timestamp: &str) -> String {
  timestamp
    .parse::<i64>()
    .ok()
    .and_then(|ts| {
      use std::time::{Duration, UNIX_EPOCH};
      UNIX_EPOCH.checked_add(Duration::from_secs(ts as u64))
    })
    .map(|time| {
      let datetime: chrono::DateTime<chrono::Utc> = time.into();
      datetime.format("%Y-%m-%d %H:%M:%S UTC").to_string()
    })
    .unwrap_or_else(|| timestamp.to_string())
}

/// Retrieve the Rust compiler version captured at build time.
///
/// # Returns
/// A string describing the `rustc` version bundled via `build.rs`.
fn rustc_version() -> String {
  env!("RUSTC_VERSION").to_string()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_format_timestamp() {
    assert_eq!(format_timestamp("0"), "1970-01-01 00:00:00 UTC");
    assert_eq!(format_timestamp("1700000000"), "2023-11-14 22:13:20 UTC");
  }

  #[test]
  fn test_format_timestamp_passes_through_garbage() {
    assert_eq!(format_timestamp("yesterday"), "yesterday");
  }
}
