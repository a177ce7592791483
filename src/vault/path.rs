//! Parsing of `path#field` secret references.

use std::fmt;
use std::str::FromStr;

/// A secret location with an optional field selector, written as
/// `secret/data/app#password`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretRef {
  /// Logical Vault path without leading or trailing slashes.
  pub path: String,
  /// Field within the secret, if one was selected.
  pub field: Option<String>,
}

impl FromStr for SecretRef {
  type Err = String;

  fn from_str(input: &str) -> Result<Self, Self::Err> {
    let (path, field) = match input.split_once('#') {
      Some((path, field)) => (path, Some(field)),
      None => (input, None),
    };

    let path = path.trim().trim_matches('/');
    if path.is_empty() {
      return Err(format!("secret reference {input:?} has an empty path"));
    }
    if path.split('/').any(|segment| segment.is_empty() || segment == "..") {
      return Err(format!("secret reference {input:?} contains an invalid path segment"));
    }

    let field = match field.map(str::trim) {
      Some("") => return Err(format!("secret reference {input:?} has an empty field")),
      other => other.map(str::to_string),
    };

    Ok(Self {
      path: path.to_string(),
      field,
    })
  }
}

impl fmt::Display for SecretRef {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.field {
      Some(field) => write!(f, "{}#{field}", self.path),
      None => write!(f, "{}", self.path),
    }
  }
}
