//! Semantic terminal colors for vault-creds output.
//!
//! Honors `--color` and falls back to plain text when stdout is not a
//! terminal.

use owo_colors::OwoColorize;

use crate::cli::ColorOption;

/// Semantic styles shared by all command handlers.
pub struct ColorScheme {
  enabled: bool,
}

impl ColorScheme {
  /// Resolve `--color` against the terminal attached to stdout.
  pub fn new(color_option: ColorOption) -> Self {
    let enabled = match color_option {
      ColorOption::Always => true,
      ColorOption::Never => false,
      ColorOption::Auto => {
        use std::io::IsTerminal;
        std::io::stdout().is_terminal()
      }
    };

    Self { enabled }
  }

  /// Check if colors are enabled
  pub fn is_enabled(&self) -> bool {
    self.enabled
  }

  /// Style for success messages (green)
  pub fn success<T: std::fmt::Display>(&self, text: T) -> String {
    if self.enabled {
      format!("{}", text.green())
    } else {
      text.to_string()
    }
  }

  /// Style for error messages (bright red)
  pub fn error<T: std::fmt::Display>(&self, text: T) -> String {
    if self.enabled {
      format!("{}", text.bright_red().bold())
    } else {
      text.to_string()
    }
  }

  /// Style for warning messages (yellow)
  pub fn warning<T: std::fmt::Display>(&self, text: T) -> String {
    if self.enabled {
      format!("{}", text.yellow())
    } else {
      text.to_string()
    }
  }

  /// Style for info messages (cyan)
  pub fn info<T: std::fmt::Display>(&self, text: T) -> String {
    if self.enabled {
      format!("{}", text.cyan())
    } else {
      text.to_string()
    }
  }

  /// Style for emphasis/important text (bright white, bold)
  pub fn emphasis<T: std::fmt::Display>(&self, text: T) -> String {
    if self.enabled {
      format!("{}", text.bright_white().bold())
    } else {
      text.to_string()
    }
  }

  /// Style for URLs and links (blue, underlined)
  pub fn link<T: std::fmt::Display>(&self, text: T) -> String {
    if self.enabled {
      format!("{}", text.blue().underline())
    } else {
      text.to_string()
    }
  }

  /// Style for file paths (magenta)
  pub fn path<T: std::fmt::Display>(&self, text: T) -> String {
    if self.enabled {
      format!("{}", text.magenta())
    } else {
      text.to_string()
    }
  }

  /// Style for numbers and metrics (bright blue)
  pub fn number<T: std::fmt::Display>(&self, text: T) -> String {
    if self.enabled {
      format!("{}", text.bright_blue())
    } else {
      text.to_string()
    }
  }

  /// Style for commands and code (bright green, monospace feel via styling)
  pub fn code<T: std::fmt::Display>(&self, text: T) -> String {
    if self.enabled {
      format!("{}", text.bright_green())
    } else {
      text.to_string()
    }
  }

  /// Style for dimmed/secondary text (gray)
  pub fn dimmed<T: std::fmt::Display>(&self, text: T) -> String {
    if self.enabled {
      format!("{}", text.dimmed())
    } else {
      text.to_string()
    }
  }

  /// Style for in-flight work (bright cyan)
  pub fn progress<T: std::fmt::Display>(&self, text: T) -> String {
    if self.enabled {
      format!("{}", text.bright_cyan())
    } else {
      text.to_string()
    }
  }
}
