//! Configuration error types.
//!
//! Loading fails fast on I/O and TOML errors. Section validation instead
//! collects every problem into [`ConfigDiagnostics`] and reports them
//! together, one block per offending field:
//!
//! ```text
//! error[data.sources]: data source 'data/missing.json' not found
//! error[taxonomies.tag]: expected a field name string, found integer
//!   = hint: write `tag = "tags"`
//!
//! 2 config errors found
//! ```

use super::FieldPath;
use owo_colors::OwoColorize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading `taxa.toml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no `{0}` here or in any parent directory (pass --config to point at one)")]
    NotFound(PathBuf),

    #[error("cannot read config `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("invalid TOML in config")]
    Toml(#[from] toml::de::Error),

    // No #[from]: the diagnostics print themselves, a source would repeat them
    #[error("{0}")]
    Diagnostics(ConfigDiagnostics),
}

/// One rejected config value.
#[derive(Debug, Clone)]
pub struct ConfigDiagnostic {
    pub field: FieldPath,
    pub message: String,
    pub hint: Option<String>,
}

impl fmt::Display for ConfigDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}",
            "error[".red().bold(),
            self.field.as_str().cyan(),
            "]:".red().bold()
        )?;
        write!(f, " {}", self.message)?;
        if let Some(hint) = &self.hint {
            write!(f, "\n  {} {}", "= hint:".yellow(), hint)?;
        }
        Ok(())
    }
}

/// Validation results for a whole config: fatal errors plus advisory hints.
#[derive(Debug, Default)]
pub struct ConfigDiagnostics {
    errors: Vec<ConfigDiagnostic>,
    hints: Vec<(FieldPath, String)>,
}

impl ConfigDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, field: FieldPath, message: impl Into<String>) {
        self.push(field, message.into(), None);
    }

    pub fn error_with_hint(
        &mut self,
        field: FieldPath,
        message: impl Into<String>,
        hint: impl Into<String>,
    ) {
        self.push(field, message.into(), Some(hint.into()));
    }

    fn push(&mut self, field: FieldPath, message: String, hint: Option<String>) {
        self.errors.push(ConfigDiagnostic {
            field,
            message,
            hint,
        });
    }

    /// Record an advisory note. Hints never fail validation.
    pub fn hint(&mut self, field: FieldPath, message: impl Into<String>) {
        self.hints.push((field, message.into()));
    }

    /// Log every collected hint.
    pub fn print_hints(&self) {
        for (field, message) in &self.hints {
            crate::log!("hint"; "[{}] {}", field.as_str(), message);
        }
    }

    /// `Err(self)` when any error was collected.
    pub fn into_result(self) -> Result<(), Self> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    #[cfg(test)]
    pub fn errors(&self) -> &[ConfigDiagnostic] {
        &self.errors
    }

    #[cfg(test)]
    pub fn hints(&self) -> &[(FieldPath, String)] {
        &self.hints
    }
}

impl fmt::Display for ConfigDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for err in &self.errors {
            writeln!(f, "{err}")?;
        }
        let noun = if self.errors.len() == 1 { "error" } else { "errors" };
        write!(
            f,
            "\n{} config {} found",
            self.errors.len().to_string().red().bold(),
            noun
        )
    }
}

impl std::error::Error for ConfigDiagnostics {}
