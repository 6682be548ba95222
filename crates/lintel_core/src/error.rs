//! Linter error types.

use std::fmt;

use lintel_parser::ParseError;
use thiserror::Error;

use crate::synthetic;

/// Errors that can occur while configuring or running the linter.
#[derive(Debug, Error)]
pub enum LinterError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The descriptor could not be built.
    #[error(transparent)]
    Descriptor(#[from] DescriptorError),

    /// No format plugin is bound for the document kind.
    #[error("No format plugin is bound for kind '{0}'")]
    UnsupportedKind(String),

    /// Parse error.
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl LinterError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an unsupported kind error.
    pub fn unsupported_kind(kind: impl Into<String>) -> Self {
        Self::UnsupportedKind(kind.into())
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Rule id used when this error is reported as a document message.
    pub fn rule_id(&self) -> &'static str {
        match self {
            Self::UnsupportedKind(_) => synthetic::UNSUPPORTED_KIND,
            Self::Parse(_) => synthetic::PARSE_ERROR,
            _ => synthetic::INTERNAL,
        }
    }
}

/// One problem found while building a descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// Two rules are bound under the same id.
    DuplicateRule { rule_id: String },
    /// Two plugins are bound under the same id.
    DuplicatePlugin { plugin_id: String },
    /// Two plugins claim the same document kind.
    DuplicateKind {
        kind: String,
        first: String,
        second: String,
    },
    /// A rule rejected its options.
    InvalidOptions { rule_id: String, message: String },
    /// The configuration names a rule nobody registered.
    UnknownRule { rule_id: String },
    /// The configuration names a plugin nobody registered.
    UnknownPlugin { plugin_id: String },
    /// No format plugin is bound at all.
    NoPlugins,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateRule { rule_id } => write!(f, "rule '{rule_id}' is bound more than once"),
            Self::DuplicatePlugin { plugin_id } => {
                write!(f, "plugin '{plugin_id}' is bound more than once")
            }
            Self::DuplicateKind {
                kind,
                first,
                second,
            } => write!(
                f,
                "kind '{kind}' is claimed by both '{first}' and '{second}'"
            ),
            Self::InvalidOptions { rule_id, message } => {
                write!(f, "invalid options for rule '{rule_id}': {message}")
            }
            Self::UnknownRule { rule_id } => write!(f, "unknown rule '{rule_id}'"),
            Self::UnknownPlugin { plugin_id } => write!(f, "unknown plugin '{plugin_id}'"),
            Self::NoPlugins => f.write_str("at least one format plugin is required"),
        }
    }
}

/// Every violation found while building a descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorError {
    pub violations: Vec<Violation>,
}

impl DescriptorError {
    pub fn new(violations: Vec<Violation>) -> Self {
        Self { violations }
    }
}

impl fmt::Display for DescriptorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid descriptor ({} violation{})",
            self.violations.len(),
            if self.violations.len() == 1 { "" } else { "s" }
        )?;
        for violation in &self.violations {
            write!(f, "\n  - {violation}")?;
        }
        Ok(())
    }
}

impl std::error::Error for DescriptorError {}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn descriptor_error_lists_every_violation() {
        let err = DescriptorError::new(vec![
            Violation::DuplicateRule {
                rule_id: "no-todo".to_string(),
            },
            Violation::NoPlugins,
        ]);

        assert_eq!(
            err.to_string(),
            "Invalid descriptor (2 violations)\n  - rule 'no-todo' is bound more than once\n  - at least one format plugin is required"
        );
    }

    #[test]
    fn errors_map_to_synthetic_rule_ids() {
        assert_eq!(
            LinterError::unsupported_kind("csv").rule_id(),
            synthetic::UNSUPPORTED_KIND
        );
        assert_eq!(
            LinterError::from(ParseError::invalid_source("bad")).rule_id(),
            synthetic::PARSE_ERROR
        );
        assert_eq!(LinterError::internal("boom").rule_id(), synthetic::INTERNAL);
    }
}
