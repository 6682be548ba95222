//! Rule error types.

use thiserror::Error;

/// Errors a rule unit can report.
#[derive(Debug, Error)]
pub enum RuleError {
    /// The configured options are not acceptable to the rule.
    ///
    /// Reported while building a descriptor, never during evaluation.
    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    /// The rule failed while evaluating a document.
    #[error("Rule execution failed: {0}")]
    Execution(String),
}

impl RuleError {
    /// Creates an invalid options error.
    pub fn invalid_options(message: impl Into<String>) -> Self {
        Self::InvalidOptions(message.into())
    }

    /// Creates an execution error.
    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution(message.into())
    }
}

impl From<serde_json::Error> for RuleError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidOptions(err.to_string())
    }
}
