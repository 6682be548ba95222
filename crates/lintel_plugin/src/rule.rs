//! Rule unit traits and evaluation contexts.

use std::collections::BTreeMap;

use lintel_ast::{Document, Span};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{Diagnostic, RuleError, RuleManifest};

/// Preset/group configuration shared by every rule of a descriptor.
pub type Settings = BTreeMap<String, Value>;

/// Everything a rule sees while evaluating one document.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    /// Identifier the rule is bound under (may be an alias).
    pub rule_id: &'a str,
    /// The document being evaluated.
    pub document: &'a Document<'a>,
    /// Options configured for this binding, passed verbatim.
    pub options: &'a Value,
    /// Descriptor-wide settings.
    pub settings: &'a Settings,
}

impl<'a> RuleContext<'a> {
    /// Starts a diagnostic attributed to this binding.
    pub fn diagnostic(&self, message: impl Into<String>, span: Span) -> Diagnostic {
        Diagnostic::new(self.rule_id, message, span)
    }

    /// Deserializes the options, treating `null` as `T::default()`.
    pub fn options_as<T>(&self) -> Result<T, RuleError>
    where
        T: DeserializeOwned + Default,
    {
        parse_options(self.options)
    }

    /// Source text of the document.
    pub fn source(&self) -> &'a str {
        self.document.source()
    }
}

/// Deserializes rule options, treating `null` as `T::default()`.
pub fn parse_options<T>(options: &Value) -> Result<T, RuleError>
where
    T: DeserializeOwned + Default,
{
    if options.is_null() {
        return Ok(T::default());
    }
    Ok(serde_json::from_value(options.clone())?)
}

/// A diagnostic/fix producer evaluated against one document at a time.
///
/// Implementations are shared between threads and between descriptors, so
/// they must not keep per-document state.
pub trait Rule: Send + Sync {
    /// Returns the rule's manifest.
    fn manifest(&self) -> &RuleManifest;

    /// Checks configured options beyond what the manifest schema expresses.
    ///
    /// Called once while building a descriptor.
    fn validate_options(&self, _options: &Value) -> Result<(), RuleError> {
        Ok(())
    }

    /// Evaluates the rule against `ctx.document`.
    fn lint(&self, ctx: &RuleContext<'_>) -> Result<Vec<Diagnostic>, RuleError>;
}

/// One document as seen by a session rule.
#[derive(Debug, Clone, Copy)]
pub struct SessionDocument<'a> {
    /// Position of the document in the batch.
    pub index: usize,
    pub id: &'a str,
    pub kind: &'a str,
    pub source: &'a str,
}

/// Everything a session rule sees: the whole batch.
#[derive(Debug, Clone, Copy)]
pub struct SessionContext<'a> {
    pub rule_id: &'a str,
    pub documents: &'a [SessionDocument<'a>],
    pub options: &'a Value,
    pub settings: &'a Settings,
}

impl<'a> SessionContext<'a> {
    /// Starts a diagnostic attributed to this binding.
    pub fn diagnostic(&self, message: impl Into<String>, span: Span) -> Diagnostic {
        Diagnostic::new(self.rule_id, message, span)
    }

    /// Deserializes the options, treating `null` as `T::default()`.
    pub fn options_as<T>(&self) -> Result<T, RuleError>
    where
        T: DeserializeOwned + Default,
    {
        parse_options(self.options)
    }
}

/// A rule that inspects the whole batch after per-document evaluation.
///
/// Returned diagnostics are paired with the `index` of the document they
/// belong to; their spans refer to that document's source as given in the
/// context.
pub trait SessionRule: Send + Sync {
    /// Returns the rule's manifest.
    fn manifest(&self) -> &RuleManifest;

    /// Checks configured options. Called once while building a descriptor.
    fn validate_options(&self, _options: &Value) -> Result<(), RuleError> {
        Ok(())
    }

    /// Evaluates the rule against the batch.
    fn lint_session(&self, ctx: &SessionContext<'_>)
    -> Result<Vec<(usize, Diagnostic)>, RuleError>;
}
