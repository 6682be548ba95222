//! Per-document and batch results.

use lintel_plugin::{Diagnostic, Severity};
use serde::Serialize;

use crate::synthetic;

/// Outcome of evaluating one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentResult {
    /// Identifier of the document.
    pub id: String,

    /// Messages ordered by range start, then rule order.
    pub messages: Vec<Diagnostic>,

    /// Final text after fixing, present only when it differs from the input.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed_text: Option<String>,

    /// Whether any patch was accepted.
    pub fix_applied: bool,

    /// Number of fix iterations that produced new text.
    pub fix_iterations: usize,
}

impl DocumentResult {
    /// Creates a lint-mode result.
    pub fn new(id: impl Into<String>, messages: Vec<Diagnostic>) -> Self {
        Self {
            id: id.into(),
            messages,
            fixed_text: None,
            fix_applied: false,
            fix_iterations: 0,
        }
    }

    /// Creates the result of a document that could not be evaluated: a
    /// single `error` message and no fix output.
    ///
    /// Callers that enforce their own per-document timeout can use this with
    /// [`synthetic::TIMEOUT`].
    pub fn failure(id: impl Into<String>, rule_id: &str, text: impl Into<String>) -> Self {
        Self::new(id, vec![synthetic::message(rule_id, Severity::Error, text)])
    }

    /// Counts messages with the given severity.
    pub fn count(&self, severity: Severity) -> usize {
        self.messages
            .iter()
            .filter(|m| m.severity == severity)
            .count()
    }

    /// Returns true if any message is an error.
    pub fn has_errors(&self) -> bool {
        self.count(Severity::Error) > 0
    }
}

/// Results of one session, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchResult {
    pub documents: Vec<DocumentResult>,
}

impl BatchResult {
    pub fn new(documents: Vec<DocumentResult>) -> Self {
        Self { documents }
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DocumentResult> {
        self.documents.iter()
    }

    /// Looks up a document result by id.
    pub fn get(&self, id: &str) -> Option<&DocumentResult> {
        self.documents.iter().find(|d| d.id == id)
    }

    /// Aggregates message and fix counts over the batch.
    pub fn summary(&self) -> LintSummary {
        self.documents
            .iter()
            .fold(LintSummary::default(), |mut summary, doc| {
                summary.documents += 1;
                summary.errors += doc.count(Severity::Error);
                summary.warnings += doc.count(Severity::Warning);
                summary.infos += doc.count(Severity::Info);
                if doc.fixed_text.is_some() {
                    summary.fixed += 1;
                }
                summary
            })
    }
}

impl<'a> IntoIterator for &'a BatchResult {
    type Item = &'a DocumentResult;
    type IntoIter = std::slice::Iter<'a, DocumentResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.documents.iter()
    }
}

/// Counts over a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LintSummary {
    pub documents: usize,
    pub errors: usize,
    pub warnings: usize,
    pub infos: usize,
    /// Documents whose text changed in fix mode.
    pub fixed: usize,
}
