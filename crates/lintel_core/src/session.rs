//! Session runner: evaluates a batch of documents.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use lintel_ast::LineIndex;
use lintel_plugin::{Diagnostic, SessionContext, SessionDocument};
use rayon::prelude::*;
use tracing::{info, warn};

use crate::config::{DEFAULT_MAX_FIX_ITERATIONS, LinterConfig};
use crate::descriptor::{Descriptor, RuleDescriptor};
use crate::kernel::{Kernel, Mode, SourceDocument, rule_failure, sort_messages};
use crate::registry::Registry;
use crate::{BatchResult, DocumentResult, LinterError, panic_message, synthetic};

/// Runs a descriptor over batches of documents.
///
/// Per-document failures never abort a batch: they become a single error
/// message in that document's result.
#[derive(Debug, Clone)]
pub struct SessionRunner {
    descriptor: Arc<Descriptor>,
    max_fix_iterations: usize,
    parallel: bool,
}

impl SessionRunner {
    pub fn new(descriptor: Arc<Descriptor>) -> Self {
        Self {
            descriptor,
            max_fix_iterations: DEFAULT_MAX_FIX_ITERATIONS,
            parallel: true,
        }
    }

    /// Builds the descriptor for `config` from `registry`.
    pub fn from_config(config: &LinterConfig, registry: &Registry) -> Result<Self, LinterError> {
        let descriptor = Descriptor::from_config(config, registry)?;
        Ok(Self::new(Arc::new(descriptor))
            .with_max_fix_iterations(config.max_fix_iterations)
            .with_parallel(config.parallel))
    }

    pub fn with_max_fix_iterations(mut self, max_fix_iterations: usize) -> Self {
        self.max_fix_iterations = max_fix_iterations;
        self
    }

    /// Enables or disables parallel evaluation of documents.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    /// Evaluates every document and returns the results in input order.
    pub fn run(&self, documents: &[SourceDocument], mode: Mode) -> BatchResult {
        info!(
            "Evaluating {} documents ({:?}, parallel={})",
            documents.len(),
            mode,
            self.parallel
        );

        let kernel =
            Kernel::new(&self.descriptor).with_max_fix_iterations(self.max_fix_iterations);
        let evaluate = |input: &SourceDocument| evaluate_document(&kernel, input, mode);

        let (mut results, evaluated): (Vec<DocumentResult>, Vec<bool>) = if self.parallel {
            documents.par_iter().map(evaluate).unzip()
        } else {
            documents.iter().map(evaluate).unzip()
        };

        self.run_session_rules(documents, &evaluated, &mut results);

        let batch = BatchResult::new(results);
        let summary = batch.summary();
        info!(
            "Evaluated {} documents: {} errors, {} warnings, {} fixed",
            summary.documents, summary.errors, summary.warnings, summary.fixed
        );
        batch
    }

    /// Runs session rules over the final text of every evaluated document and
    /// merges their messages into `results`.
    ///
    /// Documents whose evaluation failed are left out of the batch the rules
    /// see, and their single failure message is left untouched.
    fn run_session_rules(
        &self,
        documents: &[SourceDocument],
        evaluated: &[bool],
        results: &mut [DocumentResult],
    ) {
        let mut session_rules = self.descriptor.session_rules().peekable();
        if session_rules.peek().is_none() {
            return;
        }

        let texts: Vec<&str> = documents
            .iter()
            .zip(results.iter())
            .map(|(input, result)| result.fixed_text.as_deref().unwrap_or(&input.text))
            .collect();
        let batch: Vec<SessionDocument<'_>> = documents
            .iter()
            .zip(&texts)
            .enumerate()
            .filter(|(index, _)| evaluated[*index])
            .map(|(index, (input, text))| SessionDocument {
                index,
                id: &input.id,
                kind: &input.kind,
                source: text,
            })
            .collect();
        let lines: Vec<LineIndex> = texts.iter().map(|text| LineIndex::new(text)).collect();

        let mut extra: Vec<Vec<Diagnostic>> = vec![Vec::new(); batch.len()];
        for (binding, rule) in session_rules {
            let ctx = SessionContext {
                rule_id: &binding.rule_id,
                documents: &batch,
                options: &binding.options,
                settings: self.descriptor.settings(),
            };

            let outcome = match panic::catch_unwind(AssertUnwindSafe(|| rule.lint_session(&ctx))) {
                Ok(Ok(pairs)) => finalize_session(binding, &texts, evaluated, &lines, pairs),
                Ok(Err(e)) => Err(e.to_string()),
                Err(payload) => Err(format!("panicked: {}", panic_message(payload.as_ref()))),
            };

            match outcome {
                Ok(pairs) => {
                    for (index, diagnostic) in pairs {
                        extra[index].push(diagnostic);
                    }
                }
                Err(reason) => {
                    warn!("Session rule '{}' failed: {}", binding.rule_id, reason);
                    for doc in &batch {
                        extra[doc.index].push(rule_failure(&binding.rule_id, &reason));
                    }
                }
            }
        }

        for (result, messages) in results.iter_mut().zip(extra) {
            if !messages.is_empty() {
                result.messages.extend(messages);
                sort_messages(&self.descriptor, &mut result.messages);
            }
        }
    }
}

/// Evaluates one document, turning every failure into a result.
///
/// The flag is false when the document could not be evaluated.
fn evaluate_document(
    kernel: &Kernel<'_>,
    input: &SourceDocument,
    mode: Mode,
) -> (DocumentResult, bool) {
    match panic::catch_unwind(AssertUnwindSafe(|| kernel.run(input, mode))) {
        Ok(Ok(result)) => (result, true),
        Ok(Err(err)) => {
            warn!("Failed to evaluate '{}': {}", input.id, err);
            let result = DocumentResult::failure(&input.id, err.rule_id(), err.to_string());
            (result, false)
        }
        Err(payload) => {
            let reason = panic_message(payload.as_ref());
            warn!("Evaluation of '{}' panicked: {}", input.id, reason);
            let result = DocumentResult::failure(
                &input.id,
                synthetic::INTERNAL,
                format!("Internal error: evaluation panicked: {reason}"),
            );
            (result, false)
        }
    }
}

/// Checks session rule output and attributes it to its binding.
fn finalize_session(
    binding: &RuleDescriptor,
    texts: &[&str],
    evaluated: &[bool],
    lines: &[LineIndex],
    mut pairs: Vec<(usize, Diagnostic)>,
) -> Result<Vec<(usize, Diagnostic)>, String> {
    for (index, diagnostic) in &mut pairs {
        let Some(text) = texts.get(*index).filter(|_| evaluated[*index]) else {
            return Err(format!("reported unknown document index {index}"));
        };
        if !diagnostic.span.is_valid_for(text) {
            return Err(format!(
                "reported invalid range {}..{}",
                diagnostic.span.start, diagnostic.span.end
            ));
        }
        diagnostic.rule_id.clone_from(&binding.rule_id);
        if let Some(severity) = binding.severity {
            diagnostic.severity = severity;
        }
        diagnostic.loc = Some(lines[*index].location(text, diagnostic.span));
    }
    Ok(pairs)
}
