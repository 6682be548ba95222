//! Execution kernel: lints or fixes a single document.

use std::panic::{self, AssertUnwindSafe};

use lintel_ast::{AstArena, Document};
use lintel_plugin::{Diagnostic, RuleContext, Severity};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::DEFAULT_MAX_FIX_ITERATIONS;
use crate::descriptor::{Descriptor, RuleDescriptor};
use crate::fix::{FixCoordinator, FixOutcome};
use crate::fixer::{Candidate, apply_patches, select_patches};
use crate::{DocumentResult, LinterError, panic_message, synthetic};

/// Whether proposed patches are applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Lint,
    Fix,
}

/// A document handed to the linter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDocument {
    /// Stable identifier, e.g. a path.
    pub id: String,
    /// Format tag matched against the bound plugins.
    pub kind: String,
    /// Content at load time.
    pub text: String,
}

impl SourceDocument {
    pub fn new(id: impl Into<String>, kind: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            text: text.into(),
        }
    }
}

/// Runs the rules of a descriptor against one document.
#[derive(Debug, Clone, Copy)]
pub struct Kernel<'d> {
    descriptor: &'d Descriptor,
    max_fix_iterations: usize,
}

impl<'d> Kernel<'d> {
    pub fn new(descriptor: &'d Descriptor) -> Self {
        Self {
            descriptor,
            max_fix_iterations: DEFAULT_MAX_FIX_ITERATIONS,
        }
    }

    /// Sets the maximum number of rewrites adopted per document.
    pub fn with_max_fix_iterations(mut self, max_fix_iterations: usize) -> Self {
        self.max_fix_iterations = max_fix_iterations;
        self
    }

    /// Evaluates `input` in the given mode.
    ///
    /// Fails only when the document cannot be evaluated at all (unsupported
    /// kind, unparseable source). Rule failures are reported as messages.
    pub fn run(&self, input: &SourceDocument, mode: Mode) -> Result<DocumentResult, LinterError> {
        match mode {
            Mode::Lint => self.lint(input),
            Mode::Fix => self.fix(input),
        }
    }

    /// Lints `input` without touching its text.
    pub fn lint(&self, input: &SourceDocument) -> Result<DocumentResult, LinterError> {
        let messages = self.evaluate(input, &input.text)?;
        Ok(DocumentResult::new(&input.id, messages))
    }

    /// Applies patches until no rule proposes an acceptable one, the
    /// iteration cap is hit, or the text returns to an earlier state.
    ///
    /// If patched text fails to parse, every rewrite is discarded and the
    /// lint result of the original text is returned with an extra error.
    pub fn fix(&self, input: &SourceDocument) -> Result<DocumentResult, LinterError> {
        let original = self.evaluate(input, &input.text)?;

        let mut coordinator = FixCoordinator::new(self.max_fix_iterations, &input.text);
        let mut current = input.text.clone();
        let mut messages = original.clone();
        let mut fix_applied = false;

        let outcome = loop {
            let candidates: Vec<Candidate<'_>> = messages
                .iter()
                .filter_map(|m| {
                    let fix = m.fix.as_ref()?;
                    let order = self.descriptor.rule_position(&m.rule_id)?;
                    Some(Candidate::new(order, fix))
                })
                .collect();
            let patches = select_patches(&current, &candidates);

            if patches.is_empty() {
                break FixOutcome::Converged {
                    iterations: coordinator.iterations(),
                };
            }
            if !coordinator.can_continue() {
                break FixOutcome::MaxIterationsReached {
                    iterations: coordinator.iterations(),
                };
            }

            let patched = apply_patches(&current, &patches);
            debug!(
                "Fix iteration {} for '{}': {} patches",
                coordinator.iterations() + 1,
                input.id,
                patched.fixes_applied
            );

            match self.evaluate(input, &patched.fixed_content) {
                Ok(next) => {
                    current = patched.fixed_content;
                    messages = next;
                    fix_applied = true;
                }
                Err(err) => {
                    warn!("Discarding unsafe fix for '{}': {}", input.id, err);
                    break FixOutcome::Unsafe;
                }
            }

            if let Some(cycle_length) = coordinator.record(&current) {
                break FixOutcome::CycleDetected { cycle_length };
            }
        };

        let note = match outcome {
            FixOutcome::Converged { .. } => None,
            FixOutcome::MaxIterationsReached { iterations } => {
                warn!("Fixes for '{}' did not converge", input.id);
                Some(synthetic::message(
                    synthetic::FIX_NOT_CONVERGED,
                    Severity::Warning,
                    format!("Fixes did not converge after {iterations} iterations."),
                ))
            }
            FixOutcome::CycleDetected { cycle_length } => {
                warn!("Fixes for '{}' cycle", input.id);
                Some(synthetic::message(
                    synthetic::FIX_NOT_CONVERGED,
                    Severity::Warning,
                    format!("Fixes repeat a previous state every {cycle_length} iterations."),
                ))
            }
            FixOutcome::Unsafe => {
                let mut messages = original;
                messages.push(synthetic::message(
                    synthetic::UNSAFE_FIX,
                    Severity::Error,
                    "Fixes were skipped because the fixed text could not be parsed.",
                ));
                sort_messages(self.descriptor, &mut messages);
                return Ok(DocumentResult::new(&input.id, messages));
            }
        };

        if let Some(note) = note {
            messages.push(note);
            sort_messages(self.descriptor, &mut messages);
        }

        let iterations = coordinator.iterations();
        let mut result = DocumentResult::new(&input.id, messages);
        result.fix_applied = fix_applied;
        result.fix_iterations = iterations;
        if current != input.text {
            result.fixed_text = Some(current);
        }
        Ok(result)
    }

    /// Parses `text` as `input`'s kind and runs every per-document rule.
    fn evaluate(&self, input: &SourceDocument, text: &str) -> Result<Vec<Diagnostic>, LinterError> {
        let arena = AstArena::new();
        let document = self
            .descriptor
            .parse(&arena, &input.id, &input.kind, text)?;
        Ok(self.run_rules(&document))
    }

    /// Runs the rules in descriptor order. Messages come back sorted by range
    /// start, ties kept in rule order.
    fn run_rules(&self, document: &Document<'_>) -> Vec<Diagnostic> {
        let mut messages = Vec::new();

        for (binding, rule) in self.descriptor.document_rules() {
            let ctx = RuleContext {
                rule_id: &binding.rule_id,
                document,
                options: &binding.options,
                settings: self.descriptor.settings(),
            };

            let outcome = match panic::catch_unwind(AssertUnwindSafe(|| rule.lint(&ctx))) {
                Ok(Ok(diagnostics)) => finalize(binding, document, diagnostics),
                Ok(Err(e)) => Err(e.to_string()),
                Err(payload) => Err(format!("panicked: {}", panic_message(payload.as_ref()))),
            };

            match outcome {
                Ok(diagnostics) => messages.extend(diagnostics),
                Err(reason) => {
                    warn!(
                        "Rule '{}' failed on '{}': {}",
                        binding.rule_id,
                        document.id(),
                        reason
                    );
                    messages.push(rule_failure(&binding.rule_id, &reason));
                }
            }
        }

        sort_messages(self.descriptor, &mut messages);
        messages
    }
}

/// Attributes diagnostics to their binding, applies the severity override
/// and fills in locations.
///
/// A diagnostic whose range does not fit the document fails the whole
/// output of the rule.
fn finalize(
    binding: &RuleDescriptor,
    document: &Document<'_>,
    mut diagnostics: Vec<Diagnostic>,
) -> Result<Vec<Diagnostic>, String> {
    let source = document.source();
    for diagnostic in &mut diagnostics {
        if !diagnostic.span.is_valid_for(source) {
            return Err(format!(
                "reported invalid range {}..{}",
                diagnostic.span.start, diagnostic.span.end
            ));
        }
        diagnostic.rule_id.clone_from(&binding.rule_id);
        if let Some(severity) = binding.severity {
            diagnostic.severity = severity;
        }
        diagnostic.loc = Some(document.location(diagnostic.span));
    }
    Ok(diagnostics)
}

/// The single error message standing in for a failed rule.
pub(crate) fn rule_failure(rule_id: &str, reason: &str) -> Diagnostic {
    synthetic::message(
        rule_id,
        Severity::Error,
        format!("Rule '{rule_id}' failed: {reason}"),
    )
}

/// Stable sort by range start, then by the position of the reporting rule.
///
/// Messages with a linter-emitted id sort after rule messages at the same
/// start.
pub(crate) fn sort_messages(descriptor: &Descriptor, messages: &mut [Diagnostic]) {
    messages.sort_by_cached_key(|m| {
        let position = descriptor.rule_position(&m.rule_id).unwrap_or(usize::MAX);
        (m.span.start, position)
    });
}
