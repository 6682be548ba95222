//! no-todo rule: Disallow TODO/FIXME markers in text.
//!
//! This rule detects common task markers like TODO, FIXME, and XXX
//! that should be resolved before publishing. Link text is skipped.
//!
//! # Configuration
//!
//! | Option | Type | Default | Description |
//! |--------|------|---------|-------------|
//! | patterns | string[] | ["TODO:", "TODO ", "FIXME:", "FIXME ", "XXX:", "XXX "] | Patterns to detect |
//! | ignore_patterns | string[] | [] | Patterns to ignore |
//! | case_sensitive | boolean | false | Case-sensitive matching |

use std::ops::ControlFlow;

use lintel_ast::{NodeType, Span};
use lintel_plugin::{Diagnostic, Rule, RuleContext, RuleError, RuleManifest, Severity};
use serde::Deserialize;
use serde_json::json;

const RULE_ID: &str = "no-todo";
const VERSION: &str = "1.0.0";

/// Default patterns to detect.
const DEFAULT_PATTERNS: &[&str] = &["TODO:", "TODO ", "FIXME:", "FIXME ", "XXX:", "XXX "];

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct Config {
    patterns: Vec<String>,
    ignore_patterns: Vec<String>,
    case_sensitive: bool,
}

impl Config {
    /// Returns the patterns to check, using defaults if none specified.
    fn effective_patterns(&self) -> Vec<&str> {
        if self.patterns.is_empty() {
            DEFAULT_PATTERNS.to_vec()
        } else {
            self.patterns.iter().map(String::as_str).collect()
        }
    }

    fn should_ignore(&self, text: &str) -> bool {
        self.ignore_patterns.iter().any(|p| text.contains(p.as_str()))
    }
}

/// Reports task markers left in prose.
pub struct NoTodo {
    manifest: RuleManifest,
}

impl NoTodo {
    pub fn new() -> Self {
        Self {
            manifest: RuleManifest::new(RULE_ID, VERSION)
                .with_description("Disallow TODO/FIXME comments in text")
                .with_schema(json!({
                    "type": "object",
                    "properties": {
                        "patterns": { "type": "array", "items": { "type": "string", "minLength": 1 } },
                        "ignore_patterns": { "type": "array", "items": { "type": "string" } },
                        "case_sensitive": { "type": "boolean" }
                    },
                    "additionalProperties": false
                })),
        }
    }
}

impl Default for NoTodo {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for NoTodo {
    fn manifest(&self) -> &RuleManifest {
        &self.manifest
    }

    fn lint(&self, ctx: &RuleContext<'_>) -> Result<Vec<Diagnostic>, RuleError> {
        let config: Config = ctx.options_as()?;
        let patterns = config.effective_patterns();
        let mut diagnostics = Vec::new();

        let _ = ctx.document.walk_with_ancestors(|node, ancestors| {
            if node.node_type != NodeType::Str
                || ancestors
                    .iter()
                    .any(|a| matches!(a.node_type, NodeType::Link | NodeType::LinkReference))
            {
                return ControlFlow::Continue(());
            }

            for (start, end) in find_matches(node.raw, &patterns, config.case_sensitive) {
                let matched = &node.raw[start..end];
                if config.should_ignore(matched) {
                    continue;
                }
                let span = Span::new(node.span.start + start as u32, node.span.start + end as u32);
                diagnostics.push(
                    ctx.diagnostic(
                        format!(
                            "Found '{}' comment. Consider resolving this before publishing.",
                            matched.trim()
                        ),
                        span,
                    )
                    .with_severity(Severity::Warning),
                );
            }
            ControlFlow::Continue(())
        });

        Ok(diagnostics)
    }
}

/// Finds non-overlapping occurrences of any pattern, in text order.
///
/// Case-insensitive matching folds ASCII only, so byte offsets stay valid.
fn find_matches(text: &str, patterns: &[&str], case_sensitive: bool) -> Vec<(usize, usize)> {
    let mut matches = Vec::new();
    let mut next_free = 0;

    for (start, _) in text.char_indices() {
        if start < next_free {
            continue;
        }
        let hit = patterns.iter().filter(|p| !p.is_empty()).find(|p| {
            text.get(start..start + p.len()).is_some_and(|candidate| {
                if case_sensitive {
                    candidate == **p
                } else {
                    candidate.eq_ignore_ascii_case(p)
                }
            })
        });
        if let Some(pattern) = hit {
            let end = start + pattern.len();
            matches.push((start, end));
            next_free = end;
        }
    }
    matches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::run_rule;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::Value;

    #[test]
    fn config_default_patterns() {
        let config = Config::default();
        let patterns = config.effective_patterns();
        assert!(patterns.contains(&"TODO:"));
        assert!(patterns.contains(&"FIXME:"));
        assert!(patterns.contains(&"XXX:"));
    }

    #[rstest]
    #[case::exact("a TODO: b", &["TODO:"], true, vec![(2, 7)])]
    #[case::case_folded("a todo: b", &["TODO:"], false, vec![(2, 7)])]
    #[case::case_sensitive_miss("a todo: b", &["TODO:"], true, vec![])]
    #[case::multiple("TODO: x FIXME: y", &["TODO:", "FIXME:"], true, vec![(0, 5), (8, 14)])]
    #[case::multibyte("日本 TODO: 語", &["TODO:"], true, vec![(7, 12)])]
    fn find_matches_cases(
        #[case] text: &str,
        #[case] patterns: &[&str],
        #[case] case_sensitive: bool,
        #[case] expected: Vec<(usize, usize)>,
    ) {
        assert_eq!(find_matches(text, patterns, case_sensitive), expected);
    }

    #[test]
    fn lint_detects_todo() {
        let diagnostics = run_rule(&NoTodo::new(), "text", "This is a TODO: check", Value::Null);

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].message,
            "Found 'TODO:' comment. Consider resolving this before publishing."
        );
        assert_eq!(diagnostics[0].span, Span::new(10, 15));
        assert!(diagnostics[0].fix.is_none());
    }

    #[test]
    fn lint_ignores_pattern() {
        let diagnostics = run_rule(
            &NoTodo::new(),
            "text",
            "This is a TODO: fix later",
            json!({ "ignore_patterns": ["TODO:"] }),
        );

        assert!(diagnostics.is_empty());
    }

    #[test]
    fn lint_skips_link_text() {
        let diagnostics = run_rule(
            &NoTodo::new(),
            "markdown",
            "See [TODO: list](https://example.com).\n\nFIXME: here\n",
            Value::Null,
        );

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].message,
            "Found 'FIXME:' comment. Consider resolving this before publishing."
        );
    }
}
