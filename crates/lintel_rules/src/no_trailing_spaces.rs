//! no-trailing-spaces rule: Disallow whitespace at the end of lines.
//!
//! Lines inside code blocks are skipped. With `skip_blank_lines`,
//! whitespace-only lines are accepted.

use std::ops::ControlFlow;

use lintel_ast::{NodeType, Span};
use lintel_plugin::{Diagnostic, Fix, Rule, RuleContext, RuleError, RuleManifest};
use serde::Deserialize;
use serde_json::json;

const RULE_ID: &str = "no-trailing-spaces";
const VERSION: &str = "1.0.0";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Options {
    skip_blank_lines: bool,
}

/// Reports trailing spaces and tabs, with a fix that removes them.
pub struct NoTrailingSpaces {
    manifest: RuleManifest,
}

impl NoTrailingSpaces {
    pub fn new() -> Self {
        Self {
            manifest: RuleManifest::new(RULE_ID, VERSION)
                .with_description("Disallow trailing whitespace at the end of lines")
                .with_fixable(true)
                .with_schema(json!({
                    "type": "object",
                    "properties": {
                        "skip_blank_lines": { "type": "boolean" }
                    },
                    "additionalProperties": false
                })),
        }
    }
}

impl Default for NoTrailingSpaces {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for NoTrailingSpaces {
    fn manifest(&self) -> &RuleManifest {
        &self.manifest
    }

    fn lint(&self, ctx: &RuleContext<'_>) -> Result<Vec<Diagnostic>, RuleError> {
        let options: Options = ctx.options_as()?;
        let source = ctx.source();
        let lines = ctx.document.lines();

        let mut code_blocks = Vec::new();
        let _ = ctx.document.walk_with_ancestors(|node, _| {
            if node.node_type == NodeType::CodeBlock {
                code_blocks.push(node.span);
            }
            ControlFlow::Continue(())
        });

        let mut diagnostics = Vec::new();
        for line in 1..=lines.line_count() as u32 {
            let Some(span) = lines.line_span(line) else {
                continue;
            };
            if code_blocks.iter().any(|block| block.contains(span.start)) {
                continue;
            }
            let Some(text) = source.get(span.to_range()) else {
                continue;
            };

            let content = text.strip_suffix('\r').unwrap_or(text);
            let kept = content.trim_end_matches([' ', '\t']);
            if kept.len() == content.len() || (options.skip_blank_lines && kept.is_empty()) {
                continue;
            }

            let start = span.start + kept.len() as u32;
            let trailing = Span::new(start, span.start + content.len() as u32);
            diagnostics.push(
                ctx.diagnostic("Trailing spaces are not allowed.", trailing)
                    .with_fix(Fix::delete(trailing)),
            );
        }

        Ok(diagnostics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::run_rule;
    use pretty_assertions::assert_eq;
    use serde_json::Value;

    #[test]
    fn reports_each_line_with_trailing_whitespace() {
        let source = "one  \ntwo\nthree\t\r\n";
        let diagnostics = run_rule(&NoTrailingSpaces::new(), "text", source, Value::Null);

        let spans: Vec<Span> = diagnostics.iter().map(|d| d.span).collect();
        assert_eq!(spans, vec![Span::new(3, 5), Span::new(15, 16)]);
        assert_eq!(diagnostics[1].fix, Some(Fix::delete(Span::new(15, 16))));
    }

    #[test]
    fn blank_lines_can_be_skipped() {
        let source = "a\n   \nb";

        let all = run_rule(&NoTrailingSpaces::new(), "text", source, Value::Null);
        let skipped = run_rule(
            &NoTrailingSpaces::new(),
            "text",
            source,
            json!({ "skip_blank_lines": true }),
        );

        assert_eq!(all.len(), 1);
        assert!(skipped.is_empty());
    }

    #[test]
    fn code_blocks_are_skipped() {
        let source = "```\ncode  \n```\n\ntext \n";
        let diagnostics = run_rule(&NoTrailingSpaces::new(), "markdown", source, Value::Null);

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].span, Span::new(20, 21));
    }
}
