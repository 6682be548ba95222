//! no-emoji rule: Disallow emoji in prose.
//!
//! Emoji are detected per extended grapheme cluster, so a ZWJ family or a
//! flag is reported (and removed by the fix) as one unit. Code spans and code
//! blocks are not inspected.
//!
//! # Configuration
//!
//! | Option | Type | Default | Description |
//! |--------|------|---------|-------------|
//! | allow | string[] | [] | Emoji that are accepted |

use std::ops::ControlFlow;

use lintel_ast::{Span, TxtNode, VisitResult, Visitor};
use lintel_plugin::{Diagnostic, Fix, Rule, RuleContext, RuleError, RuleManifest, Severity};
use serde::Deserialize;
use serde_json::{Value, json};
use unicode_segmentation::UnicodeSegmentation;

const RULE_ID: &str = "no-emoji";
const VERSION: &str = "1.0.0";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Options {
    allow: Vec<String>,
}

/// Reports every emoji found in text nodes, with a fix that deletes it.
pub struct NoEmoji {
    manifest: RuleManifest,
}

impl NoEmoji {
    pub fn new() -> Self {
        Self {
            manifest: RuleManifest::new(RULE_ID, VERSION)
                .with_description("Disallow emoji in text")
                .with_fixable(true)
                .with_schema(json!({
                    "type": "object",
                    "properties": {
                        "allow": { "type": "array", "items": { "type": "string" } }
                    },
                    "additionalProperties": false
                })),
        }
    }
}

impl Default for NoEmoji {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for NoEmoji {
    fn manifest(&self) -> &RuleManifest {
        &self.manifest
    }

    fn validate_options(&self, options: &Value) -> Result<(), RuleError> {
        let options: Options = lintel_plugin::parse_options(options)?;
        if let Some(bad) = options.allow.iter().find(|e| !is_emoji(e)) {
            return Err(RuleError::invalid_options(format!(
                "'{bad}' in `allow` is not an emoji"
            )));
        }
        Ok(())
    }

    fn lint(&self, ctx: &RuleContext<'_>) -> Result<Vec<Diagnostic>, RuleError> {
        let options: Options = ctx.options_as()?;
        let mut finder = EmojiFinder {
            ctx,
            allow: &options.allow,
            diagnostics: Vec::new(),
        };
        let _ = ctx.document.walk(&mut finder);
        Ok(finder.diagnostics)
    }
}

struct EmojiFinder<'c, 'd> {
    ctx: &'c RuleContext<'d>,
    allow: &'c [String],
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Visitor<'a> for EmojiFinder<'_, '_> {
    fn visit_str(&mut self, node: &TxtNode<'a>) -> VisitResult {
        for (offset, grapheme) in node.raw.grapheme_indices(true) {
            if !is_emoji(grapheme) || self.allow.iter().any(|a| a == grapheme) {
                continue;
            }
            let start = node.span.start + offset as u32;
            let span = Span::new(start, start + grapheme.len() as u32);
            self.diagnostics.push(
                self.ctx
                    .diagnostic(format!("Emoji '{grapheme}' is not allowed."), span)
                    .with_severity(Severity::Warning)
                    .with_fix(Fix::delete(span)),
            );
        }
        ControlFlow::Continue(())
    }
}

/// Returns true if the grapheme cluster renders as an emoji.
fn is_emoji(grapheme: &str) -> bool {
    let Some(first) = grapheme.chars().next() else {
        return false;
    };
    // An emoji presentation selector turns digits, © and friends into emoji.
    grapheme.contains('\u{FE0F}') || is_pictographic(first)
}

fn is_pictographic(c: char) -> bool {
    matches!(
        c as u32,
        0x1F000..=0x1FAFF
            | 0x2600..=0x27BF
            | 0x2B00..=0x2BFF
            | 0x231A..=0x231B
            | 0x23E9..=0x23FA
    )
}
