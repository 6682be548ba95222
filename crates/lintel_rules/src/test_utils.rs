use lintel_ast::{AstArena, Document};
use lintel_parser::{FormatPlugin, MarkdownPlugin, PlainTextPlugin};
use lintel_plugin::{Diagnostic, Rule, RuleContext, Settings};
use serde_json::Value;

/// Parses `source` as `kind` and runs `rule` over it.
pub fn run_rule(rule: &dyn Rule, kind: &str, source: &str, options: Value) -> Vec<Diagnostic> {
    let arena = AstArena::new();
    let tree = match kind {
        "markdown" => MarkdownPlugin::new().parse(&arena, source),
        _ => PlainTextPlugin::new().parse(&arena, source),
    }
    .unwrap();
    let document = Document::new("test", kind, tree.raw, tree);
    let settings = Settings::new();
    let ctx = RuleContext {
        rule_id: &rule.manifest().name,
        document: &document,
        options: &options,
        settings: &settings,
    };
    rule.lint(&ctx).unwrap()
}
