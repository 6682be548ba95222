//! Integration tests for batch evaluation.
//!
//! These tests drive the public API end to end: configuration, descriptor
//! construction and session runs over mixed batches.

use std::sync::Arc;

use lintel_ast::Span;
use lintel_core::{
    LinterConfig, LinterError, Mode, Registry, SessionRunner, SourceDocument, Violation, synthetic,
};
use lintel_plugin::{Diagnostic, Rule, RuleContext, RuleError, RuleManifest, Severity};
use pretty_assertions::assert_eq;

/// Fails on every document.
struct AlwaysFails {
    manifest: RuleManifest,
}

impl Rule for AlwaysFails {
    fn manifest(&self) -> &RuleManifest {
        &self.manifest
    }

    fn lint(&self, _ctx: &RuleContext<'_>) -> Result<Vec<Diagnostic>, RuleError> {
        Err(RuleError::execution("dictionary not loaded"))
    }
}

/// Panics on every document.
struct AlwaysPanics {
    manifest: RuleManifest,
}

impl Rule for AlwaysPanics {
    fn manifest(&self) -> &RuleManifest {
        &self.manifest
    }

    fn lint(&self, _ctx: &RuleContext<'_>) -> Result<Vec<Diagnostic>, RuleError> {
        panic!("index out of bounds");
    }
}

fn create_runner(json: &str) -> SessionRunner {
    let config = LinterConfig::from_json(json).expect("valid config");
    SessionRunner::from_config(&config, &Registry::builtin()).expect("valid descriptor")
}

fn registry_with_failing_rules() -> Registry {
    let mut registry = Registry::builtin();
    registry
        .register_rule(Arc::new(AlwaysFails {
            manifest: RuleManifest::new("always-fails", "1.0.0"),
        }))
        .unwrap();
    registry
        .register_rule(Arc::new(AlwaysPanics {
            manifest: RuleManifest::new("always-panics", "1.0.0"),
        }))
        .unwrap();
    registry
}

#[test]
fn test_no_emoji_lint_scenario() {
    let runner = create_runner(r#"{ "rules": ["no-emoji"] }"#);
    let documents = vec![SourceDocument::new("hello.md", "markdown", "Hello 🎉 world")];

    let batch = runner.run(&documents, Mode::Lint);

    let result = &batch.documents[0];
    assert_eq!(result.messages.len(), 1);
    assert_eq!(result.messages[0].rule_id, "no-emoji");
    assert_eq!(result.messages[0].severity, Severity::Warning);
    assert_eq!(result.messages[0].span, Span::new(6, 10));
    assert!(result.fixed_text.is_none());
    assert!(!result.fix_applied);
}

#[test]
fn test_no_emoji_fix_scenario() {
    let runner = create_runner(r#"{ "rules": ["no-emoji"] }"#);
    let documents = vec![SourceDocument::new("hello.md", "markdown", "Hello 🎉 world")];

    let batch = runner.run(&documents, Mode::Fix);

    let result = &batch.documents[0];
    assert_eq!(result.fixed_text.as_deref(), Some("Hello  world"));
    assert!(result.fix_applied);
    assert_eq!(result.fix_iterations, 1);
    assert!(result.messages.is_empty());
}

#[test]
fn test_unsupported_kind_does_not_abort_batch() {
    let runner = create_runner(r#"{ "rules": ["no-emoji"] }"#);
    let documents = vec![
        SourceDocument::new("data.csv", "csv", "a,b\n🎉,2\n"),
        SourceDocument::new("notes.txt", "text", "party 🎉"),
    ];

    let batch = runner.run(&documents, Mode::Fix);

    assert_eq!(batch.len(), 2);
    let csv = &batch.documents[0];
    assert_eq!(csv.messages.len(), 1);
    assert_eq!(csv.messages[0].rule_id, synthetic::UNSUPPORTED_KIND);
    assert_eq!(csv.messages[0].severity, Severity::Error);
    assert!(csv.fixed_text.is_none());
    assert_eq!(batch.documents[1].fixed_text.as_deref(), Some("party "));
}

#[test]
fn test_failing_rule_is_isolated() {
    let config = LinterConfig::from_json(
        r#"{ "rules": ["always-fails", "no-emoji", "always-panics"], "parallel": true }"#,
    )
    .unwrap();
    let runner = SessionRunner::from_config(&config, &registry_with_failing_rules()).unwrap();
    let documents = vec![
        SourceDocument::new("a.md", "markdown", "One 🎉"),
        SourceDocument::new("b.txt", "text", "Two 🎈 and 🎁"),
    ];

    let batch = runner.run(&documents, Mode::Lint);

    for result in &batch {
        let failures: Vec<&Diagnostic> = result
            .messages
            .iter()
            .filter(|m| m.rule_id == "always-fails")
            .collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].severity, Severity::Error);
        assert_eq!(
            failures[0].message,
            "Rule 'always-fails' failed: Rule execution failed: dictionary not loaded"
        );

        let panics: Vec<&Diagnostic> = result
            .messages
            .iter()
            .filter(|m| m.rule_id == "always-panics")
            .collect();
        assert_eq!(panics.len(), 1);
        assert_eq!(
            panics[0].message,
            "Rule 'always-panics' failed: panicked: index out of bounds"
        );

        assert!(result.messages.iter().any(|m| m.rule_id == "no-emoji"));
    }
    assert_eq!(
        batch.get("b.txt").unwrap().count(Severity::Warning),
        2,
        "both emoji reported"
    );
}

#[test]
fn test_batch_order_matches_input() {
    let runner = create_runner(r#"{ "rules": ["no-trailing-spaces"], "parallel": true }"#);
    let documents: Vec<SourceDocument> = (0..64)
        .map(|i| {
            let text = format!("line {i}{}\n", " ".repeat(i % 4));
            SourceDocument::new(format!("doc-{i}.txt"), "text", text)
        })
        .collect();

    let batch = runner.run(&documents, Mode::Fix);

    let ids: Vec<&str> = batch.iter().map(|r| r.id.as_str()).collect();
    let expected: Vec<String> = (0..64).map(|i| format!("doc-{i}.txt")).collect();
    assert_eq!(ids, expected.iter().map(String::as_str).collect::<Vec<_>>());
    for (i, result) in batch.iter().enumerate() {
        assert_eq!(result.fixed_text.is_some(), i % 4 != 0);
    }
    assert_eq!(batch.summary().fixed, 48);
}

#[test]
fn test_lint_is_deterministic() {
    let json = r#"{ "rules": ["no-todo", "no-emoji", "no-trailing-spaces"] }"#;
    let documents = vec![
        SourceDocument::new(
            "a.md",
            "markdown",
            "# TODO 🎉 \n\nFIXME later 🎈\n\n```\nTODO  \n```\n",
        ),
        SourceDocument::new("b.txt", "text", "TODO 🎁  \nok\n"),
    ];

    let first = create_runner(json).run(&documents, Mode::Lint);
    let second = create_runner(json).with_parallel(false).run(&documents, Mode::Lint);

    assert_eq!(first, second);
    let starts: Vec<u32> = first.documents[0].messages.iter().map(|m| m.span.start).collect();
    let mut sorted = starts.clone();
    sorted.sort_unstable();
    assert_eq!(starts, sorted);
}

#[test]
fn test_alias_and_severity_override() {
    let runner = create_runner(
        r#"{
            "rules": ["no-todo", { "id": "no-todo", "as": "no-fixme" }],
            "options": {
                "no-todo": "error",
                "no-fixme": { "patterns": ["FIXME"], "severity": "info" }
            }
        }"#,
    );
    let documents = vec![SourceDocument::new("a.txt", "text", "TODO one\nFIXME two\n")];

    let batch = runner.run(&documents, Mode::Lint);

    let messages: Vec<(&str, Severity, u32)> = batch.documents[0]
        .messages
        .iter()
        .map(|m| (m.rule_id.as_str(), m.severity, m.loc.unwrap().start.line))
        .collect();
    assert_eq!(
        messages,
        vec![
            ("no-todo", Severity::Error, 1),
            ("no-todo", Severity::Error, 2),
            ("no-fixme", Severity::Info, 2),
        ]
    );
}

#[test]
fn test_descriptor_errors_list_every_violation() {
    let config = LinterConfig::from_json(
        r#"{
            "rules": ["no-such-rule", "no-emoji", "no-emoji"],
            "options": {
                "no-emoji": { "allow": "🎉" },
                "no-trailing-spaces": { "skip_blank_lines": true, "extra": 1 }
            },
            "plugins": ["markdown", "rst"]
        }"#,
    )
    .unwrap();

    let Err(LinterError::Descriptor(err)) =
        SessionRunner::from_config(&config, &Registry::builtin())
    else {
        panic!("expected descriptor error");
    };

    assert_eq!(err.violations[0], Violation::UnknownRule {
        rule_id: "no-such-rule".to_string()
    });
    assert_eq!(err.violations[1], Violation::UnknownPlugin {
        plugin_id: "rst".to_string()
    });
    assert!(err.violations.contains(&Violation::DuplicateRule {
        rule_id: "no-emoji".to_string()
    }));
    let invalid: Vec<&str> = err
        .violations
        .iter()
        .filter_map(|v| match v {
            Violation::InvalidOptions { rule_id, .. } => Some(rule_id.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(invalid, vec!["no-emoji", "no-trailing-spaces"]);
    assert!(err.to_string().starts_with("Invalid descriptor (5 violations)"));
}

#[test]
fn test_duplicate_documents_are_flagged() {
    let runner = create_runner(r#"{ "rules": ["no-duplicate-document"] }"#);
    let documents = vec![
        SourceDocument::new("a.md", "markdown", "# Notes\n"),
        SourceDocument::new("b.md", "markdown", "# Other\n"),
        SourceDocument::new("c.md", "markdown", "# Notes\n"),
    ];

    let batch = runner.run(&documents, Mode::Lint);

    assert!(batch.documents[0].messages.is_empty());
    assert!(batch.documents[1].messages.is_empty());
    assert_eq!(batch.documents[2].messages.len(), 1);
    assert_eq!(
        batch.documents[2].messages[0].message,
        "Document has the same content as 'a.md'."
    );
}
