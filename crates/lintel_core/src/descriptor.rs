//! Validated, immutable composition of rules and plugins for one session.

use std::collections::{HashMap, HashSet};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use jsonschema::Validator;
use lintel_ast::{AstArena, Document, TxtNode};
use lintel_parser::{FormatPlugin, ParseError, source_len};
use lintel_plugin::{Rule, SessionRule, Settings, Severity};
use serde_json::Value;
use tracing::{debug, info};

use crate::config::LinterConfig;
use crate::registry::{Registry, RuleUnit};
use crate::{DescriptorError, LinterError, Violation, panic_message};

/// A rule bound into a descriptor.
#[derive(Debug, Clone)]
pub struct RuleDescriptor {
    /// Id unique within the descriptor (may differ from the unit's name).
    pub rule_id: String,
    /// The rule unit. Shared, not owned: the same unit may be bound in
    /// several descriptors.
    pub unit: RuleUnit,
    /// Options passed verbatim to the unit.
    pub options: Value,
    /// Severity forced onto every message of this rule.
    pub severity: Option<Severity>,
}

impl RuleDescriptor {
    pub fn new(rule_id: impl Into<String>, unit: impl Into<RuleUnit>, options: Value) -> Self {
        Self {
            rule_id: rule_id.into(),
            unit: unit.into(),
            options,
            severity: None,
        }
    }

    /// Sets the severity override.
    pub fn with_severity(mut self, severity: Option<Severity>) -> Self {
        self.severity = severity;
        self
    }
}

/// A format plugin bound into a descriptor.
#[derive(Clone)]
pub struct PluginBinding {
    pub plugin_id: String,
    pub plugin: Arc<dyn FormatPlugin>,
}

impl PluginBinding {
    pub fn new(plugin: Arc<dyn FormatPlugin>) -> Self {
        Self {
            plugin_id: plugin.name().to_string(),
            plugin,
        }
    }
}

impl std::fmt::Debug for PluginBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginBinding")
            .field("plugin_id", &self.plugin_id)
            .field("kinds", &self.plugin.kinds())
            .finish()
    }
}

/// Validated composition of rules, plugins and settings.
///
/// Rules run in the order they were given. A descriptor is never mutated
/// after [`Descriptor::build`] and may be shared across threads.
#[derive(Debug)]
pub struct Descriptor {
    rules: Vec<RuleDescriptor>,
    plugins: Vec<PluginBinding>,
    settings: Settings,
    positions: HashMap<String, usize>,
}

impl Descriptor {
    /// Validates and builds a descriptor.
    ///
    /// Checks id uniqueness for rules and plugins, unique kind claims, rule
    /// options (manifest schema, then the unit's own check) and that at least
    /// one plugin is bound. Every violation is reported, not just the first.
    pub fn build(
        rules: Vec<RuleDescriptor>,
        plugins: Vec<PluginBinding>,
        settings: Settings,
    ) -> Result<Self, DescriptorError> {
        let mut violations = Vec::new();
        check_rules(&rules, &mut violations);
        check_plugins(&plugins, &mut violations);

        if !violations.is_empty() {
            return Err(DescriptorError::new(violations));
        }

        let positions = rules
            .iter()
            .enumerate()
            .map(|(idx, rule)| (rule.rule_id.clone(), idx))
            .collect();

        info!(
            "Descriptor built with {} rules and {} plugins",
            rules.len(),
            plugins.len()
        );

        Ok(Self {
            rules,
            plugins,
            settings,
            positions,
        })
    }

    /// Resolves a configuration against a registry and builds the
    /// descriptor.
    ///
    /// Unknown rule or plugin ids and malformed severities are reported
    /// together with the violations found by [`Descriptor::build`].
    pub fn from_config(config: &LinterConfig, registry: &Registry) -> Result<Self, DescriptorError> {
        let mut violations = Vec::new();
        let mut rules = Vec::new();

        let listed = config
            .enabled_rules()
            .into_iter()
            .map(|(definition, option)| (definition.unit_id(), definition.rule_id(), option));
        let unlisted = config
            .unlisted_rules()
            .map(|(rule_id, option)| (rule_id, rule_id, Some(option)));

        for (unit_id, rule_id, option) in listed.chain(unlisted) {
            let Some(unit) = registry.rule(unit_id) else {
                violations.push(Violation::UnknownRule {
                    rule_id: unit_id.to_string(),
                });
                continue;
            };
            let severity = match option.map(|o| o.severity()).transpose() {
                Ok(severity) => severity.flatten(),
                Err(keyword) => {
                    violations.push(Violation::InvalidOptions {
                        rule_id: rule_id.to_string(),
                        message: format!("unknown severity {keyword}"),
                    });
                    None
                }
            };
            let options = option.map(|o| o.options()).unwrap_or(Value::Null);
            rules.push(RuleDescriptor::new(rule_id, unit.clone(), options).with_severity(severity));
        }

        let mut plugins = Vec::new();
        for plugin_id in &config.plugins {
            match registry.plugin(plugin_id) {
                Some(plugin) => plugins.push(PluginBinding::new(Arc::clone(plugin))),
                None => violations.push(Violation::UnknownPlugin {
                    plugin_id: plugin_id.clone(),
                }),
            }
        }

        match Self::build(rules, plugins, config.settings.clone()) {
            Ok(descriptor) if violations.is_empty() => Ok(descriptor),
            Ok(_) => Err(DescriptorError::new(violations)),
            Err(err) => {
                violations.extend(err.violations);
                Err(DescriptorError::new(violations))
            }
        }
    }

    /// All bound rules in execution order.
    pub fn rules(&self) -> &[RuleDescriptor] {
        &self.rules
    }

    /// Per-document rules in execution order.
    pub fn document_rules(&self) -> impl Iterator<Item = (&RuleDescriptor, &Arc<dyn Rule>)> {
        self.rules.iter().filter_map(|binding| match &binding.unit {
            RuleUnit::Document(rule) => Some((binding, rule)),
            RuleUnit::Session(_) => None,
        })
    }

    /// Session rules in execution order.
    pub fn session_rules(&self) -> impl Iterator<Item = (&RuleDescriptor, &Arc<dyn SessionRule>)> {
        self.rules.iter().filter_map(|binding| match &binding.unit {
            RuleUnit::Session(rule) => Some((binding, rule)),
            RuleUnit::Document(_) => None,
        })
    }

    /// Position of a rule in execution order.
    pub fn rule_position(&self, rule_id: &str) -> Option<usize> {
        self.positions.get(rule_id).copied()
    }

    /// Looks up a bound rule.
    pub fn rule(&self, rule_id: &str) -> Option<&RuleDescriptor> {
        self.rule_position(rule_id).map(|idx| &self.rules[idx])
    }

    /// Bound plugins in order.
    pub fn plugins(&self) -> &[PluginBinding] {
        &self.plugins
    }

    /// Descriptor-wide settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Returns the plugin claiming `kind`.
    pub fn plugin_for(&self, kind: &str) -> Result<&dyn FormatPlugin, LinterError> {
        self.plugins
            .iter()
            .find(|binding| binding.plugin.matches(kind))
            .map(|binding| binding.plugin.as_ref())
            .ok_or_else(|| LinterError::unsupported_kind(kind))
    }

    /// Parses `source` with the plugin bound for `kind`.
    ///
    /// A panicking plugin is reported as an internal parse error.
    pub fn parse<'a>(
        &self,
        arena: &'a AstArena,
        id: &'a str,
        kind: &'a str,
        source: &'a str,
    ) -> Result<Document<'a>, LinterError> {
        let plugin = self.plugin_for(kind)?;
        source_len(source)?;
        debug!("Parsing '{}' with plugin '{}'", id, plugin.name());
        let tree = panic::catch_unwind(AssertUnwindSafe(|| plugin.parse(arena, source)))
            .unwrap_or_else(|payload| {
                Err(ParseError::internal(format!(
                    "plugin '{}' panicked: {}",
                    plugin.name(),
                    panic_message(payload.as_ref())
                )))
            })?;
        Ok(Document::new(id, kind, source, tree))
    }

    /// Serializes a tree with the plugin bound for `kind`.
    pub fn serialize(&self, kind: &str, tree: &TxtNode<'_>) -> Result<String, LinterError> {
        Ok(self.plugin_for(kind)?.serialize(tree))
    }
}

fn check_rules(rules: &[RuleDescriptor], violations: &mut Vec<Violation>) {
    let mut seen = HashSet::new();
    for rule in rules {
        if !seen.insert(rule.rule_id.as_str()) {
            violations.push(Violation::DuplicateRule {
                rule_id: rule.rule_id.clone(),
            });
            continue;
        }
        check_options(rule, violations);
    }
}

fn check_options(rule: &RuleDescriptor, violations: &mut Vec<Violation>) {
    let invalid = |message: String| Violation::InvalidOptions {
        rule_id: rule.rule_id.clone(),
        message,
    };

    // `null` means "no options"; the schema describes the options object.
    if !rule.options.is_null()
        && let Some(schema) = &rule.unit.manifest().schema
    {
        match Validator::new(schema) {
            Ok(validator) => {
                let before = violations.len();
                violations.extend(
                    validator
                        .iter_errors(&rule.options)
                        .map(|e| invalid(format!("{} at {}", e, e.instance_path()))),
                );
                if violations.len() > before {
                    return;
                }
            }
            Err(e) => {
                violations.push(invalid(format!("rule schema does not compile: {e}")));
                return;
            }
        }
    }

    if let Err(e) = rule.unit.validate_options(&rule.options) {
        violations.push(invalid(e.to_string()));
    }
}

fn check_plugins(plugins: &[PluginBinding], violations: &mut Vec<Violation>) {
    if plugins.is_empty() {
        violations.push(Violation::NoPlugins);
        return;
    }

    let mut seen = HashSet::new();
    let mut claims: HashMap<String, &str> = HashMap::new();
    for binding in plugins {
        if !seen.insert(binding.plugin_id.as_str()) {
            violations.push(Violation::DuplicatePlugin {
                plugin_id: binding.plugin_id.clone(),
            });
            continue;
        }
        for kind in binding.plugin.kinds() {
            let kind = kind.to_ascii_lowercase();
            if let Some(first) = claims.get(&kind) {
                violations.push(Violation::DuplicateKind {
                    kind,
                    first: (*first).to_string(),
                    second: binding.plugin_id.clone(),
                });
            } else {
                claims.insert(kind, &binding.plugin_id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{RuleDefinition, RuleDefinitionDetail, RuleOption};
    use lintel_parser::{MarkdownPlugin, PlainTextPlugin};
    use lintel_plugin::{Diagnostic, RuleContext, RuleError, RuleManifest};
    use lintel_rules::{NoEmoji, NoTodo};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn plugins() -> Vec<PluginBinding> {
        vec![
            PluginBinding::new(Arc::new(MarkdownPlugin::new())),
            PluginBinding::new(Arc::new(PlainTextPlugin::new())),
        ]
    }

    fn no_todo() -> RuleUnit {
        RuleUnit::Document(Arc::new(NoTodo::new()))
    }

    /// Claims the `md` kind already owned by the Markdown plugin.
    struct ShadowPlugin;

    impl FormatPlugin for ShadowPlugin {
        fn name(&self) -> &str {
            "shadow"
        }

        fn kinds(&self) -> &[&str] {
            &["MD", "shadow"]
        }

        fn parse<'a>(&self, _arena: &'a AstArena, _source: &str) -> Result<TxtNode<'a>, ParseError> {
            Err(ParseError::unsupported("shadow"))
        }
    }

    struct NeedsLimit {
        manifest: RuleManifest,
    }

    impl Rule for NeedsLimit {
        fn manifest(&self) -> &RuleManifest {
            &self.manifest
        }

        fn validate_options(&self, options: &Value) -> Result<(), RuleError> {
            match options.get("limit").and_then(Value::as_u64) {
                Some(_) => Ok(()),
                None => Err(RuleError::invalid_options("`limit` is required")),
            }
        }

        fn lint(&self, _ctx: &RuleContext<'_>) -> Result<Vec<Diagnostic>, RuleError> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn build_keeps_rule_order() {
        let descriptor = Descriptor::build(
            vec![
                RuleDescriptor::new("no-todo", no_todo(), Value::Null),
                RuleDescriptor::new("no-emoji", Arc::new(NoEmoji::new()) as Arc<dyn Rule>, Value::Null),
            ],
            plugins(),
            Settings::new(),
        )
        .unwrap();

        let ids: Vec<&str> = descriptor.rules().iter().map(|r| r.rule_id.as_str()).collect();
        assert_eq!(ids, vec!["no-todo", "no-emoji"]);
        assert_eq!(descriptor.rule_position("no-emoji"), Some(1));
        assert_eq!(descriptor.plugin_for("MD").unwrap().name(), "markdown");
        assert_eq!(descriptor.plugin_for("txt").unwrap().name(), "text");
        assert!(matches!(
            descriptor.plugin_for("csv"),
            Err(LinterError::UnsupportedKind(kind)) if kind == "csv"
        ));
    }

    #[test]
    fn build_reports_every_violation() {
        let needs_limit = RuleUnit::Document(Arc::new(NeedsLimit {
            manifest: RuleManifest::new("needs-limit", "1.0.0"),
        }));
        let mut bindings = plugins();
        bindings.push(PluginBinding::new(Arc::new(MarkdownPlugin::new())));
        bindings.push(PluginBinding::new(Arc::new(ShadowPlugin)));

        let err = Descriptor::build(
            vec![
                RuleDescriptor::new("no-todo", no_todo(), Value::Null),
                RuleDescriptor::new("no-todo", no_todo(), Value::Null),
                RuleDescriptor::new("needs-limit", needs_limit, json!({})),
                RuleDescriptor::new("strict-todo", no_todo(), json!({ "case_sensitive": "yes" })),
            ],
            bindings,
            Settings::new(),
        )
        .unwrap_err();

        assert_eq!(err.violations.len(), 5);
        assert_eq!(
            err.violations[0],
            Violation::DuplicateRule {
                rule_id: "no-todo".to_string()
            }
        );
        assert_eq!(
            err.violations[1],
            Violation::InvalidOptions {
                rule_id: "needs-limit".to_string(),
                message: "Invalid options: `limit` is required".to_string(),
            }
        );
        assert!(matches!(
            &err.violations[2],
            Violation::InvalidOptions { rule_id, .. } if rule_id == "strict-todo"
        ));
        assert_eq!(
            err.violations[3],
            Violation::DuplicatePlugin {
                plugin_id: "markdown".to_string()
            }
        );
        assert_eq!(
            err.violations[4],
            Violation::DuplicateKind {
                kind: "md".to_string(),
                first: "markdown".to_string(),
                second: "shadow".to_string(),
            }
        );
    }

    #[test]
    fn build_requires_a_plugin() {
        let err = Descriptor::build(Vec::new(), Vec::new(), Settings::new()).unwrap_err();
        assert_eq!(err.violations, vec![Violation::NoPlugins]);
    }

    #[test]
    fn from_config_resolves_aliases_and_severity() {
        let mut config = LinterConfig::new()
            .with_rule("no-todo")
            .with_option("no-fixme", RuleOption::Options(json!({ "patterns": ["FIXME"] })))
            .with_option(
                "no-emoji",
                RuleOption::Options(json!({ "allow": ["✅"], "severity": "info" })),
            );
        config.rules.push(RuleDefinition::Detail(RuleDefinitionDetail {
            id: "no-todo".to_string(),
            r#as: Some("no-fixme".to_string()),
        }));

        let descriptor = Descriptor::from_config(&config, &Registry::builtin()).unwrap();

        let ids: Vec<&str> = descriptor.rules().iter().map(|r| r.rule_id.as_str()).collect();
        assert_eq!(ids, vec!["no-todo", "no-fixme", "no-emoji"]);
        let no_emoji = descriptor.rule("no-emoji").unwrap();
        assert_eq!(no_emoji.severity, Some(Severity::Info));
        assert_eq!(no_emoji.options, json!({ "allow": ["✅"] }));
        assert_eq!(descriptor.rule("no-fixme").unwrap().unit.manifest().name, "no-todo");
    }

    #[test]
    fn from_config_collects_resolution_and_build_violations() {
        let mut config = LinterConfig::new()
            .with_rule("no-such-rule")
            .with_rule("no-todo")
            .with_option("no-todo", RuleOption::Severity("fatal".to_string()));
        config.plugins = vec!["markdown".to_string(), "asciidoc".to_string()];

        let err = Descriptor::from_config(&config, &Registry::builtin()).unwrap_err();

        assert_eq!(
            err.violations,
            vec![
                Violation::UnknownRule {
                    rule_id: "no-such-rule".to_string()
                },
                Violation::InvalidOptions {
                    rule_id: "no-todo".to_string(),
                    message: "unknown severity fatal".to_string(),
                },
                Violation::UnknownPlugin {
                    plugin_id: "asciidoc".to_string()
                },
            ]
        );
    }

    #[test]
    fn parse_and_serialize_round_trip_through_bound_plugin() {
        let descriptor = Descriptor::build(Vec::new(), plugins(), Settings::new()).unwrap();
        let arena = AstArena::new();
        let source = "# Title\n\n- item\n";

        let document = descriptor.parse(&arena, "a.md", "md", source).unwrap();

        assert_eq!(document.source(), source);
        assert_eq!(descriptor.serialize("md", document.tree()).unwrap(), source);
        assert!(matches!(
            descriptor.parse(&arena, "a.csv", "csv", "a,b"),
            Err(LinterError::UnsupportedKind(_))
        ));
    }
}
