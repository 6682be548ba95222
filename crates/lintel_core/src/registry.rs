//! Capability registration: stable ids mapped to rule units and format
//! plugins, populated once at process start.

use std::collections::HashMap;
use std::sync::Arc;

use lintel_parser::{FormatPlugin, MarkdownPlugin, PlainTextPlugin};
use lintel_plugin::{Rule, RuleError, RuleManifest, SessionRule};
use serde_json::Value;
use tracing::debug;

use crate::LinterError;

/// A registered rule unit of either flavour.
#[derive(Clone)]
pub enum RuleUnit {
    /// Evaluated against one document at a time.
    Document(Arc<dyn Rule>),
    /// Evaluated once against the whole batch.
    Session(Arc<dyn SessionRule>),
}

impl RuleUnit {
    pub fn manifest(&self) -> &RuleManifest {
        match self {
            Self::Document(rule) => rule.manifest(),
            Self::Session(rule) => rule.manifest(),
        }
    }

    pub fn validate_options(&self, options: &Value) -> Result<(), RuleError> {
        match self {
            Self::Document(rule) => rule.validate_options(options),
            Self::Session(rule) => rule.validate_options(options),
        }
    }

    pub fn is_session(&self) -> bool {
        matches!(self, Self::Session(_))
    }
}

impl std::fmt::Debug for RuleUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let flavour = if self.is_session() { "Session" } else { "Document" };
        f.debug_tuple(flavour).field(&self.manifest().name).finish()
    }
}

impl From<Arc<dyn Rule>> for RuleUnit {
    fn from(rule: Arc<dyn Rule>) -> Self {
        Self::Document(rule)
    }
}

impl From<Arc<dyn SessionRule>> for RuleUnit {
    fn from(rule: Arc<dyn SessionRule>) -> Self {
        Self::Session(rule)
    }
}

/// Registered rule units and format plugins, keyed by id.
#[derive(Default)]
pub struct Registry {
    rules: HashMap<String, RuleUnit>,
    plugins: HashMap<String, Arc<dyn FormatPlugin>>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the built-in rules and plugins.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        let units = lintel_rules::builtin_rules()
            .into_iter()
            .map(RuleUnit::from)
            .chain(
                lintel_rules::builtin_session_rules()
                    .into_iter()
                    .map(RuleUnit::from),
            );
        for unit in units {
            registry.insert_rule(unit);
        }
        registry.insert_plugin(Arc::new(MarkdownPlugin::new()));
        registry.insert_plugin(Arc::new(PlainTextPlugin::new()));
        registry
    }

    /// Registers a per-document rule under its manifest name.
    pub fn register_rule(&mut self, rule: Arc<dyn Rule>) -> Result<(), LinterError> {
        self.register_unit(RuleUnit::Document(rule))
    }

    /// Registers a session rule under its manifest name.
    pub fn register_session_rule(&mut self, rule: Arc<dyn SessionRule>) -> Result<(), LinterError> {
        self.register_unit(RuleUnit::Session(rule))
    }

    fn register_unit(&mut self, unit: RuleUnit) -> Result<(), LinterError> {
        let name = &unit.manifest().name;
        if self.rules.contains_key(name) {
            return Err(LinterError::config(format!(
                "Rule '{name}' is already registered"
            )));
        }
        self.insert_rule(unit);
        Ok(())
    }

    /// Registers a format plugin under its name.
    pub fn register_plugin(&mut self, plugin: Arc<dyn FormatPlugin>) -> Result<(), LinterError> {
        if self.plugins.contains_key(plugin.name()) {
            return Err(LinterError::config(format!(
                "Plugin '{}' is already registered",
                plugin.name()
            )));
        }
        self.insert_plugin(plugin);
        Ok(())
    }

    fn insert_rule(&mut self, unit: RuleUnit) {
        let name = unit.manifest().name.clone();
        debug!("Registered rule '{}'", name);
        self.rules.insert(name, unit);
    }

    fn insert_plugin(&mut self, plugin: Arc<dyn FormatPlugin>) {
        debug!("Registered plugin '{}'", plugin.name());
        self.plugins.insert(plugin.name().to_string(), plugin);
    }

    /// Looks up a rule unit.
    pub fn rule(&self, id: &str) -> Option<&RuleUnit> {
        self.rules.get(id)
    }

    /// Looks up a format plugin.
    pub fn plugin(&self, id: &str) -> Option<&Arc<dyn FormatPlugin>> {
        self.plugins.get(id)
    }

    /// Registered rule ids, sorted.
    pub fn rule_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.rules.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Registered plugin ids, sorted.
    pub fn plugin_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.plugins.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}
