//! Resolved linter configuration.
//!
//! Loading and merging configuration files is the caller's business; this
//! module only describes the resolved value and parses it from JSON(C).

use std::collections::BTreeMap;
use std::sync::OnceLock;

use jsonschema::Validator;
use lintel_plugin::{Settings, Severity};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::LinterError;

// Embed the schema
const SCHEMA_JSON: &str = include_str!("../../../schemas/v1/config.json");
static CONFIG_SCHEMA: OnceLock<Result<Validator, String>> = OnceLock::new();

/// Default cap on fix iterations per document.
pub const DEFAULT_MAX_FIX_ITERATIONS: usize = 10;

/// Plugins bound when the configuration names none.
pub const DEFAULT_PLUGINS: &[&str] = &["markdown", "text"];

/// Configuration for one linting session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinterConfig {
    /// Rules to bind, in execution order.
    #[serde(default)]
    pub rules: Vec<RuleDefinition>,

    /// Rule configuration (enable/disable/severity/options).
    #[serde(default)]
    pub options: BTreeMap<String, RuleOption>,

    /// Format plugins to bind, in order.
    #[serde(default = "default_plugins")]
    pub plugins: Vec<String>,

    /// Preset/group settings visible to every rule.
    #[serde(default)]
    pub settings: Settings,

    /// Maximum number of fix iterations per document.
    #[serde(default = "default_max_fix_iterations")]
    pub max_fix_iterations: usize,

    /// Whether documents are evaluated in parallel.
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

fn default_plugins() -> Vec<String> {
    DEFAULT_PLUGINS.iter().map(|p| (*p).to_string()).collect()
}

fn default_max_fix_iterations() -> usize {
    DEFAULT_MAX_FIX_ITERATIONS
}

fn default_parallel() -> bool {
    true
}

/// Reference to a registered rule.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RuleDefinition {
    /// Registered rule id: `"no-todo"`.
    Simple(String),
    /// Rule bound under another id: `{ "id": "no-todo", "as": "no-fixme" }`.
    Detail(RuleDefinitionDetail),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RuleDefinitionDetail {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r#as: Option<String>,
}

impl RuleDefinition {
    /// Id of the registered rule unit.
    pub fn unit_id(&self) -> &str {
        match self {
            Self::Simple(id) => id,
            Self::Detail(detail) => &detail.id,
        }
    }

    /// Id the rule is bound under in the descriptor.
    pub fn rule_id(&self) -> &str {
        match self {
            Self::Simple(id) => id,
            Self::Detail(detail) => detail.r#as.as_deref().unwrap_or(&detail.id),
        }
    }
}

/// Configuration for a single rule (in options map).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RuleOption {
    /// Rule is enabled/disabled (boolean).
    Enabled(bool),
    /// Rule is enabled with severity string ("error", "warning", "info") or
    /// disabled with "off".
    Severity(String),
    /// Rule is enabled with specific options object. A `"severity"` key is
    /// taken out and never reaches the rule.
    Options(Value),
}

impl RuleOption {
    /// Returns whether the rule is enabled.
    pub fn is_enabled(&self) -> bool {
        match self {
            RuleOption::Enabled(enabled) => *enabled,
            RuleOption::Severity(s) => !s.eq_ignore_ascii_case("off"),
            RuleOption::Options(v) => v
                .get("severity")
                .and_then(Value::as_str)
                .is_none_or(|s| !s.eq_ignore_ascii_case("off")),
        }
    }

    /// Returns the severity override, if any. `"off"` carries none.
    ///
    /// Fails with the offending keyword if it is not a known severity.
    pub fn severity(&self) -> Result<Option<Severity>, String> {
        let keyword = match self {
            RuleOption::Enabled(_) => None,
            RuleOption::Severity(s) => Some(s.as_str()),
            RuleOption::Options(v) => match v.get("severity") {
                None => None,
                Some(Value::String(s)) => Some(s.as_str()),
                Some(other) => return Err(other.to_string()),
            },
        };
        match keyword {
            None => Ok(None),
            Some(s) if s.eq_ignore_ascii_case("off") => Ok(None),
            Some(s) => Severity::parse(s).map(Some).ok_or_else(|| s.to_string()),
        }
    }

    /// Gets the rule options as JSON value.
    pub fn options(&self) -> Value {
        match self {
            RuleOption::Enabled(_) | RuleOption::Severity(_) => Value::Null,
            RuleOption::Options(Value::Object(map)) => {
                let mut map = map.clone();
                map.remove("severity");
                Value::Object(map)
            }
            RuleOption::Options(v) => v.clone(),
        }
    }
}

impl LinterConfig {
    /// Creates a configuration with no rules and the default plugins.
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            options: BTreeMap::new(),
            plugins: default_plugins(),
            settings: Settings::new(),
            max_fix_iterations: DEFAULT_MAX_FIX_ITERATIONS,
            parallel: true,
        }
    }

    /// Parses configuration from a JSON string. Comments and trailing commas
    /// are accepted.
    pub fn from_json(json: &str) -> Result<Self, LinterError> {
        let parse_options = jsonc_parser::ParseOptions::default();
        let value = jsonc_parser::parse_to_serde_value(json, &parse_options)
            .map_err(|e| LinterError::config(format!("Invalid JSON: {}", e)))?
            .unwrap_or(Value::Object(serde_json::Map::new()));

        Self::from_value(value)
    }

    /// Builds configuration from an already-parsed JSON value with schema
    /// validation.
    pub fn from_value(value: Value) -> Result<Self, LinterError> {
        let schema = CONFIG_SCHEMA
            .get_or_init(|| {
                let schema_json: Value = serde_json::from_str(SCHEMA_JSON)
                    .map_err(|e| format!("Invalid embedded config schema: {e}"))?;
                Validator::new(&schema_json)
                    .map_err(|e| format!("Invalid config schema compilation: {e}"))
            })
            .as_ref()
            .map_err(|e| LinterError::internal(e.clone()))?;

        let errors: Vec<String> = schema
            .iter_errors(&value)
            .map(|e| format!("{} at {}", e, e.instance_path()))
            .collect();
        if !errors.is_empty() {
            return Err(LinterError::config(format!(
                "Config validation failed: {}",
                errors.join("; ")
            )));
        }

        serde_json::from_value(value)
            .map_err(|e| LinterError::config(format!("Invalid config: {}", e)))
    }

    /// Adds a rule reference.
    pub fn with_rule(mut self, rule_id: impl Into<String>) -> Self {
        self.rules.push(RuleDefinition::Simple(rule_id.into()));
        self
    }

    /// Sets the option entry of a rule.
    pub fn with_option(mut self, rule_id: impl Into<String>, option: RuleOption) -> Self {
        self.options.insert(rule_id.into(), option);
        self
    }

    /// Returns the listed rules to bind in order, with their option entries.
    /// Disabled rules are skipped.
    pub fn enabled_rules(&self) -> Vec<(&RuleDefinition, Option<&RuleOption>)> {
        let mut enabled = Vec::new();
        for definition in &self.rules {
            let option = self.options.get(definition.rule_id());
            if option.is_none_or(RuleOption::is_enabled) {
                enabled.push((definition, option));
            }
        }

        enabled
    }

    /// Enabled option entries for rules not listed in `rules`, in id order.
    ///
    /// These are bound after the listed rules.
    pub fn unlisted_rules(&self) -> impl Iterator<Item = (&str, &RuleOption)> {
        self.options
            .iter()
            .filter(|(id, option)| {
                option.is_enabled() && !self.rules.iter().any(|r| r.rule_id() == id.as_str())
            })
            .map(|(id, option)| (id.as_str(), option))
    }
}

impl Default for LinterConfig {
    fn default() -> Self {
        Self::new()
    }
}
