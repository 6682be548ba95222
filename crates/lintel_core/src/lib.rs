//! # lintel_core
//!
//! Composition and execution kernel for Lintel.
//!
//! This crate provides:
//! - [`Registry`]: stable ids mapped to rule units and format plugins
//! - [`LinterConfig`]: the resolved configuration value
//! - [`Descriptor`]: validated, immutable composition of rules and plugins
//! - [`Kernel`]: lints or fixes one document
//! - [`SessionRunner`]: evaluates a batch, isolating failures per document
//!
//! ## Example
//!
//! ```rust
//! use lintel_core::{LinterConfig, Mode, Registry, SessionRunner, SourceDocument};
//!
//! let config = LinterConfig::from_json(r#"{ "rules": ["no-emoji"] }"#).unwrap();
//! let runner = SessionRunner::from_config(&config, &Registry::builtin()).unwrap();
//!
//! let documents = vec![SourceDocument::new("hello.md", "markdown", "Hello 🎉 world")];
//! let batch = runner.run(&documents, Mode::Fix);
//!
//! assert_eq!(batch.documents[0].fixed_text.as_deref(), Some("Hello  world"));
//! ```

mod config;
mod descriptor;
mod error;
pub mod fix;
pub mod fixer;
mod kernel;
mod registry;
mod result;
mod session;
pub mod synthetic;

pub use config::{
    DEFAULT_MAX_FIX_ITERATIONS, DEFAULT_PLUGINS, LinterConfig, RuleDefinition,
    RuleDefinitionDetail, RuleOption,
};
pub use descriptor::{Descriptor, PluginBinding, RuleDescriptor};
pub use error::{DescriptorError, LinterError, Violation};
pub use fix::{FixCoordinator, FixOutcome};
pub use fixer::FixerResult;
pub use kernel::{Kernel, Mode, SourceDocument};
pub use registry::{Registry, RuleUnit};
pub use result::{BatchResult, DocumentResult, LintSummary};
pub use session::SessionRunner;

/// Best-effort text of a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
