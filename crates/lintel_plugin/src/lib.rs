//! # lintel_plugin
//!
//! The rule unit contract for Lintel.
//!
//! A rule unit inspects a parsed [`lintel_ast::Document`] and yields
//! [`Diagnostic`]s, each optionally carrying a [`Fix`]. Per-document units
//! implement [`Rule`]; units that need the whole batch implement
//! [`SessionRule`].

mod diagnostic;
mod error;
mod manifest;
mod rule;

pub use diagnostic::{Diagnostic, Fix, Severity};
pub use error::RuleError;
pub use manifest::RuleManifest;
pub use rule::{
    Rule, RuleContext, SessionContext, SessionDocument, SessionRule, Settings, parse_options,
};
