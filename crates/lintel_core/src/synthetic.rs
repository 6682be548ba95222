//! Rule ids of messages the linter itself emits.
//!
//! Failures of a configured rule are reported under that rule's own id;
//! everything else uses one of these.

use lintel_ast::{Location, Position, Span};
use lintel_plugin::{Diagnostic, Severity};

/// The document could not be parsed.
pub const PARSE_ERROR: &str = "lintel/parse-error";

/// No format plugin is bound for the document kind.
pub const UNSUPPORTED_KIND: &str = "lintel/unsupported-kind";

/// Applying fixes produced text the format plugin rejected.
pub const UNSAFE_FIX: &str = "lintel/unsafe-fix";

/// The fix loop stopped before reaching a fixed point.
pub const FIX_NOT_CONVERGED: &str = "lintel/fix-not-converged";

/// The document was not evaluated (e.g. timed out).
pub const TIMEOUT: &str = "lintel/timeout";

/// Anything else, including panics outside rule code.
pub const INTERNAL: &str = "lintel/internal";

/// Builds a message anchored at the start of the document.
pub(crate) fn message(rule_id: &str, severity: Severity, text: impl Into<String>) -> Diagnostic {
    let start = Position::new(1, 0);
    Diagnostic::new(rule_id, text, Span::empty(0))
        .with_severity(severity)
        .with_location(Location::new(start, start))
}
