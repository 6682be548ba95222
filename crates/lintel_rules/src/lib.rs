//! # lintel_rules
//!
//! Built-in rule units.
//!
//! | Rule | Kind | Fixable |
//! |------|------|---------|
//! | `no-emoji` | document | yes |
//! | `no-todo` | document | no |
//! | `no-trailing-spaces` | document | yes |
//! | `no-duplicate-document` | session | no |

use std::sync::Arc;

use lintel_plugin::{Rule, SessionRule};

mod no_duplicate_document;
mod no_emoji;
mod no_todo;
mod no_trailing_spaces;

#[cfg(test)]
mod test_utils;

pub use no_duplicate_document::NoDuplicateDocument;
pub use no_emoji::NoEmoji;
pub use no_todo::NoTodo;
pub use no_trailing_spaces::NoTrailingSpaces;

/// Returns every built-in per-document rule.
pub fn builtin_rules() -> Vec<Arc<dyn Rule>> {
    vec![
        Arc::new(NoEmoji::new()),
        Arc::new(NoTodo::new()),
        Arc::new(NoTrailingSpaces::new()),
    ]
}

/// Returns every built-in session rule.
pub fn builtin_session_rules() -> Vec<Arc<dyn SessionRule>> {
    vec![Arc::new(NoDuplicateDocument::new())]
}
