//! no-duplicate-document rule: Flag documents whose content repeats an
//! earlier document of the batch.
//!
//! Blank documents are never reported.

use std::collections::HashMap;

use lintel_ast::Span;
use lintel_plugin::{Diagnostic, RuleError, RuleManifest, SessionContext, SessionRule, Severity};

const RULE_ID: &str = "no-duplicate-document";
const VERSION: &str = "1.0.0";

/// Session rule comparing content hashes across the batch.
pub struct NoDuplicateDocument {
    manifest: RuleManifest,
}

impl NoDuplicateDocument {
    pub fn new() -> Self {
        Self {
            manifest: RuleManifest::new(RULE_ID, VERSION)
                .with_description("Disallow documents with identical content in one batch"),
        }
    }
}

impl Default for NoDuplicateDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionRule for NoDuplicateDocument {
    fn manifest(&self) -> &RuleManifest {
        &self.manifest
    }

    fn lint_session(
        &self,
        ctx: &SessionContext<'_>,
    ) -> Result<Vec<(usize, Diagnostic)>, RuleError> {
        let mut first_seen: HashMap<blake3::Hash, &str> = HashMap::new();
        let mut diagnostics = Vec::new();

        for doc in ctx.documents {
            if doc.source.trim().is_empty() {
                continue;
            }
            let hash = blake3::hash(doc.source.as_bytes());
            match first_seen.get(&hash) {
                Some(original) => {
                    let diag = ctx
                        .diagnostic(
                            format!("Document has the same content as '{original}'."),
                            Span::new(0, doc.source.len() as u32),
                        )
                        .with_severity(Severity::Warning);
                    diagnostics.push((doc.index, diag));
                }
                None => {
                    first_seen.insert(hash, doc.id);
                }
            }
        }

        Ok(diagnostics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lintel_plugin::{SessionDocument, Settings};
    use pretty_assertions::assert_eq;
    use serde_json::Value;

    fn run(sources: &[(&str, &str)]) -> Vec<(usize, Diagnostic)> {
        let documents: Vec<SessionDocument<'_>> = sources
            .iter()
            .enumerate()
            .map(|(index, &(id, source))| SessionDocument {
                index,
                id,
                kind: "text",
                source,
            })
            .collect();
        let settings = Settings::new();
        let ctx = SessionContext {
            rule_id: RULE_ID,
            documents: &documents,
            options: &Value::Null,
            settings: &settings,
        };
        NoDuplicateDocument::new().lint_session(&ctx).unwrap()
    }

    #[test]
    fn later_copies_are_reported_against_the_first() {
        let results = run(&[
            ("a.txt", "same text"),
            ("b.txt", "other"),
            ("c.txt", "same text"),
            ("d.txt", "same text"),
        ]);

        let indices: Vec<usize> = results.iter().map(|(i, _)| *i).collect();
        assert_eq!(indices, vec![2, 3]);
        assert_eq!(results[0].1.message, "Document has the same content as 'a.txt'.");
        assert_eq!(results[0].1.span, Span::new(0, 9));
    }

    #[test]
    fn blank_documents_are_ignored() {
        let results = run(&[("a.txt", ""), ("b.txt", "  \n"), ("c.txt", "")]);
        assert!(results.is_empty());
    }
}
