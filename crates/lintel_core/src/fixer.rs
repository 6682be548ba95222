//! Patch selection and application.

use lintel_ast::Span;
use lintel_plugin::Fix;
use tracing::{debug, warn};

/// A patch proposed during one fix iteration.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    /// Position of the proposing rule in execution order.
    pub rule_order: usize,
    pub fix: &'a Fix,
}

impl<'a> Candidate<'a> {
    pub fn new(rule_order: usize, fix: &'a Fix) -> Self {
        Self { rule_order, fix }
    }
}

/// Result of applying patches to a text.
#[derive(Debug)]
pub struct FixerResult {
    /// Number of fixes applied.
    pub fixes_applied: usize,
    /// The fixed content.
    pub fixed_content: String,
}

impl FixerResult {
    /// Creates a new fixer result.
    pub fn new(fixes_applied: usize, fixed_content: String) -> Self {
        Self {
            fixes_applied,
            fixed_content,
        }
    }
}

/// Picks the patches to apply in one iteration.
///
/// Candidates are taken by range start, then rule order; a candidate is
/// accepted when it does not conflict with one accepted before it. Two
/// patches conflict when their ranges overlap or when they start at the same
/// offset, so of two patches on the same range the earlier rule wins.
/// Out-of-bounds, reversed or non char-boundary ranges are dropped, and so
/// are patches that would not change the text.
///
/// The accepted patches are returned sorted by start, descending.
pub fn select_patches<'a>(content: &str, candidates: &[Candidate<'a>]) -> Vec<&'a Fix> {
    let mut ordered = candidates.to_vec();
    ordered.sort_by_key(|c| (c.fix.span.start, c.rule_order));

    let mut accepted: Vec<&'a Fix> = Vec::with_capacity(ordered.len());
    for Candidate { fix, .. } in ordered {
        if !fix.span.is_valid_for(content) {
            warn!(
                "Invalid fix span: start={}, end={}, content_len={}",
                fix.span.start,
                fix.span.end,
                content.len()
            );
            continue;
        }
        if &content[fix.span.to_range()] == fix.text {
            debug!("Skipping no-op fix at [{}, {}]", fix.span.start, fix.span.end);
            continue;
        }
        if accepted.iter().any(|other| conflicts(&other.span, &fix.span)) {
            warn!(
                "Skipping overlapping fix at [{}, {}]",
                fix.span.start, fix.span.end
            );
            continue;
        }
        accepted.push(fix);
    }

    accepted.sort_by(|a, b| b.span.start.cmp(&a.span.start));
    accepted
}

fn conflicts(a: &Span, b: &Span) -> bool {
    a.overlaps(b) || a.start == b.start
}

/// Applies already selected patches.
///
/// Patches are applied from the end of the text to the beginning so earlier
/// offsets stay valid. `patches` must be sorted by start, descending, and
/// must not overlap.
pub fn apply_patches(content: &str, patches: &[&Fix]) -> FixerResult {
    let mut result = content.to_string();
    for fix in patches {
        debug!(
            "Applying fix: replace [{}..{}] with '{}'",
            fix.span.start, fix.span.end, fix.text
        );
        result.replace_range(fix.span.to_range(), &fix.text);
    }

    FixerResult::new(patches.len(), result)
}
