//! Bookkeeping for the bounded fix loop.

use blake3::Hash;

/// How a fix loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixOutcome {
    /// No further patch was accepted.
    Converged { iterations: usize },
    /// The iteration cap was hit while patches were still being accepted.
    MaxIterationsReached { iterations: usize },
    /// An adopted text equals one seen earlier in the loop.
    CycleDetected { cycle_length: usize },
    /// Patched text could not be parsed; the fix was rolled back.
    Unsafe,
}

/// Tracks iterations and the history of adopted texts of one document.
#[derive(Debug)]
pub struct FixCoordinator {
    max_iterations: usize,
    history: Vec<Hash>,
    iterations: usize,
}

impl FixCoordinator {
    /// Starts a loop over `initial` allowing at most `max_iterations` adopted
    /// rewrites.
    pub fn new(max_iterations: usize, initial: &str) -> Self {
        Self {
            max_iterations,
            history: vec![hash_content(initial)],
            iterations: 0,
        }
    }

    /// Number of rewrites adopted so far.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Returns true while another rewrite may be adopted.
    pub fn can_continue(&self) -> bool {
        self.iterations < self.max_iterations
    }

    /// Records an adopted rewrite.
    ///
    /// Returns the cycle length if `content` was already seen in this loop.
    pub fn record(&mut self, content: &str) -> Option<usize> {
        self.iterations += 1;
        let current = hash_content(content);
        if let Some(prev_idx) = self.history.iter().position(|h| *h == current) {
            return Some(self.history.len() - prev_idx);
        }
        self.history.push(current);
        None
    }
}

fn hash_content(content: &str) -> Hash {
    blake3::hash(content.as_bytes())
}
