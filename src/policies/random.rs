//! Random Replacement Policy.
//!
//! This policy evicts a pseudo-randomly selected line from the set,
//! preferring an invalid line when one exists. Randomness comes from the
//! shared xorshift generator rather than a full RNG, so victim streams are
//! reproducible run to run.

use super::{Lfsr, LineState, ReplacementPolicy};

/// Random policy state.
#[derive(Debug, Clone)]
pub struct RandomPolicy {
    /// Pseudo-random number generator for victim selection.
    lfsr: Lfsr,
}

impl RandomPolicy {
    /// Creates a new Random policy instance.
    pub const fn new() -> Self {
        Self { lfsr: Lfsr::new() }
    }

    fn valid_mut(line: &mut LineState) -> &mut bool {
        match line {
            LineState::Random { valid } => valid,
            _ => panic!("Random policy received line state from another policy"),
        }
    }
}

impl Default for RandomPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl ReplacementPolicy for RandomPolicy {
    fn instantiate(&self) -> LineState {
        LineState::Random { valid: false }
    }

    /// Access patterns do not affect random replacement; no-op.
    fn touch(&mut self, _line: &mut LineState) {}

    fn reset(&mut self, line: &mut LineState, _source: u64) {
        *Self::valid_mut(line) = true;
    }

    fn invalidate(&mut self, line: &mut LineState) {
        *Self::valid_mut(line) = false;
    }

    /// Returns the first invalid candidate, or a pseudo-random one.
    fn select_victim(&mut self, candidates: &mut [LineState]) -> usize {
        assert!(!candidates.is_empty(), "empty replacement candidate set");

        if let Some(idx) = candidates.iter().position(|line| !line.is_valid()) {
            return idx;
        }
        (self.lfsr.next_value() as usize) % candidates.len()
    }
}
