//! Least Recently Used (LRU) Replacement Policy.
//!
//! This policy evicts the line that has not been accessed for the longest
//! time. Each line carries the logical time of its last access; the policy
//! advances a single logical clock on every touch or insertion, so victim
//! search is a plain minimum scan with no per-set bookkeeping.
//!
//! # Performance
//!
//! - **Time Complexity:**
//!   - `touch()` / `reset()`: O(1)
//!   - `select_victim()`: O(W) where W is the number of ways (associativity)
//! - **Best Case:** Sequential/streaming accesses with good temporal locality
//! - **Worst Case:** Scanning patterns larger than cache capacity (thrashing)

use super::{LineState, ReplacementPolicy};

/// Per-line LRU state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LruLine {
    /// Logical time of the last access to this line.
    pub stamp: u64,
    /// Whether the line currently holds meaningful data.
    pub valid: bool,
}

/// LRU policy state.
#[derive(Debug, Clone)]
pub struct LruPolicy {
    /// Logical clock, advanced on every touch and insertion.
    tick: u64,
}

impl LruPolicy {
    /// Creates a new LRU policy instance.
    pub const fn new() -> Self {
        Self { tick: 0 }
    }

    /// Advances the logical clock and returns the new stamp.
    const fn advance(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    fn line_mut(line: &mut LineState) -> &mut LruLine {
        match line {
            LineState::Lru(line) => line,
            _ => panic!("LRU policy received line state from another policy"),
        }
    }
}

impl Default for LruPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl ReplacementPolicy for LruPolicy {
    fn instantiate(&self) -> LineState {
        LineState::Lru(LruLine {
            stamp: 0,
            valid: false,
        })
    }

    /// Marks the line most recently used.
    fn touch(&mut self, line: &mut LineState) {
        let stamp = self.advance();
        Self::line_mut(line).stamp = stamp;
    }

    /// Marks the line valid and most recently used.
    fn reset(&mut self, line: &mut LineState, _source: u64) {
        let stamp = self.advance();
        let line = Self::line_mut(line);
        line.stamp = stamp;
        line.valid = true;
    }

    fn invalidate(&mut self, line: &mut LineState) {
        let line = Self::line_mut(line);
        line.stamp = 0;
        line.valid = false;
    }

    /// Returns the first invalid candidate, or the valid candidate with the
    /// oldest stamp (lowest index on ties).
    fn select_victim(&mut self, candidates: &mut [LineState]) -> usize {
        assert!(!candidates.is_empty(), "empty replacement candidate set");

        let mut victim = 0;
        let mut oldest = u64::MAX;
        for (idx, candidate) in candidates.iter().enumerate() {
            match candidate {
                LineState::Lru(line) if !line.valid => return idx,
                LineState::Lru(line) if line.stamp < oldest => {
                    oldest = line.stamp;
                    victim = idx;
                }
                LineState::Lru(_) => {}
                _ => panic!("LRU policy received line state from another policy"),
            }
        }
        victim
    }
}
