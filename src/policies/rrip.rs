//! Re-Reference Interval Prediction (RRIP) Replacement Policy.
//!
//! Each line carries a saturating Re-Reference Prediction Value (RRPV):
//! higher means a longer expected interval until reuse, so the line with a
//! saturated RRPV is the preferred victim. When no candidate is saturated,
//! every candidate ages by one step and the search repeats; lines are
//! evicted only once they have aged out, which smooths thrashing for
//! working sets slightly larger than the cache.
//!
//! Insertion is bimodal: a configurable percentage of new lines lands at
//! the distant position (immediately evictable), the rest one step short
//! of it. A 1-bit RRPV degenerates to NRU.
//!
//! # Performance
//!
//! - **Time Complexity:**
//!   - `touch()` / `reset()`: O(1)
//!   - `select_victim()`: O(W × 2^bits) worst case, O(W) typical
//! - **Best Case:** Mixed streaming and re-use patterns
//! - **Worst Case:** Uniformly young sets pay repeated aging passes

use super::{Lfsr, LineState, ReplacementPolicy};
use crate::config::PolicyConfig;
use crate::counter::SatCounter;

/// Per-line RRIP state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RripLine {
    /// Re-Reference Prediction Value; saturated means "evict me first".
    pub rrpv: SatCounter,
    /// Whether the line currently holds meaningful data.
    pub valid: bool,
}

/// RRIP policy state.
#[derive(Debug, Clone)]
pub struct RripPolicy {
    /// RRPV width in bits.
    num_rrpv_bits: u32,
    /// Hit promotion mode: straight to 0 (Hit Priority) or one step
    /// (Frequency Priority).
    hit_priority: bool,
    /// Percentage of insertions forced to the distant position.
    btp: u32,
    /// Pseudo-random generator for the bimodal insertion draw.
    lfsr: Lfsr,
}

impl RripPolicy {
    /// Creates a new RRIP policy instance.
    ///
    /// Expects a configuration already checked by
    /// [`PolicyConfig::validate`].
    pub const fn new(config: &PolicyConfig) -> Self {
        Self {
            num_rrpv_bits: config.num_rrpv_bits,
            hit_priority: config.hit_priority,
            btp: config.btp,
            lfsr: Lfsr::new(),
        }
    }

    fn line_mut(line: &mut LineState) -> &mut RripLine {
        match line {
            LineState::Rrip(line) => line,
            _ => panic!("RRIP policy received line state from another policy"),
        }
    }

    fn line_ref(line: &LineState) -> &RripLine {
        match line {
            LineState::Rrip(line) => line,
            _ => panic!("RRIP policy received line state from another policy"),
        }
    }
}

impl ReplacementPolicy for RripPolicy {
    fn instantiate(&self) -> LineState {
        LineState::Rrip(RripLine {
            rrpv: SatCounter::new_at_max(self.num_rrpv_bits),
            valid: false,
        })
    }

    /// Promotes the line toward the near position.
    fn touch(&mut self, line: &mut LineState) {
        let line = Self::line_mut(line);
        if self.hit_priority {
            line.rrpv.reset();
        } else {
            line.rrpv.decrement();
        }
    }

    /// Inserts at the distant RRPV with probability `btp`%, one step short
    /// of it otherwise.
    fn reset(&mut self, line: &mut LineState, _source: u64) {
        let distant = self.lfsr.draw_percent() < self.btp;
        let line = Self::line_mut(line);
        line.valid = true;
        line.rrpv.saturate();
        if !distant {
            line.rrpv.decrement();
        }
    }

    fn invalidate(&mut self, line: &mut LineState) {
        let line = Self::line_mut(line);
        line.rrpv.saturate();
        line.valid = false;
    }

    /// Classic RRIP search-then-age loop.
    ///
    /// Invalid candidates win immediately. Otherwise the first candidate
    /// with a saturated RRPV is the victim; if none is saturated, every
    /// candidate ages one step and the search repeats. Each pass raises
    /// the set's maximum RRPV, so the loop ends within `2^bits` passes.
    fn select_victim(&mut self, candidates: &mut [LineState]) -> usize {
        assert!(!candidates.is_empty(), "empty replacement candidate set");

        if let Some(idx) = candidates.iter().position(|line| !line.is_valid()) {
            return idx;
        }

        loop {
            if let Some(idx) = candidates
                .iter()
                .position(|line| Self::line_ref(line).rrpv.is_max())
            {
                return idx;
            }
            for candidate in &mut *candidates {
                Self::line_mut(candidate).rrpv.increment();
            }
        }
    }
}
