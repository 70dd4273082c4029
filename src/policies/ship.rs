//! Signature-based Hit Prediction (SHiP) Replacement Policy.
//!
//! SHiP keeps RRIP's aging and victim search but chooses the *insertion*
//! RRPV by prediction. Every insertion is tagged with a 14-bit signature
//! derived from the memory address or the originating program counter. A
//! global Signature History Counter Table (SHCT), shared across all sets
//! and ways, counts per signature whether past insertions were reused
//! before eviction: reuse increments the counter, a dead eviction
//! decrements it, both saturating.
//!
//! On insertion, a signature with a saturated counter predicts reuse and
//! the line lands one step short of the distant position; any other
//! signature is inserted "dead" at the distant position so it drains
//! quickly instead of displacing useful lines. A bimodal throttle still
//! forces a small percentage of predicted-reuse insertions to the distant
//! position, bounding the damage of stale history.
//!
//! # Performance
//!
//! - **Time Complexity:**
//!   - `touch()` / `reset()` / `invalidate()`: O(1)
//!   - `select_victim()`: O(W × 2^bits) worst case, O(W) typical
//! - **Space Complexity:** O(16K) counters shared by the whole cache
//! - **Best Case:** Workloads with stable per-PC or per-region reuse behavior
//! - **Worst Case:** Signature aliasing across phases with opposite behavior

use tracing::trace;

use super::{Lfsr, LineState, ReplacementPolicy};
use crate::config::{PolicyConfig, SignatureSource};
use crate::counter::SatCounter;

/// Signature width in bits.
///
/// Together with [`SHCT_ENTRIES`] this fixes the table geometry. The
/// values follow the published design; they are compile-time constants
/// here, not behavioral requirements.
pub const SIGNATURE_BITS: u32 = 14;

/// Number of entries in the Signature History Counter Table.
pub const SHCT_ENTRIES: usize = 1 << SIGNATURE_BITS;

/// Mask selecting one signature worth of low bits.
const SIGNATURE_MASK: u64 = (SHCT_ENTRIES as u64) - 1;

/// Per-line SHiP state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShipLine {
    /// Re-Reference Prediction Value; saturated means "evict me first".
    pub rrpv: SatCounter,
    /// Whether the line currently holds meaningful data.
    pub valid: bool,
    /// Whether the line has been re-referenced since insertion.
    pub outcome: bool,
    /// Signature this line was inserted under; indexes the SHCT at
    /// insertion and again at eviction feedback.
    pub signature: u16,
}

/// SHiP policy state.
///
/// One instance serves the whole cache; the SHCT is the only cross-line
/// shared mutable state, owned here and mutated through `&mut self`.
#[derive(Debug, Clone)]
pub struct ShipPolicy {
    /// RRPV width in bits.
    num_rrpv_bits: u32,
    /// What `reset` receives: memory address or program counter.
    signature_source: SignatureSource,
    /// Hit promotion mode: straight to 0 (Hit Priority) or one step
    /// (Frequency Priority).
    hit_priority: bool,
    /// Percentage of predicted-reuse insertions still forced distant.
    btp: u32,
    /// Signature History Counter Table.
    shct: Vec<SatCounter>,
    /// Pseudo-random generator for the bimodal throttle draw.
    lfsr: Lfsr,
}

impl ShipPolicy {
    /// Creates a new SHiP policy instance with a cold (all-zero) SHCT.
    ///
    /// Expects a configuration already checked by
    /// [`PolicyConfig::validate`].
    pub fn new(config: &PolicyConfig) -> Self {
        Self {
            num_rrpv_bits: config.num_rrpv_bits,
            signature_source: config.signature_source,
            hit_priority: config.hit_priority,
            btp: config.btp,
            shct: vec![SatCounter::new(config.num_shct_bits); SHCT_ENTRIES],
            lfsr: Lfsr::new(),
        }
    }

    /// Derives the 14-bit signature for a source value.
    ///
    /// Address mode truncates to the low signature bits; spatial locality
    /// does the rest. PC mode drops the instruction-alignment bits and
    /// XOR-folds the remainder so clustered instruction addresses spread
    /// across the full table.
    pub const fn signature(&self, source: u64) -> u16 {
        match self.signature_source {
            SignatureSource::Address => (source & SIGNATURE_MASK) as u16,
            SignatureSource::Pc => {
                let mut value = source >> 2;
                let mut folded = 0;
                while value != 0 {
                    folded ^= value & SIGNATURE_MASK;
                    value >>= SIGNATURE_BITS;
                }
                folded as u16
            }
        }
    }

    /// Current SHCT counter value for a signature.
    ///
    /// # Panics
    ///
    /// Panics if `signature` does not fit the table; use values produced
    /// by [`Self::signature`].
    pub fn shct_value(&self, signature: u16) -> u32 {
        self.shct[signature as usize].value()
    }

    /// Feeds one finished tenancy back into the SHCT.
    fn train(&mut self, signature: u16, reused: bool) {
        let entry = &mut self.shct[signature as usize];
        if reused {
            entry.increment();
        } else {
            entry.decrement();
        }
        trace!(
            signature,
            reused,
            counter = entry.value(),
            "SHCT feedback"
        );
    }

    fn line_mut(line: &mut LineState) -> &mut ShipLine {
        match line {
            LineState::Ship(line) => line,
            _ => panic!("SHiP policy received line state from another policy"),
        }
    }

    fn line_ref(line: &LineState) -> &ShipLine {
        match line {
            LineState::Ship(line) => line,
            _ => panic!("SHiP policy received line state from another policy"),
        }
    }
}

impl ReplacementPolicy for ShipPolicy {
    fn instantiate(&self) -> LineState {
        LineState::Ship(ShipLine {
            rrpv: SatCounter::new_at_max(self.num_rrpv_bits),
            valid: false,
            outcome: false,
            signature: 0,
        })
    }

    /// Records the reuse and promotes the line toward the near position.
    fn touch(&mut self, line: &mut LineState) {
        let line = Self::line_mut(line);
        line.outcome = true;
        if self.hit_priority {
            line.rrpv.reset();
        } else {
            line.rrpv.decrement();
        }
    }

    /// Inserts new data, choosing the RRPV by SHCT prediction.
    ///
    /// If the line still holds a valid prior tenancy (replacement-driven
    /// overwrite with no intervening `invalidate`), its outcome is fed
    /// back first so the table never loses an observation. The new tenancy
    /// then lands one step short of distant when its signature's counter
    /// is saturated and the throttle draw allows, distant otherwise.
    fn reset(&mut self, line: &mut LineState, source: u64) {
        let (prior_signature, prior_outcome, prior_valid) = {
            let line = Self::line_ref(line);
            (line.signature, line.outcome, line.valid)
        };
        if prior_valid {
            self.train(prior_signature, prior_outcome);
        }

        let signature = self.signature(source);
        let predicts_reuse = self.shct[signature as usize].is_max();
        let throttled = predicts_reuse && self.lfsr.draw_percent() < self.btp;

        let line = Self::line_mut(line);
        line.signature = signature;
        line.valid = true;
        line.outcome = false;
        line.rrpv.saturate();
        if predicts_reuse && !throttled {
            line.rrpv.decrement();
        }
        trace!(
            signature,
            predicts_reuse,
            throttled,
            rrpv = line.rrpv.value(),
            "inserted"
        );
    }

    /// Feeds the tenancy's outcome back, then parks the line as the next
    /// preferred victim.
    fn invalidate(&mut self, line: &mut LineState) {
        let (signature, outcome, valid) = {
            let line = Self::line_ref(line);
            (line.signature, line.outcome, line.valid)
        };
        if valid {
            self.train(signature, outcome);
        }

        let line = Self::line_mut(line);
        line.rrpv.saturate();
        line.valid = false;
        line.outcome = false;
    }

    /// Classic RRIP search-then-age loop.
    ///
    /// Invalid candidates win immediately, first in slice order. Otherwise
    /// the first candidate with a saturated RRPV is the victim; if none is
    /// saturated, every candidate ages one step and the search repeats.
    /// Each pass raises the set's maximum RRPV, so the loop ends within
    /// `2^bits` passes.
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
            trace!(candidates = candidates.len(), "aging pass");
            for candidate in &mut *candidates {
                Self::line_mut(candidate).rrpv.increment();
            }
        }
    }
}
