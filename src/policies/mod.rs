//! Cache Replacement Policies.
//!
//! Implements victim selection algorithms for set-associative caches.
//!
//! # Policies
//!
//! - `Lru`: Least Recently Used.
//! - `Random`: Pseudo-random selection.
//! - `Rrip`: Re-Reference Interval Prediction (bimodal insertion).
//! - `Ship`: Signature-based Hit Prediction over RRIP aging.
//!
//! Unlike an index-only scheme, these policies keep their bookkeeping in a
//! per-line [`LineState`] owned by the cache line itself. The cache calls
//! the lifecycle hooks with a mutable reference to that state and, at
//! eviction time, passes the contending set as a mutable slice.

/// Least Recently Used replacement policy.
pub mod lru;

/// Random replacement policy.
pub mod random;

/// Re-Reference Interval Prediction replacement policy.
pub mod rrip;

/// Signature-based Hit Prediction replacement policy.
pub mod ship;

pub use lru::{LruLine, LruPolicy};
pub use random::RandomPolicy;
pub use rrip::{RripLine, RripPolicy};
pub use ship::{ShipLine, ShipPolicy};

use crate::config::{ConfigError, PolicyConfig, PolicyKind};

/// Per-line replacement state, tagged by the policy family that owns it.
///
/// Each cache line holds exactly one of these, produced by
/// [`ReplacementPolicy::instantiate`] on the same policy instance that
/// will later operate on it. Handing a policy a variant it did not
/// produce is a programmer error and panics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineState {
    /// State for [`LruPolicy`]: logical-clock stamp plus validity.
    Lru(LruLine),
    /// State for [`RandomPolicy`]: validity only.
    Random {
        /// Whether the line currently holds meaningful data.
        valid: bool,
    },
    /// State for [`RripPolicy`]: RRPV counter plus validity.
    Rrip(RripLine),
    /// State for [`ShipPolicy`]: RRPV, validity, reuse outcome, signature.
    Ship(ShipLine),
}

impl LineState {
    /// Whether the line currently holds meaningful data.
    pub const fn is_valid(&self) -> bool {
        match self {
            Self::Lru(line) => line.valid,
            Self::Random { valid } => *valid,
            Self::Rrip(line) => line.valid,
            Self::Ship(line) => line.valid,
        }
    }

    /// Current RRPV for RRIP-family state.
    ///
    /// Returns `None` for LRU and Random lines, which carry no counter.
    pub const fn rrpv(&self) -> Option<u32> {
        match self {
            Self::Rrip(line) => Some(line.rrpv.value()),
            Self::Ship(line) => Some(line.rrpv.value()),
            Self::Lru(_) | Self::Random { .. } => None,
        }
    }
}

/// Trait for cache replacement policies.
///
/// One instance serves every set and way of a cache; cross-line shared
/// state (such as SHiP's history table) lives inside the policy. All
/// hooks are total for state produced by the same instance's
/// [`instantiate`](Self::instantiate); all run in constant time except
/// [`select_victim`](Self::select_victim), which is linear in the
/// candidate count.
pub trait ReplacementPolicy: Send + Sync {
    /// Allocates fresh per-line state: invalid and maximally evictable.
    fn instantiate(&self) -> LineState;

    /// Updates a line's state on a cache hit.
    ///
    /// # Panics
    ///
    /// Panics if `line` was produced by a different policy family.
    fn touch(&mut self, line: &mut LineState);

    /// Resets a line's state on insertion of new data.
    ///
    /// `source` is the inserted memory address, or the originating program
    /// counter when the policy is configured for PC signatures. Policies
    /// that do not derive signatures ignore it.
    ///
    /// # Panics
    ///
    /// Panics if `line` was produced by a different policy family.
    fn reset(&mut self, line: &mut LineState, source: u64);

    /// Invalidates a line, making it the next preferred victim.
    ///
    /// # Panics
    ///
    /// Panics if `line` was produced by a different policy family.
    fn invalidate(&mut self, line: &mut LineState);

    /// Selects a victim among the candidate lines of a set.
    ///
    /// Returns the index of the chosen candidate within the slice. An
    /// invalid line is always chosen over a valid one, first in slice
    /// order; remaining ties also break to the lowest index.
    ///
    /// # Panics
    ///
    /// Panics if `candidates` is empty. The cache layer guarantees a
    /// non-empty set, so an empty slice is a precondition violation.
    fn select_victim(&mut self, candidates: &mut [LineState]) -> usize;
}

/// Xorshift pseudo-random generator for insertion throttling and random
/// victim selection.
///
/// A full RNG is overkill for a per-access decision; this is the classic
/// 13/7/17 xorshift with a fixed seed, so runs are reproducible.
#[derive(Debug, Clone)]
pub(crate) struct Lfsr {
    state: u64,
}

impl Lfsr {
    pub(crate) const fn new() -> Self {
        Self { state: 123456789 }
    }

    /// Advances the generator and returns the next raw value.
    pub(crate) const fn next_value(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Draws a percentage in `[0, 100)`.
    pub(crate) const fn draw_percent(&mut self) -> u32 {
        (self.next_value() % 100) as u32
    }
}

/// Builds the replacement policy selected by `config`.
///
/// Validates the configuration first; parameters are immutable after this
/// point. The returned trait object is what the cache layer holds.
///
/// # Errors
///
/// Returns a [`ConfigError`] if any parameter is out of range.
pub fn build_policy(
    config: &PolicyConfig,
) -> Result<Box<dyn ReplacementPolicy + Send + Sync>, ConfigError> {
    config.validate()?;

    let policy: Box<dyn ReplacementPolicy + Send + Sync> = match config.kind {
        PolicyKind::Lru => Box::new(LruPolicy::new()),
        PolicyKind::Random => Box::new(RandomPolicy::new()),
        PolicyKind::Rrip => Box::new(RripPolicy::new(config)),
        PolicyKind::Ship => Box::new(ShipPolicy::new(config)),
    };
    Ok(policy)
}
