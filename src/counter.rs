//! Bounded Saturating Counter.
//!
//! Re-reference prediction values and signature history counters are both
//! small saturating counters: incrementing at the ceiling or decrementing
//! at zero is a no-op rather than a wrap. The bit width is fixed at
//! construction and every mutation stays inside `[0, 2^bits - 1]`.

/// A saturating counter with a construction-time bit width.
///
/// The counter is a plain value type: `Copy`, ordered by value, and cheap
/// enough to embed one per cache line and sixteen thousand per history
/// table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SatCounter {
    value: u32,
    max: u32,
}

impl SatCounter {
    /// Creates a counter starting at zero.
    ///
    /// `bits` must be in `[1, 31]`; the config layer validates user input
    /// before any counter is built, so an out-of-range width here is a
    /// programmer error.
    pub const fn new(bits: u32) -> Self {
        debug_assert!(bits >= 1 && bits <= 31);
        Self {
            value: 0,
            max: (1 << bits) - 1,
        }
    }

    /// Creates a counter starting at its ceiling.
    ///
    /// Freshly instantiated lines start with the most distant re-reference
    /// prediction, so this is the usual constructor for RRPV state.
    pub const fn new_at_max(bits: u32) -> Self {
        debug_assert!(bits >= 1 && bits <= 31);
        let max = (1 << bits) - 1;
        Self { value: max, max }
    }

    /// Increments the counter, saturating at the ceiling.
    pub const fn increment(&mut self) {
        if self.value < self.max {
            self.value += 1;
        }
    }

    /// Decrements the counter, saturating at zero.
    pub const fn decrement(&mut self) {
        if self.value > 0 {
            self.value -= 1;
        }
    }

    /// Jumps the counter to its ceiling.
    pub const fn saturate(&mut self) {
        self.value = self.max;
    }

    /// Jumps the counter to zero.
    pub const fn reset(&mut self) {
        self.value = 0;
    }

    /// Returns `true` if the counter sits at its ceiling.
    pub const fn is_max(&self) -> bool {
        self.value == self.max
    }

    /// Current counter value.
    pub const fn value(&self) -> u32 {
        self.value
    }

    /// The ceiling, `2^bits - 1`.
    pub const fn max(self) -> u32 {
        self.max
    }
}
