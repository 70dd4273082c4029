//! Cache replacement policy library.
//!
//! This crate implements victim selection for set-associative caches with the following:
//! 1. **Counter:** Bounded saturating counters for re-reference prediction values.
//! 2. **Config:** Serde-deserializable policy configuration with construction-time validation.
//! 3. **Policies:** SHiP (signature-based hit prediction), RRIP, LRU, and Random
//!    replacement, all behind one trait.
//!
//! The library owns no cache storage. The surrounding cache keeps one
//! [`LineState`] per line, hands the policy a mutable slice of them at
//! eviction time, and calls the lifecycle hooks (`reset`, `touch`,
//! `invalidate`) as lines are filled, hit, and dropped. The policy returns
//! decisions and mutates per-line state; it never moves data.

/// Policy configuration (defaults, enums, validation).
pub mod config;
/// Bounded saturating counter used for RRPV and SHCT entries.
pub mod counter;
/// Replacement policy implementations (SHiP, RRIP, LRU, Random).
pub mod policies;

/// Policy configuration; use `PolicyConfig::default()` or deserialize from JSON.
pub use crate::config::PolicyConfig;
/// Per-line replacement state; owned by the cache line, mutated by the policy.
pub use crate::policies::LineState;
/// The policy trait; construct implementations with [`policies::build_policy`].
pub use crate::policies::ReplacementPolicy;
